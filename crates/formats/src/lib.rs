pub mod land;

pub use land::*;
