pub mod animation;
pub mod frame;
pub mod source;

pub use animation::*;
pub use frame::*;
pub use source::*;
