pub mod geodesy;
pub mod orthographic;
pub mod vec;

pub use geodesy::*;
pub use orthographic::*;
pub use vec::*;
