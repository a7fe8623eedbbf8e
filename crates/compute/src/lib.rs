pub mod containment;
pub mod sampler;

pub use containment::*;
pub use sampler::*;
