pub mod dataset;
pub mod early;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod repository;
#[cfg(test)]
mod test_support;

pub use dataset::*;
pub use early::*;
pub use error::*;
pub use fetch::*;
pub use loader::*;
pub use repository::*;
