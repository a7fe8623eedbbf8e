//! Dotted wireframe globe: rotation, interaction, projection and drawing.
//!
//! Everything here is platform-neutral. Hosts provide a [`Surface`] to draw
//! on and a [`runtime::FrameSource`] to drive the animation loop.

pub mod config;
pub mod graticule;
pub mod interaction;
pub mod path;
pub mod projection;
pub mod renderer;
pub mod rotation;
pub mod surface;
pub mod widget;

pub use config::*;
pub use graticule::*;
pub use interaction::*;
pub use path::*;
pub use projection::*;
pub use renderer::*;
pub use rotation::*;
pub use surface::*;
pub use widget::*;
