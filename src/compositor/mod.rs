//! Headless Wayland compositor built on smithay
//!
//! Client surfaces are tracked in a wid-addressed registry, rendered into
//! an off-screen Pixman buffer, and published to the embedding host as
//! named events carrying window metadata, damage and pixel frames.

pub mod handlers;
pub mod headless;
pub mod runtime;
pub mod state;
pub mod surfaces;

pub use headless::HeadlessBackend;
pub use runtime::HeadlessCompositor;
pub use state::Compositor;
pub use surfaces::{SurfaceRecord, SurfaceRegistry};
