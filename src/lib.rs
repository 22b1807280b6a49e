//! waycast - headless Wayland compositor core
//!
//! Drives a smithay-based compositor stack with no physical output:
//! client surfaces are tracked in a wid-addressed registry, rendered
//! off-screen, and published to an embedding host (typically a
//! remote-desktop server) as named events carrying window metadata,
//! damage rectangles and raw BGRA pixel frames. The host injects user
//! input back through the seat facades.

pub mod compositor;
pub mod config;
pub mod events;
pub mod frame;
pub mod input;

// Re-exports
pub use compositor::{Compositor, HeadlessCompositor};
pub use config::Config;
pub use events::{Event, EventBus, ListenerId};
pub use frame::{DamageRect, PixelFormat, SurfaceImage};
pub use input::{Keyboard, Pointer};
