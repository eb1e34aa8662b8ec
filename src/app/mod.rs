//! Session orchestration and the editing-surface seam

pub mod session;
pub mod surface;

pub use session::Session;
pub use surface::{BufferSurface, EditingSurface, SurfaceEvent};
