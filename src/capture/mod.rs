//! Capture hand-off contracts
//!
//! This module defines the seam between the codec session (which
//! produces a writable surface) and the OS screen-capture service (which
//! projects a display onto it).

pub mod display;
pub mod surface;

pub use display::{VirtualDisplay, VirtualDisplaySource};
pub use surface::CaptureSurface;
