//! Virtual display source contract
//!
//! The OS screen-capture service projects a display onto the capture
//! surface the codec session handed out. Both sides of that hand-off are
//! opaque to the pipeline core.

use crate::capture::surface::CaptureSurface;
use crate::error::MediaResult;

/// Live screen projection feeding a capture surface
pub trait VirtualDisplay: Send {
    /// Tear the projection down. Idempotent.
    fn release(&mut self);
}

/// OS service able to project a display onto a capture surface
pub trait VirtualDisplaySource: Send + Sync {
    fn create_display(
        &self,
        name: &str,
        width: u32,
        height: u32,
        surface: CaptureSurface,
    ) -> MediaResult<Box<dyn VirtualDisplay>>;
}
