//! Opaque capture surface handle

use std::any::Any;
use std::fmt;

/// Writable drawing target produced by a codec session and consumed by
/// the virtual-display source.
///
/// Opaque to everything in between: the pipeline core requests it while
/// configured, hands it to the display service, and never draws into it.
/// The codec backend and display source come from the same platform
/// pair, which knows the concrete type it wrapped.
pub struct CaptureSurface {
    inner: Box<dyn Any + Send>,
}

impl CaptureSurface {
    pub fn new<T: Any + Send>(surface: T) -> Self {
        Self {
            inner: Box::new(surface),
        }
    }

    /// Recover the platform surface type, returning the handle untouched
    /// on a mismatch.
    pub fn downcast<T: Any + Send>(self) -> Result<Box<T>, CaptureSurface> {
        match self.inner.downcast::<T>() {
            Ok(surface) => Ok(surface),
            Err(inner) => Err(CaptureSurface { inner }),
        }
    }

    pub fn downcast_ref<T: Any + Send>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }
}

impl fmt::Debug for CaptureSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CaptureSurface")
    }
}
