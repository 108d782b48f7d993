//! `AutoSurface`: the scoped render-target builder spec.md §5's "Resource
//! discipline" and §9's "Scoped surface" design note both call for — a
//! device acquired at the start of a materialization step is released on
//! every exit path, success or early return, with `snap` the only
//! success-path consumer.

use std::sync::Arc;

use crate::backend::{Backend, ColorSpace, Device, SpecialImage};
use crate::error::{CoreError, IntSize};
use crate::geometry::{IRect, ISize};

/// Owns an optional `Box<dyn Device>` acquired from a [`Backend`]. Dropping
/// an `AutoSurface` that was never snapped simply drops the device; nothing
/// extra needs to run, since `Device` ownership is exactly the backing
/// memory's ownership until a snap transfers it to the returned image.
pub struct AutoSurface {
    device: Option<Box<dyn Device>>,
}

impl AutoSurface {
    /// Acquires a device of `size` in `color_space` from `backend`. `None`
    /// iff allocation failed (spec.md §5 "Cancellation" — the only
    /// mid-operation abort signal the core recognizes).
    pub fn new(backend: &dyn Backend, size: ISize, color_space: &ColorSpace) -> Option<Self> {
        let device = backend.make_device(size, color_space);
        if device.is_none() {
            let err = CoreError::SurfaceAllocationFailed(IntSize { width: size.w, height: size.h });
            log::debug!("AutoSurface::new: {err}");
        }
        device.map(|device| Self { device: Some(device) })
    }

    #[inline]
    pub fn device_mut(&mut self) -> &mut dyn Device {
        self.device.as_deref_mut().expect("AutoSurface used after snap")
    }

    /// Finalizes `subset` of the device's content into an immutable image,
    /// consuming the surface. The only success-path consumer; any other
    /// drop of `self` reclaims the device without producing an image.
    pub fn snap(mut self, subset: IRect) -> Option<Arc<dyn SpecialImage>> {
        self.device.take()?.snap_special(subset)
    }
}
