//! `#[cfg(test)]`-only in-memory backend: exercises the `FilterResult`
//! algebra against real (if trivial) pixels without any concrete rasterizer
//! dependency, which spec.md §1 puts out of scope for the shipped crate.
//!
//! Grounded in shape on the teacher's `src/surface_utils/shared_surface.rs`
//! (a raw premultiplied-pixel buffer wrapped in safe accessors) but backed by
//! `Vec<f32>` rather than a Cairo image surface, since no concrete backend
//! ships here.

#![cfg(test)]

use std::sync::Arc;

use crate::backend::{
    Backend, Blender, ClipOp, ColorFilter, ColorSpace, Device, DrawConstraint, Shader, SpecialImage,
};
use crate::geometry::{IRect, ISize, Matrix};
use crate::sampling::{SamplingOptions, TileMode};

/// A premultiplied-RGBA-f32 pixel buffer, row-major, `subset` relative to
/// `(0, 0)` of the backing store (they always coincide here; the distinction
/// from a real atlas-backed cache is not exercised by these tests).
#[derive(Debug, Clone)]
pub struct TestImage {
    subset: IRect,
    pixels: Arc<Vec<f32>>,
}

impl TestImage {
    /// Builds a solid-color image of `size`, `color` as `[r, g, b, a]`
    /// premultiplied.
    pub fn solid(size: ISize, color: [f32; 4]) -> Self {
        let n = (size.w.max(0) as usize) * (size.h.max(0) as usize);
        let mut pixels = Vec::with_capacity(n * 4);
        for _ in 0..n {
            pixels.extend_from_slice(&color);
        }
        Self {
            subset: IRect::from_size(size.w, size.h),
            pixels: Arc::new(pixels),
        }
    }

    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }
}

impl SpecialImage for TestImage {
    fn dimensions(&self) -> ISize {
        ISize::new(self.subset.width(), self.subset.height())
    }

    fn subset(&self) -> IRect {
        self.subset
    }

    fn backing_store_dimensions(&self) -> ISize {
        self.dimensions()
    }

    fn color_space(&self) -> ColorSpace {
        ColorSpace::srgb()
    }

    fn make_subset(&self, subset: IRect) -> Arc<dyn SpecialImage> {
        Arc::new(Self {
            subset,
            pixels: Arc::clone(&self.pixels),
        })
    }

    fn as_shader(
        &self,
        tile_mode: TileMode,
        sampling: SamplingOptions,
        local_matrix: Matrix,
        strict: bool,
    ) -> Arc<dyn Shader> {
        Arc::new(TestShader {
            tile_mode,
            sampling,
            local_matrix,
            strict,
        })
    }
}

#[derive(Debug)]
struct TestShader {
    #[allow(dead_code)]
    tile_mode: TileMode,
    #[allow(dead_code)]
    sampling: SamplingOptions,
    #[allow(dead_code)]
    local_matrix: Matrix,
    #[allow(dead_code)]
    strict: bool,
}

impl Shader for TestShader {}

#[derive(Debug)]
pub struct TestBlender;

impl Blender for TestBlender {
    fn affects_transparent_black(&self) -> bool {
        false
    }
}

/// An in-memory render target: a flat f32 canvas plus a clip-rect stack.
#[derive(Debug)]
pub struct TestDevice {
    size: ISize,
    local_to_device: Matrix,
    clip_stack: Vec<IRect>,
    canvas: Vec<f32>,
}

impl TestDevice {
    fn new(size: ISize) -> Self {
        let n = (size.w.max(0) as usize) * (size.h.max(0) as usize) * 4;
        Self {
            size,
            local_to_device: Matrix::identity(),
            clip_stack: vec![IRect::from_size(size.w, size.h)],
            canvas: vec![0.0; n],
        }
    }
}

impl Device for TestDevice {
    fn local_to_device(&self) -> Matrix {
        self.local_to_device
    }

    fn dev_clip_bounds(&self) -> IRect {
        *self.clip_stack.last().expect("clip stack never empty")
    }

    fn push_clip_stack(&mut self) {
        let top = *self.clip_stack.last().expect("clip stack never empty");
        self.clip_stack.push(top);
    }

    fn pop_clip_stack(&mut self) {
        if self.clip_stack.len() > 1 {
            self.clip_stack.pop();
        }
    }

    fn clip_rect(&mut self, rect: IRect, op: ClipOp, _anti_alias: bool) {
        let top = self.clip_stack.last_mut().expect("clip stack never empty");
        *top = match op {
            ClipOp::Intersect => top.intersection(&rect).unwrap_or(IRect::empty()),
            ClipOp::Difference => *top, // not exercised by these tests
        };
    }

    fn draw_paint(
        &mut self,
        _shader: Option<&dyn Shader>,
        _blender: Option<&dyn Blender>,
        _local_matrix: Option<Matrix>,
    ) {
        for v in self.canvas.iter_mut() {
            *v = 1.0;
        }
    }

    fn draw_special(
        &mut self,
        image: &dyn SpecialImage,
        _matrix: Matrix,
        _sampling: SamplingOptions,
        _color_filter: Option<&dyn ColorFilter>,
        _blender: Option<&dyn Blender>,
        _constraint: DrawConstraint,
    ) {
        // Flat-fill approximation: real compositing is out of scope for this
        // in-memory stand-in, which only needs to prove draws were reached.
        let dims = image.dimensions();
        let n = (dims.w.max(0) as usize * dims.h.max(0) as usize * 4).min(self.canvas.len());
        for v in self.canvas[..n].iter_mut() {
            *v = 1.0;
        }
    }

    fn snap_special(self: Box<Self>, subset: IRect) -> Option<Arc<dyn SpecialImage>> {
        let full = IRect::from_size(self.size.w, self.size.h);
        let clipped = subset.intersection(&full)?;
        Some(Arc::new(TestImage {
            subset: clipped,
            pixels: Arc::new(self.canvas),
        }))
    }
}

#[derive(Debug)]
pub struct TestBackend {
    color_space: ColorSpace,
}

impl TestBackend {
    pub fn new() -> Self {
        let _ = env_logger::try_init();
        Self {
            color_space: ColorSpace::srgb(),
        }
    }
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for TestBackend {
    fn make_device(&self, size: ISize, _color_space: &ColorSpace) -> Option<Box<dyn Device>> {
        if size.w <= 0 || size.h <= 0 {
            return None;
        }
        Some(Box::new(TestDevice::new(size)))
    }

    fn make_image(&self, subset: IRect) -> Option<Arc<dyn SpecialImage>> {
        if subset.is_empty() {
            return None;
        }
        Some(Arc::new(TestImage::solid(
            ISize::new(subset.width(), subset.height()),
            [0.0, 0.0, 0.0, 0.0],
        )))
    }

    fn get_blur_engine(&self) -> Option<Arc<dyn crate::backend::BlurEngine>> {
        None
    }

    fn color_space(&self) -> ColorSpace {
        self.color_space.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_image_has_requested_dimensions() {
        let img = TestImage::solid(ISize::new(4, 5), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(img.dimensions(), ISize::new(4, 5));
        assert_eq!(img.pixels().len(), 4 * 5 * 4);
    }

    #[test]
    fn device_snap_clips_to_device_bounds() {
        let backend = TestBackend::new();
        let device = backend.make_device(ISize::new(8, 8), &backend.color_space()).unwrap();
        let img = device.snap_special(IRect::new(-2, -2, 20, 20)).unwrap();
        assert_eq!(img.subset(), IRect::new(0, 0, 8, 8));
    }
}
