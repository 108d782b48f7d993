//! A minimal in-memory [`Backend`] for benchmarks, analogous to
//! `crate::testutil` but defined here since that module is `#[cfg(test)]`-only
//! and unreachable from a separate bench binary.

use std::sync::Arc;

use filtres_core::backend::{
    Backend, Blender, ClipOp, ColorFilter, ColorSpace, Device, DrawConstraint, Shader, SpecialImage,
};
use filtres_core::geometry::{IRect, ISize, Matrix};
use filtres_core::sampling::{SamplingOptions, TileMode};

#[derive(Debug, Clone)]
pub struct BenchImage {
    subset: IRect,
    pixels: Arc<Vec<f32>>,
}

impl SpecialImage for BenchImage {
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
        Arc::new(BenchShader {
            tile_mode,
            sampling,
            local_matrix,
            strict,
        })
    }
}

#[derive(Debug)]
struct BenchShader {
    #[allow(dead_code)]
    tile_mode: TileMode,
    #[allow(dead_code)]
    sampling: SamplingOptions,
    #[allow(dead_code)]
    local_matrix: Matrix,
    #[allow(dead_code)]
    strict: bool,
}

impl Shader for BenchShader {}

#[derive(Debug)]
pub struct BenchDevice {
    size: ISize,
    local_to_device: Matrix,
    clip_stack: Vec<IRect>,
    canvas: Vec<f32>,
}

impl BenchDevice {
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

impl Device for BenchDevice {
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
            ClipOp::Difference => *top,
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
        let dims = image.dimensions();
        let n = (dims.w.max(0) as usize * dims.h.max(0) as usize * 4).min(self.canvas.len());
        for v in self.canvas[..n].iter_mut() {
            *v = 1.0;
        }
    }

    fn snap_special(self: Box<Self>, subset: IRect) -> Option<Arc<dyn SpecialImage>> {
        let full = IRect::from_size(self.size.w, self.size.h);
        let clipped = subset.intersection(&full)?;
        Some(Arc::new(BenchImage {
            subset: clipped,
            pixels: Arc::new(self.canvas),
        }))
    }
}

#[derive(Debug)]
pub struct BenchBackend {
    color_space: ColorSpace,
}

impl BenchBackend {
    pub fn new() -> Self {
        Self {
            color_space: ColorSpace::srgb(),
        }
    }
}

impl Backend for BenchBackend {
    fn make_device(&self, size: ISize, _color_space: &ColorSpace) -> Option<Box<dyn Device>> {
        if size.w <= 0 || size.h <= 0 {
            return None;
        }
        Some(Box::new(BenchDevice::new(size)))
    }

    fn make_image(&self, subset: IRect) -> Option<Arc<dyn SpecialImage>> {
        if subset.is_empty() {
            return None;
        }
        let n = (subset.width().max(0) as usize) * (subset.height().max(0) as usize) * 4;
        Some(Arc::new(BenchImage {
            subset,
            pixels: Arc::new(vec![0.0; n]),
        }))
    }

    fn get_blur_engine(&self) -> Option<Arc<dyn filtres_core::BlurEngine>> {
        None
    }

    fn color_space(&self) -> ColorSpace {
        self.color_space.clone()
    }
}
