//! External interfaces the core consumes (spec.md §6): concrete pixel
//! backends, picture recording, and the image-filter DAG itself are all out
//! of scope (spec.md §1) — this module only names the trait boundary.
//!
//! A `#[cfg(test)]`-only in-memory implementation lives in
//! [`crate::testutil`] so the algebra in `filter_result` can be exercised
//! without a real rasterizer.

use std::fmt;
use std::sync::Arc;

use crate::geometry::{IRect, ISize, Matrix};
use crate::sampling::{SamplingOptions, TileMode};

/// An opaque target color space handle. Two images are only compared for
/// equality of color space, never decoded, by the core (see
/// `filter_result::shader`'s "image color space differs from the context's"
/// check).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSpace(pub Arc<str>);

impl ColorSpace {
    pub fn srgb() -> Self {
        ColorSpace(Arc::from("srgb"))
    }
}

/// How strictly a draw must respect the source image's subset rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawConstraint {
    /// The backend may sample slightly outside the subset (e.g. for mipmaps).
    Fast,
    /// The backend must not sample outside the subset (required whenever the
    /// bounds analyzer set `RequiresShaderTiling`).
    Strict,
}

/// Clip combination operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipOp {
    Intersect,
    Difference,
}

/// An immutable, reference-counted image with a pixel-rectangle subset,
/// backed by storage the core never looks inside directly — all pixel
/// access goes through [`Device::draw_special`] / [`Device::snap_special`].
pub trait SpecialImage: fmt::Debug + Send + Sync {
    /// Dimensions of the logical subset (`subset.width()/height()`).
    fn dimensions(&self) -> ISize;
    /// The subset rectangle within the backing store.
    fn subset(&self) -> IRect;
    /// Dimensions of the backing store the subset was carved from. May be
    /// larger than `subset` when the backend packs several images into one
    /// atlas-like surface.
    fn backing_store_dimensions(&self) -> ISize;
    fn color_space(&self) -> ColorSpace;
    /// Carves a sub-rectangle (in the image's own pixel coordinates) out of
    /// this image without copying pixels.
    fn make_subset(&self, subset: IRect) -> Arc<dyn SpecialImage>;
    /// Wraps this image as a shader with the given tile mode / sampling /
    /// local matrix (mapping the shader's invocation space to the image's
    /// pixel space). `strict` mirrors [`DrawConstraint::Strict`].
    fn as_shader(
        &self,
        tile_mode: TileMode,
        sampling: SamplingOptions,
        local_matrix: Matrix,
        strict: bool,
    ) -> Arc<dyn Shader>;
    /// Whether `subset` exactly covers `backing_store_dimensions` (an
    /// "approx-fit" surface has slack used for a cache's size-bucketing).
    fn is_exact_fit(&self) -> bool {
        let store = self.backing_store_dimensions();
        self.subset() == IRect::from_size(store.w, store.h)
    }
}

/// A procedural or image-backed color source, consumed by `Device::draw_paint`
/// and returned by `SpecialImage::as_shader` / `filter_result::as_shader`.
pub trait Shader: fmt::Debug + Send + Sync {}

/// The minimal surface the core needs from a color filter (an external
/// collaborator belonging to "the image-filter DAG", out of scope per
/// spec.md §1).
pub trait ColorFilter: fmt::Debug + Send + Sync {
    /// Whether this filter produces non-transparent output when given
    /// transparent-black input (spec.md's "affects transparent black").
    fn affects_transparent_black(&self) -> bool;
    /// Composes `self` after `inner`: `result(x) = self(inner(x))`.
    fn compose(self: Arc<Self>, inner: Arc<dyn ColorFilter>) -> Arc<dyn ColorFilter>;
}

/// The minimal surface the core needs from a blend mode / blender (another
/// external collaborator).
pub trait Blender: fmt::Debug + Send + Sync {
    fn affects_transparent_black(&self) -> bool;
}

/// A blur algorithm handle, looked up from the backend by color type
/// (spec.md §6 "getBlurEngine").
pub trait BlurEngine: fmt::Debug + Send + Sync {
    /// Blurs `input` by `(sigma_x, sigma_y)`, producing a new image at
    /// `dst_bounds` (which already accounts for the `ceil(3*sigma)` outset
    /// the `Builder::blur` contract applies before calling this).
    fn blur(
        &self,
        input: &dyn SpecialImage,
        sigma_x: f64,
        sigma_y: f64,
        dst_bounds: IRect,
        tile_mode: TileMode,
    ) -> Option<Arc<dyn SpecialImage>>;
}

/// The per-evaluation pixel/device factory (spec.md §6 "Backend interface").
pub trait Backend: fmt::Debug {
    /// Allocates a drawable surface. Returns `None` on allocation failure —
    /// the only mid-operation abort signal the core recognizes (spec.md §5
    /// "Cancellation").
    fn make_device(&self, size: ISize, color_space: &ColorSpace) -> Option<Box<dyn Device>>;
    /// Wraps a raw image with a pixel-rectangle subset.
    fn make_image(&self, subset: IRect) -> Option<Arc<dyn SpecialImage>>;
    fn get_blur_engine(&self) -> Option<Arc<dyn BlurEngine>>;
    fn color_space(&self) -> ColorSpace;
}

/// A render target (spec.md §6 "Device interface").
pub trait Device: fmt::Debug {
    fn local_to_device(&self) -> Matrix;
    fn dev_clip_bounds(&self) -> IRect;
    fn push_clip_stack(&mut self);
    fn pop_clip_stack(&mut self);
    fn clip_rect(&mut self, rect: IRect, op: ClipOp, anti_alias: bool);
    /// Fills the device with `shader` (or a plain color if `shader` is
    /// `None`), composited with `blender` (or source-over if `None`).
    /// `local_matrix`, when given, is concatenated onto the device's current
    /// transform before the paint so a shader defined in a space other than
    /// the device's own (e.g. parameter space) evaluates correctly.
    fn draw_paint(
        &mut self,
        shader: Option<&dyn Shader>,
        blender: Option<&dyn Blender>,
        local_matrix: Option<Matrix>,
    );
    fn draw_special(
        &mut self,
        image: &dyn SpecialImage,
        matrix: Matrix,
        sampling: SamplingOptions,
        color_filter: Option<&dyn ColorFilter>,
        blender: Option<&dyn Blender>,
        constraint: DrawConstraint,
    );
    /// Finalizes the device's content (optionally just `subset` of it) into
    /// an immutable special image, consuming the device. This is the only
    /// success-path consumer of a device acquired via `make_device`
    /// (spec.md §5 "Resource discipline").
    fn snap_special(self: Box<Self>, subset: IRect) -> Option<Arc<dyn SpecialImage>>;
}
