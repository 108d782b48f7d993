//! `Mapping`: decomposes a caller-supplied current transform matrix (CTM)
//! into a layer-space component and a residual, per spec.md §4.1.
//!
//! Grounded in shape on the teacher's `FilterContext` (`src/filters/context.rs`),
//! which similarly holds the affine matrices a filter evaluation needs
//! (`_affine`, `paffine`) precomputed once and reused by every primitive.

use crate::error::CoreError;
use crate::geometry::{Matrix, Point};
use crate::space::{
    DevicePoint, DeviceRect, DeviceSize, DeviceSpace, LayerPoint, LayerRect, LayerSize,
    LayerSpace, ParamPoint, ParameterSpace, ParamRect, ParamSize, Space, SpaceMatrix,
};

/// The most general layer matrix a downstream filter can tolerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Only a translation may live in layer space; everything else stays in
    /// the residual.
    Translate,
    /// A scale+translate may live in layer space.
    ScaleTranslate,
    /// Any affine (or perspective) matrix may live in layer space.
    Complex,
}

/// Holds the three affine matrices an evaluation needs to cross between
/// parameter, layer and device space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mapping {
    param_to_layer: SpaceMatrix<ParameterSpace, LayerSpace>,
    layer_to_device: SpaceMatrix<LayerSpace, DeviceSpace>,
    dev_to_layer: SpaceMatrix<DeviceSpace, LayerSpace>,
}

impl Mapping {
    pub fn identity() -> Self {
        Self {
            param_to_layer: SpaceMatrix::identity(),
            layer_to_device: SpaceMatrix::identity(),
            dev_to_layer: SpaceMatrix::identity(),
        }
    }

    /// Builds a `Mapping` whose layer space *is* device space, i.e.
    /// `decompose_ctm(ctm, Capability::Complex, _)`.
    pub fn new(ctm: Matrix) -> Self {
        let mut m = Self::identity();
        m.decompose_ctm(ctm, Capability::Complex, Point::new(0.0, 0.0));
        m
    }

    #[inline]
    pub fn param_to_layer(&self) -> SpaceMatrix<ParameterSpace, LayerSpace> {
        self.param_to_layer
    }

    #[inline]
    pub fn layer_to_device(&self) -> SpaceMatrix<LayerSpace, DeviceSpace> {
        self.layer_to_device
    }

    #[inline]
    pub fn dev_to_layer(&self) -> SpaceMatrix<DeviceSpace, LayerSpace> {
        self.dev_to_layer
    }

    /// `paramToLayer · layerToDevice`, i.e. the original CTM this mapping was
    /// decomposed from (up to the scale-estimate approximation used for
    /// perspective CTMs).
    #[inline]
    pub fn total_matrix(&self) -> Matrix {
        Matrix::multiply(&self.layer_to_device.matrix, &self.param_to_layer.matrix)
    }

    /// Decomposes `ctm` into a layer-space component and a residual,
    /// honoring `capability` as the most general matrix class the downstream
    /// filter can accept in layer space.
    ///
    /// Returns `false` (leaving `self` unchanged) iff the computed residual
    /// would be non-invertible; the caller is expected to abandon layering
    /// in that case per spec.md §4.1.
    pub fn decompose_ctm(
        &mut self,
        ctm: Matrix,
        capability: Capability,
        representative_point: Point,
    ) -> bool {
        let (layer, remainder) = match capability {
            Capability::Translate => (Matrix::identity(), ctm),
            Capability::Complex => (ctm, Matrix::identity()),
            Capability::ScaleTranslate => {
                if ctm.is_scale_translate() {
                    (ctm, Matrix::identity())
                } else {
                    let scaling = Self::choose_scaling(&ctm, representative_point);
                    let Some(inv_scaling) = scaling.invert() else {
                        return false;
                    };
                    let remainder = Matrix::multiply(&ctm, &inv_scaling);
                    (scaling, remainder)
                }
            }
        };

        if !remainder.is_invertible() {
            log::debug!("Mapping::decompose_ctm: {}", CoreError::NonInvertibleMatrix);
            return false;
        }

        self.param_to_layer = SpaceMatrix::new(layer);
        self.layer_to_device = SpaceMatrix::new(remainder);
        self.dev_to_layer = self.layer_to_device.invert().expect("checked invertible above");
        true
    }

    fn choose_scaling(ctm: &Matrix, representative_point: Point) -> Matrix {
        if let Some((sx, sy)) = ctm.decompose_scale() {
            return Matrix::new_scale(sx, sy);
        }
        match ctm.perspective_scale_estimate(representative_point) {
            Some(s) if s.is_finite() && s > 0.0 => Matrix::new_scale(s, s),
            _ => Matrix::identity(),
        }
    }

    /// Composes an additional layer-space transform into the mapping:
    /// the new layer space is `layer` applied to the old one.
    ///
    /// Returns `false` (leaving `self` unchanged) iff `layer` is singular.
    pub fn adjust_layer_space(&mut self, layer: Matrix) -> bool {
        let Some(inv) = layer.invert() else {
            log::debug!("Mapping::adjust_layer_space: {}", CoreError::NonInvertibleMatrix);
            return false;
        };
        let new_param_to_layer = Matrix::multiply(&layer, &self.param_to_layer.matrix);
        let new_layer_to_device = Matrix::multiply(&self.layer_to_device.matrix, &inv);
        let Some(new_dev_to_layer) = new_layer_to_device.invert() else {
            log::debug!("Mapping::adjust_layer_space: {}", CoreError::NonInvertibleMatrix);
            return false;
        };
        self.param_to_layer = SpaceMatrix::new(new_param_to_layer);
        self.layer_to_device = SpaceMatrix::new(new_layer_to_device);
        self.dev_to_layer = SpaceMatrix::new(new_dev_to_layer);
        true
    }

    #[inline]
    pub fn param_to_layer_rect(&self, r: ParamRect) -> LayerRect {
        Space::reinterpret(self.param_to_layer.matrix.map_rect(&r.into_inner()))
    }

    #[inline]
    pub fn param_to_layer_point(&self, p: ParamPoint) -> LayerPoint {
        Space::reinterpret(self.param_to_layer.matrix.map_point(p.into_inner()))
    }

    #[inline]
    pub fn param_to_layer_size(&self, s: ParamSize) -> LayerSize {
        Space::reinterpret(self.param_to_layer.matrix.map_size(s.into_inner()))
    }

    #[inline]
    pub fn layer_to_device_rect(&self, r: LayerRect) -> DeviceRect {
        Space::reinterpret(self.layer_to_device.matrix.map_rect(&r.into_inner()))
    }

    #[inline]
    pub fn layer_to_device_point(&self, p: LayerPoint) -> DevicePoint {
        Space::reinterpret(self.layer_to_device.matrix.map_point(p.into_inner()))
    }

    #[inline]
    pub fn layer_to_device_size(&self, s: LayerSize) -> DeviceSize {
        Space::reinterpret(self.layer_to_device.matrix.map_size(s.into_inner()))
    }

    #[inline]
    pub fn device_to_layer_rect(&self, r: DeviceRect) -> LayerRect {
        Space::reinterpret(self.dev_to_layer.matrix.map_rect(&r.into_inner()))
    }
}
