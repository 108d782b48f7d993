//! `Context`: the per-evaluation environment threaded through every
//! `FilterResult` operation (spec.md §5).
//!
//! Grounded on the teacher's `FilterContext` (`src/filters/context.rs`),
//! which plays the same role: one struct created per filter evaluation,
//! carrying the geometry and target surface information every primitive
//! needs, plus whatever bookkeeping the evaluation accumulates along the way.

use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::{Backend, ColorSpace};
use crate::mapping::Mapping;
use crate::space::LayerIRect;
use crate::stats::Stats;

/// The environment a `FilterResult` operation runs in: where layer space
/// sits relative to device space, how far the final output is wanted, which
/// backend to allocate surfaces from, and a shared stats sink.
///
/// `Stats` is behind a `Rc<RefCell<_>>` rather than `&mut` so that a
/// `Context` can be cheaply cloned and handed to independent branches of a
/// `Builder` tree (e.g. both operands of `merge`) while still accumulating
/// into one counter set, mirroring how the teacher's `FilterContext` is
/// shared (by `&`) across sibling primitive evaluations.
#[derive(Clone)]
pub struct Context {
    mapping: Mapping,
    desired_output: LayerIRect,
    backend: Rc<dyn Backend>,
    color_space: ColorSpace,
    stats: Rc<RefCell<Stats>>,
}

impl Context {
    pub fn new(mapping: Mapping, desired_output: LayerIRect, backend: Rc<dyn Backend>) -> Self {
        let color_space = backend.color_space();
        Self {
            mapping,
            desired_output,
            backend,
            color_space,
            stats: Rc::new(RefCell::new(Stats::new())),
        }
    }

    #[inline]
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    #[inline]
    pub fn desired_output(&self) -> LayerIRect {
        self.desired_output
    }

    #[inline]
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    #[inline]
    pub fn color_space(&self) -> &ColorSpace {
        &self.color_space
    }

    /// Returns a copy of `self` scoped to a different desired-output
    /// rectangle, as `Builder` does when recursing into an operand that only
    /// needs to cover part of the parent's output.
    #[inline]
    pub fn with_desired_output(&self, desired_output: LayerIRect) -> Self {
        Self {
            desired_output,
            ..self.clone()
        }
    }

    pub fn record_filter_visited(&self) {
        self.stats.borrow_mut().record_filter_visited();
    }

    pub fn record_cache_hit(&self) {
        self.stats.borrow_mut().record_cache_hit();
    }

    pub fn record_offscreen_surface(&self) {
        self.stats.borrow_mut().record_offscreen_surface();
    }

    pub fn record_shader_clamped_draw(&self) {
        self.stats.borrow_mut().record_shader_clamped_draw();
    }

    pub fn record_shader_tiled_draw(&self) {
        self.stats.borrow_mut().record_shader_tiled_draw();
    }

    /// Snapshot of the accumulated stats so far.
    pub fn stats(&self) -> Stats {
        *self.stats.borrow()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("mapping", &self.mapping)
            .field("desired_output", &self.desired_output)
            .field("color_space", &self.color_space)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
