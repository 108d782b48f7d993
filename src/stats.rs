//! Evaluation statistics sink (spec.md §6 "Stats"): cheap counters an
//! embedder can read back after an evaluation to understand what the core
//! actually did, plus a couple of `log` trace events at points the bounds
//! analyzer or the downscaler make a consequential decision.
//!
//! Grounded on the teacher's own ad hoc instrumentation in
//! `src/filters/context.rs` (which counts filter primitives visited through
//! a plain struct field), generalized here into a small dedicated counter
//! set and routed through `log` rather than a bespoke macro (see
//! `src/lib.rs` module docs for the logging rationale).

use std::fmt;

/// Counters accumulated over one `Builder` evaluation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Filter nodes visited (including ones resolved entirely from cache).
    pub filters_visited: u64,
    /// Resolves served from an already-materialized image without a redraw.
    pub cache_hits: u64,
    /// Offscreen surfaces allocated via `Backend::make_device`.
    pub offscreen_surfaces_created: u64,
    /// Draws that used `TileMode::Clamp` in place of a requested `Decal`
    /// because the bounds analyzer proved the hardware clamp was safe.
    pub shader_clamped_draws: u64,
    /// Draws where the bounds analyzer set `RequiresShaderTiling`, forcing a
    /// real (non-hardware) shader-level tile implementation.
    pub shader_tiled_draws: u64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_filter_visited(&mut self) {
        self.filters_visited += 1;
    }

    #[inline]
    pub fn record_cache_hit(&mut self) {
        self.cache_hits += 1;
    }

    #[inline]
    pub fn record_offscreen_surface(&mut self) {
        self.offscreen_surfaces_created += 1;
        log::debug!("allocated offscreen surface (#{})", self.offscreen_surfaces_created);
    }

    #[inline]
    pub fn record_shader_clamped_draw(&mut self) {
        self.shader_clamped_draws += 1;
    }

    #[inline]
    pub fn record_shader_tiled_draw(&mut self) {
        self.shader_tiled_draws += 1;
        log::trace!("draw required real shader-level tiling");
    }

    pub fn merge(&mut self, other: &Stats) {
        self.filters_visited += other.filters_visited;
        self.cache_hits += other.cache_hits;
        self.offscreen_surfaces_created += other.offscreen_surfaces_created;
        self.shader_clamped_draws += other.shader_clamped_draws;
        self.shader_tiled_draws += other.shader_tiled_draws;
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "filters_visited={} cache_hits={} offscreen_surfaces_created={} \
             shader_clamped_draws={} shader_tiled_draws={}",
            self.filters_visited,
            self.cache_hits,
            self.offscreen_surfaces_created,
            self.shader_clamped_draws,
            self.shader_tiled_draws
        )
    }
}
