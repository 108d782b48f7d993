//! Sampling policy and tile mode: spec.md §3 "SamplingOptions" / "TileMode",
//! and the `compatibleSampling` merge table of §4.5.

/// Filter mode for the non-bicubic, non-anisotropic sampling case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Mipmap mode, paired with a [`FilterMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MipmapMode {
    None,
    Nearest,
    Linear,
}

/// A bicubic resampler's `(B, C)` parameters (Mitchell-Netravali family).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicResampler {
    pub b: f64,
    pub c: f64,
}

/// A value describing how to sample an image when drawing it.
///
/// Exactly one of three disjoint modes, matching spec.md's "SamplingOptions":
/// a `(filter, mipmap)` pair, a bicubic resampler, or an anisotropic level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SamplingOptions {
    Filter {
        filter: FilterMode,
        mipmap: MipmapMode,
    },
    Cubic(CubicResampler),
    Anisotropic(u32),
}

/// `kDefaultSampling`: linear filtering, no mipmaps.
pub const DEFAULT_SAMPLING: SamplingOptions = SamplingOptions::Filter {
    filter: FilterMode::Linear,
    mipmap: MipmapMode::None,
};

pub const NEAREST_SAMPLING: SamplingOptions = SamplingOptions::Filter {
    filter: FilterMode::Nearest,
    mipmap: MipmapMode::None,
};

impl SamplingOptions {
    #[inline]
    pub fn is_default_linear(&self) -> bool {
        matches!(
            self,
            SamplingOptions::Filter {
                filter: FilterMode::Linear,
                mipmap: MipmapMode::None,
            }
        )
    }

    #[inline]
    pub fn is_nearest(&self) -> bool {
        matches!(
            self,
            SamplingOptions::Filter {
                filter: FilterMode::Nearest,
                ..
            }
        )
    }

    #[inline]
    pub fn is_cubic(&self) -> bool {
        matches!(self, SamplingOptions::Cubic(_))
    }

    #[inline]
    pub fn is_aniso(&self) -> bool {
        matches!(self, SamplingOptions::Anisotropic(_))
    }
}

/// Tile mode applied to an image's pixel rectangle outside its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileMode {
    Clamp,
    Repeat,
    Mirror,
    /// Out-of-image samples are transparent black.
    Decal,
}

impl TileMode {
    #[inline]
    pub fn is_periodic(&self) -> bool {
        matches!(self, TileMode::Repeat | TileMode::Mirror)
    }
}

/// `compatibleSampling(current, next)` from spec.md §4.5: decides whether
/// chaining two transforms can fold into one sampling pass, and what the
/// merged sampling should be.
///
/// `current_near` / `next_near` are whether the *transform* paired with each
/// side of the table is a near-integer translation — the monoid is not
/// associative in the nearest-neighbor rows without this (spec.md §9
/// "Sampling monoid").
pub fn compatible_sampling(
    current: SamplingOptions,
    next: SamplingOptions,
    current_near: bool,
    next_near: bool,
) -> Option<SamplingOptions> {
    use SamplingOptions::*;

    match (current, next) {
        (Anisotropic(a), Anisotropic(b)) => Some(Anisotropic(a.max(b))),
        (Anisotropic(a), Filter { filter: FilterMode::Linear, .. }) => Some(Anisotropic(a)),
        (Filter { filter: FilterMode::Linear, .. }, Anisotropic(b)) => Some(Anisotropic(b)),

        (Cubic(c), Filter { filter: FilterMode::Linear, .. }) => Some(Cubic(c)),
        (Cubic(c1), Cubic(c2)) if c1 == c2 => Some(Cubic(c1)),
        (
            Filter { filter: FilterMode::Linear, .. },
            Cubic(c),
        ) => Some(Cubic(c)),

        (
            Filter { filter: FilterMode::Linear, .. },
            Filter { filter: FilterMode::Linear, .. },
        ) => Some(DEFAULT_SAMPLING),

        (
            Filter { filter: FilterMode::Linear, .. },
            Filter { filter: FilterMode::Nearest, .. },
        ) if current_near => Some(NEAREST_SAMPLING),

        (
            Filter { filter: FilterMode::Nearest, .. },
            Filter { filter: FilterMode::Linear, .. },
        ) if next_near => Some(NEAREST_SAMPLING),

        (
            Filter { filter: FilterMode::Nearest, .. },
            Filter { filter: FilterMode::Nearest, .. },
        ) => Some(NEAREST_SAMPLING),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_linear_merges_to_default() {
        assert_eq!(
            compatible_sampling(DEFAULT_SAMPLING, DEFAULT_SAMPLING, false, false),
            Some(DEFAULT_SAMPLING)
        );
    }

    #[test]
    fn aniso_merges_to_max() {
        assert_eq!(
            compatible_sampling(
                SamplingOptions::Anisotropic(2),
                SamplingOptions::Anisotropic(8),
                false,
                false
            ),
            Some(SamplingOptions::Anisotropic(8))
        );
    }

    #[test]
    fn mismatched_cubic_params_incompatible() {
        let a = SamplingOptions::Cubic(CubicResampler { b: 1.0 / 3.0, c: 1.0 / 3.0 });
        let b = SamplingOptions::Cubic(CubicResampler { b: 0.0, c: 0.5 });
        assert_eq!(compatible_sampling(a, b, false, false), None);
    }

    #[test]
    fn linear_to_nearest_requires_current_near() {
        assert_eq!(
            compatible_sampling(DEFAULT_SAMPLING, NEAREST_SAMPLING, false, false),
            None
        );
        assert_eq!(
            compatible_sampling(DEFAULT_SAMPLING, NEAREST_SAMPLING, true, false),
            Some(NEAREST_SAMPLING)
        );
    }

    #[test]
    fn nearest_to_linear_requires_next_near() {
        assert_eq!(
            compatible_sampling(NEAREST_SAMPLING, DEFAULT_SAMPLING, false, false),
            None
        );
        assert_eq!(
            compatible_sampling(NEAREST_SAMPLING, DEFAULT_SAMPLING, false, true),
            Some(NEAREST_SAMPLING)
        );
    }
}
