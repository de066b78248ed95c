//! Symmetric-log scales mapping aggregates to marker radius and opacity.
//!
//! Death counts span several orders of magnitude between countries, so a
//! linear scale would leave small countries invisible. Every scale here maps
//! missing data (NaN input, absent maximum, degenerate domain) to its
//! zero-effect output instead of propagating NaN into the renderer.

/// Largest death-marker radius, in braille pixels
pub const MAX_RADIUS: f64 = 7.0;
pub const MIN_RADIUS: f64 = 0.0;

/// Output span of the case scale used for country fill opacity
pub const CASE_OPACITY_RANGE: f64 = 100_000.0;
/// Output span of the death scale used for marker opacity
pub const DEATH_OPACITY_RANGE: f64 = 1_000.0;

/// Symmetric-log scale: linear near zero, logarithmic for large magnitudes,
/// odd-symmetric for negative input. Not clamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Symlog {
    domain: (f64, f64),
    range: (f64, f64),
    constant: f64,
}

impl Symlog {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            domain,
            range,
            constant: 1.0,
        }
    }

    /// Domain `[0, max]`, range `[0, range_max]`. A missing maximum makes
    /// the scale degenerate, so it maps everything to 0.
    pub fn from_max(max: Option<i64>, range_max: f64) -> Self {
        let max = max.map_or(f64::NAN, |m| m as f64);
        Self::new((0.0, max), (0.0, range_max))
    }

    #[inline(always)]
    fn transform(&self, x: f64) -> f64 {
        x.signum() * (x.abs() / self.constant).ln_1p()
    }

    pub fn scale(&self, x: f64) -> f64 {
        let (r0, r1) = self.range;
        let t0 = self.transform(self.domain.0);
        let span = self.transform(self.domain.1) - t0;
        if x.is_nan() || !span.is_finite() || span == 0.0 {
            return r0;
        }

        let out = r0 + (self.transform(x) - t0) / span * (r1 - r0);
        if out.is_nan() {
            r0
        } else {
            out
        }
    }
}

/// Death-marker radius scale for a month: `[0, max deaths] -> [0, 7]`
pub fn radius_scale(max_deaths: Option<i64>) -> Symlog {
    let mut scale = Symlog::from_max(max_deaths, MAX_RADIUS);
    scale.range.0 = MIN_RADIUS;
    scale
}

/// A country's share of the world total, each side passed through the same
/// symlog scale before dividing. This compresses dynamic range; it is not a
/// probability and can leave `[0, 1]`, so renderers clamp with [`clamp_unit`].
#[derive(Clone, Copy, Debug)]
pub struct OpacityScale {
    scale: Symlog,
    world: f64,
}

impl OpacityScale {
    pub fn new(max: Option<i64>, world_total: i64, range_max: f64) -> Self {
        let scale = Symlog::from_max(max, range_max);
        let world = scale.scale(world_total as f64);
        Self { scale, world }
    }

    /// Fill opacity from month case totals
    pub fn cases(max_cases: Option<i64>, world_cases: i64) -> Self {
        Self::new(max_cases, world_cases, CASE_OPACITY_RANGE)
    }

    /// Marker opacity from month death totals
    pub fn deaths(max_deaths: Option<i64>, world_deaths: i64) -> Self {
        Self::new(max_deaths, world_deaths, DEATH_OPACITY_RANGE)
    }

    pub fn ratio(&self, country_total: i64) -> f64 {
        if self.world == 0.0 || !self.world.is_finite() {
            return 0.0;
        }
        let ratio = self.scale.scale(country_total as f64) / self.world;
        if ratio.is_nan() {
            0.0
        } else {
            ratio
        }
    }
}

/// Clamp to `[0, 1]` for drawing; NaN counts as fully transparent
pub fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_symlog_endpoints() {
        let s = radius_scale(Some(99));
        assert!((s.scale(0.0) - 0.0).abs() < EPS);
        assert!((s.scale(99.0) - MAX_RADIUS).abs() < EPS);
        // ln(1 + 9) is half of ln(1 + 99)
        assert!((s.scale(9.0) - 3.5).abs() < EPS);
    }

    #[test]
    fn test_symlog_is_odd_and_monotone() {
        let s = Symlog::new((-100.0, 100.0), (-1.0, 1.0));
        assert!((s.scale(0.0)).abs() < EPS);
        assert!((s.scale(-42.0) + s.scale(42.0)).abs() < EPS);
        let mut prev = f64::NEG_INFINITY;
        for x in [-100.0, -10.0, -1.0, 0.0, 0.5, 1.0, 10.0, 100.0] {
            let y = s.scale(x);
            assert!(y > prev);
            prev = y;
        }
    }

    #[test]
    fn test_small_values_stay_visible() {
        let s = radius_scale(Some(100_000));
        // A linear scale would give 7e-5 here
        assert!(s.scale(1.0) > 0.3);
    }

    #[test]
    fn test_missing_data_has_zero_effect() {
        assert_eq!(radius_scale(None).scale(10.0), 0.0);
        assert_eq!(radius_scale(Some(0)).scale(0.0), 0.0);
        assert_eq!(radius_scale(Some(50)).scale(f64::NAN), 0.0);

        assert_eq!(OpacityScale::cases(None, 0).ratio(0), 0.0);
        assert_eq!(OpacityScale::deaths(Some(10), 0).ratio(5), 0.0);
        assert_eq!(OpacityScale::cases(Some(10), 100).ratio(0), 0.0);
    }

    #[test]
    fn test_opacity_ratio() {
        let o = OpacityScale::cases(Some(1_000), 10_000);
        let full = o.ratio(10_000);
        assert!((full - 1.0).abs() < EPS);
        let half = o.ratio(1_000);
        assert!(half > 0.0 && half < 1.0);
    }

    #[test]
    fn test_opacity_may_exceed_one() {
        // Negative correction rows elsewhere can leave the world total below a country's
        let o = OpacityScale::deaths(Some(500), 400);
        let ratio = o.ratio(500);
        assert!(ratio > 1.0);
        assert_eq!(clamp_unit(ratio), 1.0);
    }

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(f64::NAN), 0.0);
        assert_eq!(clamp_unit(-0.5), 0.0);
        assert_eq!(clamp_unit(0.25), 0.25);
        assert_eq!(clamp_unit(f64::INFINITY), 1.0);
    }
}
