//! Peak selection utilities for autocorrelation functions
//!
//! Provides the three steps applied to an ACF lag band: picking the strongest
//! lag, refining it to a fractional lag, and folding the resulting tempo into
//! the reporting range.

/// Index and value of the maximum of `signal`
///
/// Ties resolve to the first (lowest-index) occurrence. NaN values are never
/// selected. Returns `None` for an empty or all-NaN signal.
///
/// # Example
///
/// ```
/// use stratum_live::features::period::peak_picking::argmax_first;
///
/// assert_eq!(argmax_first(&[0.1, 0.7, 0.3, 0.7]), Some((1, 0.7)));
/// ```
pub fn argmax_first(signal: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &value) in signal.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((i, value)),
        }
    }
    best
}

/// Refine an integer peak to a fractional lag by parabolic interpolation
///
/// Fits a parabola through `acf[peak - 1]`, `acf[peak]`, `acf[peak + 1]` and
/// returns the abscissa of its vertex. Falls back to the integer lag when the
/// peak sits on either end of `acf`, or the curvature is zero or non-finite.
///
/// # Example
///
/// ```
/// use stratum_live::features::period::peak_picking::parabolic_refine;
///
/// // Symmetric neighbours: vertex stays on the sample
/// assert_eq!(parabolic_refine(&[0.0, 1.0, 2.0, 1.0], 2), 2.0);
/// ```
pub fn parabolic_refine(acf: &[f64], peak: usize) -> f64 {
    if peak == 0 || peak + 1 >= acf.len() {
        return peak as f64;
    }

    let (y0, y1, y2) = (acf[peak - 1], acf[peak], acf[peak + 1]);
    let denom = y0 - 2.0 * y1 + y2;
    if denom == 0.0 || !denom.is_finite() {
        log::trace!("Flat curvature at lag {}, keeping integer peak", peak);
        return peak as f64;
    }

    let delta = 0.5 * (y0 - y2) / denom;
    if !delta.is_finite() {
        return peak as f64;
    }

    peak as f64 + delta
}

/// Fold a tempo into `[bpm_min, bpm_max]` by octave steps
///
/// Doubles while below the range, then halves while above it. Returns 0.0 when
/// the input is not a positive finite number or no octave of it lands inside
/// the range (possible only when the range is narrower than one octave).
///
/// # Example
///
/// ```
/// use stratum_live::features::period::peak_picking::fold_octave;
///
/// assert_eq!(fold_octave(60.0, 90.0, 180.0), 120.0);
/// assert_eq!(fold_octave(300.0, 90.0, 180.0), 150.0);
/// ```
pub fn fold_octave(bpm: f32, bpm_min: f32, bpm_max: f32) -> f32 {
    if !(bpm.is_finite() && bpm > 0.0) {
        return 0.0;
    }

    let mut folded = bpm;
    while folded < bpm_min {
        folded *= 2.0;
    }
    while folded > bpm_max {
        folded /= 2.0;
    }

    if folded >= bpm_min && folded <= bpm_max {
        folded
    } else {
        0.0
    }
}
