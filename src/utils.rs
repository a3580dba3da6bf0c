//! Utility helpers: discount sizing.

/// Effective memory of a discount factor, `1 / (1 - gamma)`.
///
/// This is the limit of `D` for an arm pulled at every step, i.e. roughly how
/// many recent observations dominate the estimate. `gamma >= 1` never forgets
/// and returns infinity.
///
/// `gamma <= 0` or NaN falls back to `1.0` (only the latest observation counts).
///
/// ```rust
/// let m = iwtune::effective_memory(0.9);
/// assert!((m - 10.0).abs() < 1e-9);
/// ```
pub fn effective_memory(gamma: f64) -> f64 {
    if gamma.is_nan() || gamma <= 0.0 {
        return 1.0;
    }
    if gamma >= 1.0 {
        f64::INFINITY
    } else {
        1.0 / (1.0 - gamma)
    }
}

/// Suggest a discount factor from expected sample rate and changepoint rate.
///
/// Uses the D-UCB tuning `gamma = 1 - sqrt(Υ_T / T) / 4` from Garivier & Moulines
/// 2008 (arXiv:0805.3415), where `Υ_T / T = change_rate / throughput` is the
/// expected number of changes per observation.
///
/// # Arguments
///
/// - `throughput`: expected observations per condition per period (e.g. per round).
/// - `change_rate`: expected fraction of periods in which the optimum moves.
///   Must be in `(0, 1]`.
///
/// # Returns
///
/// A discount factor clamped to `[0.5, 0.999]`.
///
/// ```rust
/// // 20 measurements per condition per round, optimum drifts every ~5 rounds.
/// let gamma = iwtune::suggested_discount(20, 0.2);
/// assert!(gamma > 0.9 && gamma < 1.0);
/// ```
pub fn suggested_discount(throughput: u64, change_rate: f64) -> f64 {
    let change_rate = if change_rate.is_finite() && change_rate > 0.0 {
        change_rate.min(1.0)
    } else {
        0.01 // conservative fallback
    };
    let t = (throughput as f64).max(1.0);
    (1.0 - (change_rate / t).sqrt() / 4.0).clamp(0.5, 0.999)
}
