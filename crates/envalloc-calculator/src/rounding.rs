//! Rounding and normalization of derived ratios.
//!
//! Derived ratios are rounded one by one, which can leave the table a rounding
//! unit or two away from the target total. The residual is then pushed back
//! into the table according to the configured [`ResidualStrategy`].

use crate::types::{CalculatorSettings, ResidualStrategy};
use tracing::debug;

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Rounds each raw ratio, then corrects the rounding residual so the table
/// sums to `settings.target_total` within `settings.tolerance`.
///
/// When every raw ratio is zero (zero denominator) the table is left at zero
/// and no correction is attempted.
pub fn round_and_normalize(raw: &[f64], settings: &CalculatorSettings) -> Vec<f64> {
    let mut ratios: Vec<f64> = raw.iter().map(|&r| round_to(r, settings.decimals)).collect();
    if raw.iter().all(|&r| r == 0.0) {
        return ratios;
    }

    let residual = settings.target_total - ratios.iter().sum::<f64>();
    if residual.abs() <= settings.tolerance {
        return ratios;
    }

    debug!(
        residual,
        strategy = ?settings.residual,
        candidates = ratios.len(),
        "Correcting rounding residual"
    );

    match settings.residual {
        ResidualStrategy::LastCandidate => {
            if let Some(last) = ratios.last_mut() {
                *last = round_to(*last + residual, settings.decimals);
            }
        }
        ResidualStrategy::LargestRemainder => {
            spread_residual(raw, &mut ratios, residual, settings.decimals);
        }
    }
    ratios
}

fn spread_residual(raw: &[f64], ratios: &mut [f64], residual: f64, decimals: u32) {
    let unit = 10f64.powi(-(decimals as i32));
    let steps = (residual / unit).round() as i64;
    if steps == 0 || ratios.is_empty() {
        return;
    }

    // Stable sort keeps candidate order among equal remainders.
    let mut order: Vec<usize> = (0..ratios.len()).collect();
    if steps > 0 {
        order.sort_by(|&a, &b| (raw[b] - ratios[b]).total_cmp(&(raw[a] - ratios[a])));
    } else {
        order.sort_by(|&a, &b| (raw[a] - ratios[a]).total_cmp(&(raw[b] - ratios[b])));
    }

    let delta = unit * steps.signum() as f64;
    for step in 0..steps.unsigned_abs() as usize {
        let idx = order[step % order.len()];
        ratios[idx] = round_to(ratios[idx] + delta, decimals);
    }
}
