//! Per-category ratio points for the scatter view.

use crate::breakdown::group_sums;
use crate::models::RatioPoint;
use fip_core::config::{ClipMode, RatioDomain};
use fip_core::{AggregateTable, TableError};

/// Group by `category`, sum `numerator` and `denominator`, and plot the
/// denominator sum against `numerator / denominator`.
///
/// Categories whose denominator sums to zero (or to a non-finite value) are
/// left out, as are those whose ratio is not finite. Points outside
/// `domain` are dropped or clamped onto its edge according to
/// `domain.clip_mode`.
pub fn ratio_points(
    table: &AggregateTable,
    category: &str,
    numerator: &str,
    denominator: &str,
    domain: &RatioDomain,
) -> Result<Vec<RatioPoint>, TableError> {
    let groups = group_sums(table, category, &[numerator, denominator])?;
    let mut points = Vec::with_capacity(groups.len());
    let mut skipped = 0usize;

    for (category, sums) in groups {
        let (num, den) = (sums[0], sums[1]);
        if den == 0.0 || !den.is_finite() {
            skipped += 1;
            continue;
        }
        let ratio = num / den;
        if !ratio.is_finite() {
            skipped += 1;
            continue;
        }
        let outside = den > domain.max_x || ratio > domain.max_y;
        match (outside, domain.clip_mode) {
            (false, _) => points.push(RatioPoint {
                category,
                x: den,
                y: ratio,
                clamped: false,
            }),
            (true, ClipMode::Drop) => skipped += 1,
            (true, ClipMode::Clamp) => points.push(RatioPoint {
                category,
                x: den.min(domain.max_x),
                y: ratio.min(domain.max_y),
                clamped: true,
            }),
        }
    }

    if skipped > 0 {
        log::debug!("ratio: {skipped} categories left out of {numerator}/{denominator}");
    }
    Ok(points)
}
