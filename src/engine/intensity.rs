//! Data-driven display ranges.
//!
//! An [`IntensityRule`] scales the image's own maximum intensity:
//!
//! ```text
//! low  = max * low_fraction
//! high = max * high_fraction
//! ```
//!
//! The minimum is loaded alongside the maximum but does not anchor the scale.
//! Every matching rule emits its own `-dr` fragment; the viewer keeps the last
//! one, but all of them are emitted.

use crate::error::Result;
use crate::loader::{ImageLoader, VoxelStats};
use crate::{DisplayRange, Fragment, FragmentKind, IntensityRule};
use std::path::Path;

/// Scale `stats` by the fractions of `rule`.
pub fn scale(stats: VoxelStats, rule: &IntensityRule) -> DisplayRange {
    DisplayRange { low: stats.max * rule.low_fraction, high: stats.max * rule.high_fraction }
}

/// Range fragments for `file_name`, in table order.
///
/// Voxel data is requested from `loader` only when at least one rule matches.
pub fn compute_ranges(
    rules: &[IntensityRule],
    file_name: &str,
    absolute: &Path,
    loader: &dyn ImageLoader,
) -> Result<Vec<Fragment>> {
    let mut fragments = Vec::new();

    for rule in rules.iter().filter(|rule| rule.pattern.is_match(file_name)) {
        let stats = loader.voxel_stats(absolute)?;
        let range = scale(stats, rule);

        tracing::debug!(
            file = file_name,
            pattern = rule.pattern.as_str(),
            max = stats.max,
            low = range.low,
            high = range.high,
            "intensity rule matched"
        );

        fragments.push(Fragment { rule: rule.pattern.as_str().to_string(), kind: FragmentKind::Range(range) });
    }

    Ok(fragments)
}
