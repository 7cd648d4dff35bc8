//! # Benchmark Comparison Module / 基准比较模块
//!
//! Compares a measured run time against the stored reference for the active
//! environment tag. The verdict is informational only; it never changes whether
//! a case passed.
//!
//! 将测得的运行时间与当前环境标签对应的参考值进行比较。
//! 判定结果仅供参考，不会影响用例是否通过。

use crate::core::models::BenchmarkVerdict;

/// Symmetric relative difference below which a run counts as unchanged.
pub const TOLERANCE: f64 = 0.01;

/// Classifies `measured` seconds against an optional `reference` in seconds.
///
/// The relative difference is `|measured - reference| / (measured + reference)`.
/// Percentages are expressed relative to the measured time.
///
/// # Examples
/// ```
/// use sim_test_runner::core::benchmark::compare;
/// use sim_test_runner::models::BenchmarkVerdict;
///
/// assert_eq!(compare(100.0, Some(99.0)), BenchmarkVerdict::Unchanged);
/// assert_eq!(compare(1.0, None), BenchmarkVerdict::NotApplicable);
/// ```
pub fn compare(measured: f64, reference: Option<f64>) -> BenchmarkVerdict {
    let Some(reference) = reference else {
        return BenchmarkVerdict::NotApplicable;
    };
    if measured.is_nan() || measured <= 0.0 {
        return BenchmarkVerdict::NotApplicable;
    }

    if (measured - reference).abs() / (measured + reference) < TOLERANCE {
        BenchmarkVerdict::Unchanged
    } else if measured < reference {
        BenchmarkVerdict::Faster {
            percent: 100.0 * (reference - measured) / measured,
        }
    } else {
        BenchmarkVerdict::Slower {
            percent: 100.0 * (measured - reference) / measured,
        }
    }
}
