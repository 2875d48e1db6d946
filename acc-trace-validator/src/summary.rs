//! Result aggregation

use crate::checks::ViolationResult;
use serde::Serialize;

/// Aggregate outcome of a check battery
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Percentage of passed checks, 0 when no checks ran
    pub pass_rate: f64,
    /// Per-check results, in the order they were given
    pub results: Vec<ViolationResult>,
}

impl Summary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Pretty-printed JSON artifact
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Count passes and failures and compute the pass rate
pub fn summarize(results: &[ViolationResult]) -> Summary {
    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    let pass_rate = if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64 * 100.0
    };

    Summary {
        total,
        passed,
        failed: total - passed,
        pass_rate,
        results: results.to_vec(),
    }
}
