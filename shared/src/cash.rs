//! Cash denomination math
//!
//! Pure value objects and functions for converting a note-count breakdown
//! into a verified cash total and a signed variance against expected cash.
//! No I/O; the server recomputes totals from counts on every mutation and
//! never trusts a caller-supplied total.

use serde::{Deserialize, Serialize};

/// Note face values, largest first. Ten fixed denominations.
pub const DENOMINATIONS: [i64; 10] = [1000, 500, 200, 100, 50, 20, 10, 5, 2, 1];

/// Count of physical notes per denomination.
///
/// Embedded value object on a shift; all counts default to zero so a
/// freshly opened shift starts with an empty drawer breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DenominationCount {
    #[serde(default)]
    pub note_1000: i64,
    #[serde(default)]
    pub note_500: i64,
    #[serde(default)]
    pub note_200: i64,
    #[serde(default)]
    pub note_100: i64,
    #[serde(default)]
    pub note_50: i64,
    #[serde(default)]
    pub note_20: i64,
    #[serde(default)]
    pub note_10: i64,
    #[serde(default)]
    pub note_5: i64,
    #[serde(default)]
    pub note_2: i64,
    #[serde(default)]
    pub note_1: i64,
}

/// Partial denomination counts used to override individual fields at
/// day-close without resupplying the whole breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenominationOverride {
    pub note_1000: Option<i64>,
    pub note_500: Option<i64>,
    pub note_200: Option<i64>,
    pub note_100: Option<i64>,
    pub note_50: Option<i64>,
    pub note_20: Option<i64>,
    pub note_10: Option<i64>,
    pub note_5: Option<i64>,
    pub note_2: Option<i64>,
    pub note_1: Option<i64>,
}

impl DenominationCount {
    /// Counts paired with their face values, largest first
    pub fn entries(&self) -> [(i64, i64); 10] {
        [
            (1000, self.note_1000),
            (500, self.note_500),
            (200, self.note_200),
            (100, self.note_100),
            (50, self.note_50),
            (20, self.note_20),
            (10, self.note_10),
            (5, self.note_5),
            (2, self.note_2),
            (1, self.note_1),
        ]
    }

    /// Total cash: dot product of counts and face values
    pub fn total_cash(&self) -> f64 {
        self.entries()
            .iter()
            .map(|(value, count)| value * count)
            .sum::<i64>() as f64
    }

    /// First negative count, if any. Counts must be non-negative; callers
    /// reject before any computation.
    pub fn first_negative(&self) -> Option<(i64, i64)> {
        self.entries()
            .into_iter()
            .find(|(_, count)| *count < 0)
    }

    /// Apply a partial override, returning the merged counts
    pub fn merged(&self, overrides: &DenominationOverride) -> Self {
        Self {
            note_1000: overrides.note_1000.unwrap_or(self.note_1000),
            note_500: overrides.note_500.unwrap_or(self.note_500),
            note_200: overrides.note_200.unwrap_or(self.note_200),
            note_100: overrides.note_100.unwrap_or(self.note_100),
            note_50: overrides.note_50.unwrap_or(self.note_50),
            note_20: overrides.note_20.unwrap_or(self.note_20),
            note_10: overrides.note_10.unwrap_or(self.note_10),
            note_5: overrides.note_5.unwrap_or(self.note_5),
            note_2: overrides.note_2.unwrap_or(self.note_2),
            note_1: overrides.note_1.unwrap_or(self.note_1),
        }
    }
}

impl DenominationOverride {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overrides paired with their face values, largest first
    pub fn entries(&self) -> [(i64, Option<i64>); 10] {
        [
            (1000, self.note_1000),
            (500, self.note_500),
            (200, self.note_200),
            (100, self.note_100),
            (50, self.note_50),
            (20, self.note_20),
            (10, self.note_10),
            (5, self.note_5),
            (2, self.note_2),
            (1, self.note_1),
        ]
    }

    /// First negative override, if any
    pub fn first_negative(&self) -> Option<(i64, i64)> {
        self.entries()
            .into_iter()
            .find_map(|(value, count)| count.filter(|c| *c < 0).map(|c| (value, c)))
    }
}

/// Result of reconciling counted cash against expected cash
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Computed total from the note counts
    pub total_cash: f64,
    /// Expected cash-in-hand derived from recorded cash sales, if known
    pub expected_cash: Option<f64>,
    /// Signed variance: counted minus expected
    pub variance: Option<f64>,
}

impl Reconciliation {
    /// Warning text when the variance is material (at or above the
    /// threshold in absolute value). Variance never blocks a close;
    /// it is a business fact to record.
    pub fn warning(&self, threshold: f64) -> Option<String> {
        let variance = self.variance?;
        if variance.abs() >= threshold {
            Some(format!(
                "Counted cash deviates from expected by {:+.2} (counted {:.2}, expected {:.2})",
                variance,
                self.total_cash,
                self.expected_cash.unwrap_or(0.0),
            ))
        } else {
            None
        }
    }
}

/// Reconcile a note-count breakdown against an optional expected total
pub fn reconcile(counts: &DenominationCount, expected_cash: Option<f64>) -> Reconciliation {
    let total_cash = counts.total_cash();
    Reconciliation {
        total_cash,
        expected_cash,
        variance: expected_cash.map(|expected| total_cash - expected),
    }
}
