//! Monthly progress indicator values.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::sales::types::{last_day_of_month, SalesData};

/// Progress towards the monthly target, clamped to `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressPercent(u8);

impl ProgressPercent {
    pub const ZERO: Self = Self(0);
    pub const COMPLETE: Self = Self(100);

    /// Clamp any integer into range.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    /// Progress of `sales.total` against `monthly_target`, rounded down.
    ///
    /// `None` when no positive target is configured.
    pub fn from_sales(sales: &SalesData, monthly_target: f64) -> Option<Self> {
        if monthly_target.is_nan() || monthly_target <= 0.0 || !sales.total.is_finite() {
            return None;
        }
        let percent = (sales.total / monthly_target * 100.0).floor();
        Some(Self::clamped(percent.clamp(0.0, 100.0) as i64))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn tier(self) -> ProgressTier {
        match self.0 {
            0..=30 => ProgressTier::Behind,
            31..=70 => ProgressTier::OnTrack,
            71..=99 => ProgressTier::Ahead,
            _ => ProgressTier::Complete,
        }
    }
}

impl std::fmt::Display for ProgressPercent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Coarse band a progress value falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressTier {
    /// 0-30%
    Behind,
    /// 31-70%
    OnTrack,
    /// 71-99%
    Ahead,
    /// 100%
    Complete,
}

/// `"May 2024"`, the key the progress store uses for a month.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Days left in the month after `today` (0 on the last day).
pub fn remaining_days(today: NaiveDate) -> u32 {
    last_day_of_month(today)
        .map(|last| last.day() - today.day())
        .unwrap_or(0)
}
