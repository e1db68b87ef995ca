//! Sales query and result types.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::client::error::{ApiError, ApiResult};

/// Wire format for query dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A closed date range `[start_date, end_date]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesQuery {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl SalesQuery {
    /// # Errors
    /// [`ApiError::InvalidRequest`] when `end_date` precedes `start_date`.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> ApiResult<Self> {
        if end_date < start_date {
            return Err(ApiError::InvalidRequest(format!(
                "end date {} is before start date {}",
                end_date.format(DATE_FORMAT),
                start_date.format(DATE_FORMAT)
            )));
        }
        Ok(Self { start_date, end_date })
    }

    /// First through last day of `month` (1-12) in `year`.
    pub fn month(year: i32, month: u32) -> ApiResult<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| ApiError::InvalidRequest(format!("invalid month {year}-{month:02}")))?;
        let end = last_day_of_month(start)
            .ok_or_else(|| ApiError::InvalidRequest(format!("month {year}-{month:02} out of range")))?;
        Self::new(start, end)
    }

    /// The calendar month containing `today`.
    pub fn month_containing(today: NaiveDate) -> ApiResult<Self> {
        Self::month(today.year(), today.month())
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// `"2024-05-01 to 2024-05-31"`.
    pub fn period_label(&self) -> String {
        format!(
            "{} to {}",
            self.start_date.format(DATE_FORMAT),
            self.end_date.format(DATE_FORMAT)
        )
    }

    /// Query string parameters for the sales endpoint.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("start_date", self.start_date.format(DATE_FORMAT).to_string()),
            ("end_date", self.end_date.format(DATE_FORMAT).to_string()),
            ("format", "json".to_string()),
        ]
    }
}

/// Last calendar day of the month `date` falls in.
pub fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
}

/// Normalized sales figures for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesData {
    pub total: f64,
    /// ISO 4217 code.
    pub currency: String,
    pub period: String,
    pub transactions: u64,
}
