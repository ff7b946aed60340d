use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use clap::Args;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::config::{
    DEFAULT_LOOKBACK_YEARS, DEFAULT_NUM_CUSTOMERS, DEFAULT_NUM_PRODUCTS,
    DEFAULT_ORDERS_PER_MONTH, DEFAULT_SINGLE_FILE_DAYS, DEFAULT_SINGLE_OUTPUT_FILE,
};
use crate::domain::ReferenceMode;
use crate::domain::period::{DateWindow, MAX_YEAR, MIN_YEAR, YearMonth};
use crate::repository::files::WriteMode;
use crate::services::reference_data::ReferenceRequest;
use crate::services::runs::{BackfillRequest, MonthlyRequest, SingleFileRequest};

/// Longest trailing window accepted by single-file mode, about ten years.
const MAX_SINGLE_FILE_DAYS: u32 = 3660;

/// Result type returned by the generation form helpers.
pub type GenerateFormResult<T> = Result<T, GenerateFormError>;

/// Errors raised while turning command-line arguments into run requests.
#[derive(Debug, Error)]
pub enum GenerateFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// A year was given without the month it belongs to.
    #[error("--year requires --month")]
    PartialPeriod,
    #[error("{year}-{month} is not a valid month")]
    InvalidMonth { year: i32, month: u32 },
    #[error("start month {start} is after end month {end}")]
    RangeReversed { start: YearMonth, end: YearMonth },
}

/// Reference data options shared by every mode.
#[derive(Debug, Clone, Args, Validate)]
pub struct ReferenceArgs {
    /// Number of customers to have available
    #[arg(long, default_value_t = DEFAULT_NUM_CUSTOMERS)]
    #[validate(range(min = 1))]
    pub customers: usize,
    /// Number of products to have available
    #[arg(long, default_value_t = DEFAULT_NUM_PRODUCTS)]
    #[validate(range(min = 1))]
    pub products: usize,
    /// Regenerate products and customers instead of reusing stored ones
    #[arg(long)]
    pub force_new: bool,
}

impl ReferenceArgs {
    pub fn into_reference_request(self) -> ReferenceRequest {
        ReferenceRequest {
            products: self.products,
            customers: self.customers,
            mode: ReferenceMode::from_force_new(self.force_new),
        }
    }
}

/// Arguments of the `monthly` command.
#[derive(Debug, Clone, Args, Validate)]
pub struct MonthlyForm {
    /// Number of orders to generate
    #[arg(long, default_value_t = DEFAULT_ORDERS_PER_MONTH)]
    pub orders: usize,
    /// Year of the period (defaults to the current one)
    #[arg(long)]
    #[validate(range(min = MIN_YEAR, max = MAX_YEAR))]
    pub year: Option<i32>,
    /// Month of the period, 1-12
    #[arg(long)]
    #[validate(range(min = 1, max = 12))]
    pub month: Option<u32>,
    /// Write to this file instead of the month's order file
    #[arg(long)]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    #[validate(nested)]
    pub reference: ReferenceArgs,
}

impl MonthlyForm {
    /// Validate the arguments and resolve the target month relative to `today`.
    pub fn into_request(self, today: NaiveDate) -> GenerateFormResult<MonthlyRequest> {
        self.validate()?;

        let month = resolve_month(self.year, self.month, today)?
            .unwrap_or_else(|| YearMonth::of(today));

        Ok(MonthlyRequest {
            month,
            orders: self.orders,
            reference: self.reference.into_reference_request(),
            output: self.output,
            write_mode: WriteMode::Append,
        })
    }
}

/// Arguments of the `multi-year` command.
#[derive(Debug, Clone, Args, Validate)]
pub struct MultiYearForm {
    /// Number of orders per month
    #[arg(long, default_value_t = DEFAULT_ORDERS_PER_MONTH)]
    pub orders: usize,
    /// First year (defaults to five years back)
    #[arg(long)]
    #[validate(range(min = MIN_YEAR, max = MAX_YEAR))]
    pub start_year: Option<i32>,
    /// First month, 1-12 (defaults to January)
    #[arg(long)]
    #[validate(range(min = 1, max = 12))]
    pub start_month: Option<u32>,
    /// Last year (defaults to the current one)
    #[arg(long)]
    #[validate(range(min = MIN_YEAR, max = MAX_YEAR))]
    pub end_year: Option<i32>,
    /// Last month, 1-12 (defaults to December of a past end year, else the current month)
    #[arg(long)]
    #[validate(range(min = 1, max = 12))]
    pub end_month: Option<u32>,
    /// Only generate the current month
    #[arg(long)]
    pub auto: bool,
    /// Replace monthly files instead of appending to them
    #[arg(long)]
    pub overwrite: bool,
    #[command(flatten)]
    #[validate(nested)]
    pub reference: ReferenceArgs,
}

/// What a `multi-year` invocation resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultiYearRequest {
    /// `--auto`: the current month only.
    CurrentMonth(MonthlyRequest),
    Backfill(BackfillRequest),
}

impl MultiYearForm {
    /// Validate the arguments and resolve the month range relative to `today`.
    pub fn into_request(self, today: NaiveDate) -> GenerateFormResult<MultiYearRequest> {
        self.validate()?;

        let write_mode = if self.overwrite {
            WriteMode::Replace
        } else {
            WriteMode::Append
        };
        let reference = self.reference.into_reference_request();

        if self.auto {
            return Ok(MultiYearRequest::CurrentMonth(MonthlyRequest {
                month: YearMonth::of(today),
                orders: self.orders,
                reference,
                output: None,
                write_mode,
            }));
        }

        let start_year = self.start_year.unwrap_or(today.year() - DEFAULT_LOOKBACK_YEARS);
        let start_month = self.start_month.unwrap_or(1);
        let start = YearMonth::new(start_year, start_month).ok_or(GenerateFormError::InvalidMonth {
            year: start_year,
            month: start_month,
        })?;

        let end_year = self.end_year.unwrap_or(today.year());
        let end_month = match (self.end_year, self.end_month) {
            (_, Some(month)) => month,
            (Some(year), None) if year < today.year() => 12,
            _ => today.month(),
        };
        let end = YearMonth::new(end_year, end_month).ok_or(GenerateFormError::InvalidMonth {
            year: end_year,
            month: end_month,
        })?;

        if start > end {
            return Err(GenerateFormError::RangeReversed { start, end });
        }

        Ok(MultiYearRequest::Backfill(BackfillRequest {
            start,
            end,
            orders_per_month: self.orders,
            reference,
            write_mode,
        }))
    }
}

/// Arguments of the `single-file` command.
#[derive(Debug, Clone, Args, Validate)]
pub struct SingleFileForm {
    /// Number of orders to generate
    #[arg(long, default_value_t = DEFAULT_ORDERS_PER_MONTH)]
    pub orders: usize,
    /// Length of the trailing window ending today
    #[arg(long, default_value_t = DEFAULT_SINGLE_FILE_DAYS)]
    #[validate(range(min = 1, max = MAX_SINGLE_FILE_DAYS))]
    pub days: u32,
    /// Consolidated output file
    #[arg(long, default_value = DEFAULT_SINGLE_OUTPUT_FILE)]
    pub output: PathBuf,
    #[command(flatten)]
    #[validate(nested)]
    pub reference: ReferenceArgs,
}

impl SingleFileForm {
    pub fn into_request(self, today: NaiveDate) -> GenerateFormResult<SingleFileRequest> {
        self.validate()?;

        Ok(SingleFileRequest {
            window: DateWindow::trailing_days(today, self.days),
            orders: self.orders,
            reference: self.reference.into_reference_request(),
            output: self.output,
        })
    }
}

/// Combine an optional year and month. A month alone falls in the year of `today`.
fn resolve_month(
    year: Option<i32>,
    month: Option<u32>,
    today: NaiveDate,
) -> GenerateFormResult<Option<YearMonth>> {
    let (year, month) = match (year, month) {
        (None, None) => return Ok(None),
        (Some(_), None) => return Err(GenerateFormError::PartialPeriod),
        (year, Some(month)) => (year.unwrap_or(today.year()), month),
    };

    YearMonth::new(year, month)
        .map(Some)
        .ok_or(GenerateFormError::InvalidMonth { year, month })
}
