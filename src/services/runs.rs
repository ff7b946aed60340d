//! The three generation modes: one month, a multi-month backfill and a single
//! consolidated file.

use std::path::PathBuf;

use rand::Rng;
use validator::Validate;

use crate::config::{DEFAULT_ORDERS_PER_MONTH, GeneratorConfig};
use crate::domain::period::{DateWindow, YearMonth};
use crate::repository::files::WriteMode;
use crate::repository::{
    CustomerReader, CustomerWriter, OrderFile, OrderReader, OrderWriter, ProductReader,
    ProductWriter,
};
use crate::services::orders::{OrderBatch, generate_orders, next_order_index};
use crate::services::reference_data::{ReferenceData, ReferenceRequest, prepare_reference_data};
use crate::services::{ServiceError, ServiceResult};

/// Generate orders for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyRequest {
    pub month: YearMonth,
    pub orders: usize,
    pub reference: ReferenceRequest,
    /// Write here instead of the month's file.
    pub output: Option<PathBuf>,
    pub write_mode: WriteMode,
}

impl MonthlyRequest {
    pub fn new(month: YearMonth) -> Self {
        Self {
            month,
            orders: DEFAULT_ORDERS_PER_MONTH,
            reference: ReferenceRequest::default(),
            output: None,
            write_mode: WriteMode::Append,
        }
    }
}

/// Generate orders for every month from `start` to `end` inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillRequest {
    pub start: YearMonth,
    pub end: YearMonth,
    pub orders_per_month: usize,
    /// Applied once before the first month; later months reuse the same data.
    pub reference: ReferenceRequest,
    pub write_mode: WriteMode,
}

/// Generate one file covering a trailing window of days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleFileRequest {
    pub window: DateWindow,
    pub orders: usize,
    pub reference: ReferenceRequest,
    pub output: PathBuf,
}

/// What a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub products: usize,
    pub customers: usize,
    /// Order files touched, with the number of orders written to each.
    pub files: Vec<(OrderFile, usize)>,
}

impl RunSummary {
    fn new(reference: &ReferenceData) -> Self {
        Self {
            products: reference.products.len(),
            customers: reference.customers.len(),
            files: Vec::new(),
        }
    }

    pub fn orders_written(&self) -> usize {
        self.files.iter().map(|(_, written)| written).sum()
    }
}

/// Monthly mode. Existing orders of the month are kept and numbering continues after them
/// unless the request replaces the file.
pub fn generate_month<R, G>(
    repo: &R,
    config: &GeneratorConfig,
    rng: &mut G,
    request: &MonthlyRequest,
) -> ServiceResult<RunSummary>
where
    R: ProductReader
        + ProductWriter
        + CustomerReader
        + CustomerWriter
        + OrderReader
        + OrderWriter
        + ?Sized,
    G: Rng + ?Sized,
{
    ensure_valid(config)?;
    log::info!("Generating {} orders for {}", request.orders, request.month);

    let reference = prepare_reference_data(repo, config, rng, &request.reference)?;
    let file = match &request.output {
        Some(path) => OrderFile::Custom(path.clone()),
        None => OrderFile::Monthly(request.month),
    };

    let mut summary = RunSummary::new(&reference);
    let written = write_month(
        repo,
        config,
        rng,
        &reference,
        OrderBatch::month(request.month, request.orders),
        &file,
        request.write_mode,
    )?;
    summary.files.push((file, written));

    log::info!("Wrote {written} orders for {}", request.month);
    Ok(summary)
}

/// Multi-year mode. Stops at the first month that fails.
pub fn generate_backfill<R, G>(
    repo: &R,
    config: &GeneratorConfig,
    rng: &mut G,
    request: &BackfillRequest,
) -> ServiceResult<RunSummary>
where
    R: ProductReader
        + ProductWriter
        + CustomerReader
        + CustomerWriter
        + OrderReader
        + OrderWriter
        + ?Sized,
    G: Rng + ?Sized,
{
    ensure_valid(config)?;
    if request.start > request.end {
        return Err(ServiceError::InvalidRequest(format!(
            "start month {} is after end month {}",
            request.start, request.end
        )));
    }

    let months = YearMonth::range_inclusive(request.start, request.end);
    log::info!(
        "Generating {} orders per month for {} months ({} to {})",
        request.orders_per_month,
        months.len(),
        request.start,
        request.end
    );

    let reference = prepare_reference_data(repo, config, rng, &request.reference)?;
    let mut summary = RunSummary::new(&reference);

    for (position, month) in months.iter().enumerate() {
        let file = OrderFile::Monthly(*month);
        let written = write_month(
            repo,
            config,
            rng,
            &reference,
            OrderBatch::month(*month, request.orders_per_month),
            &file,
            request.write_mode,
        )
        .inspect_err(|err| log::error!("Generation failed for {month}: {err}"))?;

        log::info!(
            "[{}/{}] Wrote {written} orders for {month}",
            position + 1,
            months.len()
        );
        summary.files.push((file, written));
    }

    log::info!(
        "Backfill finished: {} orders across {} months",
        summary.orders_written(),
        summary.files.len()
    );
    Ok(summary)
}

/// Single-file mode. The output file is always rewritten.
pub fn generate_single_file<R, G>(
    repo: &R,
    config: &GeneratorConfig,
    rng: &mut G,
    request: &SingleFileRequest,
) -> ServiceResult<RunSummary>
where
    R: ProductReader
        + ProductWriter
        + CustomerReader
        + CustomerWriter
        + OrderReader
        + OrderWriter
        + ?Sized,
    G: Rng + ?Sized,
{
    ensure_valid(config)?;
    log::info!(
        "Generating {} orders between {} and {}",
        request.orders,
        request.window.start,
        request.window.end
    );

    let reference = prepare_reference_data(repo, config, rng, &request.reference)?;
    let orders = generate_orders(
        config,
        rng,
        &reference,
        &OrderBatch::window(request.window, request.orders),
    )?;

    let file = OrderFile::Custom(request.output.clone());
    let written = repo.replace_orders(&file, &orders)?;
    log::info!("Wrote {written} orders to {}", request.output.display());

    let mut summary = RunSummary::new(&reference);
    summary.files.push((file, written));
    Ok(summary)
}

fn write_month<R, G>(
    repo: &R,
    config: &GeneratorConfig,
    rng: &mut G,
    reference: &ReferenceData,
    batch: OrderBatch,
    file: &OrderFile,
    mode: WriteMode,
) -> ServiceResult<usize>
where
    R: OrderReader + OrderWriter + ?Sized,
    G: Rng + ?Sized,
{
    let batch = match mode {
        WriteMode::Append => {
            let first_index = next_order_index(&repo.list_orders(file)?, &batch.prefix);
            batch.starting_at(first_index)
        }
        WriteMode::Replace => batch,
    };

    let orders = generate_orders(config, rng, reference, &batch)?;
    let written = match mode {
        WriteMode::Append => repo.append_orders(file, &orders)?,
        WriteMode::Replace => repo.replace_orders(file, &orders)?,
    };
    Ok(written)
}

fn ensure_valid(config: &GeneratorConfig) -> ServiceResult<()> {
    config
        .validate()
        .map_err(|err| ServiceError::InvalidConfig(err.to_string()))
}
