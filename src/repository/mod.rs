use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::{customer::Customer, order::Order, period::YearMonth, product::Product};
use crate::models::RowError;

pub mod customer;
pub mod files;
pub mod order;
pub mod product;

#[cfg(test)]
pub mod mock;

/// Result type returned by repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors raised while reading or writing the CSV store.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV data in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// `row` is the 1-based line number, counting the header as line 1.
    #[error("invalid record in {} at line {row}: {source}", path.display())]
    InvalidRecord {
        path: PathBuf,
        row: usize,
        #[source]
        source: RowError,
    },
}

#[derive(Clone, Debug)]
/// CSV-backed repository rooted at a data directory.
///
/// Layout below the root:
/// `csv_data/products/products.csv`, `csv_data/customers/customers.csv`,
/// `csv_data/customers/customer_sequences.csv` and
/// `csv_data/orders/orders_YYYY_MM.csv`.
pub struct CsvRepository {
    root: PathBuf,
}

impl CsvRepository {
    /// Create a new repository storing its files below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn csv_dir(&self) -> PathBuf {
        self.root.join("csv_data")
    }

    pub fn products_file(&self) -> PathBuf {
        self.csv_dir().join("products").join("products.csv")
    }

    pub fn customers_file(&self) -> PathBuf {
        self.csv_dir().join("customers").join("customers.csv")
    }

    pub fn sequences_file(&self) -> PathBuf {
        self.csv_dir().join("customers").join("customer_sequences.csv")
    }

    pub fn orders_dir(&self) -> PathBuf {
        self.csv_dir().join("orders")
    }

    /// Resolve the file an [`OrderFile`] refers to.
    pub fn order_file_path(&self, file: &OrderFile) -> PathBuf {
        match file {
            OrderFile::Monthly(month) => self
                .orders_dir()
                .join(format!("orders_{}_{:02}.csv", month.year(), month.month())),
            OrderFile::Custom(path) => path.clone(),
        }
    }
}

/// Destination of a batch of orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderFile {
    /// The month-scoped file in the orders directory.
    Monthly(YearMonth),
    /// An explicit path, used for output overrides and single-file mode.
    Custom(PathBuf),
}

/// Read-only operations over product records.
pub trait ProductReader {
    /// List stored products; a missing file yields an empty list.
    fn list_products(&self) -> RepositoryResult<Vec<Product>>;
}

/// Write operations over product records.
pub trait ProductWriter {
    /// Overwrite the stored products with `products`.
    fn replace_products(&self, products: &[Product]) -> RepositoryResult<usize>;
    /// Append products whose code is not stored yet, returning how many were written.
    fn append_products(&self, products: &[Product]) -> RepositoryResult<usize>;
}

/// Read-only operations over customers and their delivery sequences.
pub trait CustomerReader {
    /// List stored customers with their sequences joined in.
    fn list_customers(&self) -> RepositoryResult<Vec<Customer>>;
}

/// Write operations over customers and their delivery sequences.
pub trait CustomerWriter {
    fn replace_customers(&self, customers: &[Customer]) -> RepositoryResult<usize>;
    /// Append customers (and sequences) whose keys are not stored yet.
    fn append_customers(&self, customers: &[Customer]) -> RepositoryResult<usize>;
}

/// Read-only operations over order files.
pub trait OrderReader {
    fn list_orders(&self, file: &OrderFile) -> RepositoryResult<Vec<Order>>;
}

/// Write operations over order files.
pub trait OrderWriter {
    /// Append orders whose number is not in the file yet.
    fn append_orders(&self, file: &OrderFile, orders: &[Order]) -> RepositoryResult<usize>;
    fn replace_orders(&self, file: &OrderFile, orders: &[Order]) -> RepositoryResult<usize>;
}
