//! Generic CSV file access shared by the entity repositories.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;

use csv::Trim;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::models::RowError;
use crate::repository::{RepositoryError, RepositoryResult};

/// How records are written to an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Keep existing rows and header, add records at the end.
    Append,
    /// Truncate the file and write a fresh header.
    Replace,
}

/// Read every record of `path`. A missing file yields an empty list.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> RepositoryResult<Vec<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(RepositoryError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(file);

    let mut records = Vec::new();
    for row in reader.deserialize::<T>() {
        let record = row.map_err(|source| RepositoryError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Write `records` to `path`, creating parent directories as needed.
///
/// The header row is emitted only when the file is new, empty or replaced.
pub fn write_records<T: Serialize>(
    path: &Path,
    records: &[T],
    mode: WriteMode,
) -> RepositoryResult<usize> {
    let io_error = |source: std::io::Error| RepositoryError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let (file, has_existing_rows) = match mode {
        WriteMode::Append => {
            let has_existing_rows = match fs::metadata(path) {
                Ok(metadata) => metadata.len() > 0,
                Err(err) if err.kind() == ErrorKind::NotFound => false,
                Err(err) => return Err(io_error(err)),
            };
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(io_error)?;
            (file, has_existing_rows)
        }
        WriteMode::Replace => (File::create(path).map_err(io_error)?, false),
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(!has_existing_rows)
        .from_writer(file);

    for record in records {
        writer
            .serialize(record)
            .map_err(|source| RepositoryError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
    }

    writer.flush().map_err(io_error)?;
    Ok(records.len())
}

/// Convert deserialized rows, attributing failures to their line in `path`.
pub fn convert_records<R, T>(path: &Path, rows: Vec<R>) -> RepositoryResult<Vec<T>>
where
    T: TryFrom<R, Error = RowError>,
{
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            T::try_from(row).map_err(|source| invalid_record(path, index, source))
        })
        .collect()
}

/// Build an [`RepositoryError::InvalidRecord`] for the zero-based data row `index`.
pub fn invalid_record(path: &Path, index: usize, source: RowError) -> RepositoryError {
    RepositoryError::InvalidRecord {
        path: path.to_path_buf(),
        row: index + 2, // account for header row
        source,
    }
}
