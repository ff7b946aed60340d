use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use env_logger::{Env, Target, WriteStyle};
use thiserror::Error;

/// Errors raised while installing the logger.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    AlreadyInstalled(#[from] log::SetLoggerError),
}

/// Name of the log file for a run started on `date`.
pub fn log_file_name(date: chrono::NaiveDate) -> String {
    format!("orders_generation_{}.log", date.format("%Y%m%d"))
}

/// Install `env_logger`, writing every record to stderr and to a dated file in `log_dir`.
///
/// The filter defaults to `info` and honours `RUST_LOG`. Returns the log file path.
pub fn init(log_dir: &Path) -> Result<PathBuf, LoggingError> {
    let path = log_dir.join(log_file_name(chrono::Local::now().date_naive()));
    let io_error = |source| LoggingError::Io {
        path: path.clone(),
        source,
    };

    fs::create_dir_all(log_dir).map_err(io_error)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(io_error)?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(TeeWriter { file })))
        .write_style(WriteStyle::Never)
        .try_init()?;

    Ok(path)
}

/// Duplicates log output to stderr and the run's log file.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}
