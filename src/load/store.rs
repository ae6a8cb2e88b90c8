//! Payments saved between invocations, as a CSV file

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::lib::{payment::Payment, repository::PaymentLog};
use crate::load::{line_of, read_record, write_record, RecordError, FIELDS};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no payment store at {}, import payments with `supporters load` first", .path.display())]
    Missing { path: PathBuf },
    #[error("cannot access payment store {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed payment store {}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("bad payment on line {line} of {}", .path.display())]
    Record {
        path: PathBuf,
        line: u64,
        #[source]
        source: RecordError,
    },
}

/// Payments kept on disk between invocations
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add payments after the ones already stored
    ///
    /// The store is rewritten through a staging file, so a failed write
    /// leaves it as it was.
    pub fn append(&self, payments: &[Payment]) -> Result<(), StoreError> {
        let mut staged = self.stage()?;
        let fresh = match File::open(&self.path) {
            Ok(mut current) => {
                io::copy(&mut current, staged.as_file_mut()).map_err(|e| self.io(e))? == 0
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => true,
            Err(e) => return Err(self.io(e)),
        };
        self.commit(staged, fresh, payments)?;
        info!(count = payments.len(), path = %self.path.display(), "payments appended");
        Ok(())
    }

    /// Discard stored payments and save these instead
    pub fn replace(&self, payments: &[Payment]) -> Result<(), StoreError> {
        let staged = self.stage()?;
        self.commit(staged, true, payments)?;
        info!(count = payments.len(), path = %self.path.display(), "payments replaced");
        Ok(())
    }

    /// Load every stored payment
    pub fn read(&self) -> Result<PaymentLog, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::Missing { path: self.path.clone() })
            }
            Err(e) => return Err(self.io(e)),
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);
        let mut payments = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| self.csv(e))?;
            let payment = read_record(&record).map_err(|source| StoreError::Record {
                path: self.path.clone(),
                line: line_of(&record),
                source,
            })?;
            payments.push(payment);
        }
        debug!(count = payments.len(), path = %self.path.display(), "payment store read");
        Ok(PaymentLog::new(payments))
    }

    /// Empty file next to the store, removed on drop unless committed
    fn stage(&self) -> Result<NamedTempFile, StoreError> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        NamedTempFile::new_in(dir).map_err(|e| self.io(e))
    }

    /// Write `payments` after whatever `staged` holds, then move it over the store
    fn commit(&self, staged: NamedTempFile, header: bool, payments: &[Payment]) -> Result<(), StoreError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(staged);
        if header {
            writer.write_record(FIELDS).map_err(|e| self.csv(e))?;
        }
        for payment in payments {
            writer
                .write_record(write_record(payment))
                .map_err(|e| self.csv(e))?;
        }
        let staged = writer.into_inner().map_err(|e| self.io(e.into_error()))?;
        staged.as_file().sync_all().map_err(|e| self.io(e))?;
        debug!(staged = %staged.path().display(), "moving staged payments into place");
        staged.persist(&self.path).map_err(|e| self.io(e.error))?;
        Ok(())
    }

    fn io(&self, source: io::Error) -> StoreError {
        StoreError::Io { path: self.path.clone(), source }
    }

    fn csv(&self, source: csv::Error) -> StoreError {
        StoreError::Csv { path: self.path.clone(), source }
    }
}
