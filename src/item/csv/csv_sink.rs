use std::{
    fs::File,
    io::Write,
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

use csv::{Writer, WriterBuilder};
use log::warn;

use crate::{
    BatchError,
    core::item::{ContactSink, Profile},
};

/// Sink writing one CSV record per committed profile.
pub struct CsvContactSink<T: Write + Send> {
    wrapper: Mutex<Writer<T>>,
}

impl<T: Write + Send> CsvContactSink<T> {
    fn wrapper(&self) -> MutexGuard<'_, Writer<T>> {
        self.wrapper.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<T, BatchError> {
        let wrapper = self
            .wrapper
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        wrapper
            .into_inner()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }
}

impl<T: Write + Send> ContactSink for CsvContactSink<T> {
    /// A record that cannot be serialized or written only fails its own
    /// unit.
    fn commit(&self, profile: &Profile) -> Result<bool, BatchError> {
        match self.wrapper().serialize(profile) {
            Ok(()) => Ok(true),
            Err(error) => {
                warn!("Unable to write contact {}: {}", profile, error);
                Ok(false)
            }
        }
    }

    /// Flush the contents of the internal buffer to the underlying writer.
    fn close(&self) -> Result<(), BatchError> {
        self.wrapper()
            .flush()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }
}

pub struct CsvContactSinkBuilder {
    delimiter: u8,
    has_headers: bool,
}

impl Default for CsvContactSinkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvContactSinkBuilder {
    pub fn new() -> CsvContactSinkBuilder {
        CsvContactSinkBuilder {
            delimiter: b',',
            has_headers: true,
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> CsvContactSinkBuilder {
        self.delimiter = delimiter;
        self
    }

    pub fn has_headers(mut self, yes: bool) -> CsvContactSinkBuilder {
        self.has_headers = yes;
        self
    }

    fn writer_builder(&self) -> WriterBuilder {
        let mut builder = WriterBuilder::new();
        builder
            .flexible(false)
            .delimiter(self.delimiter)
            .has_headers(self.has_headers);
        builder
    }

    /// Creates (or truncates) the file at `path`.
    pub fn from_path<R: AsRef<Path>>(self, path: R) -> Result<CsvContactSink<File>, BatchError> {
        let wtr = self
            .writer_builder()
            .from_path(path)
            .map_err(|error| BatchError::ItemWriter(error.to_string()))?;

        Ok(CsvContactSink {
            wrapper: Mutex::new(wtr),
        })
    }

    pub fn from_writer<W: Write + Send>(self, wtr: W) -> CsvContactSink<W> {
        CsvContactSink {
            wrapper: Mutex::new(self.writer_builder().from_writer(wtr)),
        }
    }
}
