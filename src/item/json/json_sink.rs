use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

use log::warn;

use crate::{
    BatchError,
    core::item::{ContactSink, Profile},
};

struct JsonStream<T: Write> {
    /// `None` once the writer was handed back by `into_inner`.
    stream: Option<BufWriter<T>>,
    is_first_item: bool,
    opened: bool,
    finished: bool,
}

impl<T: Write> JsonStream<T> {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        match self.stream.as_mut() {
            Some(stream) if !self.finished => stream.write_all(bytes),
            _ => Err(io::Error::other("JSON array already closed")),
        }
    }

    fn open(&mut self, pretty: bool) -> Result<(), BatchError> {
        if self.finished {
            return Err(BatchError::ItemWriter(
                "JSON array already closed".to_string(),
            ));
        }
        if self.opened {
            return Ok(());
        }
        let bracket: &[u8] = if pretty { b"[\n" } else { b"[" };
        self.write_all(bracket)
            .map_err(|error| BatchError::ItemWriter(error.to_string()))?;
        self.opened = true;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), BatchError> {
        match self.stream.as_mut() {
            Some(stream) => stream
                .flush()
                .map_err(|error| BatchError::ItemWriter(error.to_string())),
            None => Ok(()),
        }
    }

    fn finish(&mut self, pretty: bool) -> Result<(), BatchError> {
        if self.finished || self.stream.is_none() {
            return Ok(());
        }
        self.open(pretty)?;
        let bracket: &[u8] = if pretty { b"\n]\n" } else { b"]\n" };
        self.write_all(bracket)
            .map_err(|error| BatchError::ItemWriter(error.to_string()))?;
        self.flush()?;
        self.finished = true;
        Ok(())
    }
}

/// Sink writing committed profiles as one JSON array.
///
/// The opening bracket is written by the first `open`, and the closing one by
/// [`finish`](Self::finish), [`into_inner`](Self::into_inner) or when the sink
/// is dropped. Every run on the same sink appends to that array, and `close`
/// only flushes, so the output stays a single document across runs and
/// cancellations.
pub struct JsonContactSink<T: Write + Send> {
    stream: Mutex<JsonStream<T>>,
    use_pretty_formatter: bool,
}

impl<T: Write + Send> JsonContactSink<T> {
    fn stream(&self) -> MutexGuard<'_, JsonStream<T>> {
        self.stream.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Closes the array and flushes. Later runs on this sink fail to open.
    pub fn finish(&self) -> Result<(), BatchError> {
        self.stream().finish(self.use_pretty_formatter)
    }

    /// Closes the array, flushes and returns the underlying writer.
    pub fn into_inner(mut self) -> Result<T, BatchError> {
        let json = self
            .stream
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        json.finish(self.use_pretty_formatter)?;

        json.stream
            .take()
            .ok_or_else(|| BatchError::ItemWriter("writer already taken".to_string()))?
            .into_inner()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }
}

impl<T: Write + Send> Drop for JsonContactSink<T> {
    fn drop(&mut self) {
        let json = self
            .stream
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Err(error) = json.finish(self.use_pretty_formatter) {
            warn!("Unable to close JSON array: {}", error);
        }
    }
}

impl<T: Write + Send> ContactSink for JsonContactSink<T> {
    fn commit(&self, profile: &Profile) -> Result<bool, BatchError> {
        let json = if self.use_pretty_formatter {
            serde_json::to_string_pretty(profile)
        } else {
            serde_json::to_string(profile)
        };

        let json = match json {
            Ok(json) => json,
            Err(error) => {
                warn!("Unable to serialize contact {}: {}", profile, error);
                return Ok(false);
            }
        };

        let mut stream = self.stream();
        let separator: &[u8] = match (stream.is_first_item, self.use_pretty_formatter) {
            (true, _) => b"",
            (false, true) => b",\n",
            (false, false) => b",",
        };

        let result = match stream.write_all(separator) {
            Ok(()) => stream.write_all(json.as_bytes()),
            Err(error) => Err(error),
        };

        match result {
            Ok(()) => {
                stream.is_first_item = false;
                Ok(true)
            }
            Err(error) => {
                warn!("Unable to write contact {}: {}", profile, error);
                Ok(false)
            }
        }
    }

    fn open(&self) -> Result<(), BatchError> {
        self.stream().open(self.use_pretty_formatter)
    }

    fn close(&self) -> Result<(), BatchError> {
        self.stream().flush()
    }
}

#[derive(Default)]
pub struct JsonContactSinkBuilder {
    pretty_formatter: bool,
}

impl JsonContactSinkBuilder {
    pub fn new() -> JsonContactSinkBuilder {
        JsonContactSinkBuilder {
            pretty_formatter: false,
        }
    }

    pub fn pretty_formatter(mut self, yes: bool) -> JsonContactSinkBuilder {
        self.pretty_formatter = yes;
        self
    }

    /// Creates (or truncates) the file at `path`.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<JsonContactSink<File>, BatchError> {
        let file = File::create(path).map_err(|error| BatchError::ItemWriter(error.to_string()))?;
        Ok(self.from_writer(file))
    }

    pub fn from_writer<W: Write + Send>(self, wtr: W) -> JsonContactSink<W> {
        JsonContactSink {
            stream: Mutex::new(JsonStream {
                stream: Some(BufWriter::new(wtr)),
                is_first_item: true,
                opened: false,
                finished: false,
            }),
            use_pretty_formatter: self.pretty_formatter,
        }
    }
}
