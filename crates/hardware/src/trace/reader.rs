//! Streaming trace reader.
//!
//! Records are decoded lazily, one per call, so arbitrarily long traces run in
//! constant memory. Files beginning with the gzip magic are decompressed on the fly.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, ErrorKind, Read};
use std::path::Path;

use flate2::bufread::MultiGzDecoder;

use crate::common::constants::{GZIP_MAGIC, TRACE_RECORD_SIZE};
use crate::common::error::{DecodeError, SimError};

use super::InstructionSource;
use super::instruction::Instruction;
use super::record::{self, RawRecord};

/// A trace opened from disk, compressed or not.
pub type FileTrace = TraceReader<Box<dyn Read + Send>>;

/// Forward-only decoder over a byte stream of trace records.
pub struct TraceReader<R> {
    inner: R,
    records: u64,
    done: bool,
}

impl<R> fmt::Debug for TraceReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceReader")
            .field("records", &self.records)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl FileTrace {
    /// Opens a trace file, detecting gzip compression from its first bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be opened or read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let context = || format!("opening trace {}", path.display());
        let file = File::open(path).map_err(|e| SimError::io(context(), e))?;
        let mut buf = BufReader::new(file);
        let compressed = buf
            .fill_buf()
            .map_err(|e| SimError::io(context(), e))?
            .starts_with(&GZIP_MAGIC);

        tracing::debug!(path = %path.display(), compressed, "opened trace");

        let inner: Box<dyn Read + Send> = if compressed {
            Box::new(MultiGzDecoder::new(buf))
        } else {
            Box::new(buf)
        };
        Ok(Self::from_reader(inner))
    }
}

impl<R: Read> TraceReader<R> {
    /// Wraps an already-decompressed record stream.
    pub const fn from_reader(inner: R) -> Self {
        Self {
            inner,
            records: 0,
            done: false,
        }
    }

    /// Number of records decoded so far.
    pub const fn records_read(&self) -> u64 {
        self.records
    }

    /// Fills `raw`, returning how many bytes were available before EOF.
    fn fill(&mut self, raw: &mut RawRecord) -> io::Result<usize> {
        let mut filled = 0;
        while filled < raw.len() {
            match self.inner.read(&mut raw[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    fn read_record(&mut self) -> Result<Option<Instruction>, DecodeError> {
        let mut raw = [0u8; TRACE_RECORD_SIZE];
        let bytes = self.fill(&mut raw)?;
        if bytes == 0 {
            return Ok(None);
        }
        if bytes < TRACE_RECORD_SIZE {
            return Err(DecodeError::Truncated {
                record: self.records,
                bytes,
                expected: TRACE_RECORD_SIZE,
            });
        }
        let inst = record::decode(&raw, self.records)?;
        self.records += 1;
        Ok(Some(inst))
    }
}

impl<R: Read> InstructionSource for TraceReader<R> {
    /// Decodes the next record. After end of trace or an error, keeps returning `Ok(None)`.
    fn next_instruction(&mut self) -> Result<Option<Instruction>, DecodeError> {
        if self.done {
            return Ok(None);
        }
        let result = self.read_record();
        if !matches!(result, Ok(Some(_))) {
            self.done = true;
        }
        result
    }
}

impl<R: Read> Iterator for TraceReader<R> {
    type Item = Result<Instruction, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_instruction().transpose()
    }
}
