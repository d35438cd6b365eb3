//! Trace encoding.
//!
//! Produces files in the same 48-byte record format that [`TraceReader`](super::TraceReader)
//! consumes, optionally gzip-compressed.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::common::error::SimError;

use super::instruction::Instruction;
use super::record;

/// Encodes instructions into a byte sink.
#[derive(Debug)]
pub struct TraceWriter<W: Write> {
    inner: W,
    records: u64,
}

impl<W: Write> TraceWriter<W> {
    /// Creates a writer over `inner`.
    pub const fn new(inner: W) -> Self {
        Self { inner, records: 0 }
    }

    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Propagates write failures from the sink.
    pub fn write(&mut self, inst: &Instruction) -> io::Result<()> {
        self.inner.write_all(&record::encode(inst))?;
        self.records += 1;
        Ok(())
    }

    /// Number of records written.
    pub const fn records_written(&self) -> u64 {
        self.records
    }

    /// Flushes and returns the sink.
    ///
    /// # Errors
    ///
    /// Propagates flush failures from the sink.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Writes `insts` to `path`, gzip-compressed when `compress` is set.
///
/// Returns the number of records written.
///
/// # Errors
///
/// Returns [`SimError::Io`] if the file cannot be created or written.
pub fn write_trace_file(
    path: impl AsRef<Path>,
    insts: &[Instruction],
    compress: bool,
) -> Result<u64, SimError> {
    let path = path.as_ref();
    let context = || format!("writing trace {}", path.display());
    let file = File::create(path).map_err(|e| SimError::io(context(), e))?;
    let sink = BufWriter::new(file);

    let written = if compress {
        let mut writer = TraceWriter::new(GzEncoder::new(sink, Compression::default()));
        encode_all(&mut writer, insts).map_err(|e| SimError::io(context(), e))?;
        let count = writer.records_written();
        writer
            .into_inner()
            .and_then(GzEncoder::finish)
            .and_then(|mut buf| buf.flush())
            .map_err(|e| SimError::io(context(), e))?;
        count
    } else {
        let mut writer = TraceWriter::new(sink);
        encode_all(&mut writer, insts).map_err(|e| SimError::io(context(), e))?;
        let count = writer.records_written();
        let _ = writer.into_inner().map_err(|e| SimError::io(context(), e))?;
        count
    };

    tracing::debug!(path = %path.display(), records = written, compress, "wrote trace");
    Ok(written)
}

fn encode_all<W: Write>(writer: &mut TraceWriter<W>, insts: &[Instruction]) -> io::Result<()> {
    for inst in insts {
        writer.write(inst)?;
    }
    Ok(())
}
