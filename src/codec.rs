//! Score file decoding
//!
//! The score file is written by the compile data extractor. Layout, all
//! integers little-endian:
//!
//! ```text
//! u32      version                 must equal SCORE_VERSION
//! u32      unit_count
//! repeat unit_count:
//!     str  name
//!     u32  values[DISPLAY_COUNT]   category index order
//! repeat GATHER_COUNT (category index ascending):
//!     u32  entry_count
//!     repeat entry_count:
//!         str  name
//!         u64  accumulated
//!         u32  min
//!         u32  max
//!         u32  count
//! ```
//!
//! Strings carry a 7-bit variable-length size prefix followed by UTF-8 bytes,
//! the same encoding the exporter produces. Invalid UTF-8 is decoded lossily. Decoding is forward-only and
//! either yields the complete file contents or an error.

use crate::category::{Category, DISPLAY_COUNT, GATHER_COUNT};
use crate::record::{AggregateValue, UnitRecord};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Format version this reader understands
pub const SCORE_VERSION: u32 = 1;

/// Upper bound on capacity reserved from a declared count
pub(crate) const MAX_PREALLOC: usize = 4096;

/// Longest 7-bit encoded size prefix for a 32-bit length
const MAX_SIZE_PREFIX_BYTES: u32 = 5;

/// Errors raised while decoding a score or timeline stream
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Version mismatch! Expected {expected} - Found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Malformed stream at byte {offset}: {context}")]
    MalformedStream { offset: u64, context: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Everything a score file holds, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreData {
    pub units: Vec<UnitRecord>,
    /// One entry list per gathered category, indexed by `Category::index()`
    pub aggregates: [Vec<AggregateValue>; GATHER_COUNT],
}

impl ScoreData {
    pub fn aggregates(&self, category: Category) -> &[AggregateValue] {
        self.aggregates
            .get(category.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Decode a complete score file from `reader`
///
/// On a version mismatch only the four version bytes are consumed.
pub fn decode<R: Read>(reader: R) -> Result<ScoreData> {
    let mut reader = RecordReader::new(reader);
    reader.expect_version(SCORE_VERSION)?;

    let unit_count = reader.read_u32("unit count")?;
    let mut units = Vec::with_capacity(capacity_hint(unit_count));
    for _ in 0..unit_count {
        units.push(read_unit(&mut reader)?);
    }

    let mut data = ScoreData {
        units,
        ..ScoreData::default()
    };

    for category in Category::gathered() {
        let entry_count = reader.read_u32("aggregate count")?;
        let entries = &mut data.aggregates[category.index()];
        entries.reserve(capacity_hint(entry_count));
        for _ in 0..entry_count {
            entries.push(read_aggregate(&mut reader)?);
        }
    }

    Ok(data)
}

/// Open and decode the score file at `path`
pub fn decode_file(path: impl AsRef<Path>) -> Result<ScoreData> {
    let file = File::open(path.as_ref())?;
    decode(BufReader::new(file))
}

fn read_unit<R: Read>(reader: &mut RecordReader<R>) -> Result<UnitRecord> {
    let name = reader.read_string("unit name")?;
    let mut values = [0u32; DISPLAY_COUNT];
    for value in values.iter_mut() {
        *value = reader.read_u32("unit value")?;
    }
    Ok(UnitRecord::new(name, values))
}

fn read_aggregate<R: Read>(reader: &mut RecordReader<R>) -> Result<AggregateValue> {
    let name = reader.read_string("aggregate name")?;
    let accumulated = reader.read_u64("aggregate accumulated")?;
    let min = reader.read_u32("aggregate min")?;
    let max = reader.read_u32("aggregate max")?;
    let count = reader.read_u32("aggregate count")?;
    Ok(AggregateValue::new(name, accumulated, min, max, count))
}

fn capacity_hint(count: u32) -> usize {
    (count as usize).min(MAX_PREALLOC)
}

/// Little-endian primitive reader that tracks its offset for error reporting
pub(crate) struct RecordReader<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> RecordReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    pub(crate) fn malformed(&self, context: impl Into<String>) -> DecodeError {
        DecodeError::MalformedStream {
            offset: self.offset,
            context: context.into(),
        }
    }

    pub(crate) fn expect_version(&mut self, expected: u32) -> Result<()> {
        let found = self.read_u32("format version")?;
        if found != expected {
            return Err(DecodeError::VersionMismatch { expected, found });
        }
        Ok(())
    }

    fn fill(&mut self, buf: &mut [u8], what: &str) -> Result<()> {
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.offset += buf.len() as u64;
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Err(self.malformed(format!("unexpected end of stream reading {}", what)))
            }
            Err(e) => Err(DecodeError::Io(e)),
        }
    }

    pub(crate) fn read_u8(&mut self, what: &str) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.fill(&mut buf, what)?;
        Ok(buf[0])
    }

    pub(crate) fn read_u32(&mut self, what: &str) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf, what)?;
        Ok(u32::from_le_bytes(buf))
    }

    pub(crate) fn read_u64(&mut self, what: &str) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf, what)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Read a u32 that may legitimately be absent at a record boundary
    ///
    /// Returns `None` only when the stream ends before its first byte.
    pub(crate) fn read_u32_or_eof(&mut self, what: &str) -> Result<Option<u32>> {
        let mut buf = [0u8; 4];
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(DecodeError::Io(e)),
            }
        }
        self.offset += filled as u64;

        match filled {
            0 => Ok(None),
            4 => Ok(Some(u32::from_le_bytes(buf))),
            _ => Err(self.malformed(format!("unexpected end of stream reading {}", what))),
        }
    }

    fn read_size_prefix(&mut self, what: &str) -> Result<usize> {
        let mut size: u64 = 0;
        for i in 0..MAX_SIZE_PREFIX_BYTES {
            let byte = self.read_u8(what)?;
            size |= u64::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                if size > i32::MAX as u64 {
                    return Err(self.malformed(format!("{} length {} out of range", what, size)));
                }
                return Ok(size as usize);
            }
        }
        Err(self.malformed(format!("{} length prefix too long", what)))
    }

    pub(crate) fn read_string(&mut self, what: &str) -> Result<String> {
        let len = self.read_size_prefix(what)?;

        let mut bytes = Vec::with_capacity(len.min(MAX_PREALLOC));
        let read = (&mut self.inner)
            .take(len as u64)
            .read_to_end(&mut bytes)
            .map_err(DecodeError::Io)?;
        self.offset += read as u64;
        if read != len {
            return Err(self.malformed(format!(
                "unexpected end of stream reading {} ({} of {} bytes)",
                what, read, len
            )));
        }

        // Invalid sequences become U+FFFD, as the .NET reader does for ANSI-encoded paths
        Ok(String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
    }
}
