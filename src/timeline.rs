//! Per-unit timeline files
//!
//! Next to the score file the extractor writes the event timeline of every
//! translation unit, batched [`TIMELINES_PER_FILE`] per file. The file holding
//! the timeline for unit `i` is `<score path>.tNNNN` with `NNNN = i / 100`.
//!
//! ```text
//! u32      version
//! repeat until end of file:
//!     u32  event_count
//!     repeat event_count:
//!         u32  start
//!         u32  duration
//!         u32  name_id
//!         u8   category
//! ```

use crate::category::Category;
use crate::codec::{DecodeError, RecordReader, Result, MAX_PREALLOC, SCORE_VERSION};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Timelines stored in one timeline file
pub const TIMELINES_PER_FILE: usize = 100;

/// Decimal digits in the timeline file extension
const FILE_NUMBER_DIGITS: u32 = 4;

/// One compiler activity within a unit's timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineEvent {
    pub start: u32,
    pub duration: u32,
    pub name_id: u32,
    pub category: Category,
}

impl TimelineEvent {
    pub fn end(&self) -> u64 {
        u64::from(self.start) + u64::from(self.duration)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Timeline {
    pub events: Vec<TimelineEvent>,
}

impl Timeline {
    /// Time covered from the first start to the last end
    pub fn span(&self) -> u64 {
        let start = self.events.iter().map(|e| u64::from(e.start)).min();
        let end = self.events.iter().map(TimelineEvent::end).max();
        match (start, end) {
            (Some(start), Some(end)) => end.saturating_sub(start),
            _ => 0,
        }
    }

    /// Events of one category
    pub fn events_in(&self, category: Category) -> impl Iterator<Item = &TimelineEvent> {
        self.events.iter().filter(move |e| e.category == category)
    }
}

/// Timeline file holding unit `unit_index`
///
/// Returns `None` past the last file number the extension can express.
pub fn timeline_file_path(score_path: impl AsRef<Path>, unit_index: usize) -> Option<PathBuf> {
    let file_number = unit_index / TIMELINES_PER_FILE;
    if file_number >= 10usize.pow(FILE_NUMBER_DIGITS) {
        return None;
    }

    let mut path = score_path.as_ref().as_os_str().to_owned();
    path.push(format!(".t{:0width$}", file_number, width = FILE_NUMBER_DIGITS as usize));
    Some(PathBuf::from(path))
}

/// Decode every timeline in a timeline file
pub fn decode_timeline_file<R: Read>(reader: R) -> Result<Vec<Timeline>> {
    let mut reader = RecordReader::new(reader);
    reader.expect_version(SCORE_VERSION)?;

    let mut timelines = Vec::new();
    while let Some(event_count) = reader.read_u32_or_eof("timeline event count")? {
        let mut events = Vec::with_capacity((event_count as usize).min(MAX_PREALLOC));
        for _ in 0..event_count {
            events.push(read_event(&mut reader)?);
        }
        timelines.push(Timeline { events });
    }
    Ok(timelines)
}

fn read_event<R: Read>(reader: &mut RecordReader<R>) -> Result<TimelineEvent> {
    let start = reader.read_u32("event start")?;
    let duration = reader.read_u32("event duration")?;
    let name_id = reader.read_u32("event name id")?;
    let raw_category = reader.read_u8("event category")?;
    let category = Category::from_index(usize::from(raw_category))
        .ok_or_else(|| reader.malformed(format!("unknown event category {}", raw_category)))?;

    Ok(TimelineEvent {
        start,
        duration,
        name_id,
        category,
    })
}

/// Load the timeline of unit `unit_index` belonging to `score_path`
///
/// `Ok(None)` if the timeline file or the slot inside it does not exist.
pub fn load_timeline(score_path: impl AsRef<Path>, unit_index: usize) -> Result<Option<Timeline>> {
    let Some(path) = timeline_file_path(score_path, unit_index) else {
        return Ok(None);
    };

    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("No timeline file at {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(DecodeError::Io(e)),
    };

    let mut timelines = decode_timeline_file(BufReader::new(file))?;
    let slot = unit_index % TIMELINES_PER_FILE;
    if slot < timelines.len() {
        Ok(Some(timelines.swap_remove(slot)))
    } else {
        Ok(None)
    }
}
