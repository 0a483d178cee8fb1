//! Synthetic score and timeline files for unit tests

use crate::category::{Category, DISPLAY_COUNT, GATHER_COUNT};
use crate::codec::SCORE_VERSION;

pub(crate) fn put_string(out: &mut Vec<u8>, s: &str) {
    let mut size = s.len();
    loop {
        let byte = (size & 0x7F) as u8;
        size >>= 7;
        if size == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
    out.extend_from_slice(s.as_bytes());
}

pub(crate) struct ScoreFileBuilder {
    version: u32,
    units: Vec<(String, [u32; DISPLAY_COUNT])>,
    aggregates: Vec<Vec<(String, u64, u32, u32, u32)>>,
}

impl ScoreFileBuilder {
    pub(crate) fn new() -> Self {
        Self {
            version: SCORE_VERSION,
            units: Vec::new(),
            aggregates: vec![Vec::new(); GATHER_COUNT],
        }
    }

    pub(crate) fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub(crate) fn unit(mut self, name: &str, values: [u32; DISPLAY_COUNT]) -> Self {
        self.units.push((name.to_string(), values));
        self
    }

    pub(crate) fn aggregate(
        mut self,
        category: Category,
        name: &str,
        accumulated: u64,
        min: u32,
        max: u32,
        count: u32,
    ) -> Self {
        self.aggregates[category.index()].push((name.to_string(), accumulated, min, max, count));
        self
    }

    /// Include aggregates with the given maxima, named `h<i>.h`
    pub(crate) fn include_maxima(mut self, maxima: &[u32]) -> Self {
        for (i, &max) in maxima.iter().enumerate() {
            self = self.aggregate(Category::Include, &format!("h{}.h", i), u64::from(max), max, max, 1);
        }
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&(self.units.len() as u32).to_le_bytes());
        for (name, values) in &self.units {
            put_string(&mut out, name);
            for value in values {
                out.extend_from_slice(&value.to_le_bytes());
            }
        }
        for entries in &self.aggregates {
            out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
            for (name, accumulated, min, max, count) in entries {
                put_string(&mut out, name);
                out.extend_from_slice(&accumulated.to_le_bytes());
                out.extend_from_slice(&min.to_le_bytes());
                out.extend_from_slice(&max.to_le_bytes());
                out.extend_from_slice(&count.to_le_bytes());
            }
        }
        out
    }
}

/// Timeline file bytes: version header then `(start, duration, name_id, category)` lists
pub(crate) fn timeline_file(timelines: &[Vec<(u32, u32, u32, u8)>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&SCORE_VERSION.to_le_bytes());
    for events in timelines {
        out.extend_from_slice(&(events.len() as u32).to_le_bytes());
        for (start, duration, name_id, category) in events {
            out.extend_from_slice(&start.to_le_bytes());
            out.extend_from_slice(&duration.to_le_bytes());
            out.extend_from_slice(&name_id.to_le_bytes());
            out.push(*category);
        }
    }
    out
}
