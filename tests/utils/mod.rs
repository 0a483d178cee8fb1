// Score file writer for integration tests
//
// Produces byte-exact files in the extractor's format so tests can exercise
// the reader end to end.

#![allow(dead_code)]

use compile_score::category::{Category, DISPLAY_COUNT, GATHER_COUNT};
use compile_score::codec::SCORE_VERSION;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Aggregate {
    pub name: String,
    pub accumulated: u64,
    pub min: u32,
    pub max: u32,
    pub count: u32,
}

#[derive(Debug, Clone)]
pub struct ScoreFile {
    pub version: u32,
    pub units: Vec<(String, [u32; DISPLAY_COUNT])>,
    pub aggregates: Vec<Vec<Aggregate>>,
}

impl Default for ScoreFile {
    fn default() -> Self {
        Self {
            version: SCORE_VERSION,
            units: Vec::new(),
            aggregates: vec![Vec::new(); GATHER_COUNT],
        }
    }
}

fn put_string(out: &mut Vec<u8>, s: &str) {
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

impl ScoreFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_unit(mut self, name: &str, values: [u32; DISPLAY_COUNT]) -> Self {
        self.units.push((name.to_string(), values));
        self
    }

    pub fn with_aggregate(
        mut self,
        category: Category,
        name: &str,
        accumulated: u64,
        min: u32,
        max: u32,
        count: u32,
    ) -> Self {
        self.aggregates[category.index()].push(Aggregate {
            name: name.to_string(),
            accumulated,
            min,
            max,
            count,
        });
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
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
            for entry in entries {
                put_string(&mut out, &entry.name);
                out.extend_from_slice(&entry.accumulated.to_le_bytes());
                out.extend_from_slice(&entry.min.to_le_bytes());
                out.extend_from_slice(&entry.max.to_le_bytes());
                out.extend_from_slice(&entry.count.to_le_bytes());
            }
        }
        out
    }

    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.to_bytes()).expect("write score file");
        path
    }
}

/// A file with one unit and a spread of include costs
pub fn sample_score_file() -> ScoreFile {
    let mut values = [0u32; DISPLAY_COUNT];
    values[Category::Include.index()] = 42_000;
    values[Category::FrontEnd.index()] = 80_000;
    values[Category::ExecuteCompiler.index()] = 120_000;

    let mut file = ScoreFile::new().with_unit("src/main.cpp", values);
    for i in 1..=10u32 {
        file = file.with_aggregate(
            Category::Include,
            &format!("include/header{}.h", i),
            u64::from(i) * 3_000,
            i * 500,
            i * 1_000,
            3,
        );
    }
    file.with_aggregate(Category::ParseClass, "std::vector<int>", 900, 100, 400, 3)
}

/// Timeline file bytes: version header then `(start, duration, name_id, category)` lists
pub fn timeline_bytes(timelines: &[Vec<(u32, u32, u32, u8)>]) -> Vec<u8> {
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
