use std::{
    fs,
    path::Path,
    sync::atomic::{AtomicU64, Ordering},
};

use anyhow::Context as _;
use serde::Deserialize;

static NEXT_TIMELINE_ID: AtomicU64 = AtomicU64::new(1);

/// One captured item in a replay index: the source URL plus the instant it
/// was archived. `timestamp_raw` keeps the spelling found in the index file
/// (archive exports use 14-digit strings); `timestamp` is the parsed,
/// comparable form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub url: String,
    pub timestamp: u64,
    pub timestamp_raw: String,
}

impl Capture {
    pub fn new(url: impl Into<String>, timestamp: u64) -> Self {
        Self {
            url: url.into(),
            timestamp,
            timestamp_raw: timestamp.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    OutOfOrder { index: usize },
    InvalidTimestamp { index: usize, value: String },
}

impl std::fmt::Display for TimelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfOrder { index } => {
                write!(f, "capture at index {index} is older than its predecessor")
            }
            Self::InvalidTimestamp { index, value } => {
                write!(f, "capture at index {index} has unparseable timestamp `{value}`")
            }
        }
    }
}

impl std::error::Error for TimelineError {}

/// An immutable capture sequence sorted non-decreasing by timestamp.
///
/// Duplicate timestamps are allowed (multi-frame captures within the same
/// second). Producing and maintaining the ordering is the index writer's
/// job; construction only verifies it. Each timeline carries a unique
/// identity so cached lookup results can be tied to the exact sequence they
/// were computed against.
#[derive(Debug)]
pub struct Timeline {
    id: u64,
    captures: Vec<Capture>,
}

impl Timeline {
    pub fn new(captures: Vec<Capture>) -> Result<Self, TimelineError> {
        for (index, pair) in captures.windows(2).enumerate() {
            if pair[1].timestamp < pair[0].timestamp {
                return Err(TimelineError::OutOfOrder { index: index + 1 });
            }
        }
        Ok(Self {
            id: NEXT_TIMELINE_ID.fetch_add(1, Ordering::Relaxed),
            captures,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("read capture index {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("load capture index {}", path.display()))
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let records: Vec<CaptureRecord> =
            serde_json::from_str(json).context("parse capture index JSON")?;

        let mut captures = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            captures.push(record.into_capture(index)?);
        }

        Ok(Self::new(captures)?)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn len(&self) -> usize {
        self.captures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }

    pub fn get(&self, index: usize) -> Option<&Capture> {
        self.captures.get(index)
    }
}

#[derive(Debug, Deserialize)]
struct CaptureRecord {
    url: String,
    timestamp: RawTimestamp,
}

// Index files spell timestamps either as JSON numbers or as the original
// digit strings; accept both.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Number(u64),
    Text(String),
}

impl CaptureRecord {
    fn into_capture(self, index: usize) -> Result<Capture, TimelineError> {
        let (timestamp, timestamp_raw) = match self.timestamp {
            RawTimestamp::Number(value) => (value, value.to_string()),
            RawTimestamp::Text(text) => {
                let parsed = text.trim().parse::<u64>().map_err(|_| {
                    TimelineError::InvalidTimestamp {
                        index,
                        value: text.clone(),
                    }
                })?;
                (parsed, text)
            }
        };

        Ok(Capture {
            url: self.url,
            timestamp,
            timestamp_raw,
        })
    }
}
