use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{QuoteMetrics, Symbol};

/// Wire format of `last_updated`, rendered in the snapshot's timezone.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Immutable, fully populated result of one refresh cycle.
///
/// Built privately by the refresher and never mutated after publish;
/// readers share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    entries: BTreeMap<Symbol, QuoteMetrics>,
    last_updated: DateTime<Tz>,
}

impl Snapshot {
    pub fn new(entries: BTreeMap<Symbol, QuoteMetrics>, last_updated: DateTime<Tz>) -> Self {
        Self {
            entries,
            last_updated,
        }
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&QuoteMetrics> {
        self.entries.get(symbol)
    }

    pub fn entries(&self) -> &BTreeMap<Symbol, QuoteMetrics> {
        &self.entries
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_updated(&self) -> &DateTime<Tz> {
        &self.last_updated
    }

    pub fn last_updated_display(&self) -> String {
        format_timestamp(&self.last_updated)
    }

    pub fn to_view(&self) -> SnapshotView {
        SnapshotView {
            data: self
                .entries
                .iter()
                .map(|(k, v)| (k.as_str().to_string(), *v))
                .collect(),
            last_updated: Some(self.last_updated_display()),
        }
    }

    /// Rebuilds a snapshot from its wire form, interpreting `last_updated`
    /// in `tz`. Sub-second precision is not carried on the wire.
    pub fn from_view(view: SnapshotView, tz: Tz) -> Result<Self, ViewError> {
        let raw = view.last_updated.ok_or(ViewError::MissingTimestamp)?;
        let last_updated = parse_timestamp(&raw, tz)?;

        let entries = view
            .data
            .into_iter()
            .map(|(k, v)| (Symbol::from(k), v))
            .collect();

        Ok(Self::new(entries, last_updated))
    }
}

/// JSON body of `GET /get_stock_data`.
///
/// `last_updated` is `null` until the first publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotView {
    pub data: BTreeMap<String, QuoteMetrics>,
    pub last_updated: Option<String>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ViewError {
    #[error("last_updated missing")]
    MissingTimestamp,

    #[error("unparseable last_updated '{0}'")]
    BadTimestamp(String),
}

pub fn format_timestamp(ts: &DateTime<Tz>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(raw: &str, tz: Tz) -> Result<DateTime<Tz>, ViewError> {
    let naive = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|_| ViewError::BadTimestamp(raw.to_string()))?;

    // earliest(): a DST fold has two candidates, pick the first
    tz.from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| ViewError::BadTimestamp(raw.to_string()))
}
