use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

mod error;
mod impls;
mod parser;
mod repo;
mod report;
mod scanner;
mod traits;

pub use error::{Error, Result};
pub use parser::{read_from, read_log};
pub use report::{write_history_csv, write_history_json, write_snapshot_csv, write_snapshot_json, HISTORY_STEPS, HISTORY_STEP_DAYS};
pub use scanner::scan_file;
pub use traits::Checkout;

/// Timestamp layout of commit header lines, e.g. `2024-01-15 10:00:00 +0100`.
pub const LOG_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

#[derive(Debug, Clone)]
pub struct Repo {
	inner: PathBuf,
	default_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitHash(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
	Added,
	Copied,
	Deleted,
	Modified,
	Renamed,
	TypeChanged,
	Unmerged,
	Unknown,
	Other(char),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FileMetrics {
	pub complexity: u64,
	pub long_lines: u64,
	pub number_of_lines: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
	pub hash: CommitHash,
	pub date: DateTime<FixedOffset>,
	pub operation: Operation,
	pub metrics: FileMetrics,
}

/// Every commit that touched one path, newest first once parsing completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileHistory(pub(crate) Vec<CommitRecord>);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileHistories(pub(crate) BTreeMap<String, FileHistory>);

/// Block order of the log as produced by `git log` (default) or `git log --reverse`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogOrder {
	#[default]
	NewestFirst,
	OldestFirst,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogArgs {
	locations: Vec<String>,
	walk: bool,
	root: PathBuf,
	order: LogOrder,
	strict_order: bool,
}

pub struct LogArgsBuilder(LogArgs);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadSummary {
	pub blocks: usize,
	pub entries: usize,
	pub skipped: usize,
	pub scanned: usize,
	pub checkout_failures: usize,
	pub order_violations: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLog {
	pub histories: FileHistories,
	pub summary: ReadSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotRow {
	pub file: String,
	pub complexity: u64,
	pub change_frequency: u64,
	pub long_lines: u64,
	pub number_of_lines: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
	pub complexity: u64,
	pub change_frequency: u64,
	pub long_lines: u64,
	pub number_of_lines: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRow {
	pub time: DateTime<Utc>,
	#[serde(flatten)]
	pub totals: Totals,
}
