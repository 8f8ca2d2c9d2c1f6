use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
	#[error("failed to open log file {path:?}: {source}")]
	OpenLog {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to read log at line {line}: {source}")]
	ReadLog {
		line: usize,
		#[source]
		source: std::io::Error,
	},
	#[error("malformed commit header at line {line}: {content:?}")]
	Header { line: usize, content: String },
	#[error("commit date {value:?} at line {line} is not YYYY-MM-DD HH:MM:SS ±HHMM")]
	DateFormat { line: usize, value: String },
	#[error("invalid commit date {value:?} at line {line}: {source}")]
	Timestamp {
		line: usize,
		value: String,
		#[source]
		source: chrono::ParseError,
	},
	#[error("malformed file-change line at line {line}: {content:?}")]
	ChangeLine { line: usize, content: String },
	#[error("commit {hash} at line {line} is out of order for {path}")]
	Ordering { line: usize, path: String, hash: String },
	#[error("failed to scan source file {path:?}: {source}")]
	Scan {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to write report: {0}")]
	Write(#[from] std::io::Error),
	#[error("failed to serialize report: {0}")]
	Serde(#[from] serde_json::Error),
}
