use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{Error, Result};
use crate::FileMetrics;

/// Lines whose raw byte length exceeds this count as long.
pub const LONG_LINE_LIMIT: usize = 80;

/// Computes [FileMetrics] for the file currently on disk at `path`.
pub fn scan_file<P: AsRef<Path>>(path: P) -> Result<FileMetrics> {
	let path = path.as_ref();
	let file = File::open(path).map_err(|source| Error::Scan {
		path: path.to_path_buf(),
		source,
	})?;
	scan_reader(file).map_err(|source| Error::Scan {
		path: path.to_path_buf(),
		source,
	})
}

pub(crate) fn scan_reader<R: Read>(reader: R) -> std::io::Result<FileMetrics> {
	let mut metrics = FileMetrics::default();

	for line in BufReader::new(reader).split(b'\n') {
		let line = line?;
		let line = line.strip_suffix(b"\r").unwrap_or(&line);
		let trimmed = line.trim_ascii();

		metrics.complexity += (line.len() - trimmed.len()) as u64;
		if line.len() > LONG_LINE_LIMIT {
			metrics.long_lines += 1;
		}
		metrics.number_of_lines += 1;
	}

	Ok(metrics)
}
