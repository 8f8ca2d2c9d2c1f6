use std::fs::File;
use std::io::{BufRead, BufReader, Split};
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::scanner::scan_file;
use crate::traits::Checkout;
use crate::{CommitHash, CommitRecord, FileHistories, LogArgs, LogOrder, Operation, ParsedLog, ReadSummary, LOG_DATE_FORMAT};

const HEADER_MARKER: &str = "# ";
const HEADER_DELIMITER: &str = " - ";

lazy_static! {
	static ref CHANGE_LINE_RE: Regex = Regex::new(
		"^:(?<old_mode>[^ \\t]+) +(?<new_mode>[^ \\t]+) +(?<old_hash>[^ \\t]+) +(?<new_hash>[^ \\t]+) +(?<status>[A-Z][0-9]*)\\t(?<path>[^\\t]+)(?:\\t(?<dest>[^\\t]+))?$"
	)
	.unwrap();
	static ref LOG_DATE_RE: Regex = Regex::new("^\\d{4}-\\d{2}-\\d{2} \\d{2}:\\d{2}:\\d{2} [+-]\\d{4}$").unwrap();
}

/// Opens `path` and parses it with [read_from].
pub fn read_log<P: AsRef<Path>, C: Checkout>(path: P, args: &LogArgs, checkout: C) -> Result<ParsedLog> {
	let path = path.as_ref();
	let file = File::open(path).map_err(|source| Error::OpenLog {
		path: path.to_path_buf(),
		source,
	})?;
	read_from(BufReader::new(file), args, checkout)
}

/// Parses a history log into per-file histories.
///
/// In walk mode every commit block is checked out through `checkout` before its
/// file-change lines are read, and every non-delete entry is scanned from
/// `args.root()`. The returned histories are always newest first.
pub fn read_from<R: BufRead, C: Checkout>(reader: R, args: &LogArgs, checkout: C) -> Result<ParsedLog> {
	let mut log_reader = LogReader {
		args,
		checkout,
		lines: LineSource::new(reader),
		histories: FileHistories::new(),
		summary: ReadSummary::default(),
	};
	log_reader.read()?;

	let LogReader {
		mut histories,
		summary,
		..
	} = log_reader;

	if args.order() == LogOrder::OldestFirst {
		histories.reverse_all();
	}

	info!(files = histories.num_files(), "{}", summary);
	Ok(ParsedLog { histories, summary })
}

/// How a commit block ended.
#[derive(Debug)]
enum BlockEnd {
	/// A blank line closed the block.
	Complete,
	/// The next header line closed the block and still has to be handled.
	NextHeader(String),
	/// The log ran out.
	Exhausted,
}

struct LineSource<R> {
	inner: Split<R>,
	line: usize,
}

impl<R: BufRead> LineSource<R> {
	fn new(reader: R) -> Self {
		LineSource {
			inner: reader.split(b'\n'),
			line: 0,
		}
	}

	fn next_line(&mut self) -> Result<Option<String>> {
		match self.inner.next() {
			None => Ok(None),
			Some(Ok(bytes)) => {
				self.line += 1;
				let bytes = bytes.strip_suffix(b"\r").unwrap_or(&bytes[..]);
				Ok(Some(String::from_utf8_lossy(bytes).into_owned()))
			}
			Some(Err(source)) => Err(Error::ReadLog {
				line: self.line + 1,
				source,
			}),
		}
	}
}

struct Header {
	hash: CommitHash,
	date: DateTime<FixedOffset>,
}

struct LogReader<'a, R, C> {
	args: &'a LogArgs,
	checkout: C,
	lines: LineSource<R>,
	histories: FileHistories,
	summary: ReadSummary,
}

impl<R: BufRead, C: Checkout> LogReader<'_, R, C> {
	fn read(&mut self) -> Result<()> {
		let mut pending: Option<String> = None;

		loop {
			let line = match pending.take() {
				Some(line) => line,
				None => match self.lines.next_line()? {
					Some(line) => line,
					None => break,
				},
			};

			let Some(header) = line.strip_prefix(HEADER_MARKER) else {
				continue;
			};

			match self.read_block(header)? {
				BlockEnd::Complete => {}
				BlockEnd::NextHeader(next) => pending = Some(next),
				BlockEnd::Exhausted => break,
			}
		}

		if self.args.walk() {
			if let Err(err) = self.checkout.checkout_default() {
				warn!("failed to restore default checkout: {err:#}");
				self.summary.checkout_failures += 1;
			}
		}

		Ok(())
	}

	fn read_block(&mut self, header: &str) -> Result<BlockEnd> {
		let header = self.parse_header(header)?;
		self.summary.blocks += 1;
		debug!(line = self.lines.line, "commit {} at {}", header.hash, header.date);

		if self.args.walk() {
			if let Err(err) = self.checkout.checkout_revision(&header.hash) {
				warn!("failed to checkout {}, scanning current working tree: {err:#}", header.hash);
				self.summary.checkout_failures += 1;
			}
		}

		loop {
			let Some(line) = self.lines.next_line()? else {
				return Ok(BlockEnd::Exhausted);
			};

			if line.starts_with(HEADER_MARKER) {
				return Ok(BlockEnd::NextHeader(line));
			}

			if line.is_empty() {
				return Ok(BlockEnd::Complete);
			}

			self.read_change(&header, &line)?;
		}
	}

	fn parse_header(&self, header: &str) -> Result<Header> {
		let line = self.lines.line;
		let fields = header.splitn(3, HEADER_DELIMITER).collect::<Vec<_>>();
		let [hash, date, _subject] = fields[..] else {
			return Err(Error::Header {
				line,
				content: format!("{HEADER_MARKER}{header}"),
			});
		};

		if !LOG_DATE_RE.is_match(date) {
			return Err(Error::DateFormat {
				line,
				value: date.to_string(),
			});
		}

		let date = DateTime::parse_from_str(date, LOG_DATE_FORMAT).map_err(|source| Error::Timestamp {
			line,
			value: date.to_string(),
			source,
		})?;

		Ok(Header {
			hash: CommitHash::from(hash),
			date,
		})
	}

	fn read_change(&mut self, header: &Header, line: &str) -> Result<()> {
		let line_no = self.lines.line;
		let malformed = || Error::ChangeLine {
			line: line_no,
			content: line.to_string(),
		};

		let find = CHANGE_LINE_RE.captures(line).ok_or_else(malformed)?;
		let operation = find
			.name("status")
			.and_then(|status| Operation::from_status(status.as_str()))
			.ok_or_else(malformed)?;
		let path = find
			.name("dest")
			.filter(|_| matches!(operation, Operation::Renamed | Operation::Copied))
			.or_else(|| find.name("path"))
			.ok_or_else(malformed)?
			.as_str();

		if !self.args.in_location(path) {
			trace!(line = line_no, "skipping {path}");
			self.summary.skipped += 1;
			return Ok(());
		}

		if let Some(previous) = self.histories.get(path).map(|history| history.last()) {
			if self.args.order().is_violated_by(&previous.date, &header.date) {
				if self.args.strict_order() {
					return Err(Error::Ordering {
						line: line_no,
						path: path.to_string(),
						hash: header.hash.to_string(),
					});
				}
				warn!(
					line = line_no,
					"commit {} ({}) breaks {} order for {path} after {} ({})",
					header.hash,
					header.date,
					self.args.order(),
					previous.hash,
					previous.date
				);
				self.summary.order_violations += 1;
			}
		}

		let record = self.histories.push(
			path,
			CommitRecord::new(header.hash.clone(), header.date, operation),
		);
		self.summary.entries += 1;
		trace!(line = line_no, "{operation} {path}");

		if self.args.walk() && !operation.is_delete() {
			record.metrics = scan_file(self.args.root().join(path))?;
			self.summary.scanned += 1;
		}

		Ok(())
	}
}
