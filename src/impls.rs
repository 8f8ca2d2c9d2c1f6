use std::collections::btree_map;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use anyhow::anyhow;
use chrono::{DateTime, FixedOffset};

use crate::{
	CommitHash, CommitRecord, FileHistories, FileHistory, FileMetrics, LogArgs, LogArgsBuilder, LogOrder, Operation, ReadSummary,
	SnapshotRow, Totals,
};

// region CommitHash

impl Display for CommitHash {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<&str> for CommitHash {
	fn from(value: &str) -> Self {
		CommitHash(value.to_string())
	}
}

impl<'a> From<&'a CommitHash> for &'a str {
	fn from(value: &'a CommitHash) -> Self {
		&value.0
	}
}

// endregion CommitHash

// region Operation

impl Operation {
	/// Decodes a raw-diff status token such as `M`, `D` or `R100`.
	pub fn from_status(status: &str) -> Option<Self> {
		let mut chars = status.chars();
		let code = chars.next()?;
		if !chars.all(|c| c.is_ascii_digit()) {
			return None;
		}
		Some(match code {
			'A' => Operation::Added,
			'C' => Operation::Copied,
			'D' => Operation::Deleted,
			'M' => Operation::Modified,
			'R' => Operation::Renamed,
			'T' => Operation::TypeChanged,
			'U' => Operation::Unmerged,
			'X' => Operation::Unknown,
			other => Operation::Other(other),
		})
	}

	pub fn is_delete(&self) -> bool {
		matches!(self, Operation::Deleted)
	}

	pub fn code(&self) -> char {
		match self {
			Operation::Added => 'A',
			Operation::Copied => 'C',
			Operation::Deleted => 'D',
			Operation::Modified => 'M',
			Operation::Renamed => 'R',
			Operation::TypeChanged => 'T',
			Operation::Unmerged => 'U',
			Operation::Unknown => 'X',
			Operation::Other(code) => *code,
		}
	}
}

impl Display for Operation {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.code())
	}
}

// endregion Operation

// region FileMetrics

impl Display for FileMetrics {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"complexity: {}, long lines: {}, lines: {}",
			self.complexity, self.long_lines, self.number_of_lines
		)
	}
}

// endregion FileMetrics

// region CommitRecord

impl CommitRecord {
	pub fn new(hash: CommitHash, date: DateTime<FixedOffset>, operation: Operation) -> Self {
		CommitRecord {
			hash,
			date,
			operation,
			metrics: FileMetrics::default(),
		}
	}

	pub fn with_metrics(mut self, metrics: FileMetrics) -> Self {
		self.metrics = metrics;
		self
	}
}

impl Display for CommitRecord {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} {} {}, {}", self.hash, self.date, self.operation, self.metrics)
	}
}

// endregion CommitRecord

// region FileHistory

impl FileHistory {
	pub(crate) fn new(first: CommitRecord) -> Self {
		FileHistory(vec![first])
	}

	pub fn entries(&self) -> &[CommitRecord] {
		&self.0
	}

	pub fn first(&self) -> &CommitRecord {
		&self.0[0]
	}

	pub fn last(&self) -> &CommitRecord {
		&self.0[self.0.len() - 1]
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub(crate) fn push(&mut self, record: CommitRecord) -> &mut CommitRecord {
		self.0.push(record);
		let last = self.0.len() - 1;
		&mut self.0[last]
	}

	pub(crate) fn reverse(&mut self) {
		self.0.reverse();
	}
}

// endregion FileHistory

// region FileHistories

impl FileHistories {
	pub fn new() -> Self {
		FileHistories::default()
	}

	pub fn num_files(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn get(&self, path: &str) -> Option<&FileHistory> {
		self.0.get(path)
	}

	pub fn iter(&self) -> btree_map::Iter<'_, String, FileHistory> {
		self.0.iter()
	}

	/// Appends `record` to the history of `path` and hands back the stored record.
	pub(crate) fn push(&mut self, path: &str, record: CommitRecord) -> &mut CommitRecord {
		match self.0.entry(path.to_string()) {
			btree_map::Entry::Occupied(entry) => entry.into_mut().push(record),
			btree_map::Entry::Vacant(entry) => &mut entry.insert(FileHistory::new(record)).0[0],
		}
	}

	pub(crate) fn reverse_all(&mut self) {
		self.0.values_mut().for_each(FileHistory::reverse);
	}
}

impl<'a> IntoIterator for &'a FileHistories {
	type Item = (&'a String, &'a FileHistory);
	type IntoIter = btree_map::Iter<'a, String, FileHistory>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

// endregion FileHistories

// region LogArgs

impl LogArgsBuilder {
	pub fn locations<I, S>(mut self, values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.0.locations = values.into_iter().map(Into::into).collect();
		self
	}

	pub fn walk(mut self, value: bool) -> Self {
		self.0.walk = value;
		self
	}

	pub fn root<P: Into<PathBuf>>(mut self, value: P) -> Self {
		self.0.root = value.into();
		self
	}

	pub fn order(mut self, value: LogOrder) -> Self {
		self.0.order = value;
		self
	}

	pub fn strict_order(mut self, value: bool) -> Self {
		self.0.strict_order = value;
		self
	}

	pub fn build(self) -> anyhow::Result<LogArgs> {
		self.0.validate()?;
		Ok(self.0)
	}
}

impl LogArgs {
	pub fn builder() -> LogArgsBuilder {
		LogArgsBuilder(Default::default())
	}

	pub fn walk(&self) -> bool {
		self.walk
	}

	pub fn root(&self) -> &std::path::Path {
		&self.root
	}

	pub fn order(&self) -> LogOrder {
		self.order
	}

	pub fn strict_order(&self) -> bool {
		self.strict_order
	}

	pub fn locations(&self) -> &[String] {
		&self.locations
	}

	/// Plain string prefix match; every path is tracked when no location is set.
	pub fn in_location(&self, path: &str) -> bool {
		self.locations.is_empty() || self.locations.iter().any(|loc| path.starts_with(loc.as_str()))
	}

	pub(crate) fn validate(&self) -> anyhow::Result<()> {
		if self.locations.iter().any(|loc| loc.is_empty()) {
			return Err(anyhow!("location prefixes cannot be empty"));
		}

		if self.root.as_os_str().is_empty() {
			return Err(anyhow!("working tree root cannot be empty"));
		}

		Ok(())
	}
}

impl Default for LogArgs {
	fn default() -> Self {
		LogArgs {
			locations: vec![],
			walk: false,
			root: PathBuf::from("."),
			order: LogOrder::default(),
			strict_order: false,
		}
	}
}

// endregion LogArgs

// region LogOrder

impl LogOrder {
	/// True when `next`, read after `previous` for the same path, contradicts this order.
	pub fn is_violated_by(&self, previous: &DateTime<FixedOffset>, next: &DateTime<FixedOffset>) -> bool {
		match self {
			LogOrder::NewestFirst => next > previous,
			LogOrder::OldestFirst => next < previous,
		}
	}
}

impl Display for LogOrder {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			LogOrder::NewestFirst => write!(f, "newest-first"),
			LogOrder::OldestFirst => write!(f, "oldest-first"),
		}
	}
}

// endregion LogOrder

// region ReadSummary

impl Display for ReadSummary {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"blocks: {}, entries: {}, skipped: {}, scanned: {}, checkout failures: {}, order violations: {}",
			self.blocks, self.entries, self.skipped, self.scanned, self.checkout_failures, self.order_violations
		)
	}
}

// endregion ReadSummary

// region Totals

impl std::ops::Add for Totals {
	type Output = Totals;

	fn add(self, rhs: Self) -> Self::Output {
		Totals {
			complexity: self.complexity.saturating_add(rhs.complexity),
			change_frequency: self.change_frequency.saturating_add(rhs.change_frequency),
			long_lines: self.long_lines.saturating_add(rhs.long_lines),
			number_of_lines: self.number_of_lines.saturating_add(rhs.number_of_lines),
		}
	}
}

impl std::ops::AddAssign for Totals {
	fn add_assign(&mut self, rhs: Self) {
		*self = *self + rhs;
	}
}

impl From<&SnapshotRow> for Totals {
	fn from(value: &SnapshotRow) -> Self {
		Totals {
			complexity: value.complexity,
			change_frequency: value.change_frequency,
			long_lines: value.long_lines,
			number_of_lines: value.number_of_lines,
		}
	}
}

impl Display for Totals {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"complexity: {}, change frequency: {}, long lines: {}, lines: {}",
			self.complexity, self.change_frequency, self.long_lines, self.number_of_lines
		)
	}
}

// endregion Totals
