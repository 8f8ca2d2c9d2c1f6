use std::io::Write;

use chrono::{DateTime, Days, Months, TimeZone, Utc};

use crate::error::Result;
use crate::{CommitRecord, FileHistories, FileHistory, HistoryRow, SnapshotRow, Totals};

pub const HISTORY_STEPS: usize = 100;
pub const HISTORY_STEP_DAYS: u64 = 7;

const SNAPSHOT_HEADER: &str = "file, complexity, changeFreqAll, longLines, numberOfLines";
const HISTORY_HEADER: &str = "time, complexity, changeFreqAll, longLines, numberOfLines";
const HISTORY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

// region FileHistory

impl FileHistory {
	/// Histories whose most recent stored entry is a delete drop out of every report.
	pub fn is_reported(&self) -> bool {
		!self.first().operation.is_delete()
	}

	/// The first stored entry dated at or before `at`, with its position.
	pub fn entry_at<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> Option<(usize, &CommitRecord)> {
		self.entries().iter().enumerate().find(|(_, record)| record.date <= *at)
	}

	/// Counts the entries from `index` onward that fall within one calendar
	/// month before the entry at `index`, stopping at the first older one.
	pub fn change_frequency(&self, index: usize) -> u64 {
		let Some(selected) = self.entries().get(index) else {
			return 0;
		};
		let threshold = selected.date.checked_sub_months(Months::new(1));

		self.entries()[index..]
			.iter()
			.take_while(|record| threshold.map_or(true, |threshold| record.date >= threshold))
			.count() as u64
	}

	pub(crate) fn snapshot_at<Tz: TimeZone>(&self, file: &str, at: &DateTime<Tz>) -> Option<SnapshotRow> {
		if !self.is_reported() {
			return None;
		}

		let (index, record) = self.entry_at(at)?;
		Some(SnapshotRow {
			file: file.to_string(),
			complexity: record.metrics.complexity,
			change_frequency: self.change_frequency(index),
			long_lines: record.metrics.long_lines,
			number_of_lines: record.metrics.number_of_lines,
		})
	}
}

// endregion FileHistory

// region FileHistories

impl FileHistories {
	/// One row per reported file, as of `at`, sorted by path.
	pub fn snapshot<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> Vec<SnapshotRow> {
		self.iter()
			.filter_map(|(file, history)| history.snapshot_at(file, at))
			.collect()
	}

	pub fn totals_at<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> Totals {
		self.iter()
			.filter_map(|(file, history)| history.snapshot_at(file, at))
			.fold(Totals::default(), |acc, row| acc + Totals::from(&row))
	}

	/// Totals sampled every [HISTORY_STEP_DAYS] days going back from `now`;
	/// the first row is one step before `now`.
	pub fn history_series(&self, now: DateTime<Utc>) -> Vec<HistoryRow> {
		let mut rows = Vec::with_capacity(HISTORY_STEPS);
		let mut time = now;

		for _ in 0..HISTORY_STEPS {
			time = time.checked_sub_days(Days::new(HISTORY_STEP_DAYS)).unwrap_or(DateTime::<Utc>::MIN_UTC);
			rows.push(HistoryRow {
				time,
				totals: self.totals_at(&time),
			});
		}

		rows
	}

	pub fn write_snapshot<W: Write, Tz: TimeZone>(&self, writer: W, at: &DateTime<Tz>) -> Result<()> {
		write_snapshot_csv(writer, &self.snapshot(at))
	}

	pub fn write_history<W: Write>(&self, writer: W) -> Result<()> {
		write_history_csv(writer, &self.history_series(Utc::now()))
	}
}

// endregion FileHistories

pub fn write_snapshot_csv<W: Write>(mut writer: W, rows: &[SnapshotRow]) -> Result<()> {
	writeln!(writer, "{SNAPSHOT_HEADER}")?;
	for row in rows {
		writeln!(
			writer,
			"{},{},{},{},{}",
			row.file, row.complexity, row.change_frequency, row.long_lines, row.number_of_lines
		)?;
	}
	writer.flush()?;
	Ok(())
}

pub fn write_history_csv<W: Write>(mut writer: W, rows: &[HistoryRow]) -> Result<()> {
	writeln!(writer, "{HISTORY_HEADER}")?;
	for row in rows {
		writeln!(
			writer,
			"{},{},{},{},{}",
			row.time.format(HISTORY_TIME_FORMAT),
			row.totals.complexity,
			row.totals.change_frequency,
			row.totals.long_lines,
			row.totals.number_of_lines
		)?;
	}
	writer.flush()?;
	Ok(())
}

pub fn write_snapshot_json<W: Write>(mut writer: W, rows: &[SnapshotRow]) -> Result<()> {
	serde_json::to_writer_pretty(&mut writer, rows)?;
	writeln!(writer)?;
	writer.flush()?;
	Ok(())
}

pub fn write_history_json<W: Write>(mut writer: W, rows: &[HistoryRow]) -> Result<()> {
	serde_json::to_writer_pretty(&mut writer, rows)?;
	writeln!(writer)?;
	writer.flush()?;
	Ok(())
}
