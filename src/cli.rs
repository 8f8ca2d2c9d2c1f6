use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use clap::{ArgAction, Parser, ValueEnum};
use codestats::{
	read_from, write_history_csv, write_history_json, write_snapshot_csv, write_snapshot_json, LogArgs, LogOrder, ParsedLog, Repo,
	LOG_DATE_FORMAT,
};
use comfy_table::{Cell, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "codestats")]
#[command(about = "Derive complexity, long-line and change-frequency reports from a git history log")]
#[command(version)]
pub struct Args {
	/// Only track paths starting with one of these prefixes
	pub locations: Vec<String>,

	/// History log, as written by `git log --raw --date=iso --pretty=format:'# %H - %ad - %s'`
	#[arg(long, default_value = "githist.log")]
	pub log: PathBuf,

	/// Working tree to check out and scan
	#[arg(long, default_value = ".")]
	pub repo: PathBuf,

	/// Do not check out commits or scan files; metrics stay at zero
	#[arg(long)]
	pub no_walk: bool,

	/// Reference checked out once the log has been walked
	#[arg(long, default_value = "master")]
	pub default_ref: String,

	/// Block order of the log
	#[arg(long, value_enum, default_value_t = Order::NewestFirst)]
	pub order: Order,

	/// Abort when a commit contradicts the declared order
	#[arg(long)]
	pub strict_order: bool,

	/// Reference time for the file report (YYYY-MM-DD, RFC 3339 or the log's date format)
	#[arg(long)]
	pub at: Option<String>,

	#[arg(long, default_value = "file-report.csv")]
	pub file_report: PathBuf,

	#[arg(long, default_value = "history-report.csv")]
	pub history_report: PathBuf,

	#[arg(long, value_enum, default_value_t = Format::Csv)]
	pub format: Format,

	/// Increase log verbosity (-v, -vv, -vvv)
	#[arg(short, long, action = ArgAction::Count)]
	pub verbose: u8,
}

#[derive(ValueEnum, Clone, Debug, Copy)]
pub enum Order {
	/// `git log` default, most recent commit first
	NewestFirst,
	/// `git log --reverse`
	OldestFirst,
}

#[derive(ValueEnum, Clone, Debug, Copy)]
pub enum Format {
	Csv,
	Json,
}

impl From<Order> for LogOrder {
	fn from(value: Order) -> Self {
		match value {
			Order::NewestFirst => LogOrder::NewestFirst,
			Order::OldestFirst => LogOrder::OldestFirst,
		}
	}
}

impl Args {
	pub fn level(&self) -> tracing::Level {
		match self.verbose {
			0 => tracing::Level::WARN,
			1 => tracing::Level::INFO,
			2 => tracing::Level::DEBUG,
			_ => tracing::Level::TRACE,
		}
	}

	pub fn execute(self) -> Result<()> {
		let walk = !self.no_walk;
		if walk {
			Repo::ensure_git()?;
		}

		let at = match self.at.as_deref() {
			Some(value) => parse_reference_time(value)?,
			None => Utc::now().fixed_offset(),
		};

		let args = LogArgs::builder()
			.locations(self.locations.iter().cloned())
			.walk(walk)
			.root(&self.repo)
			.order(self.order.into())
			.strict_order(self.strict_order)
			.build()?;
		let repo = Repo::new(&self.repo).with_default_ref(&self.default_ref);
		if walk {
			info!("walking {repo}");
		}

		let parsed = read_with_progress(&self.log, &args, &repo)?;
		let histories = &parsed.histories;

		let snapshot = histories.snapshot(&at);
		let history = histories.history_series(Utc::now());

		let file_report = create(&self.file_report)?;
		let history_report = create(&self.history_report)?;
		match self.format {
			Format::Csv => {
				write_snapshot_csv(file_report, &snapshot)?;
				write_history_csv(history_report, &history)?;
			}
			Format::Json => {
				write_snapshot_json(file_report, &snapshot)?;
				write_history_json(history_report, &history)?;
			}
		}
		info!("wrote {} and {}", self.file_report.display(), self.history_report.display());

		print_summary(&parsed, snapshot.len());
		Ok(())
	}
}

fn read_with_progress(log: &Path, args: &LogArgs, repo: &Repo) -> Result<ParsedLog> {
	let file = File::open(log).with_context(|| format!("Failed to open log file {}", log.display()))?;
	let size = file.metadata().map(|m| m.len()).unwrap_or(0);

	let pb = ProgressBar::new(size);
	pb.set_style(
		ProgressStyle::default_bar()
			.template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {percent}%")
			.unwrap_or_else(|_| ProgressStyle::default_bar()),
	);
	pb.set_message("Processing...");

	let parsed = read_from(BufReader::new(pb.wrap_read(file)), args, repo);
	pb.finish_with_message("Processing... done");

	parsed.with_context(|| format!("Failed to read log file {}", log.display()))
}

fn create(path: &Path) -> Result<BufWriter<File>> {
	File::create(path)
		.map(BufWriter::new)
		.with_context(|| format!("Failed to create {}", path.display()))
}

fn parse_reference_time(value: &str) -> Result<DateTime<FixedOffset>> {
	if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
		return Ok(datetime);
	}
	if let Ok(datetime) = DateTime::parse_from_str(value, LOG_DATE_FORMAT) {
		return Ok(datetime);
	}
	NaiveDate::parse_from_str(value, "%Y-%m-%d")
		.ok()
		.and_then(|date| date.and_hms_opt(23, 59, 59))
		.map(|naive| naive.and_utc().fixed_offset())
		.ok_or_else(|| anyhow!("invalid reference time {value:?}"))
}

fn print_summary(parsed: &ParsedLog, reported: usize) {
	let summary = &parsed.summary;

	let mut table = Table::new();
	table.set_header(["Files", "Reported", "Commits", "Entries", "Skipped", "Scanned", "Checkout failures", "Order violations"]);

	let failures = Cell::new(summary.checkout_failures);
	let failures = if summary.checkout_failures > 0 {
		failures.fg(Color::Red)
	} else {
		failures
	};

	table.add_row(vec![
		Cell::new(parsed.histories.num_files()),
		Cell::new(reported),
		Cell::new(summary.blocks),
		Cell::new(summary.entries),
		Cell::new(summary.skipped),
		Cell::new(summary.scanned),
		failures,
		Cell::new(summary.order_violations),
	]);
	println!("{table}");

	if summary.checkout_failures > 0 {
		warn!(
			"{} checkouts failed; some metrics were scanned against the wrong revision",
			summary.checkout_failures
		);
	}
}
