use crate::CommitHash;

/// Switches the working tree between revisions while a log is walked.
///
/// The parser only ever talks to this trait: once per commit block with the
/// block's hash, and once after the last block to return to the default
/// reference. Failures are reported back as errors but never abort a read;
/// the parser logs them and keeps scanning whatever is on disk.
///
/// # Examples:
/// ```rust
/// use codestats::{read_log, LogArgs, Repo};
///
/// fn walk_repo() {
/// 	let repo = Repo::new("/custom/repo").with_default_ref("main");
/// 	let args = LogArgs::builder().walk(true).root("/custom/repo").build().unwrap();
/// 	let parsed = read_log("/custom/repo/githist.log", &args, &repo).unwrap();
/// 	if parsed.summary.checkout_failures > 0 {
/// 		println!("metrics may have been scanned against the wrong revision");
/// 	}
/// }
/// ```
pub trait Checkout {
	fn checkout_revision(&self, hash: &CommitHash) -> anyhow::Result<()>;

	fn checkout_default(&self) -> anyhow::Result<()>;
}

impl<T: Checkout + ?Sized> Checkout for &T {
	fn checkout_revision(&self, hash: &CommitHash) -> anyhow::Result<()> {
		(**self).checkout_revision(hash)
	}

	fn checkout_default(&self) -> anyhow::Result<()> {
		(**self).checkout_default()
	}
}
