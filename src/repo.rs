use std::ffi::OsStr;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use anyhow::Context;
use simple_cmd::CommandBuilder;

use crate::traits::Checkout;
use crate::{CommitHash, Repo};

pub const DEFAULT_REF: &str = "master";

impl Repo {
	pub fn new<S: AsRef<OsStr> + ?Sized>(s: &S) -> Self {
		Repo {
			inner: PathBuf::from(s),
			default_ref: DEFAULT_REF.to_string(),
		}
	}

	pub fn with_default_ref(mut self, value: &str) -> Self {
		self.default_ref = value.to_string();
		self
	}

	/// Fails when no `git` executable can be found on `PATH`.
	pub fn ensure_git() -> anyhow::Result<PathBuf> {
		which::which("git").context("git executable not found on PATH")
	}

	fn checkout(&self, reference: &str) -> anyhow::Result<()> {
		let output = self
			.git()
			.args([
				"checkout", "--quiet", reference,
			])
			.build()
			.output()
			.with_context(|| format!("Failed to checkout {reference}"))?;
		anyhow::ensure!(
			output.status.success(),
			"git checkout {reference} exited with {}: {}",
			output.status,
			String::from_utf8_lossy(&output.stderr).trim()
		);
		Ok(())
	}

	fn git(&self) -> CommandBuilder {
		CommandBuilder::new("git").current_dir(&self.inner).with_debug(false)
	}
}

impl Checkout for Repo {
	fn checkout_revision(&self, hash: &CommitHash) -> anyhow::Result<()> {
		self.checkout(hash.into())
	}

	fn checkout_default(&self) -> anyhow::Result<()> {
		self.checkout(&self.default_ref)
	}
}

impl Display for Repo {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} (default ref {})", self.inner.display(), self.default_ref)
	}
}
