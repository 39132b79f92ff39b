//! Check command - Review the changes against the baseline

use std::path::{Path, PathBuf};

use clap::Args;
use revet_core::{
    color_enabled, render, Baseline, Config, DiffCollector, Evaluator, GitRepo, Report,
};

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Extra rules file merged into the registry (same format as .revet.toml)
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// Returns the process exit code: 0 for a clean review (including
    /// the nothing-to-review case), 1 when any Critical or High finding
    /// exists. Fatal errors propagate and exit with 2.
    pub fn execute(&self, verbose: bool, dir: &Path, config: &Config) -> anyhow::Result<i32> {
        let repo = GitRepo::open(dir)?;
        let baseline = Baseline::parse(&config.review.baseline);

        if verbose {
            tracing::info!(
                root = %repo.root().display(),
                baseline = %baseline,
                "Starting review"
            );
        }

        let changeset = match DiffCollector::new(&repo).collect(&baseline) {
            Ok(changeset) => changeset,
            Err(err) if err.is_recoverable() => {
                eprintln!("{}", err);
                return Ok(0);
            }
            Err(err) => return Err(err.into()),
        };

        let mut registry = config.build_registry()?;
        if let Some(path) = &self.rules {
            let extra = Config::load_from_file(path)?;
            registry = registry
                .with_custom_rules(&extra.rules.custom)?
                .without_rules(&extra.rules.disabled);
        }

        if verbose {
            tracing::info!(
                files = changeset.file_count(),
                hunks = changeset.hunk_count(),
                rules = registry.len(),
                "Evaluating"
            );
        }

        let evaluator = Evaluator::new(registry);
        let findings = evaluator.evaluate(&changeset);
        let report = Report::new(findings);

        let format = config.output_format()?;
        let color = !self.no_color && color_enabled(format);
        let text = render(&report, format, color)?;
        if text.ends_with('\n') {
            print!("{}", text);
        } else {
            println!("{}", text);
        }

        if report.has_blocking() {
            Ok(1)
        } else {
            Ok(0)
        }
    }
}
