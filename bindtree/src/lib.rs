//! bindtree — manifest-driven binding generation and module tree synthesis.
//!
//! Reads a TOML manifest of native headers, drives an external
//! header-to-binding translator for each entry, and assembles the generated
//! files into a `mod.rs` hierarchy mirroring their directory structure.
//! Generation is incremental: a file that already exists is never touched,
//! and a module file is only rewritten when something beneath it changed.
//!
//! # Quick start
//!
//! ```no_run
//! use std::path::Path;
//!
//! let options = bindtree::Options::new("src/bindings");
//! let report = bindtree::build(Path::new("bindings.toml"), &options).unwrap();
//! println!("generated {}, skipped {}", report.generated(), report.skipped());
//! ```
//!
//! One run owns the output prefix: existence checks and writes are not
//! synchronized against other processes, and a hung translator blocks the
//! run indefinitely.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

pub mod clean;
pub mod config;
pub mod error;
pub mod generate;
pub mod modtree;
pub mod rewrite;

pub use clean::Deletion;
pub use config::{Binding, Manifest, Options, Platform};
pub use error::Error;
pub use generate::Outcome;

/// Summary of one `build` run.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Per-binding outcome, keyed by binding path.
    pub outcomes: BTreeMap<String, Outcome>,
    /// Module files written this run.
    pub module_files: Vec<PathBuf>,
    /// Collected generation failures; the run continues past each one.
    pub failures: Vec<Error>,
}

impl BuildReport {
    pub fn generated(&self) -> usize {
        self.count(Outcome::Generated)
    }

    pub fn skipped(&self) -> usize {
        self.count(Outcome::SkippedAlreadyExists)
    }

    fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.values().filter(|o| **o == outcome).count()
    }
}

/// Run the full `build` pipeline: load the manifest, generate builtins and
/// every missing binding, then (re)write the module files whose subtrees
/// changed.
///
/// Translator failures do not abort the run; they are collected in the
/// returned [`BuildReport`] so one bad header cannot mask the rest of the
/// manifest.
pub fn build(manifest_path: &Path, options: &Options) -> Result<BuildReport, Error> {
    let manifest = config::load_manifest(manifest_path)?;
    build_manifest(&manifest, options)
}

/// Like [`build`], for an already-loaded manifest.
pub fn build_manifest(manifest: &Manifest, options: &Options) -> Result<BuildReport, Error> {
    let includes = generate::resolve_includes(manifest, options);
    info!(
        bindings = manifest.bindings.len(),
        includes = includes.len(),
        prefix = %options.prefix.display(),
        "loaded manifest"
    );

    let mut report = BuildReport::default();

    if let Err(e) = generate::generate_builtins(options) {
        warn!(err = %e, "builtins generation failed");
        report.failures.push(e);
    }

    for binding in &manifest.bindings {
        match generate::generate_binding(binding, &includes, options) {
            Ok(outcome) => {
                report.outcomes.insert(binding.path.clone(), outcome);
            }
            Err(e) => {
                warn!(path = %binding.path, err = %e, "binding generation failed");
                report.outcomes.insert(binding.path.clone(), Outcome::Failed);
                report.failures.push(e);
            }
        }
    }

    let tree = modtree::gather_modules(manifest.bindings.iter().map(|b| b.path.as_str()));
    report.module_files = modtree::emit_module_files(&tree, &report.outcomes, &options.prefix)?;

    info!(
        generated = report.generated(),
        skipped = report.skipped(),
        failed = report.failures.len(),
        module_files = report.module_files.len(),
        "build complete"
    );
    Ok(report)
}

/// Delete every artifact `build` could have produced for this manifest
/// under `prefix`.  Best-effort: missing files are fine and one failure
/// never stops the rest.
pub fn clean(manifest_path: &Path, prefix: &Path) -> Result<Vec<Deletion>, Error> {
    let manifest = config::load_manifest(manifest_path)?;
    Ok(clean::clean(&manifest, prefix))
}
