//! Cleanup planning and best-effort deletion of generated artifacts.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::{BINDING_EXT, BUILTINS_NAME, Manifest};
use crate::modtree;

/// Every artifact `build` could have produced for this manifest, relative
/// to the prefix: one file per binding, the builtins file, and one module
/// file per ancestor directory.  Computed from the manifest alone, whether
/// or not anything exists on disk.
pub fn plan_deletions(manifest: &Manifest) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = manifest
        .bindings
        .iter()
        .map(|b| PathBuf::from(format!("{}.{BINDING_EXT}", b.path)))
        .collect();
    paths.push(PathBuf::from(format!("{BUILTINS_NAME}.{BINDING_EXT}")));
    let tree = modtree::gather_modules(manifest.bindings.iter().map(|b| b.path.as_str()));
    for dir in tree.keys() {
        paths.push(Path::new(dir).join(format!("mod.{BINDING_EXT}")));
    }
    paths
}

/// Result of one deletion attempt.
#[derive(Debug)]
pub enum Deletion {
    Removed(PathBuf),
    /// The file was not there; not an error.
    Absent(PathBuf),
    Failed(PathBuf, std::io::Error),
}

impl Deletion {
    pub fn is_failure(&self) -> bool {
        matches!(self, Deletion::Failed(..))
    }
}

/// Delete every planned artifact under `prefix`.  Missing files are
/// tolerated, and a failure on one path never stops the remaining
/// deletions; each attempt reports its own result.
pub fn clean(manifest: &Manifest, prefix: &Path) -> Vec<Deletion> {
    plan_deletions(manifest)
        .into_iter()
        .map(|rel| {
            let path = prefix.join(&rel);
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), "removed");
                    Deletion::Removed(path)
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Deletion::Absent(path),
                Err(e) => {
                    warn!(path = %path.display(), err = %e, "failed to remove");
                    Deletion::Failed(path, e)
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Binding;

    fn manifest_of(paths: &[&str]) -> Manifest {
        Manifest::new(
            paths
                .iter()
                .map(|p| Binding {
                    path: p.to_string(),
                    matches: vec![],
                    deps: vec![],
                    root: None,
                    remove_fnptr_opts: false,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn plans_bindings_builtins_and_module_files() {
        let manifest = manifest_of(&["net/sock", "net/http/client", "io/buf"]);
        let plan = plan_deletions(&manifest);

        // 3 bindings + 1 builtins + 3 ancestor directories.
        assert_eq!(plan.len(), 7);
        assert!(plan.contains(&PathBuf::from("net/sock.rs")));
        assert!(plan.contains(&PathBuf::from("bindgen_builtins.rs")));
        assert!(plan.contains(&PathBuf::from("net/mod.rs")));
        assert!(plan.contains(&PathBuf::from("net/http/mod.rs")));
        assert!(plan.contains(&PathBuf::from("io/mod.rs")));
    }

    #[test]
    fn missing_files_are_not_failures() {
        let manifest = manifest_of(&["net/sock"]);
        let tmp = tempfile::tempdir().unwrap();
        let results = clean(&manifest, tmp.path());

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| matches!(r, Deletion::Absent(_))));
    }
}
