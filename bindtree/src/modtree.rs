//! Module tree derivation and `mod.rs` emission.
//!
//! Binding paths are slash-separated identifiers, not filesystem paths, so
//! tree derivation works on strings and only the emitter touches the
//! filesystem.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::BINDING_EXT;
use crate::error::Error;
use crate::generate::Outcome;

/// Map each proper ancestor directory of `paths` to its direct children.
///
/// Children are full slash-separated paths; a child that is itself a key in
/// the map is a sub-directory, anything else is a binding.  The root
/// (empty path) never appears, and neither does a directory without
/// binding descendants.  Each walk strictly shortens the path, so this
/// terminates without cycle handling.
pub fn gather_modules<'a, I>(paths: I) -> BTreeMap<String, BTreeSet<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut dirs: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for path in paths {
        let mut child = path;
        while let Some((parent, _)) = child.rsplit_once('/') {
            dirs.entry(parent.to_string())
                .or_default()
                .insert(child.to_string());
            child = parent;
        }
    }
    dirs
}

/// True iff every binding at or beneath `dir` was already present before
/// this run.  A failed binding counts as a change, so its ancestors get
/// their module files rewritten.
pub fn is_fully_preexisting(dir: &str, outcomes: &BTreeMap<String, Outcome>) -> bool {
    let prefix = format!("{dir}/");
    outcomes
        .iter()
        .filter(|(path, _)| path.starts_with(&prefix))
        .all(|(_, outcome)| outcome.is_preexisting())
}

/// Write `mod.rs` for every directory whose subtree saw a change this run.
///
/// A written file lists one `pub mod` per direct child, sorted by name for
/// reproducible output.  Files are fully regenerated, never merged: any
/// hand-added entries in a rewritten `mod.rs` are lost.  Returns the paths
/// written.
pub fn emit_module_files(
    tree: &BTreeMap<String, BTreeSet<String>>,
    outcomes: &BTreeMap<String, Outcome>,
    prefix: &Path,
) -> Result<Vec<PathBuf>, Error> {
    let mut written = Vec::new();
    for (dir, children) in tree {
        if is_fully_preexisting(dir, outcomes) {
            debug!(%dir, "module subtree unchanged, keeping mod file");
            continue;
        }
        let mut body = String::new();
        for child in children {
            // Direct children sit one component below `dir`.
            let name = child.rsplit_once('/').map(|(_, n)| n).unwrap_or(child);
            body.push_str(&format!("pub mod {name};\n"));
        }
        let dest = prefix.join(dir).join(format!("mod.{BINDING_EXT}"));
        std::fs::write(&dest, body)
            .map_err(|e| Error::io(format!("writing module file {}", dest.display()), e))?;
        info!(%dir, "wrote module file");
        written.push(dest);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(paths: &[&str]) -> BTreeMap<String, BTreeSet<String>> {
        gather_modules(paths.iter().copied())
    }

    #[test]
    fn derives_proper_ancestors_only() {
        let tree = tree_of(&["net/sock", "net/http/client", "io/buf"]);

        let dirs: Vec<&str> = tree.keys().map(String::as_str).collect();
        assert_eq!(dirs, vec!["io", "net", "net/http"]);

        let net: Vec<&str> = tree["net"].iter().map(String::as_str).collect();
        assert_eq!(net, vec!["net/http", "net/sock"]);

        let http: Vec<&str> = tree["net/http"].iter().map(String::as_str).collect();
        assert_eq!(http, vec!["net/http/client"]);

        let io: Vec<&str> = tree["io"].iter().map(String::as_str).collect();
        assert_eq!(io, vec!["io/buf"]);
    }

    #[test]
    fn top_level_binding_yields_no_directories() {
        assert!(tree_of(&["stdio"]).is_empty());
    }

    #[test]
    fn skip_propagates_only_through_fully_preexisting_subtrees() {
        let mut outcomes = BTreeMap::new();
        outcomes.insert("net/sock".to_string(), Outcome::Generated);
        outcomes.insert("net/http/client".to_string(), Outcome::SkippedAlreadyExists);

        // Everything under net/http was already present.
        assert!(is_fully_preexisting("net/http", &outcomes));
        // net has a freshly generated descendant, so it is not.
        assert!(!is_fully_preexisting("net", &outcomes));
    }

    #[test]
    fn failed_binding_marks_ancestors_changed() {
        let mut outcomes = BTreeMap::new();
        outcomes.insert("net/sock".to_string(), Outcome::Failed);
        assert!(!is_fully_preexisting("net", &outcomes));
    }
}
