//! Builtins and per-binding generation — the write side of `build`.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use tracing::{debug, info};

use crate::config::{BINDING_EXT, BUILTINS_NAME, Binding, Manifest, Options};
use crate::error::Error;
use crate::rewrite::remove_fnptr_options;

/// Lint suppressions written at the top of every generated file, in this
/// exact order.
pub const PRELUDE_LINTS: [&str; 5] = [
    "unused_attribute",
    "unused_imports",
    "non_camel_case_types",
    "non_snake_case",
    "non_uppercase_statics",
];

/// What happened to one output file during `build`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The file was written this run.
    Generated,
    /// The file already existed and was left untouched.
    SkippedAlreadyExists,
    /// The translator failed; no file was written.
    Failed,
}

impl Outcome {
    pub fn is_preexisting(self) -> bool {
        matches!(self, Outcome::SkippedAlreadyExists)
    }
}

/// Full set of header search directories: the platform's static include
/// dirs plus every binding's declared (or defaulted) root.  Duplicates
/// collapse; order carries no meaning.
pub fn resolve_includes(manifest: &Manifest, options: &Options) -> BTreeSet<PathBuf> {
    let mut dirs: BTreeSet<PathBuf> = options.platform.include_dirs.iter().cloned().collect();
    for binding in &manifest.bindings {
        dirs.insert(
            binding
                .root
                .clone()
                .unwrap_or_else(|| options.platform.header_root.clone()),
        );
    }
    dirs
}

fn prelude() -> String {
    let mut out = String::new();
    for lint in PRELUDE_LINTS {
        out.push_str(&format!("#![allow({lint})]\n"));
    }
    out
}

/// Deduplicated import list: the implicit builtins module followed by
/// `deps`, keeping first-occurrence order.
fn import_list(deps: &[String]) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    let mut list = Vec::new();
    for dep in std::iter::once(BUILTINS_NAME).chain(deps.iter().map(String::as_str)) {
        if seen.insert(dep) {
            list.push(dep);
        }
    }
    list
}

fn run_translator(cmd: &mut Command, header: &std::path::Path) -> Result<Output, Error> {
    let output = cmd
        .output()
        .map_err(|e| Error::io(format!("running translator for {}", header.display()), e))?;
    Ok(output)
}

/// Generate the shared builtins module, at most once.
///
/// An existing file is treated as a pre-supplied artifact and left alone;
/// this is the one case where `build` never regenerates.  The translator
/// runs in builtins mode, reading an empty program from stdin.
pub fn generate_builtins(options: &Options) -> Result<Outcome, Error> {
    let dest = options
        .prefix
        .join(format!("{BUILTINS_NAME}.{BINDING_EXT}"));
    if dest.exists() {
        debug!(path = %dest.display(), "builtins already present, skipping");
        return Ok(Outcome::SkippedAlreadyExists);
    }
    std::fs::create_dir_all(&options.prefix)
        .map_err(|e| Error::io(format!("creating {}", options.prefix.display()), e))?;

    let mut cmd = Command::new(&options.translator);
    cmd.args(["-builtins", "-E", "-"]).stdin(Stdio::null());
    let output = run_translator(&mut cmd, &dest)?;
    if !output.status.success() && !options.best_effort {
        return Err(Error::Translator {
            header: dest,
            status: output.status,
        });
    }

    let mut body = prelude();
    body.push_str(&String::from_utf8_lossy(&output.stdout));
    std::fs::write(&dest, body)
        .map_err(|e| Error::io(format!("writing {}", dest.display()), e))?;
    info!(path = %dest.display(), "wrote builtins");
    Ok(Outcome::Generated)
}

/// Generate one binding file.
///
/// An existing destination is never overwritten: the binding is reported
/// as preexisting and nothing else happens, which is what makes repeated
/// `build` runs cheap and safe around hand-edited files.  Otherwise the
/// translator runs with one `-I` per include directory and one `-match`
/// per pattern, and the file is written in a single shot: lint prelude,
/// deduplicated imports, then the (possibly rewritten) translator output.
pub fn generate_binding(
    binding: &Binding,
    includes: &BTreeSet<PathBuf>,
    options: &Options,
) -> Result<Outcome, Error> {
    let dest = options
        .prefix
        .join(format!("{}.{BINDING_EXT}", binding.path));
    if dest.exists() {
        debug!(path = %binding.path, "binding already present, skipping");
        return Ok(Outcome::SkippedAlreadyExists);
    }
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::io(format!("creating {}", parent.display()), e))?;
    }

    let header = binding.header(&options.platform);
    let mut cmd = Command::new(&options.translator);
    for dir in includes {
        cmd.arg("-I").arg(dir);
    }
    for pattern in &binding.matches {
        cmd.arg("-match").arg(pattern);
    }
    cmd.arg(&header);

    debug!(header = %header.display(), "invoking translator");
    let output = run_translator(&mut cmd, &header)?;
    if !output.status.success() && !options.best_effort {
        return Err(Error::Translator {
            header,
            status: output.status,
        });
    }

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    if binding.remove_fnptr_opts {
        text = remove_fnptr_options(&text);
    }

    let mut body = prelude();
    for dep in import_list(&binding.deps) {
        body.push_str(&format!("use {dep}::*;\n"));
    }
    body.push_str(&text);
    std::fs::write(&dest, body)
        .map_err(|e| Error::io(format!("writing {}", dest.display()), e))?;
    info!(path = %binding.path, "wrote binding");
    Ok(Outcome::Generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Platform;

    #[test]
    fn imports_dedup_and_include_builtins() {
        let deps = vec![
            "foo".to_string(),
            BUILTINS_NAME.to_string(),
            "foo".to_string(),
        ];
        assert_eq!(import_list(&deps), vec![BUILTINS_NAME, "foo"]);
        assert_eq!(import_list(&[]), vec![BUILTINS_NAME]);
    }

    #[test]
    fn prelude_lints_are_ordered() {
        let text = prelude();
        assert!(text.starts_with("#![allow(unused_attribute)]\n"));
        assert_eq!(text.lines().count(), PRELUDE_LINTS.len());
    }

    #[test]
    fn includes_union_platform_and_roots() {
        let platform = Platform {
            header_root: PathBuf::from("/sysroot/usr/include"),
            include_dirs: vec![
                PathBuf::from("/sysroot/usr/include"),
                PathBuf::from("/toolchain/include"),
            ],
        };
        let manifest = Manifest::new(vec![
            Binding {
                path: "a".into(),
                matches: vec![],
                deps: vec![],
                root: None,
                remove_fnptr_opts: false,
            },
            Binding {
                path: "b".into(),
                matches: vec![],
                deps: vec![],
                root: Some(PathBuf::from("/opt/extra")),
                remove_fnptr_opts: false,
            },
        ])
        .unwrap();
        let options = Options {
            prefix: PathBuf::from("."),
            translator: PathBuf::from("bindgen"),
            platform,
            best_effort: false,
        };

        let includes = resolve_includes(&manifest, &options);
        let expected: BTreeSet<PathBuf> = [
            "/sysroot/usr/include",
            "/toolchain/include",
            "/opt/extra",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        assert_eq!(includes, expected);
    }
}
