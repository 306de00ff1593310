//! Configuration types for the binding manifest.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Name of the shared builtins module every binding imports.
pub const BUILTINS_NAME: &str = "bindgen_builtins";

/// Extension of generated binding files.
pub const BINDING_EXT: &str = "rs";

/// One `[[binding]]` entry from the manifest.
///
/// Unknown fields in the manifest are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Binding {
    /// Slash-separated relative identifier.  Doubles as the output path
    /// (without extension) and the header path under `root`.
    #[serde(default)]
    pub path: String,
    /// Declaration filter patterns, passed as `-match` flags.  Empty means
    /// all declarations.
    #[serde(default, rename = "match")]
    pub matches: Vec<String>,
    /// Modules the generated file imports.  The builtins module is always
    /// implied; duplicates collapse.
    #[serde(default)]
    pub deps: Vec<String>,
    /// Directory under which `path + ".h"` resolves.  Defaults to the
    /// platform header root.
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// Unwrap optional function-pointer types in the translator output.
    #[serde(default)]
    pub remove_fnptr_opts: bool,
}

impl Binding {
    /// The header this binding translates, under `root` or the platform
    /// default.
    pub fn header(&self, platform: &Platform) -> PathBuf {
        let root = self.root.as_deref().unwrap_or(&platform.header_root);
        root.join(format!("{}.h", self.path))
    }
}

#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    binding: Vec<Binding>,
}

/// A validated manifest: every binding has a path, and paths are unique.
#[derive(Debug)]
pub struct Manifest {
    pub bindings: Vec<Binding>,
}

impl Manifest {
    pub fn new(bindings: Vec<Binding>) -> Result<Self, Error> {
        let mut seen = BTreeSet::new();
        for binding in &bindings {
            if binding.path.is_empty() {
                return Err(Error::Validation("binding entry is missing a path".into()));
            }
            if !seen.insert(binding.path.as_str()) {
                return Err(Error::Validation(format!(
                    "duplicate binding path `{}`",
                    binding.path
                )));
            }
        }
        Ok(Manifest { bindings })
    }
}

/// Load and validate a manifest file.
pub fn load_manifest(path: &Path) -> Result<Manifest, Error> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::io(format!("reading manifest {}", path.display()), e))?;
    let raw: ManifestFile = toml::from_str(&content).map_err(|e| Error::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    Manifest::new(raw.binding)
}

/// Platform header locations.
///
/// Supplied by the caller; nothing here validates that the directories
/// exist.  The CLI builds this from `ANDROID_NDK_ROOT` / `PLATFORM_NAME`,
/// and absent variables simply yield malformed paths that the translator
/// reports in its own way.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Default root for header resolution.
    pub header_root: PathBuf,
    /// Include directories always passed to the translator.
    pub include_dirs: Vec<PathBuf>,
}

impl Platform {
    pub fn from_env() -> Self {
        let ndk = std::env::var("ANDROID_NDK_ROOT").unwrap_or_default();
        let name = std::env::var("PLATFORM_NAME").unwrap_or_default();
        let arch_dir = PathBuf::from(format!("{ndk}/platforms/{name}/arch-arm"));
        let header_root = arch_dir.join("usr/include");
        let toolchain_include = PathBuf::from(format!(
            "{ndk}/toolchains/arm-linux-androideabi-4.6/prebuilt/linux-x86_64\
             /lib/gcc/arm-linux-androideabi/4.6/include"
        ));
        Platform {
            include_dirs: vec![header_root.clone(), toolchain_include],
            header_root,
        }
    }
}

/// Everything `build` needs besides the manifest itself.
#[derive(Debug, Clone)]
pub struct Options {
    /// Output prefix; generated files land beneath it.
    pub prefix: PathBuf,
    /// Translator executable to invoke.
    pub translator: PathBuf,
    /// Platform include configuration.
    pub platform: Platform,
    /// Tolerate non-zero translator exit instead of collecting it as a
    /// failure.
    pub best_effort: bool,
}

impl Options {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Options {
            prefix: prefix.into(),
            translator: PathBuf::from("bindgen"),
            platform: Platform::from_env(),
            best_effort: false,
        }
    }
}
