//! Version synchronization across project manifests
//!
//! The primary manifest (`pyproject.toml`) is the source of truth. A version
//! can only be "set" to the value the primary manifest already records; the
//! set then propagates it to the secondary build manifest (`Cargo.toml`) and
//! to any mention of the old string in the README.
//!
//! Manifests are edited through `toml_edit`, so only the version value
//! changes and comments and formatting around it survive.

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;
use toml_edit::{DocumentMut, Item, Value};

/// Key path of a table, e.g. `["tool", "poetry"]` for `[tool.poetry]`
type TablePath = &'static [&'static str];

/// Tables that may carry the package version in the primary manifest
const PRIMARY_TABLES: &[TablePath] = &[&["tool", "poetry"], &["project"]];
/// Tables that may carry the package version in the secondary manifest
const SECONDARY_TABLES: &[TablePath] = &[&["package"], &["workspace", "package"]];

// The pattern is a literal, so compilation cannot fail at runtime.
static SEMVER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("semver pattern is valid"));

/// Three-component dotted version, `MAJOR.MINOR.PATCH`
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemVer {
    /// Major component
    pub major: u64,
    /// Minor component
    pub minor: u64,
    /// Patch component
    pub patch: u64,
}

impl SemVer {
    /// Create a version from its components
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for SemVer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidVersionFormat(s.to_string());
        if !SEMVER.is_match(s) {
            return Err(invalid());
        }
        let mut parts = s.split('.').map(|p| p.parse::<u64>().map_err(|_| invalid()));
        let mut next = || parts.next().unwrap_or_else(|| Err(invalid()));
        Ok(Self::new(next()?, next()?, next()?))
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// The three files kept in sync
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionFiles {
    /// Package manifest holding the authoritative version
    pub primary: PathBuf,
    /// Build manifest mirrored from the primary
    pub secondary: PathBuf,
    /// README whose version mentions are rewritten
    pub readme: PathBuf,
}

impl Default for VersionFiles {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

impl VersionFiles {
    /// Standard file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            primary: dir.join("pyproject.toml"),
            secondary: dir.join("Cargo.toml"),
            readme: dir.join("README.md"),
        }
    }

    /// Version recorded in the primary manifest
    pub fn get_version(&self) -> Result<SemVer> {
        read_version(&self.primary, PRIMARY_TABLES)
    }

    /// Version recorded in the secondary manifest
    pub fn secondary_version(&self) -> Result<SemVer> {
        read_version(&self.secondary, SECONDARY_TABLES)
    }

    /// Primary version, after checking the secondary manifest agrees
    pub fn check_consistency(&self) -> Result<SemVer> {
        let primary = self.get_version()?;
        let secondary = self.secondary_version()?;
        if primary != secondary {
            return Err(Error::VersionMismatch {
                manifest: self.secondary.clone(),
                expected: primary.to_string(),
                found: secondary.to_string(),
            });
        }
        Ok(primary)
    }

    /// Propagate `version` to every file
    ///
    /// # Errors
    ///
    /// - `InvalidVersionFormat` if `version` is not `MAJOR.MINOR.PATCH`
    /// - `VersionMismatch` if the primary manifest records a different version
    /// - `Manifest` / `Io` if a file is missing its version or unwritable
    pub fn set_version(&self, version: &str) -> Result<SemVer> {
        let requested: SemVer = version.parse()?;
        let current = self.get_version()?;
        if current != requested {
            return Err(Error::VersionMismatch {
                manifest: self.primary.clone(),
                expected: requested.to_string(),
                found: current.to_string(),
            });
        }

        write_version(&self.primary, PRIMARY_TABLES, &requested)?;
        write_version(&self.secondary, SECONDARY_TABLES, &requested)?;

        let readme = read(&self.readme)?;
        let updated = readme.replace(&current.to_string(), &requested.to_string());
        write(&self.readme, &updated)?;

        tracing::info!(version = %requested, "version set");
        Ok(requested)
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

fn write(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| Error::io(path, e))
}

fn parse_manifest(path: &Path) -> Result<DocumentMut> {
    read(path)?
        .parse::<DocumentMut>()
        .map_err(|e| Error::Manifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

fn missing_version(path: &Path, tables: &[TablePath]) -> Error {
    let names: Vec<String> = tables.iter().map(|t| t.join(".")).collect();
    Error::Manifest {
        path: path.to_path_buf(),
        reason: format!("no version key under [{}]", names.join("] or [")),
    }
}

fn locate<'d>(item: &'d Item, keys: &[&str]) -> Option<&'d Item> {
    keys.iter().try_fold(item, |item, key| item.get(*key))
}

fn locate_mut<'d>(item: &'d mut Item, keys: &[&str]) -> Option<&'d mut Item> {
    keys.iter().try_fold(item, |item, key| item.get_mut(*key))
}

/// First of `tables` holding a string `version`, and its value
fn find_version<'d>(doc: &'d DocumentMut, tables: &[TablePath]) -> Option<(TablePath, &'d str)> {
    tables.iter().find_map(|&table| {
        let version = locate(doc.as_item(), table)?.get("version")?.as_str()?;
        Some((table, version))
    })
}

fn read_version(path: &Path, tables: &[TablePath]) -> Result<SemVer> {
    let doc = parse_manifest(path)?;
    let (_, raw) = find_version(&doc, tables).ok_or_else(|| missing_version(path, tables))?;
    raw.parse()
}

fn write_version(path: &Path, tables: &[TablePath], version: &SemVer) -> Result<()> {
    let mut doc = parse_manifest(path)?;
    let (table, _) = find_version(&doc, tables).ok_or_else(|| missing_version(path, tables))?;
    let value = locate_mut(doc.as_item_mut(), table)
        .and_then(|t| t.get_mut("version"))
        .and_then(Item::as_value_mut)
        .ok_or_else(|| missing_version(path, tables))?;
    set_keeping_decor(value, version.to_string());
    write(path, &doc.to_string())
}

/// Replace a value but keep the whitespace and comments around it
fn set_keeping_decor(value: &mut Value, replacement: String) {
    let decor = value.decor().clone();
    *value = Value::from(replacement);
    *value.decor_mut() = decor;
}
