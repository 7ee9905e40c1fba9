//! Reference template lookup.
//!
//! A command-line token such as `MNI` stands for a standard-space image shipped
//! with a toolkit installation. The image is searched under each root (a glob
//! such as `/usr/local/fsl*`); `$FSLDIR` is searched first when set. Matches
//! under the configured roots are ordered by version, newest first, so
//! `fsl-6.0.10` wins over `fsl-6.0.4`.

use serde::Deserialize;
use std::cmp::Reverse;
use std::ffi::OsStr;
use std::path::PathBuf;

/// A command-line token that expands to a template image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateSpec {
    /// Literal command-line token, e.g. `MNI`.
    pub token: String,
    /// Image path relative to a toolkit root.
    pub file: String,
}

/// Roots to search: `$FSLDIR` (if set), then the configured globs.
pub fn search_roots(configured: &[String]) -> Vec<String> {
    search_roots_for(std::env::var_os("FSLDIR").as_deref(), configured)
}

/// Root list with the `$FSLDIR` lookup factored out.
///
/// `fsldir` is a literal directory, so glob metacharacters in it are escaped.
pub fn search_roots_for(fsldir: Option<&OsStr>, configured: &[String]) -> Vec<String> {
    let mut roots = Vec::with_capacity(configured.len() + 1);
    if let Some(fsldir) = fsldir.filter(|dir| !dir.is_empty()) {
        roots.push(glob::Pattern::escape(&fsldir.to_string_lossy()));
    }
    roots.extend(configured.iter().cloned());
    roots
}

/// First existing match of `spec.file` under `roots`.
///
/// Roots are tried in order; within a root, matches are version-sorted newest
/// first.
pub fn find_template(spec: &TemplateSpec, roots: &[String]) -> Option<PathBuf> {
    roots.iter().find_map(|root| {
        let pattern = format!("{}/{}", root.trim_end_matches('/'), spec.file.trim_start_matches('/'));
        let paths = match glob::glob(&pattern) {
            Ok(paths) => paths,
            Err(err) => {
                tracing::warn!(pattern = %pattern, "invalid template search pattern: {err}");
                return None;
            }
        };

        let mut found: Vec<PathBuf> = paths.filter_map(Result::ok).filter(|path| path.is_file()).collect();
        found.sort_by_cached_key(|path| Reverse(version_key(&path.to_string_lossy())));

        tracing::debug!(token = %spec.token, pattern = %pattern, candidates = found.len(), "template search");
        found.into_iter().next()
    })
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Chunk {
    Text(String),
    Number(u64),
}

/// Split `s` into text and number runs so that `6.0.10` sorts after `6.0.4`.
fn version_key(s: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut rest = s;

    while let Some(first) = rest.chars().next() {
        let digits = first.is_ascii_digit();
        let end = rest.find(|c: char| c.is_ascii_digit() != digits).unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);

        let chunk = match run.parse::<u64>() {
            Ok(n) if digits => Chunk::Number(n),
            _ => Chunk::Text(run.to_string()),
        };
        chunks.push(chunk);
        rest = tail;
    }

    chunks
}
