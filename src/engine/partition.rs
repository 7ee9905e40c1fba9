//! Matched/unmatched partitioning.
//!
//! Files with a non-empty directive form the matched group. The unmatched group
//! is computed according to [`PartitionMode`]:
//!
//! - `Substring` (default): a NIfTI input is unmatched iff its literal path does
//!   not occur anywhere in the joined, rendered matched group. If one path is a
//!   substring of another file's rendered entry (`T1.nii` inside
//!   `T1.nii_bin.nii -cm blue`), the shorter file is counted as matched and is
//!   left out of the command altogether.
//! - `Exact`: a file is unmatched iff its own directive is empty.
//!
//! Reference templates always land in the unmatched group.

use super::gate::is_nifti_name;
use crate::Directive;
use crate::preset::PartitionMode;

/// One accepted input, in command-line order.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// A gated file and whatever directive the rule tables produced for it.
    Resolved { path: String, directive: Directive },
    /// A resolved reference template path.
    Template { path: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub matched: Vec<(String, Directive)>,
    pub unmatched: Vec<String>,
}

impl Partition {
    /// The matched group as it appears on the command line.
    pub fn matched_text(&self) -> String {
        self.matched.iter().map(|(path, directive)| format!("{path} {directive}")).collect::<Vec<_>>().join(" ")
    }
}

pub fn partition(entries: &[Entry], mode: PartitionMode) -> Partition {
    let matched: Vec<(String, Directive)> = entries
        .iter()
        .filter_map(|entry| match entry {
            Entry::Resolved { path, directive } if !directive.is_empty() => Some((path.clone(), directive.clone())),
            _ => None,
        })
        .collect();

    let mut out = Partition { matched, unmatched: Vec::new() };
    let matched_text = out.matched_text();

    for entry in entries {
        match entry {
            Entry::Template { path } => out.unmatched.push(path.clone()),
            Entry::Resolved { path, directive } => {
                let unmatched = match mode {
                    PartitionMode::Substring => is_nifti_name(path) && !matched_text.contains(path.as_str()),
                    PartitionMode::Exact => directive.is_empty(),
                };
                if unmatched {
                    out.unmatched.push(path.clone());
                } else if directive.is_empty() {
                    tracing::debug!(file = %path, "path occurs in the matched group, left out of the command");
                }
            }
        }
    }

    out
}
