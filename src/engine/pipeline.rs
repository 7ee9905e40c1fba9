//! Batch driver.
//!
//! `Pipeline` owns nothing: it borrows the preset and the image loader and
//! walks the arguments in order. Each argument is finished (gate, rules,
//! intensity, names) before the next one starts. A fatal input error aborts
//! the batch; skipped files and missing templates are logged and recorded.

use super::gate::{self, InputFile, SkipReason, Verdict, VoxelTypes};
use super::partition::{self, Entry, Partition};
use super::{intensity, naming, rule_table};
use crate::Directive;
use crate::error::Result;
use crate::loader::ImageLoader;
use crate::preset::{PartitionMode, Preset};
use crate::template;
use std::path::PathBuf;

/// What happened to one command-line argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Accepted and at least one rule produced options.
    Directive(Directive),
    /// Accepted, no rule matched.
    NoDirective,
    /// Left out with a warning.
    Skipped(SkipReason),
    /// Template token resolved to an installed image.
    Template(PathBuf),
    /// Template token with no installed image.
    TemplateMissing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub input: String,
    pub outcome: Outcome,
}

#[derive(Debug)]
pub struct Pipeline<'a> {
    preset: &'a Preset,
    loader: &'a dyn ImageLoader,
    allowed: VoxelTypes,
}

impl<'a> Pipeline<'a> {
    pub fn new(preset: &'a Preset, loader: &'a dyn ImageLoader, allowed: VoxelTypes) -> Self {
        Self { preset, loader, allowed }
    }

    /// Process `args` in order and partition the accepted files.
    pub fn run(&self, args: &[String], mode: PartitionMode) -> Result<(Vec<FileReport>, Partition)> {
        let mut reports = Vec::with_capacity(args.len());
        let mut entries = Vec::with_capacity(args.len());

        for arg in args {
            let outcome = self.process(arg)?;
            match &outcome {
                Outcome::Directive(directive) => {
                    entries.push(Entry::Resolved { path: arg.clone(), directive: directive.clone() });
                }
                Outcome::NoDirective => entries.push(Entry::Resolved { path: arg.clone(), directive: Directive::new() }),
                Outcome::Template(path) => entries.push(Entry::Template { path: path.to_string_lossy().into_owned() }),
                Outcome::Skipped(_) | Outcome::TemplateMissing => {}
            }
            reports.push(FileReport { input: arg.clone(), outcome });
        }

        Ok((reports, partition::partition(&entries, mode)))
    }

    fn process(&self, arg: &str) -> Result<Outcome> {
        if let Some(spec) = self.preset.template_for(arg) {
            let roots = template::search_roots(&self.preset.template_roots);
            return Ok(match template::find_template(spec, &roots) {
                Some(path) => {
                    tracing::debug!(token = arg, path = %path.display(), "reference template resolved");
                    Outcome::Template(path)
                }
                None => {
                    tracing::error!("Reference template {} for '{arg}' not found under {}", spec.file, roots.join(", "));
                    Outcome::TemplateMissing
                }
            });
        }

        let file = InputFile::probe(arg);
        if let Verdict::Skip(reason) = gate::accept(&file, self.allowed, self.loader)? {
            tracing::warn!("Skipping {arg}: file {reason}");
            return Ok(Outcome::Skipped(reason));
        }

        let directive = self.directive_for(arg)?;
        Ok(if directive.is_empty() { Outcome::NoDirective } else { Outcome::Directive(directive) })
    }

    /// Static rules, then intensity ranges, then names.
    fn directive_for(&self, arg: &str) -> Result<Directive> {
        let mut directive = Directive::new();

        let options = rule_table::resolve(&self.preset.rules, arg);
        let named = !options.is_empty();
        directive.extend(options);

        let absolute = std::path::absolute(arg)?;
        directive.extend(intensity::compute_ranges(&self.preset.intensity, arg, &absolute, self.loader)?);

        if named {
            directive.extend(naming::resolve_names(&self.preset.names, arg, &absolute));
        }

        Ok(directive)
    }
}
