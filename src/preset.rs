//! Preset files.
//!
//! A preset holds the three rule tables plus a few knobs. It is read from
//! `~/.fsleyes_preset/config.toml` when that file exists; otherwise the preset
//! bundled into the binary (`presets/default.toml`) is used.
//!
//! Tables are TOML arrays of tables, so their order in the file is the order
//! of evaluation and duplicate patterns are allowed:
//!
//! ```toml
//! [[rule]]
//! pattern = "_seg(_manual)*.nii(.gz)*"
//! directive = "-cm red -a 50"
//!
//! [[intensity]]
//! pattern = "T1w.nii.gz"
//! low = 0.0
//! high = 0.7
//!
//! [[name]]
//! pattern = ".*FA.nii(.gz)*"
//! label = ".*FA.nii(.gz)*"   # same as the pattern: name after the parent directory
//! ```

use crate::error::{PresetError, Result};
use crate::template::TemplateSpec;
use crate::{IntensityRule, NameLabel, NameRule, Rule};
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// The preset compiled into the binary.
pub const BUNDLED_PRESET: &str = include_str!("../presets/default.toml");

const DEFAULT_TEMPLATE_ROOTS: &[&str] = &["/usr/local/fsl*"];

/// How the matched/unmatched split of the command is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionMode {
    /// A file is unmatched iff its path does not occur in the rendered
    /// matched group.
    #[default]
    Substring,
    /// A file is unmatched iff it has no directive of its own.
    Exact,
}

/// Where a preset came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetSource {
    Explicit(PathBuf),
    User(PathBuf),
    Bundled,
}

impl fmt::Display for PresetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetSource::Explicit(path) | PresetSource::User(path) => write!(f, "{}", path.display()),
            PresetSource::Bundled => f.write_str("<bundled>"),
        }
    }
}

/// Compiled rule tables and settings.
#[derive(Debug, Clone)]
pub struct Preset {
    pub rules: Vec<Rule>,
    pub intensity: Vec<IntensityRule>,
    pub names: Vec<NameRule>,
    pub templates: Vec<TemplateSpec>,
    pub template_roots: Vec<String>,
    pub viewer: Option<String>,
    pub partition: PartitionMode,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PresetFile {
    viewer: Option<String>,
    #[serde(default)]
    partition: PartitionMode,
    template_roots: Option<Vec<String>>,
    #[serde(default, rename = "rule")]
    rules: Vec<RuleEntry>,
    #[serde(default)]
    intensity: Vec<IntensityEntry>,
    #[serde(default, rename = "name")]
    names: Vec<NameEntry>,
    #[serde(default, rename = "template")]
    templates: Vec<TemplateSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleEntry {
    pattern: String,
    directive: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IntensityEntry {
    pattern: String,
    low: f64,
    high: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NameEntry {
    pattern: String,
    label: String,
}

impl Preset {
    /// Parse and validate preset TOML. `origin` is only used in messages.
    pub fn from_toml(text: &str, origin: &str) -> Result<Self> {
        let file: PresetFile =
            toml::from_str(text).map_err(|source| PresetError::PresetSyntax { origin: origin.to_string(), source })?;
        let compile = |pattern: &str| compile_pattern(pattern, origin);

        let mut rules = Vec::with_capacity(file.rules.len());
        for entry in file.rules {
            if entry.directive.trim().is_empty() {
                return Err(PresetError::preset(origin, format!("rule '{}' has an empty directive", entry.pattern)));
            }
            rules.push(Rule { pattern: compile(&entry.pattern)?, directive: entry.directive });
        }

        let mut intensity = Vec::with_capacity(file.intensity.len());
        for entry in file.intensity {
            for (field, value) in [("low", entry.low), ("high", entry.high)] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(PresetError::preset(
                        origin,
                        format!("intensity rule '{}': {field} = {value} is outside [0, 1]", entry.pattern),
                    ));
                }
            }
            intensity.push(IntensityRule {
                pattern: compile(&entry.pattern)?,
                low_fraction: entry.low,
                high_fraction: entry.high,
            });
        }

        let mut names = Vec::with_capacity(file.names.len());
        for entry in file.names {
            // A label equal to its own key names the overlay after the parent directory.
            let label =
                if entry.label == entry.pattern { NameLabel::ParentDirectory } else { NameLabel::Literal(entry.label) };
            names.push(NameRule { pattern: compile(&entry.pattern)?, label });
        }

        for spec in &file.templates {
            if spec.token.is_empty() || spec.file.is_empty() {
                return Err(PresetError::preset(origin, "template entries need a token and a file"));
            }
        }

        let template_roots = match file.template_roots {
            Some(roots) => roots,
            None => DEFAULT_TEMPLATE_ROOTS.iter().map(|root| root.to_string()).collect(),
        };
        for root in &template_roots {
            glob::Pattern::new(root)
                .map_err(|err| PresetError::preset(origin, format!("template root '{root}': {err}")))?;
        }

        if file.viewer.as_deref().is_some_and(|viewer| viewer.trim().is_empty()) {
            return Err(PresetError::preset(origin, "viewer must not be empty"));
        }

        Ok(Preset {
            rules,
            intensity,
            names,
            templates: file.templates,
            template_roots,
            viewer: file.viewer,
            partition: file.partition,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text, &path.display().to_string())
    }

    pub fn bundled() -> Result<Self> {
        Self::from_toml(BUNDLED_PRESET, "<bundled>")
    }

    /// `~/.fsleyes_preset/config.toml`
    pub fn user_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".fsleyes_preset").join("config.toml"))
    }

    /// Load the explicit preset if given, else the user preset, else the
    /// bundled one.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, PresetSource)> {
        Self::load_from(explicit, Self::user_path())
    }

    fn load_from(explicit: Option<&Path>, user: Option<PathBuf>) -> Result<(Self, PresetSource)> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, PresetSource::Explicit(path.to_path_buf())));
        }

        match user {
            Some(path) if path.is_file() => {
                tracing::debug!(preset = %path.display(), "using user preset");
                Ok((Self::from_file(&path)?, PresetSource::User(path)))
            }
            user => {
                let shown = user.map_or_else(|| "~/.fsleyes_preset/config.toml".to_string(), |p| p.display().to_string());
                tracing::info!("{shown} config file not found. Using bundled preset with limited settings.");
                Ok((Self::bundled()?, PresetSource::Bundled))
            }
        }
    }

    /// The template configured for a command-line token, if any.
    pub fn template_for(&self, token: &str) -> Option<&TemplateSpec> {
        self.templates.iter().find(|spec| spec.token == token)
    }
}

fn compile_pattern(pattern: &str, origin: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| PresetError::Pattern {
        origin: origin.to_string(),
        pattern: pattern.to_string(),
        source,
    })
}
