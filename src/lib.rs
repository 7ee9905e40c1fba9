use regex::Regex;
use std::fmt;

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
mod loader;
mod preset;
mod template;
#[cfg(test)]
mod testing;
mod viewer;

pub use api::{FileReport, Options, Outcome, Resolution, build_command, resolve, resolve_with};
pub use engine::{Invocation, Partition, SkipReason, VoxelTypes};
pub use error::{PresetError, Result};
pub use loader::{CachedLoader, ImageLoader, NiftiLoader, VoxelStats};
pub use preset::{BUNDLED_PRESET, PartitionMode, Preset, PresetSource};
pub use template::TemplateSpec;
pub use viewer::{Viewer, launch};

// --- Rule tables ------------------------------------------------------------

/// A static display rule.
///
/// Every file whose name contains a match for `pattern` receives `directive`
/// (for example `-cm red -a 50`). All matching rules contribute, in table order.
#[derive(Debug, Clone)]
pub struct Rule {
    pub pattern: Regex,
    pub directive: String,
}

/// A data-driven display range rule.
///
/// The emitted range is `(max * low_fraction, max * high_fraction)` where `max`
/// is the maximal voxel intensity of the matched image.
#[derive(Debug, Clone)]
pub struct IntensityRule {
    pub pattern: Regex,
    pub low_fraction: f64,
    pub high_fraction: f64,
}

/// How a [`NameRule`] turns into an overlay name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameLabel {
    /// Use the label verbatim.
    Literal(String),
    /// Use the name of the directory that holds the file.
    ParentDirectory,
}

/// Overlay naming rule.
#[derive(Debug, Clone)]
pub struct NameRule {
    pub pattern: Regex,
    pub label: NameLabel,
}

// --- Directives -------------------------------------------------------------

/// A `(low, high)` intensity window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRange {
    pub low: f64,
    pub high: f64,
}

/// One piece of a [`Directive`], tagged with the pattern that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Source pattern (as written in the preset).
    pub rule: String,
    pub kind: FragmentKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FragmentKind {
    /// Options copied from the static rule table.
    Options(String),
    /// `-dr LOW HIGH`
    Range(DisplayRange),
    /// `-n NAME`
    Name(String),
}

impl Fragment {
    /// Split the fragment into argv tokens.
    pub fn tokens(&self) -> Vec<String> {
        match &self.kind {
            FragmentKind::Options(options) => options.split_whitespace().map(str::to_string).collect(),
            FragmentKind::Range(range) => {
                vec!["-dr".to_string(), format_range_value(range.low), format_range_value(range.high)]
            }
            FragmentKind::Name(name) => vec!["-n".to_string(), name.clone()],
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FragmentKind::Options(options) => write!(f, "{}", options.trim()),
            FragmentKind::Range(range) => {
                write!(f, "-dr {} {}", format_range_value(range.low), format_range_value(range.high))
            }
            FragmentKind::Name(name) => write!(f, "-n {name}"),
        }
    }
}

/// Ordered display options attached to one input file: static rules first,
/// then intensity ranges, then names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directive {
    fragments: Vec<Fragment>,
}

impl Directive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn extend(&mut self, fragments: impl IntoIterator<Item = Fragment>) {
        self.fragments.extend(fragments);
    }

    pub fn tokens(&self) -> Vec<String> {
        self.fragments.iter().flat_map(Fragment::tokens).collect()
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for fragment in &self.fragments {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{fragment}")?;
            first = false;
        }
        Ok(())
    }
}

/// Format a display range bound.
///
/// Whole numbers print without a decimal point; fractional values keep at most
/// three decimals with trailing zeros trimmed.
pub(crate) fn format_range_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        return format!("{}", v as i64);
    }
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(kind: FragmentKind) -> Fragment {
        Fragment { rule: "x".to_string(), kind }
    }

    #[test]
    fn range_values_render_compactly() {
        let cases = [(700.0, "700"), (0.0, "0"), (0.35, "0.35"), (863.8, "863.8"), (1.0 / 3.0, "0.333"), (-0.0001, "0")];
        for (value, expected) in cases {
            assert_eq!(format_range_value(value), expected, "value {value}");
        }
    }

    #[test]
    fn directive_renders_fragments_in_order() {
        let mut directive = Directive::new();
        directive.extend([
            fragment(FragmentKind::Options("-cm red  -a 50".to_string())),
            fragment(FragmentKind::Range(DisplayRange { low: 0.0, high: 700.0 })),
            fragment(FragmentKind::Name("cord".to_string())),
        ]);

        assert_eq!(directive.to_string(), "-cm red  -a 50 -dr 0 700 -n cord");
        assert_eq!(directive.tokens(), ["-cm", "red", "-a", "50", "-dr", "0", "700", "-n", "cord"]);
    }

    #[test]
    fn name_with_spaces_stays_one_token() {
        let name = fragment(FragmentKind::Name("grey matter".to_string()));
        assert_eq!(name.tokens(), ["-n", "grey matter"]);
    }
}
