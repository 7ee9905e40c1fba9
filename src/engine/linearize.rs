//! Command linearization.
//!
//! ```text
//! viewer  unmatched...  (path directive-tokens...)...
//! ```
//!
//! Unmatched files come first so that the overlays carrying display options
//! are stacked on top of them in the viewer.

use super::partition::Partition;
use crate::viewer::Viewer;
use std::fmt;

/// A fully assembled viewer invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

impl Invocation {
    /// The arguments joined by single spaces, without the program.
    pub fn args_text(&self) -> String {
        self.args.join(" ")
    }
}

pub fn linearize(viewer: &Viewer, partition: &Partition) -> Invocation {
    let mut args = partition.unmatched.clone();
    for (path, directive) in &partition.matched {
        args.push(path.clone());
        args.extend(directive.tokens());
    }
    Invocation { program: viewer.program().to_string(), args }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Directive, DisplayRange, Fragment, FragmentKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn unmatched_first_then_matched_with_tokens() {
        let mut seg = Directive::new();
        seg.extend([Fragment { rule: "_seg".to_string(), kind: FragmentKind::Options("-cm red -a 50".to_string()) }]);
        let mut t1 = Directive::new();
        t1.extend([Fragment { rule: "T1w".to_string(), kind: FragmentKind::Range(DisplayRange { low: 0.0, high: 700.0 }) }]);

        let partition = Partition {
            matched: vec![("a_seg.nii".to_string(), seg), ("T1w.nii.gz".to_string(), t1)],
            unmatched: vec!["plain.nii.gz".to_string(), "other.nii".to_string()],
        };

        let invocation = linearize(&Viewer::Linux, &partition);

        assert_eq!(invocation.program, "/usr/local/fsl/bin/fsleyes");
        assert_eq!(
            invocation.args,
            ["plain.nii.gz", "other.nii", "a_seg.nii", "-cm", "red", "-a", "50", "T1w.nii.gz", "-dr", "0", "700"]
        );
        assert_eq!(
            invocation.to_string(),
            "/usr/local/fsl/bin/fsleyes plain.nii.gz other.nii a_seg.nii -cm red -a 50 T1w.nii.gz -dr 0 700"
        );
    }

    #[test]
    fn empty_partition_is_just_the_viewer() {
        let invocation = linearize(&Viewer::Mac, &Partition::default());
        assert_eq!(invocation.to_string(), "fsleyes");
        assert_eq!(invocation.args_text(), "");
    }
}
