//! Overlay naming.
//!
//! Names are only attached to files that already carry a static rule
//! directive. A [`NameLabel::ParentDirectory`] rule names the overlay after the
//! directory holding the file (for example the subject or session folder).

use crate::{Fragment, FragmentKind, NameLabel, NameRule};
use std::path::Path;

/// `-n` fragments for `file_name`, in table order.
pub fn resolve_names(rules: &[NameRule], file_name: &str, absolute: &Path) -> Vec<Fragment> {
    rules
        .iter()
        .filter(|rule| rule.pattern.is_match(file_name))
        .filter_map(|rule| {
            let label = match &rule.label {
                NameLabel::Literal(label) => label.clone(),
                NameLabel::ParentDirectory => match parent_directory_name(absolute) {
                    Some(name) => name,
                    None => {
                        tracing::debug!(file = file_name, "no parent directory to name the overlay after");
                        return None;
                    }
                },
            };
            Some(Fragment { rule: rule.pattern.as_str().to_string(), kind: FragmentKind::Name(label) })
        })
        .collect()
}

fn parent_directory_name(absolute: &Path) -> Option<String> {
    let name = absolute.parent()?.file_name()?;
    Some(name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn rule(pattern: &str, label: NameLabel) -> NameRule {
        NameRule { pattern: Regex::new(pattern).unwrap(), label }
    }

    fn names(rules: &[NameRule], file_name: &str, absolute: &str) -> Vec<String> {
        resolve_names(rules, file_name, Path::new(absolute)).iter().map(ToString::to_string).collect()
    }

    #[test]
    fn literal_label() {
        let rules = [rule("_seg", NameLabel::Literal("cord".to_string()))];
        assert_eq!(names(&rules, "t2_seg.nii", "/data/sub-01/t2_seg.nii"), ["-n cord"]);
    }

    #[test]
    fn self_reference_uses_parent_directory() {
        let rules = [rule("X", NameLabel::ParentDirectory)];
        assert_eq!(names(&rules, "X.nii.gz", "/data/sub-07/ses-02/X.nii.gz"), ["-n ses-02"]);
    }

    #[test]
    fn every_matching_rule_fires() {
        let rules = [
            rule("_seg", NameLabel::Literal("cord".to_string())),
            rule("FA", NameLabel::Literal("fa".to_string())),
            rule("_seg", NameLabel::ParentDirectory),
        ];
        assert_eq!(names(&rules, "FA_seg.nii", "/d/dwi/FA_seg.nii"), ["-n cord", "-n fa", "-n dwi"]);
    }

    #[test]
    fn root_level_file_has_no_parent_name() {
        let rules = [rule("X", NameLabel::ParentDirectory)];
        assert!(names(&rules, "X.nii", "/X.nii").is_empty());
    }
}
