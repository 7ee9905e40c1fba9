//! Static rule table evaluation.
//!
//! Each [`Rule`] is searched (unanchored) against the file name. There is no
//! first-match short circuit: a generic `_seg` rule and a more specific
//! `_seg_labeled` rule both contribute when both match, earlier rules first.

use crate::{Fragment, FragmentKind, Rule};

/// Directive fragments for `file_name`, in table order.
pub fn resolve(rules: &[Rule], file_name: &str) -> Vec<Fragment> {
    rules
        .iter()
        .filter(|rule| rule.pattern.is_match(file_name))
        .inspect(|rule| tracing::debug!(file = file_name, pattern = rule.pattern.as_str(), "rule matched"))
        .map(|rule| Fragment { rule: rule.pattern.as_str().to_string(), kind: FragmentKind::Options(rule.directive.clone()) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn rule(pattern: &str, directive: &str) -> Rule {
        Rule { pattern: Regex::new(pattern).unwrap(), directive: directive.to_string() }
    }

    fn rendered(rules: &[Rule], name: &str) -> Vec<String> {
        resolve(rules, name).iter().map(ToString::to_string).collect()
    }

    #[test]
    fn every_matching_rule_contributes_in_table_order() {
        let rules = [rule("mask", "-cm red -a 50"), rule("_bin.nii", "-cm blue"), rule("_seg_labeled.nii", "-cm random")];

        assert_eq!(rendered(&rules, "sc_mask_bin.nii.gz"), ["-cm red -a 50", "-cm blue"]);

        // Reversing the table reverses the contribution order.
        let reversed: Vec<Rule> = rules.iter().rev().cloned().collect();
        assert_eq!(rendered(&reversed, "sc_mask_bin.nii.gz"), ["-cm blue", "-cm red -a 50"]);
    }

    #[test]
    fn pattern_conventions() {
        let rules = [rule("_seg(_manual)*.nii(.gz)*", "-cm red"), rule(".*FA.nii(.gz)*", "-cm red-yellow -dr 0 1")];

        assert_eq!(rendered(&rules, "sub-01_T2w_seg.nii"), ["-cm red"]);
        assert_eq!(rendered(&rules, "sub-01_T2w_seg_manual.nii.gz"), ["-cm red"]);
        assert_eq!(rendered(&rules, "dwi/dti_FA.nii.gz"), ["-cm red-yellow -dr 0 1"]);
        // `.` is any single character, unanchored search.
        assert_eq!(rendered(&rules, "x_segXnii"), ["-cm red"]);
        assert!(rendered(&rules, "sub-01_T1w.nii.gz").is_empty());
    }

    #[test]
    fn duplicate_patterns_are_kept() {
        let rules = [rule("thresh_zstat", "-cm red-yellow"), rule("thresh_zstat", "-a 80")];
        assert_eq!(rendered(&rules, "thresh_zstat1.nii.gz"), ["-cm red-yellow", "-a 80"]);
    }

    #[test]
    fn fragments_record_their_pattern() {
        let rules = [rule("_bin.nii", "-cm blue")];
        let fragments = resolve(&rules, "mask_bin.nii");
        assert_eq!(fragments[0].rule, "_bin.nii");
    }
}
