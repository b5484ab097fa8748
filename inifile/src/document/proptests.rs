//! Property-based tests for document building and equivalence.

use std::collections::{HashMap, HashSet};

use super::Document;
use proptest::prelude::*;

type RawSection = (String, Vec<(String, String)>);

// Small alphabets so repeated sections and keys are common
fn section_strategy() -> impl Strategy<Value = RawSection> {
    (
        "[a-c]{1,2}",
        prop::collection::vec(("[a-d]{1,2}", "[a-z0-9]{0,5}"), 0..6),
    )
}

fn render(sections: &[RawSection]) -> Vec<String> {
    let mut lines = Vec::new();
    for (name, pairs) in sections {
        lines.push(format!("[{name}]"));
        for (key, value) in pairs {
            lines.push(format!("{key} = {value}"));
        }
    }
    lines
}

// Reference first-wins model
fn first_wins(sections: &[RawSection]) -> HashMap<String, HashMap<String, String>> {
    let mut model: HashMap<String, HashMap<String, String>> = HashMap::new();
    for (name, pairs) in sections {
        if model.contains_key(name) {
            continue;
        }
        let mut entries = HashMap::new();
        for (key, value) in pairs {
            entries.entry(key.clone()).or_insert_with(|| value.clone());
        }
        model.insert(name.clone(), entries);
    }
    model
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 1000,
        .. ProptestConfig::default()
    })]

    // Building matches the first-wins model for every section and key
    #[test]
    fn build_keeps_first_occurrences(
        sections in prop::collection::vec(section_strategy(), 0..8)
    ) {
        let doc = Document::from_lines("generated", render(&sections));
        let model = first_wins(&sections);

        let names: HashSet<&str> = doc.sections().unwrap().into_iter().collect();
        let expected: HashSet<&str> = model.keys().map(String::as_str).collect();
        prop_assert_eq!(names, expected);

        for (name, entries) in &model {
            prop_assert_eq!(doc.get_all_keys(name).unwrap().len(), entries.len());
            for (key, value) in entries {
                prop_assert_eq!(doc.get_value(name, key).unwrap(), Some(value.as_str()));
            }
        }
    }

    // Section order does not affect equivalence
    #[test]
    fn equivalence_ignores_section_order(
        sections in prop::collection::vec(section_strategy(), 0..8)
    ) {
        let mut seen = HashSet::new();
        let unique: Vec<RawSection> = sections
            .into_iter()
            .filter(|(name, _)| seen.insert(name.clone()))
            .collect();
        let mut reversed = unique.clone();
        reversed.reverse();

        let a = Document::from_lines("a", render(&unique));
        let b = Document::from_lines("b", render(&reversed));
        prop_assert!(a.equivalent(&b));
        prop_assert!(b.equivalent(&a));
    }

    // Adding a new key to an existing section breaks equivalence
    #[test]
    fn extra_key_breaks_equivalence(
        sections in prop::collection::vec(section_strategy(), 1..6)
    ) {
        let base = render(&sections);
        let mut extended = base.clone();
        let target = format!("[{}]", sections[0].0);
        let at = extended.iter().position(|line| *line == target).unwrap();
        extended.insert(at + 1, "zzz = new".to_string());

        let a = Document::from_lines("a", base);
        let b = Document::from_lines("b", extended);
        prop_assert!(!a.equivalent(&b));
    }
}
