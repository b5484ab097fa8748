//! Property-based tests for line classification.

use super::{classify, normalize_section_name, value_span, Line};
use proptest::prelude::*;

// Strategy for horizontal padding around tokens
fn padding_strategy() -> impl Strategy<Value = String> {
    "[ \t]{0,3}"
}

// Strategy for line terminators
fn terminator_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(""), Just("\n"), Just("\r\n")]
}

// Strategy for key-value lines with their expected key and value
fn key_value_line_strategy() -> impl Strategy<Value = (String, String, String)> {
    (
        padding_strategy(),
        "[a-zA-Z_][a-zA-Z0-9_.]{0,10}",
        padding_strategy(),
        padding_strategy(),
        "[a-zA-Z0-9/:.]([a-zA-Z0-9/:. ]{0,10}[a-zA-Z0-9/:.])?",
        padding_strategy(),
        prop::option::of("[a-z ]{0,10}"),
        terminator_strategy(),
    )
        .prop_map(|(lead, key, pre_eq, post_eq, value, trail, comment, end)| {
            let comment = comment.map(|c| format!(";{c}")).unwrap_or_default();
            let line = format!("{lead}{key}{pre_eq}={post_eq}{value}{trail}{comment}{end}");
            (line, key, value)
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // Classification recovers the key and the comment-free value
    #[test]
    fn key_value_lines_classify(
        (line, key, value) in key_value_line_strategy()
    ) {
        prop_assert_eq!(
            classify(&line),
            Line::KeyValue { key: &key, value: &value }
        );
    }

    // The value span points at exactly the classified value
    #[test]
    fn value_span_matches_classified_value(
        (line, _key, value) in key_value_line_strategy()
    ) {
        let span = value_span(&line).unwrap();
        prop_assert_eq!(&line[span], value.as_str());
    }

    // Splicing into the value span changes only the value
    #[test]
    fn splice_changes_only_value(
        (line, key, _value) in key_value_line_strategy(),
        replacement in "[a-z0-9]{1,8}"
    ) {
        let span = value_span(&line).unwrap();
        let mut rewritten = line.clone();
        rewritten.replace_range(span.clone(), &replacement);

        prop_assert_eq!(
            classify(&rewritten),
            Line::KeyValue { key: &key, value: &replacement }
        );
        prop_assert_eq!(&rewritten[..span.start], &line[..span.start]);
        prop_assert!(rewritten.ends_with(&line[span.end..]));
    }

    // Bracketed and padded names normalize to the bare name
    #[test]
    fn normalize_strips_brackets_and_padding(
        name in "[a-zA-Z0-9_.]{1,12}",
        lead in padding_strategy(),
        trail in padding_strategy()
    ) {
        let wrapped = format!("{lead}[{name}]{trail}");
        prop_assert_eq!(normalize_section_name(&wrapped), name.as_str());
        prop_assert_eq!(normalize_section_name(&name), name.as_str());
    }

    // A header written for a name classifies back to that name
    #[test]
    fn headers_classify_to_their_name(
        name in "[a-zA-Z0-9_. ]{0,12}",
        end in terminator_strategy()
    ) {
        let line = format!("[{name}]{end}");
        prop_assert_eq!(classify(&line), Line::Section(name.trim()));
    }
}
