//! Property-based tests for rust_log_spooler using proptest

use proptest::prelude::*;
use rust_log_spooler::prelude::*;
use rust_log_spooler::format_template;

fn any_kind() -> impl Strategy<Value = LogKind> {
    prop_oneof![
        Just(LogKind::None),
        Just(LogKind::Normal),
        Just(LogKind::Warn),
        Just(LogKind::Exception),
    ]
}

// ============================================================================
// LogKind / LogKindMask Tests
// ============================================================================

proptest! {
    /// LogKind string conversions roundtrip
    #[test]
    fn test_log_kind_str_roundtrip(kind in any_kind()) {
        let parsed: LogKind = kind.to_str().parse().unwrap();
        prop_assert_eq!(kind, parsed);
    }

    /// Parsing ignores case
    #[test]
    fn test_log_kind_case_insensitive(kind in any_kind(), use_lower in any::<bool>()) {
        let text = if use_lower { kind.to_str().to_lowercase() } else { kind.to_str().to_string() };
        prop_assert_eq!(text.parse::<LogKind>().unwrap(), kind);
    }

    /// A mask built from a set of kinds intersects exactly those kinds
    #[test]
    fn test_mask_membership(selected in proptest::collection::vec(any::<bool>(), 4)) {
        let mut mask = LogKindMask::EMPTY;
        for (kind, on) in LogKind::ALL.iter().zip(&selected) {
            if *on {
                mask = mask.with(*kind);
            }
        }

        for (kind, on) in LogKind::ALL.iter().zip(&selected) {
            prop_assert_eq!(mask.intersects(*kind), *on);
        }
        prop_assert_eq!(mask.kinds().count(), selected.iter().filter(|on| **on).count());
        prop_assert_eq!(mask.is_empty(), !selected.iter().any(|on| *on));
    }

    /// with/without are inverse for a single kind
    #[test]
    fn test_mask_with_without(bits in 0u32..32, kind in any_kind()) {
        let mask = LogKindMask::from_bits(bits << 1);
        prop_assert!(mask.with(kind).intersects(kind));
        prop_assert!(!mask.without(kind).intersects(kind));
        prop_assert_eq!(mask.with(kind).without(kind), mask.without(kind));
    }

    /// Masks survive a JSON roundtrip as plain integers
    #[test]
    fn test_mask_serde_is_transparent(bits in 0u32..32) {
        let mask = LogKindMask::from_bits(bits << 1);
        let json = serde_json::to_string(&mask).unwrap();
        prop_assert_eq!(&json, &(bits << 1).to_string());
        let parsed: LogKindMask = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(parsed, mask);
    }
}

// ============================================================================
// Template Tests
// ============================================================================

proptest! {
    /// Without arguments the template is returned untouched
    #[test]
    fn test_template_without_args_is_verbatim(template in ".*") {
        prop_assert_eq!(format_template(&template, &[]).unwrap(), template);
    }

    /// Text without braces is unaffected by arguments
    #[test]
    fn test_brace_free_text_unchanged(text in "[^{}]*", arg in any::<i64>()) {
        prop_assert_eq!(format_template(&text, &[&arg]).unwrap(), text);
    }

    /// Positional placeholders pick the right argument
    #[test]
    fn test_positional_substitution(a in any::<i32>(), b in "[a-z]{0,12}") {
        let out = format_template("{1}:{0}:{1}", &[&a, &b]).unwrap();
        prop_assert_eq!(out, format!("{}:{}:{}", b, a, b));
    }

    /// Escaped braces always come out single
    #[test]
    fn test_escaped_braces(text in "[a-z ]{0,16}") {
        let template = format!("{{{{{}}}}} {{0}}", text);
        let out = format_template(&template, &[&"x"]).unwrap();
        prop_assert_eq!(out, format!("{{{}}} x", text));
    }

    /// Out-of-range indexes are errors, never panics
    #[test]
    fn test_out_of_range_index_errors(index in 1usize..64) {
        let template = format!("value {{{}}}", index);
        prop_assert!(format_template(&template, &[&0]).is_err());
    }

    /// Arbitrary templates never panic
    #[test]
    fn test_template_no_panic(template in ".*", arg in any::<u8>()) {
        let _ = format_template(&template, &[&arg]);
    }
}
