//! End-to-end scenarios against the public API, mirroring the concrete
//! examples used to pin down the reconciler's trivia-preservation behavior.

use jsonc_preserve::{RecordingWarnSink, StringifyError, stringify_preserving_comments, stringify_preserving_comments_default};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn basic_value_update() {
    let source = r#"{ "enabled": true, "extends": ["config:recommended"], "timezone": "America/New_York" }"#;
    let target = json!({
        "enabled": true,
        "extends": ["config:base"],
        "timezone": "America/New_York",
    });
    let sink = RecordingWarnSink::new();
    let out = stringify_preserving_comments(&target, Some(source), "  ", &sink).unwrap();
    assert_eq!(out, r#"{ "enabled": true, "extends": ["config:base"], "timezone": "America/New_York" }"#);
    assert!(sink.recorded().is_empty());
}

#[test]
fn comment_preservation_on_value_change() {
    let source = "{\n  // before enabled\n  \"enabled\": true,\n  /* about extends */\n  \"extends\": [\"config:recommended\"]\n}\n";
    let target = json!({
        "enabled": true,
        "extends": ["config:base"],
    });
    let out = stringify_preserving_comments_default(&target, Some(source)).unwrap();
    assert!(out.contains("// before enabled"));
    assert!(out.contains("/* about extends */"));
    assert!(out.contains("\"extends\": [\"config:base\"]"));
}

#[test]
fn append_adds_new_key_at_end_with_inferred_indent() {
    let source = "{\n  \"enabled\": true\n}\n";
    let target = json!({
        "enabled": true,
        "prHourlyLimit": 2,
    });
    let out = stringify_preserving_comments_default(&target, Some(source)).unwrap();
    assert_eq!(out, "{\n  \"enabled\": true,\n  \"prHourlyLimit\": 2\n}\n");
}

#[test]
fn append_to_single_line_object_uses_single_space_separator() {
    let source = r#"{ "enabled": true }"#;
    let target = json!({
        "enabled": true,
        "prHourlyLimit": 2,
    });
    let out = stringify_preserving_comments_default(&target, Some(source)).unwrap();
    assert_eq!(out, r#"{ "enabled": true, "prHourlyLimit": 2 }"#);
}

#[test]
fn remove_drops_key_and_comma_but_keeps_neighboring_comments() {
    let source = "{\n  \"keepMe\": 1, // keep this comment\n  \"oldProperty\": 2,\n  \"alsoKeep\": 3\n}\n";
    let target = json!({
        "keepMe": 1,
        "alsoKeep": 3,
    });
    let out = stringify_preserving_comments_default(&target, Some(source)).unwrap();
    assert!(!out.contains("oldProperty"));
    assert!(out.contains("\"keepMe\": 1, // keep this comment"));
    assert_eq!(out, "{\n  \"keepMe\": 1, // keep this comment\n  \"alsoKeep\": 3\n}\n");
}

#[test]
fn rename_with_trailing_comment_preserves_the_comment() {
    let source = "{\n  \"toBeRenamedProperty\": \"oldvalue\", // should not be removed\n  \"other\": 1\n}\n";
    let target = json!({
        "renamedProperty": "newvalue",
        "other": 1,
    });
    let out = stringify_preserving_comments_default(&target, Some(source)).unwrap();
    assert_eq!(out, "{\n  \"renamedProperty\": \"newvalue\", // should not be removed\n  \"other\": 1\n}\n");
}

#[test]
fn scalar_to_array_promotion_goes_multiline() {
    let source = "{\n  \"replacedWithArray\": \"someString\"\n}\n";
    let target = json!({
        "replacedWithArray": ["someValue"],
    });
    let out = stringify_preserving_comments_default(&target, Some(source)).unwrap();
    assert_eq!(out, "{\n  \"replacedWithArray\": [\n    \"someValue\"\n  ]\n}\n");
}

#[test]
fn invalid_source_falls_back_and_warns_once() {
    let source = "invalid json{";
    let target = json!({"a": 1});
    let sink = RecordingWarnSink::new();
    let out = stringify_preserving_comments(&target, Some(source), "  ", &sink).unwrap();
    assert_eq!(out, "{\n  \"a\": 1\n}");
    let recorded = sink.recorded();
    assert_eq!(recorded.len(), 1);
    assert!(!recorded[0].0.is_empty());
}

#[test]
fn round_trip_identity_for_untouched_document() {
    let source = "{\n  // a leading comment\n  \"a\": 1,\n  \"b\": [1, 2, 3],\n  \"c\": { \"nested\": true } // trailing\n}\n";
    let parsed: serde_json::Value = serde_json_lenient_parse(source);
    let out = stringify_preserving_comments_default(&parsed, Some(source)).unwrap();
    assert_eq!(out, source);
}

#[test]
fn fallback_without_source_matches_plain_pretty_print() {
    let target = json!({"z": 1, "a": [1, 2]});
    let out = stringify_preserving_comments_default(&target, None).unwrap();
    assert_eq!(out, "{\n  \"z\": 1,\n  \"a\": [\n    1,\n    2\n  ]\n}");
}

#[test]
fn non_object_target_is_rejected() {
    let sink = RecordingWarnSink::new();
    let err = stringify_preserving_comments(&json!([1, 2, 3]), None, "  ", &sink).unwrap_err();
    assert!(matches!(err, StringifyError::TargetNotAnObject("array")));
}

/// Builds the `serde_json::Value` a JSONC source decodes to, without going
/// through this crate's own lexer (this is test setup, standing in for
/// whatever upstream parser a caller of this crate already owns - this crate
/// only ever reconciles against a value the caller already has in hand).
fn serde_json_lenient_parse(source: &str) -> serde_json::Value {
    let mut stripped = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '/' && chars.peek() == Some(&'/') {
            for c in chars.by_ref() {
                if c == '\n' {
                    break;
                }
            }
        } else if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            let mut prev = ' ';
            for c in chars.by_ref() {
                if prev == '*' && c == '/' {
                    break;
                }
                prev = c;
            }
        } else {
            stripped.push(c);
        }
    }
    serde_json::from_str(&stripped).expect("test fixture must be valid once comments are stripped")
}
