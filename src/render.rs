//! Deterministic fallback printer, used when there is no original source to
//! preserve (or it couldn't be parsed): a plain `serde_json` pretty-print
//! with a caller-chosen indent, so output is at least stable and readable.

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};

pub(crate) fn pretty_print(target: &Value, indent: &str) -> String {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    target.serialize(&mut serializer).expect("serializing a serde_json::Value cannot fail");
    String::from_utf8(buf).expect("serde_json always writes valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_prints_with_given_indent() {
        let v = serde_json::json!({"a": 1, "b": [1, 2]});
        let out = pretty_print(&v, "    ");
        assert_eq!(out, "{\n    \"a\": 1,\n    \"b\": [\n        1,\n        2\n    ]\n}");
    }

    #[test]
    fn is_deterministic() {
        let v = serde_json::json!({"z": 1, "a": 2});
        assert_eq!(pretty_print(&v, "  "), pretty_print(&v, "  "));
    }
}
