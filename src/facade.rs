//! The crate's single public entry point.

use serde_json::Value;

use crate::error::StringifyError;
use crate::logging::{TracingWarnSink, WarnFields, WarnSink};
use crate::{parser, reconcile, render};

const FALLBACK_MESSAGE: &str = "failed to preserve comments while serializing JSONC, falling back to a plain re-print";

/// Serializes `target` back to JSONC text.
///
/// If `original` holds the source the value was originally parsed from, this
/// reconciles `target` against that source's concrete syntax tree and
/// renders the result, preserving every comment, blank line, and formatting
/// choice not affected by the change. If `original` is absent, or it fails
/// to parse, or its root isn't a JSON object, this falls back to a plain
/// `serde_json` pretty-print at `fallback_indent` and reports the reason to
/// `warn`.
///
/// `target` must be a JSON object; any other top-level shape is rejected,
/// since a JSONC config document is always object-shaped.
pub fn stringify_preserving_comments(
    target: &Value,
    original: Option<&str>,
    fallback_indent: &str,
    warn: &dyn WarnSink,
) -> Result<String, StringifyError> {
    let Value::Object(target_map) = target else {
        return Err(StringifyError::TargetNotAnObject(value_type_name(target)));
    };

    let Some(source) = original else {
        return Ok(render::pretty_print(target, fallback_indent));
    };

    match parser::parse(source) {
        Ok(mut cst) if cst.root_is_object() => {
            reconcile::reconcile(&mut cst, cst.root, target_map);
            Ok(cst.render())
        }
        Ok(_) => {
            warn.warn(WarnFields { error: "root of JSONC document is not an object".to_string() }, FALLBACK_MESSAGE);
            Ok(render::pretty_print(target, fallback_indent))
        }
        Err(e) => {
            warn.warn(WarnFields { error: e.to_string() }, FALLBACK_MESSAGE);
            Ok(render::pretty_print(target, fallback_indent))
        }
    }
}

/// Convenience wrapper using a two-space fallback indent and the default
/// `tracing`-backed warning sink.
pub fn stringify_preserving_comments_default(target: &Value, original: Option<&str>) -> Result<String, StringifyError> {
    stringify_preserving_comments(target, original, "  ", &TracingWarnSink)
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
