//! Diffs a target `serde_json::Value` against an existing CST object and
//! applies the minimal set of [`crate::mutate`] primitives needed to make
//! the tree denote that value, leaving everything else untouched.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::cst::{Cst, NodeId, NodeKind};

/// Reconciles `object` (which must be an object node) against `target`,
/// key by key:
///
/// - A key present in both is recursed into via [`reconcile_value`].
/// - A key new to the target is, if the slot at the position it would be
///   inserted at currently holds a to-be-removed key, treated as a rename
///   (preserving that property's comments) rather than an insert+remove.
/// - A key that disappears from the target (and wasn't consumed by a
///   rename) is removed.
pub(crate) fn reconcile(cst: &mut Cst, object: NodeId, target: &Map<String, Value>) {
    let existing_keys: Vec<String> = cst
        .as_object(object)
        .properties
        .iter()
        .map(|&p| cst.property_key(p).to_string())
        .collect();

    let mut to_remove: HashSet<String> = existing_keys.into_iter().filter(|k| !target.contains_key(k)).collect();
    let mut processed: HashSet<String> = HashSet::new();
    let mut insert_index = 0usize;

    for (key, value) in target {
        if let Some(existing_id) = cst.get_property(object, key) {
            let indent = cst.line_indent_of(existing_id);
            let value_id = cst.property_value(existing_id);
            reconcile_value(cst, value_id, value, &indent);
            insert_index = cst.property_index(object, existing_id) + 1;
            processed.insert(key.clone());
            continue;
        }

        let rename_candidate = cst.as_object(object).properties.get(insert_index).copied().filter(|&id| {
            let k = cst.property_key(id);
            to_remove.contains(k) && !processed.contains(k)
        });

        if let Some(candidate) = rename_candidate {
            let old_key = cst.property_key(candidate).to_string();
            let indent = cst.line_indent_of(candidate);
            cst.replace_property_with(candidate, key, value);
            to_remove.remove(&old_key);
            processed.insert(old_key);
            processed.insert(key.clone());
            insert_index = cst.property_index(object, candidate) + 1;
            if let Value::Array(items) = value {
                if !items.is_empty() {
                    let value_id = cst.property_value(candidate);
                    cst.ensure_multiline(value_id, &indent);
                }
            }
        } else {
            let new_id = cst.insert_property(object, insert_index, key, value);
            let indent = cst.line_indent_of(new_id);
            insert_index += 1;
            if let Value::Array(items) = value {
                if !items.is_empty() {
                    let value_id = cst.property_value(new_id);
                    cst.ensure_multiline(value_id, &indent);
                }
            }
        }
    }

    for key in to_remove.into_iter().filter(|k| !processed.contains(k)) {
        if let Some(idx) = cst.as_object(object).properties.iter().position(|&p| cst.property_key(p) == key) {
            cst.remove_property(object, idx);
        }
    }
}

/// Reconciles a single value slot (an object property's value, or - via
/// [`reconcile_array`] - an array element) against `value`. `line_indent`
/// is the indentation of the line the slot's own leading trivia ends on,
/// used only if an array at this slot needs to be promoted to multi-line.
fn reconcile_value(cst: &mut Cst, node: NodeId, value: &Value, line_indent: &str) {
    if cst.decoded_value(node) == *value {
        return;
    }
    match value {
        Value::Array(items) => reconcile_array(cst, node, items, line_indent),
        Value::Object(map) => {
            if matches!(cst.node_kind(node), NodeKind::Object(_)) {
                reconcile(cst, node, map);
            } else {
                cst.replace_with(node, value);
            }
        }
        scalar => {
            if cst.is_scalar(node) {
                cst.set_scalar_value(node, scalar);
            } else {
                cst.replace_with(node, scalar);
            }
        }
    }
}

/// If `node` is already an array, reuses and extends/truncates its element
/// list in place (no per-element diffing - see the crate's design notes on
/// why array elements are always replaced wholesale rather than recursed
/// into). Otherwise rebuilds the slot from scratch as a fresh array.
fn reconcile_array(cst: &mut Cst, node: NodeId, items: &[Value], line_indent: &str) {
    if matches!(cst.node_kind(node), NodeKind::Array(_)) {
        let existing_len = cst.array_len(node);
        for i in (items.len()..existing_len).rev() {
            cst.remove_element(node, i);
        }
        for (i, item) in items.iter().enumerate() {
            if i < cst.array_len(node) {
                cst.replace_element(node, i, item);
            } else {
                cst.append_element(node, item);
            }
        }
    } else {
        cst.replace_with(node, &Value::Array(items.to_vec()));
        if !items.is_empty() {
            cst.ensure_multiline(node, line_indent);
        }
    }
}
