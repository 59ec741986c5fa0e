//! Mutation primitives: the small set of operations the reconciler composes
//! to turn an existing [`Cst`] into one that denotes a target value, without
//! disturbing any trivia it doesn't have to.

use serde_json::Value;

use crate::cst::{ArrayData, Cst, Node, NodeId, NodeKind, ObjectData, PropertyData};

impl Cst {
    /// Rewrites a scalar node's lexeme in place for a new scalar value,
    /// preserving its leading/trailing trivia. `node` must currently be a
    /// scalar (not an object or array) - composite-to-scalar transitions go
    /// through [`Cst::replace_with`] instead.
    pub(crate) fn set_scalar_value(&mut self, node: NodeId, v: &Value) {
        debug_assert!(self.is_scalar(node), "set_scalar_value called on a composite node");
        self.node_mut(node).kind = scalar_node_kind(v);
    }

    /// Replaces a node's entire content with a freshly built subtree for
    /// `v`, preserving only the node's own leading/trailing trivia. Works by
    /// building the new subtree into fresh arena slots, then swapping its
    /// `kind` into `node`'s slot - `node`'s id, and therefore every existing
    /// reference to it, stays valid.
    pub(crate) fn replace_with(&mut self, node: NodeId, v: &Value) {
        let fresh = self.build_value_node(v);
        let kind = std::mem::replace(&mut self.node_mut(fresh).kind, NodeKind::Null);
        self.node_mut(node).kind = kind;
    }

    /// Replaces both a property's key and its value, preserving the
    /// property's own leading/trailing trivia (and therefore any comment
    /// riding on it). Used by the reconciler's key-rename heuristic.
    pub(crate) fn replace_property_with(&mut self, property: NodeId, new_key: &str, v: &Value) {
        let key = self.as_property(property).key;
        let value = self.as_property(property).value;
        self.node_mut(key).kind = NodeKind::String {
            lexeme: encode_string_lexeme(new_key),
            value: new_key.to_string(),
        };
        self.replace_with(value, v);
    }

    /// Inserts a new property at `index`, synthesizing indentation from its
    /// siblings (or from the object's own opening brace if it has none) and
    /// fixing up commas on both sides as needed. Returns the new property's
    /// id.
    ///
    /// Trivia attachment mirrors the parser's own rule: in multi-line mode
    /// the newline that separates one member from the next lives in the
    /// *earlier* member's trailing trivia, never in the later member's
    /// leading trivia, so a new non-first property only ever needs a plain
    /// indent for its leading trivia. In single-line mode the parser's
    /// convention is the mirror image - the comma is the left member's
    /// trailing trivia, but the space after it belongs to the *right*
    /// member's leading trivia - so a new property being inserted before an
    /// untouched existing sibling supplies its own leading space, while its
    /// own trailing trivia is just the bare comma (the next sibling already
    /// carries the space). The one case where the next sibling *isn't*
    /// carrying that space already is inserting as the new first property:
    /// the old first property's leading trivia is cleared (see below) and
    /// the new property's trailing trivia has to carry the separating space
    /// in its place. The other exception is appending past the old last
    /// property, since the old last property's trailing trivia is the
    /// container's closing trivia (the blank line and indentation before
    /// `}`, or just the interior space in single-line mode) and that role
    /// now belongs to the new last property instead.
    pub(crate) fn insert_property(&mut self, object: NodeId, index: usize, key: &str, v: &Value) -> NodeId {
        let multiline = self.object_is_multiline(object) || self.as_object(object).properties.is_empty();
        let value_id = self.build_value_node(v);
        let key_id = self.alloc(Node {
            leading: String::new(),
            trailing: String::new(),
            kind: NodeKind::String { lexeme: encode_string_lexeme(key), value: key.to_string() },
        });
        let leading = match (multiline, index) {
            (true, 0) => format!("\n{}", self.property_base_indent(object)),
            (true, _) => self.property_base_indent(object),
            (false, 0) => String::new(),
            (false, _) => " ".to_string(),
        };
        let prop_id = self.alloc(Node {
            leading,
            trailing: String::new(),
            kind: NodeKind::Property(PropertyData { key: key_id, colon_leading: String::new(), colon_trailing: " ".to_string(), value: value_id }),
        });

        let has_following_sibling = index < self.as_object(object).properties.len();
        if has_following_sibling {
            self.node_mut(prop_id).trailing = match (multiline, index) {
                (true, _) => ",\n".to_string(),
                (false, 0) => ", ".to_string(),
                (false, _) => ",".to_string(),
            };
            if index == 0 {
                if let Some(&old_first) = self.as_object(object).properties.first() {
                    if multiline {
                        self.strip_leading_newline(old_first);
                    } else {
                        self.node_mut(old_first).leading = String::new();
                    }
                }
            }
        } else if index > 0 {
            let prev = self.as_object(object).properties[index - 1];
            self.transfer_closing_trivia(prev, prop_id, multiline);
        }
        self.as_object_mut(object).properties.insert(index, prop_id);
        prop_id
    }

    pub(crate) fn append_property(&mut self, object: NodeId, key: &str, v: &Value) -> NodeId {
        let index = self.as_object(object).properties.len();
        self.insert_property(object, index, key, v)
    }

    /// Removes the property at `index`. The comma that separated it from
    /// its successor is simply discarded along with the rest of the
    /// property's own trailing trivia; if the removed property was last,
    /// the new last property's now-superfluous trailing comma is stripped.
    pub(crate) fn remove_property(&mut self, object: NodeId, index: usize) {
        let was_last = index + 1 == self.as_object(object).properties.len();
        self.as_object_mut(object).properties.remove(index);
        if was_last {
            if let Some(&new_last) = self.as_object(object).properties.last() {
                self.strip_trailing_comma(new_last);
            }
        }
    }

    /// Appends a new last element. Same closing-trivia transplant as
    /// [`Cst::insert_property`]'s append case - arrays never gain a member at
    /// any position but the end, so that's the only case to handle.
    pub(crate) fn append_element(&mut self, array: NodeId, v: &Value) -> NodeId {
        let has_prev = !self.as_array(array).elements.is_empty();
        let multiline = self.array_is_multiline(array) || !has_prev;
        let value_id = self.build_value_node(v);
        self.node_mut(value_id).leading = match (multiline, has_prev) {
            (true, false) => format!("\n{}", self.element_base_indent(array)),
            (true, true) => self.element_base_indent(array),
            (false, _) => String::new(),
        };
        if has_prev {
            let prev = *self.as_array(array).elements.last().expect("has_prev checked");
            self.transfer_closing_trivia(prev, value_id, multiline);
        }
        self.as_array_mut(array).elements.push(value_id);
        value_id
    }

    pub(crate) fn replace_element(&mut self, array: NodeId, index: usize, v: &Value) {
        let element = self.as_array(array).elements[index];
        self.replace_with(element, v);
    }

    /// Same trailing-comma bookkeeping as [`Cst::remove_property`], applied
    /// to an array's elements.
    pub(crate) fn remove_element(&mut self, array: NodeId, index: usize) {
        let was_last = index + 1 == self.as_array(array).elements.len();
        self.as_array_mut(array).elements.remove(index);
        if was_last {
            if let Some(&new_last) = self.as_array(array).elements.last() {
                self.strip_trailing_comma(new_last);
            }
        }
    }

    /// Rewrites a single-line array into a multi-line one, one element per
    /// line at `parent_line_indent` plus two spaces, with the closing
    /// bracket back at `parent_line_indent`. A no-op if the array already
    /// spans multiple lines.
    pub(crate) fn ensure_multiline(&mut self, array: NodeId, parent_line_indent: &str) {
        let already_multiline = {
            let a = self.as_array(array);
            a.interior_head.contains('\n') || a.elements.iter().any(|&e| self.node(e).leading.contains('\n'))
        };
        if already_multiline {
            return;
        }
        let item_indent = format!("{parent_line_indent}  ");
        let elements = self.as_array(array).elements.clone();
        let last = elements.len().saturating_sub(1);
        for (i, &el) in elements.iter().enumerate() {
            self.node_mut(el).leading = format!("\n{item_indent}");
            self.node_mut(el).trailing = if i == last { String::new() } else { ",".to_string() };
        }
        let a = self.as_array_mut(array);
        a.interior_head = String::new();
        a.interior_tail = format!("\n{parent_line_indent}");
    }

    /// Whether `object` currently spans more than one line, judged from its
    /// existing trivia. Drives whether a freshly inserted property adopts
    /// multi-line (one property per line) or single-line (`, `-separated)
    /// formatting.
    fn object_is_multiline(&self, object: NodeId) -> bool {
        let obj = self.as_object(object);
        obj.interior_head.contains('\n') || obj.properties.iter().any(|&p| self.node(p).leading.contains('\n') || self.node(p).trailing.contains('\n'))
    }

    fn array_is_multiline(&self, array: NodeId) -> bool {
        let arr = self.as_array(array);
        arr.interior_head.contains('\n') || arr.elements.iter().any(|&e| self.node(e).leading.contains('\n') || self.node(e).trailing.contains('\n'))
    }

    /// The indentation a sibling property sits at, with any leading newline
    /// stripped - i.e. just the whitespace between the start of the line and
    /// the property's first token. Falls back to the object's own opening
    /// column plus two spaces when it has no properties to sample from yet.
    fn property_base_indent(&self, object: NodeId) -> String {
        let obj = self.as_object(object);
        if let Some(&first) = obj.properties.first() {
            self.line_indent_of(first)
        } else {
            " ".repeat(obj.open_col + 2)
        }
    }

    fn element_base_indent(&self, array: NodeId) -> String {
        let arr = self.as_array(array);
        if let Some(&first) = arr.elements.first() {
            self.line_indent_of(first)
        } else {
            " ".repeat(arr.open_col + 2)
        }
    }

    /// Removes a single leading newline from `node`'s leading trivia, if
    /// present, demoting it from "first member of its container" (whose
    /// leading trivia carries the newline after `{`/`[`) to "has a preceding
    /// sibling" (whose leading trivia is indentation only).
    fn strip_leading_newline(&mut self, node: NodeId) {
        let n = self.node_mut(node);
        if let Some(rest) = n.leading.strip_prefix('\n') {
            n.leading = rest.to_string();
        }
    }

    /// When `new_last` is appended after `prev` (previously the container's
    /// last member), `prev`'s existing trailing trivia - which used to close
    /// the container - moves onto `new_last` verbatim, including any
    /// trailing comment; `prev` gets a plain separator in its place.
    ///
    /// In single-line mode the separating space is only added here if
    /// `new_last` doesn't already carry its own leading space: object
    /// properties synthesize that space into their own leading trivia
    /// (see [`Cst::insert_property`]), so here the separator is the bare
    /// comma; array elements don't (see [`Cst::append_element`]), so here
    /// it has to supply the space itself. Stacking both would double it.
    fn transfer_closing_trivia(&mut self, prev: NodeId, new_last: NodeId, multiline: bool) {
        let moved = std::mem::take(&mut self.node_mut(prev).trailing);
        let new_last_has_own_leading_space = !multiline && !self.node(new_last).leading.is_empty();
        self.node_mut(prev).trailing = if multiline {
            ",\n".to_string()
        } else if new_last_has_own_leading_space {
            ",".to_string()
        } else {
            ", ".to_string()
        };
        self.node_mut(new_last).trailing = moved;
    }

    fn strip_trailing_comma(&mut self, node: NodeId) {
        let n = self.node_mut(node);
        if let Some(idx) = n.trailing.find(',') {
            n.trailing.remove(idx);
        }
    }

    /// Builds a brand new, trivia-free subtree denoting `v`, formatted
    /// single-line: `{ "a": 1, "b": 2 }` for objects (matching the rest of
    /// the crate's bracket-spacing convention), `[1, 2, 3]` for arrays.
    /// Callers that need the result multi-line call [`Cst::ensure_multiline`]
    /// afterwards.
    fn build_value_node(&mut self, v: &Value) -> NodeId {
        match v {
            Value::Null => self.alloc_node(NodeKind::Null),
            Value::Bool(b) => self.alloc_node(NodeKind::Bool(*b)),
            Value::Number(n) => self.alloc_node(NodeKind::Number { lexeme: n.to_string(), value: n.clone() }),
            Value::String(s) => self.alloc_node(NodeKind::String { lexeme: encode_string_lexeme(s), value: s.clone() }),
            Value::Array(items) => {
                let n = items.len();
                let elements: Vec<NodeId> = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let id = self.build_value_node(item);
                        if i + 1 < n {
                            self.node_mut(id).trailing = ", ".to_string();
                        }
                        id
                    })
                    .collect();
                self.alloc_node(NodeKind::Array(ArrayData { elements, interior_head: String::new(), interior_tail: String::new(), open_col: 0 }))
            }
            Value::Object(map) => {
                let n = map.len();
                let properties: Vec<NodeId> = map
                    .iter()
                    .enumerate()
                    .map(|(i, (k, val))| {
                        let value_id = self.build_value_node(val);
                        let key_id = self.alloc(Node {
                            leading: String::new(),
                            trailing: String::new(),
                            kind: NodeKind::String { lexeme: encode_string_lexeme(k), value: k.clone() },
                        });
                        let trailing = if i + 1 < n { ", ".to_string() } else { String::new() };
                        self.alloc(Node {
                            leading: String::new(),
                            trailing,
                            kind: NodeKind::Property(PropertyData { key: key_id, colon_leading: String::new(), colon_trailing: " ".to_string(), value: value_id }),
                        })
                    })
                    .collect();
                let (head, tail) = if properties.is_empty() { (String::new(), String::new()) } else { (" ".to_string(), " ".to_string()) };
                self.alloc_node(NodeKind::Object(ObjectData { properties, interior_head: head, interior_tail: tail, open_col: 0 }))
            }
        }
    }

    fn alloc_node(&mut self, kind: NodeKind) -> NodeId {
        self.alloc(Node { leading: String::new(), trailing: String::new(), kind })
    }
}

fn scalar_node_kind(v: &Value) -> NodeKind {
    match v {
        Value::Null => NodeKind::Null,
        Value::Bool(b) => NodeKind::Bool(*b),
        Value::Number(n) => NodeKind::Number { lexeme: n.to_string(), value: n.clone() },
        Value::String(s) => NodeKind::String { lexeme: encode_string_lexeme(s), value: s.clone() },
        Value::Array(_) | Value::Object(_) => unreachable!("scalar_node_kind called with a composite value"),
    }
}

/// Minimal-escape JSON string encoding, reusing `serde_json`'s own
/// formatter rather than hand-rolling escape rules.
fn encode_string_lexeme(s: &str) -> String {
    serde_json::to_string(s).expect("serializing a &str to JSON cannot fail")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn set_scalar_value_preserves_trivia() {
        let mut cst = parse("{ \"a\": 1 /* keep */ }").unwrap();
        let prop = cst.as_object(cst.root).properties[0];
        let value = cst.property_value(prop);
        cst.set_scalar_value(value, &serde_json::json!(2));
        assert_eq!(cst.render(), "{ \"a\": 2 /* keep */ }");
    }

    #[test]
    fn insert_property_adds_comma_to_previous_last() {
        let mut cst = parse("{\n  \"a\": 1\n}").unwrap();
        cst.append_property(cst.root, "b", &serde_json::json!(2));
        assert_eq!(cst.render(), "{\n  \"a\": 1,\n  \"b\": 2\n}");
    }

    #[test]
    fn remove_last_property_strips_preceding_comma() {
        let mut cst = parse("{\n  \"a\": 1,\n  \"b\": 2\n}").unwrap();
        cst.remove_property(cst.root, 1);
        assert_eq!(cst.render(), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn append_element_to_multiline_array_preserves_formatting() {
        let mut cst = parse("{\n  \"a\": [\n    1\n  ]\n}").unwrap();
        let prop = cst.as_object(cst.root).properties[0];
        let array = cst.property_value(prop);
        cst.append_element(array, &serde_json::json!(2));
        assert_eq!(cst.render(), "{\n  \"a\": [\n    1,\n    2\n  ]\n}");
    }

    #[test]
    fn insert_property_as_new_first_preserves_old_first_formatting() {
        let mut cst = parse("{\n  \"a\": 1\n}").unwrap();
        cst.insert_property(cst.root, 0, "z", &serde_json::json!(0));
        assert_eq!(cst.render(), "{\n  \"z\": 0,\n  \"a\": 1\n}");
    }

    #[test]
    fn append_property_to_single_line_object_uses_single_space_separator() {
        let mut cst = parse("{ \"a\": 1 }").unwrap();
        cst.append_property(cst.root, "b", &serde_json::json!(2));
        assert_eq!(cst.render(), "{ \"a\": 1, \"b\": 2 }");
    }

    #[test]
    fn insert_property_into_single_line_object_uses_single_space_separator() {
        let mut cst = parse("{\"a\": 1, \"c\": 3}").unwrap();
        cst.insert_property(cst.root, 1, "b", &serde_json::json!(2));
        assert_eq!(cst.render(), "{\"a\": 1, \"b\": 2, \"c\": 3}");
    }

    #[test]
    fn ensure_multiline_upgrades_single_line_array() {
        let mut cst = parse("{ \"a\": [] }").unwrap();
        let prop = cst.as_object(cst.root).properties[0];
        let value = cst.property_value(prop);
        cst.replace_with(value, &serde_json::json!(["x"]));
        cst.ensure_multiline(value, "  ");
        assert_eq!(cst.render(), "{ \"a\": [\n    \"x\"\n  ] }");
    }
}
