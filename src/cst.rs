//! The lossless concrete syntax tree: a flat arena of nodes, each carrying
//! its own leading and trailing trivia, so that every byte of a parsed
//! document is owned by exactly one node.

use serde_json::{Map, Value};

/// A handle into a [`Cst`]'s node arena. Stable for the lifetime of the
/// tree: nodes are never relocated or freed once allocated, only unlinked
/// from their parent's child list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// A lossless, mutable JSONC document.
///
/// Every node owns the literal source text immediately surrounding it
/// (whitespace, comments, and - for object/array members - the separating
/// comma) as `leading`/`trailing` trivia. Rendering the tree is just a
/// depth-first walk that concatenates trivia and token text; see
/// [`Cst::render`].
#[derive(Debug)]
pub struct Cst {
    pub(crate) nodes: Vec<Node>,
    pub root: NodeId,
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) leading: String,
    pub(crate) trailing: String,
    pub(crate) kind: NodeKind,
}

#[derive(Debug)]
pub(crate) enum NodeKind {
    Null,
    Bool(bool),
    Number {
        lexeme: String,
        value: serde_json::Number,
    },
    String {
        lexeme: String,
        value: String,
    },
    Array(ArrayData),
    Object(ObjectData),
    Property(PropertyData),
}

#[derive(Debug)]
pub(crate) struct ArrayData {
    pub(crate) elements: Vec<NodeId>,
    /// Trivia between `[` and the first element. Only ever non-empty for an
    /// array with zero elements - once there is a first element, this span
    /// is that element's own leading trivia instead, to keep trivia owned by
    /// exactly one node.
    pub(crate) interior_head: String,
    /// Trivia between the last element and `]`.
    pub(crate) interior_tail: String,
    /// Source column of the opening `[`, used to infer indentation for
    /// elements appended to an originally-empty array.
    pub(crate) open_col: usize,
}

#[derive(Debug)]
pub(crate) struct ObjectData {
    pub(crate) properties: Vec<NodeId>,
    pub(crate) interior_head: String,
    pub(crate) interior_tail: String,
    pub(crate) open_col: usize,
}

#[derive(Debug)]
pub(crate) struct PropertyData {
    pub(crate) key: NodeId,
    pub(crate) colon_leading: String,
    pub(crate) colon_trailing: String,
    pub(crate) value: NodeId,
}

impl Cst {
    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub(crate) fn as_object(&self, id: NodeId) -> &ObjectData {
        match &self.node(id).kind {
            NodeKind::Object(o) => o,
            _ => unreachable!("expected an object node"),
        }
    }

    pub(crate) fn as_object_mut(&mut self, id: NodeId) -> &mut ObjectData {
        match &mut self.node_mut(id).kind {
            NodeKind::Object(o) => o,
            _ => unreachable!("expected an object node"),
        }
    }

    pub(crate) fn as_array(&self, id: NodeId) -> &ArrayData {
        match &self.node(id).kind {
            NodeKind::Array(a) => a,
            _ => unreachable!("expected an array node"),
        }
    }

    pub(crate) fn as_array_mut(&mut self, id: NodeId) -> &mut ArrayData {
        match &mut self.node_mut(id).kind {
            NodeKind::Array(a) => a,
            _ => unreachable!("expected an array node"),
        }
    }

    pub(crate) fn as_property(&self, id: NodeId) -> &PropertyData {
        match &self.node(id).kind {
            NodeKind::Property(p) => p,
            _ => unreachable!("expected a property node"),
        }
    }

    pub(crate) fn is_scalar(&self, id: NodeId) -> bool {
        matches!(
            self.node(id).kind,
            NodeKind::Null | NodeKind::Bool(_) | NodeKind::Number { .. } | NodeKind::String { .. }
        )
    }

    pub fn root_is_object(&self) -> bool {
        matches!(self.node(self.root).kind, NodeKind::Object(_))
    }

    pub(crate) fn node_kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub(crate) fn array_len(&self, id: NodeId) -> usize {
        self.as_array(id).elements.len()
    }

    pub(crate) fn property_key(&self, property: NodeId) -> &str {
        let key_id = self.as_property(property).key;
        match &self.node(key_id).kind {
            NodeKind::String { value, .. } => value,
            _ => unreachable!("a property key is always a string node"),
        }
    }

    pub(crate) fn property_value(&self, property: NodeId) -> NodeId {
        self.as_property(property).value
    }

    pub(crate) fn property_index(&self, object: NodeId, property: NodeId) -> usize {
        self.as_object(object)
            .properties
            .iter()
            .position(|&p| p == property)
            .expect("property belongs to the given object")
    }

    pub(crate) fn get_property(&self, object: NodeId, key: &str) -> Option<NodeId> {
        self.as_object(object)
            .properties
            .iter()
            .copied()
            .find(|&p| self.property_key(p) == key)
    }

    /// The indentation of the line `node`'s own leading trivia ends on, i.e.
    /// everything after the last newline in its leading trivia (or the whole
    /// leading trivia, if it holds no newline at all).
    pub(crate) fn line_indent_of(&self, node: NodeId) -> String {
        let leading = &self.node(node).leading;
        match leading.rfind('\n') {
            Some(idx) => leading[idx + 1..].to_string(),
            None => leading.clone(),
        }
    }

    /// Reconstructs the `serde_json::Value` this node denotes, discarding
    /// all trivia. Used by the reconciler to test whether a subtree already
    /// matches a target value, so that untouched subtrees keep their exact
    /// original formatting.
    pub(crate) fn decoded_value(&self, id: NodeId) -> Value {
        match &self.node(id).kind {
            NodeKind::Null => Value::Null,
            NodeKind::Bool(b) => Value::Bool(*b),
            NodeKind::Number { value, .. } => Value::Number(value.clone()),
            NodeKind::String { value, .. } => Value::String(value.clone()),
            NodeKind::Array(a) => Value::Array(a.elements.iter().map(|&e| self.decoded_value(e)).collect()),
            NodeKind::Object(o) => {
                let mut map = Map::new();
                for &p in &o.properties {
                    let pd = self.as_property(p);
                    map.insert(self.property_key(p).to_string(), self.decoded_value(pd.value));
                }
                Value::Object(map)
            }
            NodeKind::Property(_) => unreachable!("decoded_value is never called on a property node directly"),
        }
    }

    /// Renders the tree back to source text by walking it depth-first and
    /// concatenating every node's leading trivia, token text, and trailing
    /// trivia in order.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(self.root, &mut out);
        out
    }

    fn render_node(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        out.push_str(&node.leading);
        match &node.kind {
            NodeKind::Null => out.push_str("null"),
            NodeKind::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            NodeKind::Number { lexeme, .. } => out.push_str(lexeme),
            NodeKind::String { lexeme, .. } => out.push_str(lexeme),
            NodeKind::Array(a) => {
                out.push('[');
                out.push_str(&a.interior_head);
                for &e in &a.elements {
                    self.render_node(e, out);
                }
                out.push_str(&a.interior_tail);
                out.push(']');
            }
            NodeKind::Object(o) => {
                out.push('{');
                out.push_str(&o.interior_head);
                for &p in &o.properties {
                    self.render_node(p, out);
                }
                out.push_str(&o.interior_tail);
                out.push('}');
            }
            NodeKind::Property(p) => {
                self.render_node(p.key, out);
                out.push_str(&p.colon_leading);
                out.push(':');
                out.push_str(&p.colon_trailing);
                self.render_node(p.value, out);
            }
        }
        out.push_str(&node.trailing);
    }
}
