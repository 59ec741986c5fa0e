//! Recursive-descent parser building a [`Cst`] from the token stream.
//!
//! The core subtlety is trivia attachment around commas: this module
//! consumes trivia only at well-defined points (see
//! [`Parser::consume_trivia_run`] and [`Parser::consume_member_tail`]) so
//! that every run of whitespace/comments ends up owned by exactly one
//! sibling or by the enclosing container.

use std::collections::HashSet;

use crate::cst::{ArrayData, Cst, Node, NodeId, NodeKind, ObjectData, PropertyData};
use crate::error::ParseError;
use crate::lexer::{self, TokKind, Token};

pub(crate) fn parse(source: &str) -> Result<Cst, ParseError> {
    let tokens = lexer::lex(source)?;
    let mut parser = Parser { src: source, tokens, pos: 0, nodes: Vec::new() };

    let leading = parser.consume_trivia_run();
    let root = parser.parse_value(leading)?;
    let trailing = parser.consume_trivia_run();
    parser.nodes[root.0].trailing = trailing;

    if parser.peek_kind() != TokKind::Eof {
        return Err(parser.error_here("unexpected trailing content after top-level value"));
    }

    Ok(Cst { nodes: parser.nodes, root })
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    nodes: Vec<Node>,
}

impl<'a> Parser<'a> {
    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn peek_kind(&self) -> TokKind {
        self.tokens[self.pos].kind
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos];
        self.pos += 1;
        tok
    }

    fn text(&self, tok: Token) -> &'a str {
        &self.src[tok.start..tok.end]
    }

    fn expect(&mut self, kind: TokKind) -> Result<Token, ParseError> {
        if self.peek_kind() == kind {
            Ok(self.bump())
        } else {
            Err(self.error_here(format!("expected {kind:?}")))
        }
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        ParseError::at(self.tokens[self.pos].start, message)
    }

    fn consume_trivia_run(&mut self) -> String {
        let mut out = String::new();
        while self.tokens[self.pos].kind.is_trivia() {
            let tok = self.bump();
            out.push_str(self.text(tok));
        }
        out
    }

    /// Consumes whatever separates a just-parsed member from its successor:
    /// any trivia before a comma, the comma itself if present, and then the
    /// trivia after it up to and including the first newline. Returns
    /// `(this_member_trailing, next_member_leading)`.
    fn consume_member_tail(&mut self) -> (String, String) {
        let mut trailing = self.consume_trivia_run();
        if self.peek_kind() == TokKind::Comma {
            self.bump();
            trailing.push(',');
            let post_comma = self.consume_trivia_run();
            match post_comma.find('\n') {
                Some(nl) => {
                    let cut = nl + 1;
                    trailing.push_str(&post_comma[..cut]);
                    (trailing, post_comma[cut..].to_string())
                }
                None => (trailing, post_comma),
            }
        } else {
            (trailing, String::new())
        }
    }

    /// Parses a comma-separated member list up to (not including) `close`,
    /// returning the parsed members plus the container's interior-head and
    /// interior-tail trivia.
    fn parse_comma_list(
        &mut self,
        close: TokKind,
        mut parse_member: impl FnMut(&mut Self, String) -> Result<NodeId, ParseError>,
    ) -> Result<(Vec<NodeId>, String, String), ParseError> {
        let mut pending_leading = self.consume_trivia_run();
        let mut members = Vec::new();
        loop {
            if self.peek_kind() == close {
                break;
            }
            if self.peek_kind() == TokKind::Eof {
                return Err(self.error_here("unexpected end of input"));
            }
            let leading = std::mem::take(&mut pending_leading);
            let member_id = parse_member(self, leading)?;
            let (trailing, remainder) = self.consume_member_tail();
            self.nodes[member_id.0].trailing = trailing;
            members.push(member_id);
            pending_leading = remainder;
        }
        if members.is_empty() {
            Ok((members, pending_leading, String::new()))
        } else {
            Ok((members, String::new(), pending_leading))
        }
    }

    fn parse_value(&mut self, leading: String) -> Result<NodeId, ParseError> {
        match self.peek_kind() {
            TokKind::LBrace => self.parse_object(leading),
            TokKind::LBracket => self.parse_array(leading),
            TokKind::String => {
                let tok = self.bump();
                let lexeme = self.text(tok).to_string();
                let value = decode_string_lexeme(&lexeme).map_err(|e| ParseError::at(tok.start, e))?;
                Ok(self.alloc(Node { leading, trailing: String::new(), kind: NodeKind::String { lexeme, value } }))
            }
            TokKind::Number => {
                let tok = self.bump();
                let lexeme = self.text(tok).to_string();
                let value = decode_number_lexeme(&lexeme).map_err(|e| ParseError::at(tok.start, e))?;
                Ok(self.alloc(Node { leading, trailing: String::new(), kind: NodeKind::Number { lexeme, value } }))
            }
            TokKind::True => {
                self.bump();
                Ok(self.alloc(Node { leading, trailing: String::new(), kind: NodeKind::Bool(true) }))
            }
            TokKind::False => {
                self.bump();
                Ok(self.alloc(Node { leading, trailing: String::new(), kind: NodeKind::Bool(false) }))
            }
            TokKind::Null => {
                self.bump();
                Ok(self.alloc(Node { leading, trailing: String::new(), kind: NodeKind::Null }))
            }
            _ => Err(self.error_here("expected a JSON value")),
        }
    }

    fn parse_object(&mut self, leading: String) -> Result<NodeId, ParseError> {
        let open = self.bump();
        let open_col = column_of(self.src, open.start);
        let mut seen = HashSet::new();
        let (properties, interior_head, interior_tail) =
            self.parse_comma_list(TokKind::RBrace, |p, member_leading| p.parse_property(member_leading, &mut seen))?;
        self.expect(TokKind::RBrace)?;
        Ok(self.alloc(Node {
            leading,
            trailing: String::new(),
            kind: NodeKind::Object(ObjectData { properties, interior_head, interior_tail, open_col }),
        }))
    }

    fn parse_property(&mut self, leading: String, seen: &mut HashSet<String>) -> Result<NodeId, ParseError> {
        if self.peek_kind() != TokKind::String {
            return Err(self.error_here("expected a string property key"));
        }
        let key_tok = self.bump();
        let key_lexeme = self.text(key_tok).to_string();
        let key_value = decode_string_lexeme(&key_lexeme).map_err(|e| ParseError::at(key_tok.start, e))?;
        if !seen.insert(key_value.clone()) {
            return Err(ParseError::at(key_tok.start, format!("duplicate object key \"{key_value}\"")));
        }
        let key_id = self.alloc(Node {
            leading: String::new(),
            trailing: String::new(),
            kind: NodeKind::String { lexeme: key_lexeme, value: key_value },
        });
        let colon_leading = self.consume_trivia_run();
        self.expect(TokKind::Colon)?;
        let colon_trailing = self.consume_trivia_run();
        let value = self.parse_value(String::new())?;
        Ok(self.alloc(Node {
            leading,
            trailing: String::new(),
            kind: NodeKind::Property(PropertyData { key: key_id, colon_leading, colon_trailing, value }),
        }))
    }

    fn parse_array(&mut self, leading: String) -> Result<NodeId, ParseError> {
        let open = self.bump();
        let open_col = column_of(self.src, open.start);
        let (elements, interior_head, interior_tail) =
            self.parse_comma_list(TokKind::RBracket, |p, member_leading| p.parse_value(member_leading))?;
        self.expect(TokKind::RBracket)?;
        Ok(self.alloc(Node {
            leading,
            trailing: String::new(),
            kind: NodeKind::Array(ArrayData { elements, interior_head, interior_tail, open_col }),
        }))
    }
}

fn column_of(src: &str, offset: usize) -> usize {
    let line_start = src[..offset].rfind('\n').map_or(0, |i| i + 1);
    src[line_start..offset].chars().count()
}

fn decode_string_lexeme(lexeme: &str) -> Result<String, String> {
    serde_json::from_str::<String>(lexeme).map_err(|e| format!("invalid string literal: {e}"))
}

fn decode_number_lexeme(lexeme: &str) -> Result<serde_json::Number, String> {
    serde_json::from_str::<serde_json::Number>(lexeme).map_err(|e| format!("invalid number literal: {e}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_trivial_object() {
        let src = "{}";
        let cst = parse(src).unwrap();
        assert_eq!(cst.render(), src);
    }

    #[test]
    fn round_trips_comments_and_whitespace() {
        let src = "{\n  // leading comment\n  \"a\": 1, // trailing comment\n  \"b\": [1, 2, 3]\n}\n";
        let cst = parse(src).unwrap();
        assert_eq!(cst.render(), src);
    }

    #[test]
    fn round_trips_bom() {
        let src = "\u{FEFF}{\"a\": 1}";
        let cst = parse(src).unwrap();
        assert_eq!(cst.render(), src);
    }

    #[test]
    fn rejects_duplicate_keys() {
        assert!(parse("{\"a\":1,\"a\":2}").is_err());
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(parse("{}garbage").is_err());
    }

    #[test]
    fn decodes_escaped_strings() {
        let cst = parse("{\"a\": \"line\\nbreak\"}").unwrap();
        let prop = cst.as_object(cst.root).properties[0];
        let value = cst.property_value(prop);
        assert_eq!(cst.decoded_value(value), serde_json::json!("line\nbreak"));
    }
}
