//! Documentation-comment type extraction.
//!
//! A `/** ... */` block immediately preceding a declaration may annotate
//! parameters with `@param {type} name` tags. The braced type text is fed
//! back through the type parser; a tag whose type text does not parse is
//! still recorded, as `Unsupported`, so downstream resolution degrades it
//! to the unknown descriptor rather than pretending no annotation exists.

use crate::ast::TypeNode;
use crate::parser::parse_type_text;

/// Structured view of a documentation comment.
#[derive(Debug, Clone, Default)]
pub struct JsDoc {
    /// `@param` tags in source order: (parameter name, annotated type).
    pub params: Vec<(String, TypeNode)>,
}

impl JsDoc {
    /// The documented type for a parameter, if any.
    pub fn param_type(&self, name: &str) -> Option<&TypeNode> {
        self.params
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, ty)| ty)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Parse the raw text of a `/** ... */` block (delimiters included).
pub fn parse_doc_text(text: &str) -> JsDoc {
    let mut doc = JsDoc::default();
    let mut rest = text;

    while let Some(at) = rest.find("@param") {
        rest = &rest["@param".len() + at..];
        let Some((type_text, after_brace)) = braced_type(rest) else {
            continue;
        };
        let Some(name) = param_name(after_brace) else {
            continue;
        };
        let ty = parse_type_text(type_text).unwrap_or(TypeNode::Unsupported);
        doc.params.push((name.to_string(), ty));
        rest = after_brace;
    }

    doc
}

/// Extract a brace-balanced `{...}` group following an `@param` tag.
/// Returns the inner text and the remainder after the closing brace.
fn braced_type(text: &str) -> Option<(&str, &str)> {
    let trimmed = text.trim_start();
    let inner_start = trimmed.strip_prefix('{')?;
    let mut depth = 1usize;
    for (i, ch) in inner_start.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&inner_start[..i], &inner_start[i + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

/// The parameter name token following the braced type.
fn param_name(text: &str) -> Option<&str> {
    let trimmed = text.trim_start();
    let end = trimmed
        .char_indices()
        .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '$'))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    if end == 0 { None } else { Some(&trimmed[..end]) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{TypeKeyword, TypeNode};

    #[test]
    fn extracts_param_tags_in_order() {
        let doc = parse_doc_text(
            "/**\n * Adds things.\n * @param {number} a\n * @param {string} b\n */",
        );
        assert_eq!(doc.params.len(), 2);
        assert_eq!(doc.params[0].0, "a");
        assert_eq!(doc.params[0].1, TypeNode::Keyword(TypeKeyword::Number));
        assert_eq!(doc.params[1].0, "b");
        assert_eq!(doc.params[1].1, TypeNode::Keyword(TypeKeyword::String));
    }

    #[test]
    fn braced_union_type_parses() {
        let doc = parse_doc_text("/** @param {string | number} x */");
        match doc.param_type("x") {
            Some(TypeNode::Union(alts)) => assert_eq!(alts.len(), 2),
            other => panic!("expected union, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_type_is_recorded_as_unsupported() {
        let doc = parse_doc_text("/** @param {number=} x */");
        assert_eq!(doc.param_type("x"), Some(&TypeNode::Unsupported));
    }

    #[test]
    fn tag_without_braces_is_skipped() {
        let doc = parse_doc_text("/** @param x plain description */");
        assert!(doc.is_empty());
    }
}
