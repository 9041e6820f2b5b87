//! Recursive-descent parser over the scanned token vector.
//!
//! Split by syntax class: `statements`, `expressions`, and `types` each
//! extend the same `Parser` state. Speculative parses (arrow-function
//! detection, function-type detection) save and restore the token index.

mod expressions;
mod statements;
mod types;

use quicklens_common::Span;
use thiserror::Error;

use crate::ast::{Expr, SourceFile, TypeNode};
use crate::jsdoc::{self, JsDoc};
use crate::scanner::{self, DocComment, Token};
use crate::syntax_kind::SyntaxKind;

/// A fatal parse diagnostic. The engine is never invoked for a file that
/// fails to parse, so the first error wins.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            span,
        }
    }
}

/// Parse a whole source file into its declaration tree.
pub fn parse_source(source: &str) -> Result<SourceFile, ParseError> {
    let mut parser = Parser::new(source)?;
    let mut items = Vec::new();
    while !parser.at(SyntaxKind::EndOfFile) {
        parser.parse_statement_into(&mut items)?;
    }
    Ok(SourceFile { items })
}

/// Parse a standalone expression (used for call-expression text and
/// template interpolations).
pub fn parse_expression_text(source: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(source)?;
    let expr = parser.parse_expression()?;
    parser.expect_eof()?;
    Ok(expr)
}

/// Parse a standalone type annotation (used for JSDoc braced types).
pub fn parse_type_text(source: &str) -> Result<TypeNode, ParseError> {
    let mut parser = Parser::new(source)?;
    let ty = parser.parse_type()?;
    parser.expect_eof()?;
    Ok(ty)
}

pub(crate) struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    doc_comments: Vec<DocComment>,
    idx: usize,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str) -> Result<Self, ParseError> {
        let scanned = scanner::scan(source)?;
        Ok(Parser {
            source,
            tokens: scanned.tokens,
            doc_comments: scanned.doc_comments,
            idx: 0,
        })
    }

    // =========================================================================
    // Token access
    // =========================================================================

    pub(crate) fn current(&self) -> Token {
        self.tokens[self.idx.min(self.tokens.len() - 1)]
    }

    pub(crate) fn kind(&self) -> SyntaxKind {
        self.current().kind
    }

    pub(crate) fn nth_kind(&self, n: usize) -> SyntaxKind {
        self.tokens
            .get(self.idx + n)
            .map(|t| t.kind)
            .unwrap_or(SyntaxKind::EndOfFile)
    }

    pub(crate) fn token_text(&self) -> &'src str {
        self.current().text(self.source)
    }

    fn nth_text(&self, n: usize) -> &'src str {
        self.tokens
            .get(self.idx + n)
            .map(|t| t.text(self.source))
            .unwrap_or("")
    }

    pub(crate) fn bump(&mut self) -> Token {
        let token = self.current();
        if self.idx < self.tokens.len() - 1 {
            self.idx += 1;
        }
        token
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.kind() == kind
    }

    /// Contextual keyword check: an `Identifier` with the given text.
    pub(crate) fn at_word(&self, word: &str) -> bool {
        self.kind() == SyntaxKind::Identifier && self.token_text() == word
    }

    pub(crate) fn nth_is_word(&self, n: usize, word: &str) -> bool {
        self.nth_kind(n) == SyntaxKind::Identifier && self.nth_text(n) == word
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind, what: &str) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.error_here(format!("expected {what}")))
        }
    }

    pub(crate) fn expect_identifier(&mut self, what: &str) -> Result<(String, Span), ParseError> {
        if self.at(SyntaxKind::Identifier) {
            let token = self.bump();
            Ok((token.text(self.source).to_string(), token.span))
        } else {
            Err(self.error_here(format!("expected {what}")))
        }
    }

    fn expect_eof(&mut self) -> Result<(), ParseError> {
        if self.at(SyntaxKind::EndOfFile) {
            Ok(())
        } else {
            Err(self.error_here("expected end of input"))
        }
    }

    pub(crate) fn error_here(&self, message: impl Into<String>) -> ParseError {
        let mut message = message.into();
        let token = self.current();
        if token.kind == SyntaxKind::EndOfFile {
            message.push_str(", found end of file");
        } else {
            message.push_str(&format!(", found `{}`", token.text(self.source)));
        }
        ParseError::new(message, token.span)
    }

    // =========================================================================
    // Speculation
    // =========================================================================

    pub(crate) fn snapshot(&self) -> usize {
        self.idx
    }

    pub(crate) fn restore(&mut self, snapshot: usize) {
        self.idx = snapshot;
    }

    /// Token index of the matching `CloseParen` for an `OpenParen` at the
    /// current position, if it exists before end of file.
    pub(crate) fn find_matching_paren(&self) -> Option<usize> {
        if !self.at(SyntaxKind::OpenParen) {
            return None;
        }
        let mut depth = 0usize;
        for (offset, token) in self.tokens[self.idx..].iter().enumerate() {
            match token.kind {
                SyntaxKind::OpenParen => depth += 1,
                SyntaxKind::CloseParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(self.idx + offset);
                    }
                }
                SyntaxKind::EndOfFile => return None,
                _ => {}
            }
        }
        None
    }

    // =========================================================================
    // Doc comments
    // =========================================================================

    /// The doc comment attached to a declaration starting at `pos`: the
    /// last `/** ... */` before it, separated only by whitespace or the
    /// `export`/`default` modifiers.
    pub(crate) fn doc_for(&self, pos: u32) -> Option<JsDoc> {
        let doc = self
            .doc_comments
            .iter()
            .rev()
            .find(|d| d.span.end <= pos)?;
        let gap = &self.source[doc.span.end as usize..pos as usize];
        let only_modifiers = gap
            .split_whitespace()
            .all(|word| word == "export" || word == "default");
        if !only_modifiers {
            return None;
        }
        let parsed = jsdoc::parse_doc_text(doc.span.text(self.source));
        if parsed.is_empty() { None } else { Some(parsed) }
    }
}

#[cfg(test)]
mod tests;
