//! Type-annotation parsing.
//!
//! The subset models exactly the shapes the descriptor grammar knows:
//! keywords, `T[]`, type literals, unions, and named references. Anything
//! else the parser can still recognize (generics, function types, literal
//! types) is consumed and mapped to `Unsupported` so the resolver can
//! degrade it instead of the file failing to parse.

use super::{ParseError, Parser};
use crate::ast::{PropertySignature, TypeKeyword, TypeMember, TypeNode};
use crate::syntax_kind::SyntaxKind;

impl Parser<'_> {
    /// Parse a type: `union` is the lowest-precedence production.
    pub(crate) fn parse_type(&mut self) -> Result<TypeNode, ParseError> {
        // Leading `|` as in `type T = | A | B`
        self.eat(SyntaxKind::Bar);
        let first = self.parse_postfix_type()?;
        if !self.at(SyntaxKind::Bar) {
            return Ok(first);
        }
        let mut alternatives = vec![first];
        while self.eat(SyntaxKind::Bar) {
            alternatives.push(self.parse_postfix_type()?);
        }
        Ok(TypeNode::Union(alternatives))
    }

    /// Primary type followed by any number of `[]` suffixes.
    fn parse_postfix_type(&mut self) -> Result<TypeNode, ParseError> {
        let mut ty = self.parse_primary_type()?;
        while self.at(SyntaxKind::OpenBracket) && self.nth_kind(1) == SyntaxKind::CloseBracket {
            self.bump();
            self.bump();
            ty = TypeNode::Array(Box::new(ty));
        }
        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> Result<TypeNode, ParseError> {
        match self.kind() {
            SyntaxKind::Identifier => {
                let token = self.bump();
                let name = token.text(self.source);
                if self.at(SyntaxKind::LessThan) {
                    // Generic instantiation: consumed, not modeled.
                    self.skip_type_arguments()?;
                    return Ok(TypeNode::Unsupported);
                }
                Ok(keyword_type(name).unwrap_or_else(|| TypeNode::Named(name.to_string())))
            }
            SyntaxKind::NullKeyword => {
                self.bump();
                Ok(TypeNode::Keyword(TypeKeyword::Null))
            }
            SyntaxKind::StringLiteral | SyntaxKind::NumberLiteral => {
                // Literal types (`"a"`, `1`) are outside the modeled grammar.
                self.bump();
                Ok(TypeNode::Unsupported)
            }
            SyntaxKind::OpenBrace => self.parse_type_literal(),
            SyntaxKind::OpenParen => self.parse_paren_or_function_type(),
            _ => Err(self.error_here("expected type")),
        }
    }

    /// `{ name: T; name?: T, ... }` plus skipped non-property members.
    fn parse_type_literal(&mut self) -> Result<TypeNode, ParseError> {
        let members = self.parse_type_member_block()?;
        Ok(TypeNode::Literal(members))
    }

    /// Shared body parser for type literals and interface declarations.
    pub(crate) fn parse_type_member_block(&mut self) -> Result<Vec<TypeMember>, ParseError> {
        self.expect(SyntaxKind::OpenBrace, "`{`")?;
        let mut members = Vec::new();
        while !self.at(SyntaxKind::CloseBrace) && !self.at(SyntaxKind::EndOfFile) {
            members.push(self.parse_type_member()?);
            // `;` or `,` member separators, both optional before `}`
            while self.eat(SyntaxKind::Semicolon) || self.eat(SyntaxKind::Comma) {}
        }
        self.expect(SyntaxKind::CloseBrace, "`}`")?;
        Ok(members)
    }

    fn parse_type_member(&mut self) -> Result<TypeMember, ParseError> {
        // Index signature: `[key: string]: T`
        if self.at(SyntaxKind::OpenBracket) {
            self.skip_balanced(SyntaxKind::OpenBracket, SyntaxKind::CloseBracket)?;
            if self.eat(SyntaxKind::Colon) {
                self.parse_type()?;
            }
            return Ok(TypeMember::Other);
        }

        let name = match self.kind() {
            SyntaxKind::Identifier => {
                let token = self.bump();
                token.text(self.source).to_string()
            }
            SyntaxKind::StringLiteral => {
                let token = self.bump();
                let raw = token.text(self.source);
                super::expressions::unescape_string(&raw[1..raw.len() - 1])
            }
            _ => return Err(self.error_here("expected member name")),
        };
        let optional = self.eat(SyntaxKind::Question);

        // Method signature: `name(...): T`
        if self.at(SyntaxKind::OpenParen) {
            self.skip_balanced(SyntaxKind::OpenParen, SyntaxKind::CloseParen)?;
            if self.eat(SyntaxKind::Colon) {
                self.parse_type()?;
            }
            return Ok(TypeMember::Other);
        }

        self.expect(SyntaxKind::Colon, "`:`")?;
        let ty = self.parse_type()?;
        Ok(TypeMember::Property(PropertySignature { name, ty, optional }))
    }

    /// `(T)` grouping, or a function type `(params) => T` which is
    /// consumed and mapped to `Unsupported`.
    fn parse_paren_or_function_type(&mut self) -> Result<TypeNode, ParseError> {
        let is_function_type = match self.find_matching_paren() {
            Some(close) => self.tokens.get(close + 1).map(|t| t.kind) == Some(SyntaxKind::Arrow),
            None => false,
        };
        if is_function_type {
            self.skip_balanced(SyntaxKind::OpenParen, SyntaxKind::CloseParen)?;
            self.expect(SyntaxKind::Arrow, "`=>`")?;
            self.parse_type()?;
            return Ok(TypeNode::Unsupported);
        }
        self.expect(SyntaxKind::OpenParen, "`(`")?;
        let inner = self.parse_type()?;
        self.expect(SyntaxKind::CloseParen, "`)`")?;
        Ok(inner)
    }

    /// Consume a balanced `open ... close` token region, nesting included.
    fn skip_balanced(&mut self, open: SyntaxKind, close: SyntaxKind) -> Result<(), ParseError> {
        self.expect(open, "opening delimiter")?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.kind() {
                SyntaxKind::EndOfFile => {
                    return Err(self.error_here("unbalanced delimiters"));
                }
                k if k == open => {
                    depth += 1;
                    self.bump();
                }
                k if k == close => {
                    depth -= 1;
                    self.bump();
                }
                _ => {
                    self.bump();
                }
            }
        }
        Ok(())
    }

    /// Consume `<...>` type arguments. Only angle-bracket depth is
    /// tracked; the contents are not modeled.
    fn skip_type_arguments(&mut self) -> Result<(), ParseError> {
        self.expect(SyntaxKind::LessThan, "`<`")?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.kind() {
                SyntaxKind::EndOfFile => {
                    return Err(self.error_here("unbalanced type arguments"));
                }
                SyntaxKind::LessThan => {
                    depth += 1;
                    self.bump();
                }
                SyntaxKind::GreaterThan => {
                    depth -= 1;
                    self.bump();
                }
                _ => {
                    self.bump();
                }
            }
        }
        Ok(())
    }
}

fn keyword_type(name: &str) -> Option<TypeNode> {
    let keyword = match name {
        "string" => TypeKeyword::String,
        "number" => TypeKeyword::Number,
        "boolean" => TypeKeyword::Boolean,
        "any" => TypeKeyword::Any,
        "unknown" => TypeKeyword::Unknown,
        "void" => TypeKeyword::Void,
        "undefined" => TypeKeyword::Undefined,
        "never" => TypeKeyword::Never,
        "object" => TypeKeyword::Object,
        _ => return None,
    };
    Some(TypeNode::Keyword(keyword))
}
