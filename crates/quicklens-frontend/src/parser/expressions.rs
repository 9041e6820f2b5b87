//! Expression parsing: Pratt loop over binary operators, postfix chains
//! for calls/members/indexing, and speculative arrow-function detection.

use super::{ParseError, Parser, parse_expression_text};
use crate::ast::*;
use crate::syntax_kind::SyntaxKind;

impl Parser<'_> {
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_conditional()?;
        if self.kind().is_assignment_operator() {
            if !matches!(left, Expr::Ident(_) | Expr::Member { .. } | Expr::Index { .. }) {
                return Err(self.error_here("invalid assignment target"));
            }
            let op = match self.bump().kind {
                SyntaxKind::PlusEquals => AssignOp::Add,
                SyntaxKind::MinusEquals => AssignOp::Sub,
                SyntaxKind::AsteriskEquals => AssignOp::Mul,
                SyntaxKind::SlashEquals => AssignOp::Div,
                _ => AssignOp::Assign,
            };
            // Right-associative: a = b = c
            let value = self.parse_expression()?;
            return Ok(Expr::Assign {
                op,
                target: Box::new(left),
                value: Box::new(value),
            });
        }
        Ok(left)
    }

    /// Expression at assignment precedence: what a variable initializer,
    /// default value, or argument position accepts (no comma operator).
    pub(crate) fn parse_assignment_operand(&mut self) -> Result<Expr, ParseError> {
        self.parse_expression()
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let cond = self.parse_binary(1)?;
        if self.eat(SyntaxKind::Question) {
            let then_expr = self.parse_expression()?;
            self.expect(SyntaxKind::Colon, "`:`")?;
            let else_expr = self.parse_expression()?;
            return Ok(Expr::Conditional {
                cond: Box::new(cond),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            });
        }
        Ok(cond)
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let precedence = self.kind().binary_precedence();
            if precedence == 0 || precedence < min_precedence {
                return Ok(left);
            }
            let op = binary_op(self.bump().kind);
            let right = self.parse_binary(precedence + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.kind() {
            SyntaxKind::Minus => Some(UnaryOp::Neg),
            SyntaxKind::Plus => Some(UnaryOp::Pos),
            SyntaxKind::Exclamation => Some(UnaryOp::Not),
            SyntaxKind::TypeofKeyword => Some(UnaryOp::TypeOf),
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.parse_postfix()
    }

    /// Primary expression followed by any chain of calls, member accesses,
    /// and index accesses.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.kind() {
                SyntaxKind::OpenParen => {
                    let args = self.parse_arguments()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                SyntaxKind::Dot => {
                    self.bump();
                    let (property, _) = self.expect_identifier("property name")?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property,
                    };
                }
                SyntaxKind::OpenBracket => {
                    self.bump();
                    let index = self.parse_expression()?;
                    self.expect(SyntaxKind::CloseBracket, "`]`")?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(SyntaxKind::OpenParen, "`(`")?;
        let mut args = Vec::new();
        while !self.at(SyntaxKind::CloseParen) && !self.at(SyntaxKind::EndOfFile) {
            args.push(self.parse_assignment_operand()?);
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(SyntaxKind::CloseParen, "`)`")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.kind() {
            SyntaxKind::NumberLiteral => {
                let token = self.bump();
                let text = token.text(self.source);
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ParseError::new("invalid number literal", token.span))?;
                Ok(Expr::Number(value))
            }
            SyntaxKind::StringLiteral => {
                let token = self.bump();
                let raw = token.text(self.source);
                Ok(Expr::String(unescape_string(&raw[1..raw.len() - 1])))
            }
            SyntaxKind::TemplateLiteral => {
                let token = self.bump();
                let raw = token.text(self.source);
                let parts = parse_template_parts(&raw[1..raw.len() - 1], token.span)?;
                Ok(Expr::Template(parts))
            }
            SyntaxKind::TrueKeyword => {
                self.bump();
                Ok(Expr::Bool(true))
            }
            SyntaxKind::FalseKeyword => {
                self.bump();
                Ok(Expr::Bool(false))
            }
            SyntaxKind::NullKeyword => {
                self.bump();
                Ok(Expr::Null)
            }
            SyntaxKind::FunctionKeyword => {
                let func = self.parse_function(false)?;
                Ok(Expr::FunctionExpr(Box::new(func)))
            }
            SyntaxKind::NewKeyword => {
                self.bump();
                let (callee, _) = self.expect_identifier("constructor name")?;
                let args = if self.at(SyntaxKind::OpenParen) {
                    self.parse_arguments()?
                } else {
                    Vec::new()
                };
                Ok(Expr::New { callee, args })
            }
            SyntaxKind::Identifier => {
                // `x => body`
                if self.nth_kind(1) == SyntaxKind::Arrow {
                    return self.parse_single_param_arrow();
                }
                let token = self.bump();
                let name = token.text(self.source);
                if name == "undefined" {
                    Ok(Expr::Undefined)
                } else {
                    Ok(Expr::Ident(name.to_string()))
                }
            }
            SyntaxKind::OpenParen => self.parse_paren_or_arrow(),
            SyntaxKind::OpenBracket => self.parse_array_literal(),
            SyntaxKind::OpenBrace => self.parse_object_literal(),
            _ => Err(self.error_here("expected expression")),
        }
    }

    // =========================================================================
    // Arrow functions
    // =========================================================================

    fn parse_single_param_arrow(&mut self) -> Result<Expr, ParseError> {
        let (name, span) = self.expect_identifier("parameter name")?;
        self.expect(SyntaxKind::Arrow, "`=>`")?;
        let body = self.parse_arrow_body()?;
        Ok(Expr::Arrow {
            params: vec![Param {
                name,
                ty: None,
                optional: false,
                default_value: None,
                span,
            }],
            body,
        })
    }

    /// Disambiguate `(a: T, b) => ...` from a parenthesized expression by
    /// checking what follows the matching close paren, speculatively
    /// parsing the parameter list when it looks like an arrow.
    fn parse_paren_or_arrow(&mut self) -> Result<Expr, ParseError> {
        let looks_like_arrow = match self.find_matching_paren() {
            Some(close) => matches!(
                self.tokens.get(close + 1).map(|t| t.kind),
                Some(SyntaxKind::Arrow) | Some(SyntaxKind::Colon)
            ),
            None => false,
        };

        if looks_like_arrow {
            let snapshot = self.snapshot();
            match self.try_parse_arrow() {
                Ok(expr) => return Ok(expr),
                Err(_) => self.restore(snapshot),
            }
        }

        self.expect(SyntaxKind::OpenParen, "`(`")?;
        let inner = self.parse_expression()?;
        self.expect(SyntaxKind::CloseParen, "`)`")?;
        Ok(Expr::Paren(Box::new(inner)))
    }

    fn try_parse_arrow(&mut self) -> Result<Expr, ParseError> {
        self.expect(SyntaxKind::OpenParen, "`(`")?;
        let params = self.parse_params()?;
        self.expect(SyntaxKind::CloseParen, "`)`")?;
        if self.eat(SyntaxKind::Colon) {
            // Return-type annotation; parsed and dropped (lowering erases
            // types anyway).
            self.parse_type()?;
        }
        self.expect(SyntaxKind::Arrow, "`=>`")?;
        let body = self.parse_arrow_body()?;
        Ok(Expr::Arrow { params, body })
    }

    fn parse_arrow_body(&mut self) -> Result<ArrowBody, ParseError> {
        if self.at(SyntaxKind::OpenBrace) {
            Ok(ArrowBody::Block(self.parse_block()?))
        } else {
            Ok(ArrowBody::Expr(Box::new(self.parse_assignment_operand()?)))
        }
    }

    // =========================================================================
    // Composite literals
    // =========================================================================

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        self.expect(SyntaxKind::OpenBracket, "`[`")?;
        let mut elements = Vec::new();
        while !self.at(SyntaxKind::CloseBracket) && !self.at(SyntaxKind::EndOfFile) {
            elements.push(self.parse_assignment_operand()?);
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(SyntaxKind::CloseBracket, "`]`")?;
        Ok(Expr::Array(elements))
    }

    fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        self.expect(SyntaxKind::OpenBrace, "`{`")?;
        let mut properties = Vec::new();
        while !self.at(SyntaxKind::CloseBrace) && !self.at(SyntaxKind::EndOfFile) {
            let key = match self.kind() {
                SyntaxKind::Identifier => {
                    let token = self.bump();
                    token.text(self.source).to_string()
                }
                SyntaxKind::StringLiteral => {
                    let token = self.bump();
                    let raw = token.text(self.source);
                    unescape_string(&raw[1..raw.len() - 1])
                }
                SyntaxKind::NumberLiteral => {
                    let token = self.bump();
                    token.text(self.source).to_string()
                }
                _ => return Err(self.error_here("expected property name")),
            };
            if self.eat(SyntaxKind::Colon) {
                let value = self.parse_assignment_operand()?;
                properties.push((key, value));
            } else {
                // Shorthand `{ x }`
                properties.push((key.clone(), Expr::Ident(key)));
            }
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(SyntaxKind::CloseBrace, "`}`")?;
        Ok(Expr::Object(properties))
    }
}

fn binary_op(kind: SyntaxKind) -> BinaryOp {
    use SyntaxKind::*;
    match kind {
        Plus => BinaryOp::Add,
        Minus => BinaryOp::Sub,
        Asterisk => BinaryOp::Mul,
        Slash => BinaryOp::Div,
        Percent => BinaryOp::Mod,
        EqualsEquals => BinaryOp::Eq,
        EqualsEqualsEquals => BinaryOp::StrictEq,
        ExclamationEquals => BinaryOp::Ne,
        ExclamationEqualsEquals => BinaryOp::StrictNe,
        LessThan => BinaryOp::Lt,
        LessThanEquals => BinaryOp::Le,
        GreaterThan => BinaryOp::Gt,
        GreaterThanEquals => BinaryOp::Ge,
        AmpersandAmpersand => BinaryOp::And,
        BarBar => BinaryOp::Or,
        QuestionQuestion => BinaryOp::Coalesce,
        InKeyword => BinaryOp::In,
        // binary_precedence() gates which kinds reach here
        _ => unreachable!("not a binary operator: {kind:?}"),
    }
}

/// Decode the escape sequences of a string literal body.
pub(crate) fn unescape_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('b') => out.push('\u{8}'),
            Some('u') => {
                // \uXXXX or \u{...}
                let mut rest = chars.clone();
                if rest.next() == Some('{') {
                    let mut hex = String::new();
                    for c in rest.by_ref() {
                        if c == '}' {
                            break;
                        }
                        hex.push(c);
                    }
                    if let Some(decoded) = u32::from_str_radix(&hex, 16)
                        .ok()
                        .and_then(char::from_u32)
                    {
                        out.push(decoded);
                        chars = rest;
                        continue;
                    }
                } else {
                    let hex: String = chars.clone().take(4).collect();
                    if hex.len() == 4 {
                        if let Some(decoded) = u32::from_str_radix(&hex, 16)
                            .ok()
                            .and_then(char::from_u32)
                        {
                            out.push(decoded);
                            for _ in 0..4 {
                                chars.next();
                            }
                            continue;
                        }
                    }
                }
                out.push('u');
            }
            Some(other) => out.push(other),
            None => break,
        }
    }
    out
}

/// Split a template body (backticks stripped) into literal text and
/// interpolated expressions. Interpolation sources are re-parsed through
/// the standalone expression entry point.
fn parse_template_parts(
    body: &str,
    span: quicklens_common::Span,
) -> Result<Vec<TemplatePart>, ParseError> {
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut chars = body.char_indices().peekable();

    while let Some((_, ch)) = chars.next() {
        if ch == '\\' {
            if let Some((_, next)) = chars.next() {
                match next {
                    'n' => text.push('\n'),
                    't' => text.push('\t'),
                    'r' => text.push('\r'),
                    '`' => text.push('`'),
                    '$' => text.push('$'),
                    '\\' => text.push('\\'),
                    other => {
                        text.push('\\');
                        text.push(other);
                    }
                }
            }
            continue;
        }
        if ch == '$' && matches!(chars.peek(), Some((_, '{'))) {
            chars.next(); // `{`
            let expr_start = chars.peek().map(|(j, _)| *j).unwrap_or(body.len());
            let mut depth = 0usize;
            let mut expr_end = None;
            for (j, c) in chars.by_ref() {
                match c {
                    '{' => depth += 1,
                    '}' => {
                        if depth == 0 {
                            expr_end = Some(j);
                            break;
                        }
                        depth -= 1;
                    }
                    _ => {}
                }
            }
            let Some(expr_end) = expr_end else {
                return Err(ParseError::new("unterminated template interpolation", span));
            };
            if !text.is_empty() {
                parts.push(TemplatePart::Text(std::mem::take(&mut text)));
            }
            let expr = parse_expression_text(&body[expr_start..expr_end])?;
            parts.push(TemplatePart::Expr(expr));
            continue;
        }
        text.push(ch);
    }

    if !text.is_empty() {
        parts.push(TemplatePart::Text(text));
    }
    Ok(parts)
}
