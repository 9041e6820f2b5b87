//! Statement and declaration parsing.

use quicklens_common::Span;

use super::{ParseError, Parser};
use crate::ast::*;
use crate::syntax_kind::SyntaxKind;

impl Parser<'_> {
    /// Parse one statement, pushing the result(s) into `items`. A variable
    /// statement with several declarators expands to several `Stmt::Var`s.
    pub(crate) fn parse_statement_into(&mut self, items: &mut Vec<Stmt>) -> Result<(), ParseError> {
        match self.kind() {
            SyntaxKind::ConstKeyword | SyntaxKind::LetKeyword | SyntaxKind::VarKeyword => {
                let mut stmts = self.parse_var_statement()?;
                items.append(&mut stmts);
                Ok(())
            }
            _ => {
                let stmt = self.parse_statement()?;
                items.push(stmt);
                Ok(())
            }
        }
    }

    /// Parse one statement in a single-statement position.
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.kind() {
            SyntaxKind::FunctionKeyword => {
                let func = self.parse_function(true)?;
                Ok(Stmt::Function(func))
            }
            SyntaxKind::ConstKeyword | SyntaxKind::LetKeyword | SyntaxKind::VarKeyword => {
                let mut stmts = self.parse_var_statement()?;
                if stmts.len() == 1 {
                    Ok(stmts.remove(0))
                } else {
                    Ok(Stmt::Block(stmts))
                }
            }
            SyntaxKind::ImportKeyword => self.parse_import(),
            SyntaxKind::ExportKeyword => self.parse_export(),
            SyntaxKind::ReturnKeyword => self.parse_return(),
            SyntaxKind::IfKeyword => self.parse_if(),
            SyntaxKind::WhileKeyword => self.parse_while(),
            SyntaxKind::ForKeyword => self.parse_for(),
            SyntaxKind::ThrowKeyword => self.parse_throw(),
            SyntaxKind::TryKeyword => self.parse_try(),
            SyntaxKind::BreakKeyword => {
                let span = self.bump().span;
                self.eat(SyntaxKind::Semicolon);
                Ok(Stmt::Break(span))
            }
            SyntaxKind::ContinueKeyword => {
                let span = self.bump().span;
                self.eat(SyntaxKind::Semicolon);
                Ok(Stmt::Continue(span))
            }
            SyntaxKind::OpenBrace => {
                let stmts = self.parse_block()?;
                Ok(Stmt::Block(stmts))
            }
            SyntaxKind::Semicolon => {
                self.bump();
                Ok(Stmt::Empty)
            }
            SyntaxKind::Identifier if self.at_word("interface") && self.nth_is_ident(1) => {
                self.parse_interface()
            }
            SyntaxKind::Identifier
                if self.at_word("type")
                    && self.nth_is_ident(1)
                    && self.nth_kind(2) == SyntaxKind::Equals =>
            {
                self.parse_type_alias()
            }
            _ => {
                let expr = self.parse_expression()?;
                self.eat(SyntaxKind::Semicolon);
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn nth_is_ident(&self, n: usize) -> bool {
        self.nth_kind(n) == SyntaxKind::Identifier
    }

    /// `{ stmt* }`
    pub(crate) fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(SyntaxKind::OpenBrace, "`{`")?;
        let mut stmts = Vec::new();
        while !self.at(SyntaxKind::CloseBrace) && !self.at(SyntaxKind::EndOfFile) {
            self.parse_statement_into(&mut stmts)?;
        }
        self.expect(SyntaxKind::CloseBrace, "`}`")?;
        Ok(stmts)
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// `function name?(params): T? { body }`
    ///
    /// `as_declaration` controls doc-comment attachment; function
    /// expressions never get one.
    pub(crate) fn parse_function(&mut self, as_declaration: bool) -> Result<FunctionDecl, ParseError> {
        let start = self.current().span.pos;
        let doc = if as_declaration {
            self.doc_for(start)
        } else {
            None
        };
        self.expect(SyntaxKind::FunctionKeyword, "`function`")?;
        let name = if self.at(SyntaxKind::Identifier) {
            let token = self.bump();
            Some(token.text(self.source).to_string())
        } else {
            None
        };
        self.expect(SyntaxKind::OpenParen, "`(`")?;
        let params = self.parse_params()?;
        self.expect(SyntaxKind::CloseParen, "`)`")?;
        let return_type = if self.eat(SyntaxKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let body = self.parse_block()?;
        let end = self.previous_end();
        Ok(FunctionDecl {
            name,
            params,
            return_type,
            body,
            span: Span::new(start, end),
            doc,
        })
    }

    /// Comma-separated parameter list, cursor on the first parameter or
    /// the closing paren.
    pub(crate) fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();
        while !self.at(SyntaxKind::CloseParen) && !self.at(SyntaxKind::EndOfFile) {
            let (name, span) = self.expect_identifier("parameter name")?;
            let optional = self.eat(SyntaxKind::Question);
            let ty = if self.eat(SyntaxKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let default_value = if self.eat(SyntaxKind::Equals) {
                Some(self.parse_assignment_operand()?)
            } else {
                None
            };
            params.push(Param {
                name,
                ty,
                optional,
                default_value,
                span,
            });
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        Ok(params)
    }

    // =========================================================================
    // Variables
    // =========================================================================

    /// `const/let/var name (: T)? (= init)? (, ...)* ;?`
    fn parse_var_statement(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let start = self.current().span.pos;
        let doc = self.doc_for(start);
        let kind = match self.bump().kind {
            SyntaxKind::ConstKeyword => VarKind::Const,
            SyntaxKind::LetKeyword => VarKind::Let,
            _ => VarKind::Var,
        };

        let mut stmts = Vec::new();
        loop {
            let (name, name_span) = self.expect_identifier("variable name")?;
            let ty = if self.eat(SyntaxKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let init = if self.eat(SyntaxKind::Equals) {
                Some(self.parse_assignment_operand()?)
            } else {
                None
            };
            let end = self.previous_end();
            stmts.push(Stmt::Var(VarStmt {
                kind,
                name,
                ty,
                init,
                span: Span::new(if stmts.is_empty() { start } else { name_span.pos }, end),
                // Doc comments only describe the first declarator.
                doc: if stmts.is_empty() { doc.clone() } else { None },
            }));
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.eat(SyntaxKind::Semicolon);
        Ok(stmts)
    }

    // =========================================================================
    // Modules
    // =========================================================================

    /// `import` statements are recognized so that lowering can erase them;
    /// their clause structure is irrelevant here. Consumes through the
    /// terminating semicolon or the module-specifier string.
    fn parse_import(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect(SyntaxKind::ImportKeyword, "`import`")?.span.pos;
        loop {
            match self.kind() {
                SyntaxKind::Semicolon => {
                    self.bump();
                    break;
                }
                SyntaxKind::StringLiteral => {
                    self.bump();
                    self.eat(SyntaxKind::Semicolon);
                    break;
                }
                SyntaxKind::EndOfFile => break,
                _ => {
                    self.bump();
                }
            }
        }
        Ok(Stmt::Import(Span::new(start, self.previous_end())))
    }

    /// `export` / `export default` prefix: the modifier is dropped and the
    /// underlying declaration or expression parsed as usual.
    fn parse_export(&mut self) -> Result<Stmt, ParseError> {
        self.expect(SyntaxKind::ExportKeyword, "`export`")?;
        if self.at_word("default") {
            self.bump();
            if self.at(SyntaxKind::FunctionKeyword) {
                let func = self.parse_function(true)?;
                return Ok(Stmt::Function(func));
            }
            let expr = self.parse_expression()?;
            self.eat(SyntaxKind::Semicolon);
            return Ok(Stmt::Expr(expr));
        }
        self.parse_statement()
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let span = self.expect(SyntaxKind::ReturnKeyword, "`return`")?.span;
        let value = if self.at(SyntaxKind::Semicolon)
            || self.at(SyntaxKind::CloseBrace)
            || self.at(SyntaxKind::EndOfFile)
        {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.eat(SyntaxKind::Semicolon);
        Ok(Stmt::Return(value, span))
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.expect(SyntaxKind::IfKeyword, "`if`")?;
        self.expect(SyntaxKind::OpenParen, "`(`")?;
        let cond = self.parse_expression()?;
        self.expect(SyntaxKind::CloseParen, "`)`")?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.eat(SyntaxKind::ElseKeyword) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        self.expect(SyntaxKind::WhileKeyword, "`while`")?;
        self.expect(SyntaxKind::OpenParen, "`(`")?;
        let cond = self.parse_expression()?;
        self.expect(SyntaxKind::CloseParen, "`)`")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::While { cond, body })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        self.expect(SyntaxKind::ForKeyword, "`for`")?;
        self.expect(SyntaxKind::OpenParen, "`(`")?;

        // for (const x of iterable) body
        if matches!(
            self.kind(),
            SyntaxKind::ConstKeyword | SyntaxKind::LetKeyword | SyntaxKind::VarKeyword
        ) && self.nth_kind(1) == SyntaxKind::Identifier
            && self.nth_is_word(2, "of")
        {
            self.bump();
            let (binding, _) = self.expect_identifier("loop binding")?;
            self.bump(); // `of`
            let iterable = self.parse_expression()?;
            self.expect(SyntaxKind::CloseParen, "`)`")?;
            let body = Box::new(self.parse_statement()?);
            return Ok(Stmt::ForOf {
                binding,
                iterable,
                body,
            });
        }

        let init = if self.at(SyntaxKind::Semicolon) {
            self.bump();
            None
        } else {
            // parse_statement consumes the first `;` itself
            Some(Box::new(self.parse_statement()?))
        };
        let cond = if self.at(SyntaxKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(SyntaxKind::Semicolon, "`;`")?;
        let update = if self.at(SyntaxKind::CloseParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(SyntaxKind::CloseParen, "`)`")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::For {
            init,
            cond,
            update,
            body,
        })
    }

    fn parse_throw(&mut self) -> Result<Stmt, ParseError> {
        let span = self.expect(SyntaxKind::ThrowKeyword, "`throw`")?.span;
        let value = self.parse_expression()?;
        self.eat(SyntaxKind::Semicolon);
        Ok(Stmt::Throw(value, span))
    }

    fn parse_try(&mut self) -> Result<Stmt, ParseError> {
        self.expect(SyntaxKind::TryKeyword, "`try`")?;
        let block = self.parse_block()?;
        let catch = if self.eat(SyntaxKind::CatchKeyword) {
            let binding = if self.eat(SyntaxKind::OpenParen) {
                let (name, _) = self.expect_identifier("catch binding")?;
                self.expect(SyntaxKind::CloseParen, "`)`")?;
                Some(name)
            } else {
                None
            };
            Some(CatchClause {
                binding,
                block: self.parse_block()?,
            })
        } else {
            None
        };
        let finally = if self.eat(SyntaxKind::FinallyKeyword) {
            Some(self.parse_block()?)
        } else {
            None
        };
        if catch.is_none() && finally.is_none() {
            return Err(self.error_here("expected `catch` or `finally`"));
        }
        Ok(Stmt::Try {
            block,
            catch,
            finally,
        })
    }

    // =========================================================================
    // Type declarations
    // =========================================================================

    /// `interface Name { members }` -- heritage clauses are not modeled.
    fn parse_interface(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span.pos;
        self.bump(); // `interface`
        let (name, _) = self.expect_identifier("interface name")?;
        let members = self.parse_type_member_block()?;
        Ok(Stmt::Interface(InterfaceDecl {
            name,
            members,
            span: Span::new(start, self.previous_end()),
        }))
    }

    /// `type Name = T;`
    fn parse_type_alias(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span.pos;
        self.bump(); // `type`
        let (name, _) = self.expect_identifier("type alias name")?;
        self.expect(SyntaxKind::Equals, "`=`")?;
        let ty = self.parse_type()?;
        self.eat(SyntaxKind::Semicolon);
        Ok(Stmt::TypeAlias(TypeAliasDecl {
            name,
            ty,
            span: Span::new(start, self.previous_end()),
        }))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// End offset of the token just consumed.
    pub(crate) fn previous_end(&self) -> u32 {
        if self.idx == 0 {
            0
        } else {
            self.tokens[self.idx - 1].span.end
        }
    }
}
