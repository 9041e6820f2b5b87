//! TypeScript-subset front end for the quicklens engine.
//!
//! This crate provides the lexical and syntactic analysis phases:
//! - `SyntaxKind` - Token types
//! - `Scanner` - Tokenizer producing a token vector plus doc comments
//! - `ast` - The declaration/statement/expression/type tree
//! - `Parser` - Recursive-descent parser over the token vector
//! - `jsdoc` - Documentation-comment type extraction
//!
//! The engine crate consumes only the tree this front end yields; raw
//! source text never crosses that boundary.

pub mod ast;
pub mod jsdoc;
pub mod parser;
pub mod scanner;
pub mod syntax_kind;

pub use ast::SourceFile;
pub use parser::{ParseError, parse_expression_text, parse_source, parse_type_text};
pub use syntax_kind::SyntaxKind;
