use crate::ast::*;
use crate::parser::{parse_expression_text, parse_source, parse_type_text};

fn parse(source: &str) -> SourceFile {
    parse_source(source).expect("parse failed")
}

#[test]
fn parses_typed_function_declaration() {
    let file = parse("function add(a: number, b: number): number { return a + b; }");
    assert_eq!(file.items.len(), 1);
    let Stmt::Function(func) = &file.items[0] else {
        panic!("expected function");
    };
    assert_eq!(func.name.as_deref(), Some("add"));
    assert_eq!(func.params.len(), 2);
    assert_eq!(
        func.params[0].ty,
        Some(TypeNode::Keyword(TypeKeyword::Number))
    );
    assert_eq!(func.span.pos, 0);
}

#[test]
fn parses_arrow_bound_to_const() {
    let file = parse("const greet = (name: string) => `hi ${name}`;");
    let Stmt::Var(var) = &file.items[0] else {
        panic!("expected var");
    };
    assert_eq!(var.name, "greet");
    assert_eq!(var.kind, VarKind::Const);
    let Some(Expr::Arrow { params, body }) = &var.init else {
        panic!("expected arrow initializer, got {:?}", var.init);
    };
    assert_eq!(params.len(), 1);
    assert!(matches!(body, ArrowBody::Expr(_)));
}

#[test]
fn parses_arrow_with_return_type() {
    let file = parse("const f = (x: number): number => x * 2;");
    let Stmt::Var(var) = &file.items[0] else {
        panic!("expected var");
    };
    assert!(matches!(var.init, Some(Expr::Arrow { .. })));
}

#[test]
fn paren_expression_is_not_an_arrow() {
    let expr = parse_expression_text("(1 + 2) * 3").expect("parse failed");
    assert!(matches!(expr, Expr::Binary { .. }));
}

#[test]
fn conditional_after_paren_is_not_an_arrow() {
    let expr = parse_expression_text("flag ? (a) : b").expect("parse failed");
    assert!(matches!(expr, Expr::Conditional { .. }));
}

#[test]
fn parses_interface_with_skipped_members() {
    let file = parse(
        "interface Point { x: number; y: number; dist(other: Point): number; [k: string]: any }",
    );
    let Stmt::Interface(decl) = &file.items[0] else {
        panic!("expected interface");
    };
    assert_eq!(decl.name, "Point");
    assert_eq!(decl.members.len(), 4);
    let properties: Vec<_> = decl
        .members
        .iter()
        .filter(|m| matches!(m, TypeMember::Property(_)))
        .collect();
    assert_eq!(properties.len(), 2);
}

#[test]
fn parses_type_alias_union() {
    let file = parse("type Id = string | number;");
    let Stmt::TypeAlias(decl) = &file.items[0] else {
        panic!("expected alias");
    };
    let TypeNode::Union(alts) = &decl.ty else {
        panic!("expected union");
    };
    assert_eq!(alts.len(), 2);
}

#[test]
fn type_is_still_a_valid_identifier() {
    let file = parse("let type = 1; type = 2;");
    assert!(matches!(file.items[0], Stmt::Var(_)));
    assert!(matches!(file.items[1], Stmt::Expr(Expr::Assign { .. })));
}

#[test]
fn multi_declarator_let_expands() {
    let file = parse("let a = 1, b = 2;");
    assert_eq!(file.items.len(), 2);
    assert!(matches!(&file.items[1], Stmt::Var(v) if v.name == "b"));
}

#[test]
fn import_statement_is_recognized() {
    let file = parse("import { readFile } from \"fs\";\nfunction f() { return 1; }");
    assert!(matches!(file.items[0], Stmt::Import(_)));
    assert!(matches!(file.items[1], Stmt::Function(_)));
}

#[test]
fn export_modifier_is_transparent() {
    let file = parse("export function f(x: number) { return x; }");
    let Stmt::Function(func) = &file.items[0] else {
        panic!("expected function");
    };
    assert_eq!(func.name.as_deref(), Some("f"));
}

#[test]
fn doc_comment_attaches_through_export() {
    let file = parse("/** @param {number} x */\nexport function f(x) { return x; }");
    let Stmt::Function(func) = &file.items[0] else {
        panic!("expected function");
    };
    let doc = func.doc.as_ref().expect("doc should attach");
    assert_eq!(
        doc.param_type("x"),
        Some(&TypeNode::Keyword(TypeKeyword::Number))
    );
}

#[test]
fn doc_comment_does_not_attach_across_code() {
    let file = parse("/** @param {number} x */\nconst y = 1;\nfunction f(x) { return x; }");
    let Stmt::Function(func) = &file.items[1] else {
        panic!("expected function");
    };
    assert!(func.doc.is_none());
}

#[test]
fn parses_generic_annotation_as_unsupported() {
    let ty = parse_type_text("Map<string, number>").expect("parse failed");
    assert_eq!(ty, TypeNode::Unsupported);
}

#[test]
fn parses_nested_array_type() {
    let ty = parse_type_text("string[][]").expect("parse failed");
    let TypeNode::Array(inner) = ty else {
        panic!("expected array");
    };
    assert_eq!(*inner, TypeNode::Array(Box::new(TypeNode::Keyword(TypeKeyword::String))));
}

#[test]
fn parses_object_type_literal() {
    let ty = parse_type_text("{ x: number, y: number }").expect("parse failed");
    let TypeNode::Literal(members) = ty else {
        panic!("expected literal");
    };
    assert_eq!(members.len(), 2);
}

#[test]
fn function_type_is_unsupported_not_an_error() {
    let ty = parse_type_text("(a: number) => void").expect("parse failed");
    assert_eq!(ty, TypeNode::Unsupported);
}

#[test]
fn template_interpolation_round_trips() {
    let expr = parse_expression_text("`sum: ${a + b}!`").expect("parse failed");
    let Expr::Template(parts) = expr else {
        panic!("expected template");
    };
    assert_eq!(parts.len(), 3);
    assert!(matches!(&parts[0], TemplatePart::Text(t) if t == "sum: "));
    assert!(matches!(&parts[1], TemplatePart::Expr(Expr::Binary { .. })));
    assert!(matches!(&parts[2], TemplatePart::Text(t) if t == "!"));
}

#[test]
fn statement_block_functions_and_loops() {
    let file = parse(
        "function fib(n: number): number {\n  if (n < 2) { return n; }\n  let a = 0;\n  let b = 1;\n  for (let i = 2; i <= n; i += 1) {\n    const next = a + b;\n    a = b;\n    b = next;\n  }\n  return b;\n}",
    );
    let Stmt::Function(func) = &file.items[0] else {
        panic!("expected function");
    };
    assert_eq!(func.body.len(), 5);
}

#[test]
fn throw_new_error_parses() {
    let file = parse("function k() { throw new Error(\"boom\"); }");
    let Stmt::Function(func) = &file.items[0] else {
        panic!("expected function");
    };
    let Stmt::Throw(Expr::New { callee, args }, _) = &func.body[0] else {
        panic!("expected throw of new Error");
    };
    assert_eq!(callee, "Error");
    assert_eq!(args.len(), 1);
}

#[test]
fn parse_error_reports_span() {
    let err = parse_source("function (((").expect_err("should fail");
    assert!(err.span.pos > 0);
}
