//! End-to-end pipeline tests: source text -> parse -> compile ->
//! annotate, with a scripted randomness source so the synthesized calls
//! are exact.

use quicklens_engine::{Annotation, ScriptedRandom, annotate_source_file};
use quicklens_frontend::parse_source;
use quicklens_runtime::compile;

fn annotate(source: &str, random: &mut ScriptedRandom) -> Vec<Annotation> {
    let file = parse_source(source).expect("parse failed");
    let module = compile(&file);
    annotate_source_file(&file, &module, random)
}

#[test]
fn numeric_parameters_evaluate_to_their_sum() {
    let mut random = ScriptedRandom::with_ints(&[2, -4]);
    let annotations = annotate(
        "function add(a: number, b: number): number { return a + b; }",
        &mut random,
    );
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].display_text, "add(2, -4) => -2");
    assert_eq!(annotations[0].anchor, 0);
}

#[test]
fn string_parameter_flows_through_a_template() {
    let mut random = ScriptedRandom {
        words: vec!["foo", "bar"],
        booleans: vec![true],
        ..ScriptedRandom::default()
    };
    let annotations = annotate(
        "function greet(name: string): string { return `hello, ${name}!`; }",
        &mut random,
    );
    assert_eq!(
        annotations[0].display_text,
        "greet(\"foo bar\") => \"hello, foo bar!\""
    );
}

#[test]
fn jsdoc_number_beats_any_annotation() {
    let mut random = ScriptedRandom::with_ints(&[3]);
    let annotations = annotate(
        "/** @param {number} x */\nfunction double(x: any) { return x * 2; }",
        &mut random,
    );
    assert_eq!(annotations[0].display_text, "double(3) => 6");
}

#[test]
fn string_array_parameter_synthesizes_a_list() {
    let mut random = ScriptedRandom {
        words: vec!["foo", "bar", "baz"],
        counts: vec![3],
        ..ScriptedRandom::default()
    };
    let annotations = annotate(
        "function count(items: string[]): number { return items.length; }",
        &mut random,
    );
    assert_eq!(
        annotations[0].display_text,
        "count([\"foo\", \"bar\", \"baz\"]) => 3"
    );
}

#[test]
fn empty_array_is_an_accepted_synthesis() {
    let mut random = ScriptedRandom {
        counts: vec![0],
        ..ScriptedRandom::default()
    };
    let annotations = annotate(
        "function count(items: string[]): number { return items.length; }",
        &mut random,
    );
    assert_eq!(annotations[0].display_text, "count([]) => 0");
}

#[test]
fn object_shape_keeps_property_order() {
    let mut random = ScriptedRandom::with_ints(&[-3, 4]);
    let annotations = annotate(
        "function mag(shape: {x: number, y: number}): number { return shape.x * shape.x + shape.y * shape.y; }",
        &mut random,
    );
    assert_eq!(
        annotations[0].display_text,
        "mag({x: -3, y: 4}) => 25"
    );
}

#[test]
fn interface_parameter_resolves_through_the_context() {
    let mut random = ScriptedRandom {
        ints: vec![2, 5],
        ..ScriptedRandom::default()
    };
    let annotations = annotate(
        "interface Point { x: number; y: number }\nfunction sum(p: Point): number { return p.x + p.y; }",
        &mut random,
    );
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].display_text, "sum({x: 2, y: 5}) => 7");
}

#[test]
fn throwing_function_fails_alone() {
    let mut random = ScriptedRandom::new();
    let annotations = annotate(
        "function k() { throw new Error(\"boom\"); }\nfunction ok(): number { return 9; }",
        &mut random,
    );
    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations[0].display_text, "k() => Error: boom");
    assert_eq!(annotations[1].display_text, "ok() => 9");
}

#[test]
fn union_parameter_synthesizes_one_alternative() {
    let mut random = ScriptedRandom {
        picks: vec![1],
        ints: vec![4],
        ..ScriptedRandom::default()
    };
    let annotations = annotate(
        "type Id = string | number;\nfunction ident(id: Id) { return id; }",
        &mut random,
    );
    assert_eq!(annotations[0].display_text, "ident(4) => 4");
}

#[test]
fn arrow_and_function_expression_bindings_are_annotated() {
    let mut random = ScriptedRandom::with_ints(&[2, 3]);
    let annotations = annotate(
        "const twice = (n: number): number => n * 2;\nlet shout = function (s) { return s; };",
        &mut random,
    );
    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations[0].display_text, "twice(2) => 4");
    // untyped param falls back to the string-or-number guess; scripted
    // boolean defaults pick the number branch
    assert_eq!(annotations[1].display_text, "shout(3) => 3");
}

#[test]
fn module_state_resets_between_call_sites() {
    let mut random = ScriptedRandom::new();
    let annotations = annotate(
        "let hits = 0;\nfunction a(): number { hits += 1; return hits; }\nfunction b(): number { hits += 10; return hits; }",
        &mut random,
    );
    assert_eq!(annotations[0].display_text, "a() => 1");
    assert_eq!(annotations[1].display_text, "b() => 10");
}
