//! Call expression building and printing.
//!
//! Turns a call-site into the source text `name(arg1, arg2, ...)`, with
//! one independently synthesized value per parameter, left to right.
//! Printing must yield syntactically valid JavaScript: strings are
//! double-quoted and escaped, nested literals nest, property names are
//! quoted when they are not plain identifiers.

use crate::extract::CallSite;
use crate::random::RandomSource;
use crate::synth::{SynthValue, Synthesizer};

/// A printable synthesized call, anchored to its declaration.
#[derive(Debug, Clone)]
pub struct CallExpr {
    pub source_code: String,
    pub position: u32,
}

pub fn build_call(site: &CallSite, random: &mut dyn RandomSource) -> CallExpr {
    let mut source_code = String::new();
    source_code.push_str(&site.name);
    source_code.push('(');
    for (i, param) in site.params.iter().enumerate() {
        if i > 0 {
            source_code.push_str(", ");
        }
        let value = Synthesizer::new(random).synthesize(param);
        render_value(&value, &mut source_code);
    }
    source_code.push(')');
    CallExpr {
        source_code,
        position: site.anchor,
    }
}

/// Print a synthesized value as a JavaScript literal.
pub fn render_value(value: &SynthValue, out: &mut String) {
    match value {
        SynthValue::Str(text) => write_js_string(text, out),
        SynthValue::Int(n) => out.push_str(&n.to_string()),
        SynthValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        SynthValue::Undefined => out.push_str("undefined"),
        SynthValue::Array(elements) => {
            out.push('[');
            for (i, element) in elements.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_value(element, out);
            }
            out.push(']');
        }
        SynthValue::Object(properties) => {
            out.push('{');
            for (i, (name, property)) in properties.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if is_identifier(name) {
                    out.push_str(name);
                } else {
                    write_js_string(name, out);
                }
                out.push_str(": ");
                render_value(property, out);
            }
            out.push('}');
        }
    }
}

fn write_js_string(text: &str, out: &mut String) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
