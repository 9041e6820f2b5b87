//! Value synthesis: descriptor -> literal expression tree.
//!
//! The synthesizer is total: every descriptor variant, `Reference` and
//! the depth-capped degenerate cases included, terminates in a literal. It owns no randomness; everything is drawn
//! from the injected [`RandomSource`], and every recursion re-draws
//! (array elements are independently randomized, never memoized).

use quicklens_common::limits;

use crate::descriptor::{PrimitiveKind, TypeDescriptor};
use crate::random::{DEFAULT_COUNT_RANGE, DEFAULT_INT_RANGE, RandomSource};

/// An abstract literal expression, matching a descriptor's shape.
/// Transient: generated fresh per synthesis call, never reused.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Array(Vec<SynthValue>),
    /// Ordered properties mirroring an `Object` descriptor's fields.
    Object(Vec<(String, SynthValue)>),
    /// The "no value" token.
    Undefined,
}

pub struct Synthesizer<'r> {
    random: &'r mut dyn RandomSource,
}

impl<'r> Synthesizer<'r> {
    pub fn new(random: &'r mut dyn RandomSource) -> Self {
        Synthesizer { random }
    }

    pub fn synthesize(&mut self, descriptor: &TypeDescriptor) -> SynthValue {
        self.synth_at(descriptor, 0)
    }

    fn synth_at(&mut self, descriptor: &TypeDescriptor, depth: u32) -> SynthValue {
        match descriptor {
            TypeDescriptor::Primitive(PrimitiveKind::String) => {
                SynthValue::Str(self.random.phrase())
            }
            TypeDescriptor::Primitive(PrimitiveKind::Number) => {
                let (lo, hi) = DEFAULT_INT_RANGE;
                SynthValue::Int(self.random.int_in(lo, hi))
            }
            TypeDescriptor::Primitive(PrimitiveKind::Boolean) => {
                SynthValue::Bool(self.random.boolean())
            }
            TypeDescriptor::Array(element) => {
                if depth >= limits::MAX_SYNTH_DEPTH {
                    return SynthValue::Array(Vec::new());
                }
                let (lo, hi) = DEFAULT_COUNT_RANGE;
                let len = self.random.count(lo, hi);
                let elements = (0..len)
                    .map(|_| self.synth_at(element, depth + 1))
                    .collect();
                SynthValue::Array(elements)
            }
            TypeDescriptor::Object(fields) => {
                let values = fields
                    .iter()
                    .map(|(name, field)| {
                        let value = if depth >= limits::MAX_SYNTH_DEPTH {
                            SynthValue::Undefined
                        } else {
                            self.synth_at(field, depth + 1)
                        };
                        (name.clone(), value)
                    })
                    .collect();
                SynthValue::Object(values)
            }
            TypeDescriptor::Union(alternatives) => {
                if alternatives.is_empty() {
                    return SynthValue::Undefined;
                }
                let choice = self.random.pick(alternatives.len());
                self.synth_at(&alternatives[choice], depth.saturating_add(1))
            }
            // Resolution failure upstream; best-effort guess, same as
            // Unknown.
            TypeDescriptor::Reference(_) => self.unknown_fallback(),
            TypeDescriptor::Unknown => self.unknown_fallback(),
        }
    }

    /// No type information at all: a coin flip between a string and a
    /// number literal.
    fn unknown_fallback(&mut self) -> SynthValue {
        if self.random.boolean() {
            SynthValue::Str(self.random.phrase())
        } else {
            let (lo, hi) = DEFAULT_INT_RANGE;
            SynthValue::Int(self.random.int_in(lo, hi))
        }
    }
}
