//! The quicklens engine: inspect the functions of a source file,
//! synthesize plausible arguments from their parameter types, evaluate
//! the resulting calls in a sandbox, and report each call expression with
//! its produced value anchored to a source position.
//!
//! Pipeline, leaves first:
//! - [`descriptor`] - the normalized recursive type grammar
//! - [`resolve`] - annotation/JSDoc nodes -> descriptors, named
//!   references resolved through the file's alias/interface table
//! - [`random`] - the injected randomness provider
//! - [`synth`] - descriptor -> literal expression tree, total by
//!   construction
//! - [`extract`] - declarations -> call-sites
//! - [`build`] - call-site -> printable call expression
//! - [`eval`] - sandboxed execution + result serialization
//! - [`orchestrate`] - per-file driver emitting [`Annotation`]s
//!
//! The engine consumes a parsed tree and a compiled module; it never
//! touches raw source text and is invoked only for files the front end
//! already parsed successfully. Each run recomputes everything from the
//! current tree: no cache, no state shared between runs or call-sites.

pub mod build;
pub mod descriptor;
pub mod eval;
pub mod extract;
pub mod orchestrate;
pub mod random;
pub mod resolve;
pub mod synth;

pub use descriptor::{PrimitiveKind, TypeDescriptor};
pub use eval::Evaluation;
pub use extract::CallSite;
pub use orchestrate::{Annotation, annotate_source_file};
pub use random::{EntropyRandom, RandomSource, ScriptedRandom};
pub use resolve::ResolutionContext;
pub use synth::{SynthValue, Synthesizer};
