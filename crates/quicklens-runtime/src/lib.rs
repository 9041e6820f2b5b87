//! Baseline execution runtime for the quicklens engine.
//!
//! The engine treats "compile source to an executable module" and
//! "execute a call against it" as services; this crate provides both:
//! - `compile` lowers a parsed source file to a `CompiledModule` (type
//!   declarations and imports erased, executable statements kept)
//! - `Sandbox` executes a compiled module plus one call expression in a
//!   freshly constructed, isolated interpreter context
//!
//! The interpreter implements a fixed JavaScript-flavored evaluation
//! profile: f64 numbers, UTF-8 strings, JS truthiness, a minimal injected
//! global surface, and nothing else. There is no module system; `require`
//! is stubbed to fail and `import` statements never survive lowering.

pub mod compile;
pub mod env;
pub mod error;
pub mod interp;
pub mod sandbox;
pub mod value;

pub use compile::{CompiledModule, compile};
pub use error::RuntimeError;
pub use sandbox::Sandbox;
pub use value::Value;
