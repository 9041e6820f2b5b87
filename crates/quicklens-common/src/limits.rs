//! Centralized limits and budgets for the quicklens engine.
//!
//! This module provides shared constants for recursion depths and
//! evaluation budgets used throughout the codebase. Centralizing these
//! values prevents duplicate definitions with inconsistent values and
//! documents the rationale for each limit.

// =============================================================================
// Resolution / Synthesis Depth Limits
// =============================================================================

/// Maximum depth when resolving type annotations to descriptors.
///
/// Bounds recursive alias/interface chains such as `type T = T[]` or
/// mutually recursive interfaces. Past this depth the resolver degrades
/// the descriptor to `Unknown` instead of recursing further.
pub const MAX_TYPE_RESOLUTION_DEPTH: u32 = 32;

/// Maximum nesting depth for synthesized values.
///
/// A legal but deeply recursive shape (arrays of objects of arrays ...)
/// bottoms out in leaf literals past this depth, keeping synthesis
/// terminating without changing its shape contract for realistic types.
/// Arrays branch up to 5 ways per level, so this also bounds total node
/// count (worst case 5^8).
pub const MAX_SYNTH_DEPTH: u32 = 8;

// =============================================================================
// Sandbox Execution Limits
// =============================================================================

/// Maximum interpreter call depth inside a sandbox evaluation.
///
/// Unbounded recursion in evaluated code would otherwise exhaust the host
/// stack. Exceeding the limit fails that one evaluation with a
/// runtime-throw-class message.
pub const MAX_CALL_DEPTH: u32 = 256;

/// Evaluation fuel budget: the number of interpreter steps a single
/// sandbox evaluation may charge before it is cut off.
///
/// The engine does not implement wall-clock timeouts (those belong to the
/// embedding caller); fuel is the host-safety backstop that turns infinite
/// loops into a failure message for that call-site only.
pub const EVAL_FUEL_BUDGET: u64 = 2_000_000;

/// Maximum depth when serializing an evaluation result to JSON text.
///
/// Results nested deeper than this degrade to a placeholder rather than
/// recursing further during serialization.
pub const MAX_SERIALIZATION_DEPTH: u32 = 32;
