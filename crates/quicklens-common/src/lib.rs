//! Common types and utilities for the quicklens annotation engine.
//!
//! This crate provides foundational types used across all quicklens crates:
//! - Source spans (`Span`) in byte offsets
//! - Position/LineMap types for offset <-> line/column conversion
//! - Centralized limits and budgets

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Position/LineMap types for line/column source locations
pub mod position;
pub use position::{LineMap, Position};

// Centralized limits and thresholds
pub mod limits;
