// Copyright (c) 2017-2021 Fabian Schuiki

//! Optimization infrastructure for source-level passes.
//!
//! This module provides the trait implemented by the individual passes, the
//! context that configures them, and the errors a pass can produce.

pub mod rewrite;

use std::fmt::{self, Display};

/// A source-to-source transformation pass.
///
/// A pass is a pure function over the input text: it either returns the
/// rewritten source, or fails without producing any output. Implementors
/// typically express themselves as a matcher over the token stream and let
/// the machinery in [`rewrite`](crate::opt::rewrite) drive the scanning to a
/// fixpoint.
pub trait Pass {
    /// Run this pass on an entire source string.
    fn run_on_source(ctx: &PassContext, code: &str) -> Result<String, TransformError>;
}

/// Additional context and configuration for the passes.
#[derive(Debug, Clone)]
pub struct PassContext {
    /// The largest iteration count a loop may have and still be unrolled.
    /// Loops beyond this are left rolled and marked as skipped.
    pub threshold: u32,
    /// Upper bound on the number of sweeps a pass may take to reach its
    /// fixpoint before it is aborted as divergent.
    pub max_sweeps: usize,
}

impl Default for PassContext {
    fn default() -> PassContext {
        PassContext {
            threshold: 32,
            max_sweeps: 1000,
        }
    }
}

/// An error produced by a transformation pass.
///
/// Failures are local to a single call; since a pass never mutates its input,
/// there is no partial state to roll back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// A matched loop bound could not be parsed as an integer.
    InvalidBounds {
        /// The text of the offending bound.
        text: String,
    },
    /// A pass failed to reach a fixpoint within the sweep limit.
    Divergence {
        /// The name of the diverging pass.
        pass: &'static str,
        /// The number of sweeps that were performed.
        sweeps: usize,
    },
}

impl Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TransformError::InvalidBounds { text } => {
                write!(f, "loop bound `{}` is not a valid integer", text)
            }
            TransformError::Divergence { pass, sweeps } => {
                write!(f, "pass `{}` did not converge after {} sweeps", pass, sweeps)
            }
        }
    }
}

impl std::error::Error for TransformError {}

/// A prelude for writing passes.
pub mod prelude {
    pub use super::{Pass, PassContext, TransformError};
}
