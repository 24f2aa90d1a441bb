// Copyright (c) 2017-2021 Fabian Schuiki

//! Source-level specialization of WGSL shader code. This library rewrites
//! shader source text before it is handed to a downstream compiler: counting
//! loops with literal bounds are unrolled into specialized copies of their
//! body, and conditionals with a literal guard are reduced to the taken
//! branch.
//!
//! The passes operate on a restricted, syntactically shallow surface of the
//! language. They do not build a full syntax tree; a minimal tokenizer feeds
//! a recursive-descent matcher that recognizes exactly the constructs the
//! passes rewrite. Everything else in the input is passed through untouched,
//! byte for byte.

#[macro_use]
extern crate log;

pub mod opt;
pub mod pass;
pub mod syntax;

pub use crate::opt::{Pass, PassContext, TransformError};
pub use crate::pass::{simplify_conditionals, unroll_loops, ConstCondElim, LoopUnroll};
