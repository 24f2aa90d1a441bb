// Copyright (c) 2017-2021 Fabian Schuiki

//! Source-to-source transformation passes on shader code.
//!
//! This module implements the passes that specialize WGSL source text. Each
//! pass is independent of the others; callers run whichever passes they need,
//! in whichever order.

pub mod condelim;
pub mod unroll;

pub use condelim::{simplify_conditionals, ConstCondElim};
pub use unroll::{unroll_loops, LoopUnroll};
