// Copyright (c) 2017-2021 Fabian Schuiki

//! Constant Conditional Elimination

use crate::opt::prelude::*;
use crate::opt::rewrite::{fixpoint, sweep, Scan};
use crate::syntax::{Cursor, Token, TokenKind};

/// Constant Conditional Elimination
///
/// This pass reduces conditionals whose guard is the literal token `true` or
/// `false` to their taken branch, or removes them entirely when no branch is
/// taken. Guards that are mere expressions over booleans are never touched.
/// It handles four literal-guard shapes, each scanned to its own fixpoint
/// before the next one runs:
///
/// - `if (true) {A} else {B}` becomes `A`
/// - `if (false) {A} else {B}` becomes `B`
/// - `if (true) {A}` becomes `A`
/// - `if (false) {A}` is removed
///
/// Branch bodies must be free of nested blocks. A conditional nested inside
/// another one is reduced once the inner construct has itself become
/// brace-free through an earlier reduction of the same shape.
pub struct ConstCondElim;

impl Pass for ConstCondElim {
    fn run_on_source(ctx: &PassContext, code: &str) -> Result<String, TransformError> {
        info!("CondElim");
        let mut code = code.to_string();
        for &shape in &[
            Shape::TrueElse,
            Shape::FalseElse,
            Shape::True,
            Shape::False,
        ] {
            code = fixpoint(ctx, shape.name(), &code, |code| {
                sweep(code, |code, tokens, at| {
                    Ok(match_conditional(code, tokens, at, shape))
                })
            })?;
        }
        Ok(code)
    }
}

/// Simplify all constant conditionals in a source string.
///
/// Convenience wrapper around [`ConstCondElim`].
pub fn simplify_conditionals(code: &str) -> Result<String, TransformError> {
    ConstCondElim::run_on_source(&PassContext::default(), code)
}

/// One of the four literal-guard shapes, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    TrueElse,
    FalseElse,
    True,
    False,
}

impl Shape {
    /// The literal the guard must spell.
    fn guard(self) -> &'static str {
        match self {
            Shape::TrueElse | Shape::True => "true",
            Shape::FalseElse | Shape::False => "false",
        }
    }

    /// Whether the shape carries an `else` branch.
    fn has_else(self) -> bool {
        match self {
            Shape::TrueElse | Shape::FalseElse => true,
            Shape::True | Shape::False => false,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Shape::TrueElse => "condelim-true-else",
            Shape::FalseElse => "condelim-false-else",
            Shape::True => "condelim-true",
            Shape::False => "condelim-false",
        }
    }
}

/// Match and rewrite one conditional shape at a token position.
fn match_conditional(code: &str, tokens: &[Token], at: usize, shape: Shape) -> Scan {
    let mut c = Cursor::new(code, tokens, at);
    let branches = match match_shape(&mut c, shape) {
        Some(branches) => branches,
        None => return Scan::Miss,
    };
    debug!(
        "Folding `if ({})`{}",
        shape.guard(),
        if shape.has_else() { " with else branch" } else { "" }
    );
    let text = match shape {
        Shape::TrueElse | Shape::True => body_text(code, branches.then_branch),
        Shape::FalseElse => body_text(code, branches.else_branch.unwrap()),
        Shape::False => String::new(),
    };
    Scan::Rewrite {
        until: c.pos(),
        text,
    }
}

/// The branches of a matched conditional, each as its delimiting braces.
struct Branches {
    then_branch: (Token, Token),
    else_branch: Option<(Token, Token)>,
}

/// Match a conditional of the given shape. The cursor ends up just past the
/// construct on a match.
fn match_shape(c: &mut Cursor, shape: Shape) -> Option<Branches> {
    c.keyword("if")?;
    c.eat(TokenKind::LParen)?;
    c.keyword(shape.guard())?;
    c.eat(TokenKind::RParen)?;
    let then_branch = flat_block(c)?;
    let else_branch = if shape.has_else() {
        c.keyword("else")?;
        Some(flat_block(c)?)
    } else {
        // A trailing `else` belongs to the else-carrying shapes; splitting it
        // off here would leave it dangling.
        if upcoming_else(c) {
            return None;
        }
        None
    };
    Some(Branches {
        then_branch,
        else_branch,
    })
}

/// Consume a `{ ... }` block whose interior is free of nested braces, and
/// return its delimiting brace tokens.
fn flat_block(c: &mut Cursor) -> Option<(Token, Token)> {
    let lbrace = c.eat(TokenKind::LBrace)?;
    let (rbrace, nested) = c.block_end()?;
    if nested {
        return None;
    }
    Some((lbrace, rbrace))
}

/// Check whether the next non-comment token is an `else`.
fn upcoming_else(c: &Cursor) -> bool {
    let mut ahead = c.fork();
    while ahead.eat(TokenKind::Comment).is_some() {}
    ahead.keyword("else").is_some()
}

/// The verbatim text between a pair of brace tokens.
fn body_text(code: &str, (lbrace, rbrace): (Token, Token)) -> String {
    code[lbrace.end..rbrace.start].to_string()
}
