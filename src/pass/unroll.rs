// Copyright (c) 2017-2021 Fabian Schuiki

//! Loop Unrolling

use crate::opt::prelude::*;
use crate::opt::rewrite::{fixpoint, sweep, Scan};
use crate::syntax::{Cursor, Token, TokenKind};

/// Loop Unrolling
///
/// This pass expands counting loops with literal bounds into repeated copies
/// of their body, one per iteration, with the induction variable replaced by
/// its literal value in each copy. It recognizes loops of the shape
/// `for (var i: u32 = <start>; i < <end>; i++) { <body> }` whose body
/// contains no nested blocks; a loop whose body does contain nested blocks
/// is left entirely untouched, including any loops inside it. Loops whose
/// iteration count exceeds the configured threshold are left rolled and
/// marked with a skip comment instead, which keeps the generated code from
/// exploding in size.
pub struct LoopUnroll;

impl Pass for LoopUnroll {
    fn run_on_source(ctx: &PassContext, code: &str) -> Result<String, TransformError> {
        info!("Unroll [threshold {}]", ctx.threshold);
        fixpoint(ctx, "unroll", code, |code| {
            sweep(code, |code, tokens, at| match_loop(ctx, code, tokens, at))
        })
    }
}

/// Unroll all counting loops in a source string.
///
/// Convenience wrapper around [`LoopUnroll`] for callers that do not carry a
/// pass context of their own.
pub fn unroll_loops(code: &str, threshold: u32) -> Result<String, TransformError> {
    let ctx = PassContext {
        threshold,
        ..Default::default()
    };
    LoopUnroll::run_on_source(&ctx, code)
}

/// A recognized counting loop.
struct LoopHead<'a> {
    /// The induction variable.
    var: &'a str,
    /// The literal start bound.
    start: Token,
    /// The literal end bound.
    end: Token,
    /// The `)` closing the loop header.
    rparen: Token,
    /// The braces delimiting the body.
    lbrace: Token,
    rbrace: Token,
    /// The tokens between the braces.
    body: &'a [Token],
    /// Index of the first token after the loop.
    until: usize,
}

/// The outcome of probing a token position for a counting loop.
enum LoopScan<'a> {
    /// No counting loop starts here.
    Miss,
    /// A loop header matched, but the body contains nested blocks; the whole
    /// construct up to (excluding) the given token is off limits.
    Nested { until: usize },
    /// A fully matching loop.
    Match(LoopHead<'a>),
}

/// Match the header of a counting loop, up to and including the opening
/// brace. Returns the induction variable and the start, end, `)`, and `{`
/// tokens.
fn match_header(code: &str, c: &mut Cursor) -> Option<(Token, Token, Token, Token, Token)> {
    c.keyword("for")?;
    c.eat(TokenKind::LParen)?;
    c.keyword("var")?;
    let var = c.ident()?;
    c.eat(TokenKind::Colon)?;
    c.keyword("u32")?;
    c.eat(TokenKind::Assign)?;
    let start = c.int()?;
    c.eat(TokenKind::Semicolon)?;
    let test_var = c.ident()?;
    c.eat(TokenKind::Lt)?;
    let end = c.int()?;
    c.eat(TokenKind::Semicolon)?;
    let incr_var = c.ident()?;
    c.eat(TokenKind::Incr)?;
    let rparen = c.eat(TokenKind::RParen)?;
    let lbrace = c.eat(TokenKind::LBrace)?;
    // The induction variable must be the one tested and incremented.
    let name = var.text(code);
    if test_var.text(code) != name || incr_var.text(code) != name {
        return None;
    }
    Some((var, start, end, rparen, lbrace))
}

/// Probe a token position for a counting loop.
fn recognize<'a>(code: &'a str, tokens: &'a [Token], at: usize) -> LoopScan<'a> {
    let mut c = Cursor::new(code, tokens, at);
    let (var, start, end, rparen, lbrace) = match match_header(code, &mut c) {
        Some(header) => header,
        None => return LoopScan::Miss,
    };
    let body_start = c.pos();
    let (rbrace, nested) = match c.block_end() {
        Some(end) => end,
        None => return LoopScan::Miss,
    };
    if nested {
        return LoopScan::Nested { until: c.pos() };
    }
    LoopScan::Match(LoopHead {
        var: var.text(code),
        start,
        end,
        rparen,
        lbrace,
        rbrace,
        body: &tokens[body_start..c.pos() - 1],
        until: c.pos(),
    })
}

/// Match and rewrite a counting loop at a token position.
fn match_loop(
    ctx: &PassContext,
    code: &str,
    tokens: &[Token],
    at: usize,
) -> Result<Scan, TransformError> {
    let head = match recognize(code, tokens, at) {
        LoopScan::Miss => return Ok(Scan::Miss),
        LoopScan::Nested { until } => return Ok(Scan::Skip { until }),
        LoopScan::Match(head) => head,
    };
    let start = parse_bound(code, head.start)?;
    let end = parse_bound(code, head.end)?;
    trace!("Matched loop (var {}, {}..{})", head.var, start, end);

    let text = if i64::from(end) - i64::from(start) > i64::from(ctx.threshold) {
        debug!(
            "Keeping loop rolled (var {}, {}..{}): count exceeds threshold {}",
            head.var, start, end, ctx.threshold
        );
        let mut text = String::new();
        text.push_str(&code[tokens[at].start..head.rparen.end]);
        text.push_str(" /* Skipped */ ");
        text.push_str(&code[head.lbrace.start..head.rbrace.end]);
        text
    } else {
        debug!("Unrolling loop (var {}, {}..{})", head.var, start, end);
        let mut text = String::new();
        for i in start..end {
            specialize(code, &head, i, &mut text);
        }
        text
    };
    Ok(Scan::Rewrite {
        until: head.until,
        text,
    })
}

/// Append one specialized copy of the loop body, with the induction variable
/// replaced by its literal value.
///
/// Replacement works on whole identifier tokens; identifiers that merely
/// contain the variable name as a substring are left alone. The copy spans
/// from the first body token to the closing brace, so leading whitespace is
/// dropped and trailing whitespace is kept.
fn specialize(code: &str, head: &LoopHead, value: u32, out: &mut String) {
    let mut copied = match head.body.first() {
        Some(token) => token.start,
        None => return,
    };
    for token in head.body {
        out.push_str(&code[copied..token.start]);
        if token.kind == TokenKind::Ident && token.text(code) == head.var {
            out.push_str(&value.to_string());
        } else {
            out.push_str(token.text(code));
        }
        copied = token.end;
    }
    out.push_str(&code[copied..head.rbrace.start]);
}

/// Parse a matched bound token, guarding against values the pattern can
/// capture but the target type cannot hold.
fn parse_bound(code: &str, token: Token) -> Result<u32, TransformError> {
    token
        .text(code)
        .parse()
        .map_err(|_| TransformError::InvalidBounds {
            text: token.text(code).to_string(),
        })
}
