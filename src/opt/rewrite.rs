// Copyright (c) 2017-2021 Fabian Schuiki

//! Shared scan-and-rewrite machinery.
//!
//! The passes express themselves as matchers over the token stream; this
//! module owns the sweep across the text and the fixpoint driver around it.
//! A sweep tokenizes the current source, offers every token position to the
//! matcher from left to right, and splices the replacements it produces into
//! a fresh output string. Text the matcher never claims is copied through
//! verbatim, so a sweep without any matches reproduces its input byte for
//! byte.

use crate::opt::{PassContext, TransformError};
use crate::syntax::{tokenize, Token};

/// What a matcher decided about a token position.
pub enum Scan {
    /// No construct starts at this token.
    Miss,
    /// A construct spanning the tokens up to (excluding) `until` was matched
    /// and is replaced by `text`.
    Rewrite { until: usize, text: String },
    /// A construct spanning the tokens up to (excluding) `until` was matched
    /// but is left in place; the sweep continues after it.
    Skip { until: usize },
}

/// Run one left-to-right sweep over the source.
///
/// Replacement text is not rescanned within the same sweep; a rewrite that
/// produces new matches is picked up by the next sweep. Returns the rewritten
/// source and the number of rewrites performed.
pub fn sweep<M>(code: &str, mut matcher: M) -> Result<(String, usize), TransformError>
where
    M: FnMut(&str, &[Token], usize) -> Result<Scan, TransformError>,
{
    let tokens = tokenize(code);
    let mut out = String::with_capacity(code.len());
    let mut copied = 0;
    let mut rewrites = 0;
    let mut at = 0;
    while at < tokens.len() {
        match matcher(code, &tokens, at)? {
            Scan::Miss => at += 1,
            Scan::Rewrite { until, text } => {
                out.push_str(&code[copied..tokens[at].start]);
                out.push_str(&text);
                copied = tokens[until - 1].end;
                at = until;
                rewrites += 1;
            }
            Scan::Skip { until } => at = until,
        }
    }
    out.push_str(&code[copied..]);
    Ok((out, rewrites))
}

/// Drive a sweep function to its fixpoint.
///
/// Sweeps are repeated until one of them performs no rewrite. The number of
/// sweeps is capped by the context; exceeding the cap aborts the pass rather
/// than scanning forever on input whose rewrites keep producing new matches.
pub fn fixpoint<F>(
    ctx: &PassContext,
    pass: &'static str,
    code: &str,
    mut sweep_fn: F,
) -> Result<String, TransformError>
where
    F: FnMut(&str) -> Result<(String, usize), TransformError>,
{
    let mut code = code.to_string();
    for n in 0..ctx.max_sweeps {
        let (rewritten, rewrites) = sweep_fn(&code)?;
        trace!("Sweep {} of `{}` rewrote {} constructs", n, pass, rewrites);
        if rewrites == 0 {
            return Ok(rewritten);
        }
        code = rewritten;
    }
    Err(TransformError::Divergence {
        pass,
        sweeps: ctx.max_sweeps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::TokenKind;

    #[test]
    fn sweep_without_matches_is_identity() {
        let code = "fn main() { let x = 1; /* note */ }";
        let (out, rewrites) = sweep(code, |_, _, _| Ok(Scan::Miss)).unwrap();
        assert_eq!(out, code);
        assert_eq!(rewrites, 0);
    }

    #[test]
    fn skipped_regions_are_preserved() {
        let code = "a { b } c";
        let (out, rewrites) = sweep(code, |_, tokens, at| {
            Ok(match tokens[at].kind {
                TokenKind::LBrace => Scan::Skip { until: at + 3 },
                TokenKind::Ident => Scan::Rewrite {
                    until: at + 1,
                    text: "x".to_string(),
                },
                _ => Scan::Miss,
            })
        })
        .unwrap();
        assert_eq!(out, "x { b } x");
        assert_eq!(rewrites, 2);
    }

    #[test]
    fn runaway_rewrites_hit_the_sweep_cap() {
        let ctx = PassContext {
            max_sweeps: 8,
            ..Default::default()
        };
        // Doubling every identifier never converges.
        let result = fixpoint(&ctx, "runaway", "a", |code| {
            sweep(code, |code, tokens, at| {
                Ok(match tokens[at].kind {
                    TokenKind::Ident => Scan::Rewrite {
                        until: at + 1,
                        text: format!("{0} {0}", tokens[at].text(code)),
                    },
                    _ => Scan::Miss,
                })
            })
        });
        assert_eq!(
            result,
            Err(TransformError::Divergence {
                pass: "runaway",
                sweeps: 8
            })
        );
    }
}
