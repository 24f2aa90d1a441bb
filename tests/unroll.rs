#[macro_use]
extern crate indoc;

use wgslopt::{simplify_conditionals, unroll_loops, TransformError};

#[test]
fn unrolls_literal_counting_loop() {
    let out = unroll_loops("for (var i: u32 = 0; i < 3; i++) { x[i] = i; }", 32).unwrap();
    assert_eq!(out, "x[0] = 0; x[1] = 1; x[2] = 2; ");
}

#[test]
fn zero_iterations_vanish() {
    let out = unroll_loops("a; for (var i: u32 = 4; i < 4; i++) { x[i] = i; } b;", 32).unwrap();
    assert_eq!(out, "a;  b;");
}

#[test]
fn reversed_bounds_unroll_to_nothing() {
    let out = unroll_loops("for (var i: u32 = 5; i < 2; i++) { x[i] = i; }", 32).unwrap();
    assert_eq!(out, "");
}

#[test]
fn count_at_threshold_still_unrolls() {
    let out = unroll_loops("for (var i: u32 = 0; i < 2; i++) { f(i); }", 2).unwrap();
    assert_eq!(out, "f(0); f(1); ");
}

#[test]
fn count_beyond_threshold_is_marked_skipped() {
    let src = "for (var i: u32 = 0; i < 100; i++) { x[i] = i; }";
    let out = unroll_loops(src, 32).unwrap();
    assert_eq!(
        out,
        "for (var i: u32 = 0; i < 100; i++) /* Skipped */ { x[i] = i; }"
    );
    // The marker keeps the loop from matching again.
    assert_eq!(unroll_loops(&out, 32).unwrap(), out);
}

#[test]
fn substitution_respects_identifier_boundaries() {
    let out = unroll_loops(
        "for (var i: u32 = 0; i < 2; i++) { idx[i] = i + offset_i; }",
        32,
    )
    .unwrap();
    assert_eq!(out, "idx[0] = 0 + offset_i; idx[1] = 1 + offset_i; ");
}

#[test]
fn nested_loops_are_left_untouched() {
    let src = "for (var i: u32 = 0; i < 2; i++) { for (var j: u32 = 0; j < 2; j++) { x[i][j] = 1; } }";
    assert_eq!(unroll_loops(src, 32).unwrap(), src);
}

#[test]
fn non_literal_bounds_are_a_non_match() {
    let src = "for (var i: u32 = n; i < 3; i++) { x[i] = i; }";
    assert_eq!(unroll_loops(src, 32).unwrap(), src);
    let src = "for (var i = 0; i < 3; i++) { x[i] = i; }";
    assert_eq!(unroll_loops(src, 32).unwrap(), src);
}

#[test]
fn mismatched_induction_variable_is_a_non_match() {
    let src = "for (var i: u32 = 0; j < 3; i++) { x[i] = i; }";
    assert_eq!(unroll_loops(src, 32).unwrap(), src);
}

#[test]
fn overlarge_bound_is_reported() {
    let err = unroll_loops("for (var i: u32 = 0; i < 4294967296; i++) { x[i] = i; }", 32)
        .unwrap_err();
    assert_eq!(
        err,
        TransformError::InvalidBounds {
            text: "4294967296".to_string()
        }
    );
}

#[test]
fn unrolls_every_loop_in_the_source() {
    let out = unroll_loops(
        "for (var i: u32 = 0; i < 2; i++) { a[i]; } for (var j: u32 = 0; j < 2; j++) { b[j]; }",
        32,
    )
    .unwrap();
    assert_eq!(out, "a[0]; a[1];  b[0]; b[1]; ");
}

#[test]
fn unrolling_is_idempotent() {
    let src = "s = 0; for (var i: u32 = 0; i < 4; i++) { s = s + v[i]; } t = s;";
    let once = unroll_loops(src, 32).unwrap();
    assert_eq!(unroll_loops(&once, 32).unwrap(), once);
}

#[test]
fn rewrites_cascade_across_sweeps() {
    // The unrolled body recombines with the text after the loop into a new
    // counting loop, which the next sweep picks up.
    let src = "for (var i: u32 = 0; i < 1; i++) { for (var k: u32 = 0; k < 1; k++) } { w; }";
    assert_eq!(unroll_loops(src, 32).unwrap(), "w; ");
}

#[test]
fn unrolls_inside_surrounding_code() {
    let src = indoc! {"
        fn main() {
            for (var i: u32 = 0; i < 2; i++) { acc = acc + data[i]; }
        }
    "};
    let out = unroll_loops(src, 32).unwrap();
    assert_eq!(
        out,
        "fn main() {\n    acc = acc + data[0]; acc = acc + data[1]; \n}\n"
    );
}

#[test]
fn composes_with_conditional_elimination() {
    let src = "for (var i: u32 = 0; i < 2; i++) { s += w[i]; } if (false) { debug(); }";
    let out = simplify_conditionals(&unroll_loops(src, 32).unwrap()).unwrap();
    assert_eq!(out, "s += w[0]; s += w[1];  ");
}
