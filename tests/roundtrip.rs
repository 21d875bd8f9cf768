//! End-to-end assembly and round-trip tests.
//!
//! The core property: printing a resolved module yields canonical text, and
//! assembling that text again prints the same bytes.

use pretty_assertions::assert_eq;

use mica::{assemble, Error};

fn canon(src: &str) -> String {
    assemble(src).unwrap().to_string()
}

/// Asserts that `src` assembles and that its canonical form is stable
/// under re-assembly.
fn roundtrip(src: &str) -> String {
    let first = canon(src);
    let second = canon(&first);
    assert_eq!(first, second, "canonical form not stable for:\n{}", src);
    first
}

#[test]
fn test_full_module_roundtrip() {
    let out = roundtrip(
        r#"
source_filename = "demo.c"
target datalayout = "e-m:e-i64:64-f80:128-n8:16:32:64-S128"
target triple = "x86_64-unknown-linux-gnu"

%pair = type { i32, i8* }

$shared = comdat any

@counter = global i32 0, align 4
@msg = private unnamed_addr constant [6 x i8] c"hello\00", align 1
@table = constant [2 x i32] [i32 10, i32 20], section ".rodata", comdat($shared)

@counter_alias = alias i32, i32* @counter

declare i32 @printf(i8*, ...)

define i32 @main() #0 !dbg !1 {
entry:
  %p = alloca %pair, align 8
  %fmt = getelementptr inbounds [6 x i8], [6 x i8]* @msg, i64 0, i64 0
  %n = call i32 (i8*, ...) @printf(i8* %fmt)
  %old = load i32, i32* @counter, align 4
  %new = add nsw i32 %old, 1
  store i32 %new, i32* @counter, align 4
  %done = icmp sgt i32 %new, 10
  br i1 %done, label %exit, label %again

again:
  br label %exit

exit:
  %r = phi i32 [ %n, %entry ], [ 0, %again ]
  ret i32 %r
}

attributes #0 = { noinline "frame-pointer"="all" }

!llvm.module.flags = !{!0}
!0 = !{i32 1, !"wchar_size", i32 4}
!1 = distinct !{!1}
"#,
    );
    assert!(out.contains("define i32 @main() #0 !dbg !1 {"), "{}", out);
}

#[test]
fn test_whitespace_and_comments_normalize() {
    let a = canon("@g   =   global   i32   7 ; trailing comment\n");
    let b = canon("; leading\n@g = global i32 7");
    assert_eq!(a, b);
    assert_eq!(a, "@g = global i32 7\n");
}

#[test]
fn test_unnamed_entities_number_in_order() {
    // Named entities never consume slots; the unnamed global after two
    // named ones is still @0, and prints as @0.
    let out = roundtrip("@a = global i32 1\n@b = global i32 2\n@0 = global i32 3");
    assert_eq!(
        out,
        "@a = global i32 1\n@b = global i32 2\n@0 = global i32 3\n"
    );
}

#[test]
fn test_unnamed_locals_materialize_in_output() {
    let out = roundtrip(
        "define i32 @f(i32, i32) {\n\
         \x20 %3 = add i32 %0, %1\n\
         \x20 ret i32 %3\n\
         }",
    );
    assert_eq!(
        out,
        "define i32 @f(i32 %0, i32 %1) {\n\
         2:\n\
         \x20 %3 = add i32 %0, %1\n\
         \x20 ret i32 %3\n\
         }\n"
    );
}

#[test]
fn test_forward_references_keep_identity() {
    let out = roundtrip(
        "@p = global i32* @g\n\
         @g = global i32 7",
    );
    assert_eq!(out, "@p = global i32* @g\n@g = global i32 7\n");
}

#[test]
fn test_metadata_cycle_prints_safely() {
    let out = roundtrip(
        "!scope = !{!0}\n\
         !0 = distinct !{!0, !1}\n\
         !1 = !{!\"name\"}",
    );
    assert_eq!(
        out,
        "!scope = !{!0}\n\
         !0 = distinct !{!0, !1}\n\
         !1 = !{!\"name\"}\n"
    );
}

#[test]
fn test_metadata_uniquing_rewrites_references() {
    let out = canon(
        "!a = !{!0, !1}\n\
         !0 = !{i32 1}\n\
         !1 = !{i32 1}",
    );
    assert_eq!(out, "!a = !{!0, !0}\n!0 = !{i32 1}\n");
}

#[test]
fn test_hex_floats_print_exactly() {
    let out = roundtrip(
        "@a = global double 0x7FF8000000000000\n\
         @b = global float 0x7FF8000000000000\n\
         @c = global half 0xH7E00\n\
         @d = global fp128 0xL00000000000000003FFF000000000000",
    );
    // NaN has no finite decimal form; the hex spelling survives.
    assert!(out.contains("double 0x7FF8000000000000"), "{}", out);
    assert!(out.contains("half 0xH7E00"), "{}", out);
}

#[test]
fn test_decimal_floats_print_when_exact() {
    assert_eq!(canon("@x = global double 2.5"), "@x = global double 2.500000e+00\n");
    assert_eq!(canon("@y = global double 0.1"), "@y = global double 1.000000e-01\n");
    // A full mantissa does not survive six decimal digits; the bits keep
    // their hexadecimal spelling.
    let out = roundtrip("@z = global double 0x3FD5555555555555");
    assert_eq!(out, "@z = global double 0x3FD5555555555555\n");
}

#[test]
fn test_quoted_identifiers_roundtrip() {
    let out = roundtrip("@\"odd name\" = global i32 0");
    assert_eq!(out, "@\"odd name\" = global i32 0\n");
}

#[test]
fn test_duplicate_definitions_rejected() {
    assert_eq!(
        assemble("@g = global i32 0\n@g = global i32 1").unwrap_err(),
        Error::DuplicateDefinition("@g".into())
    );
    assert_eq!(
        assemble("%t = type opaque\n%t = type { i32 }").unwrap_err(),
        Error::DuplicateDefinition("%t".into())
    );
}

#[test]
fn test_numbering_gap_rejected() {
    assert_eq!(
        assemble("@0 = global i32 0\n@2 = global i32 1").unwrap_err(),
        Error::Numbering {
            scope: "module".into(),
            expected: 1,
            found: 2,
        }
    );
}

#[test]
fn test_unresolved_references_enumerated() {
    let err = assemble(
        "@p = global i32* @gone\n\
         define void @f() {\n\
         \x20 %x = add i32 %y, 1\n\
         \x20 br label %nowhere\n\
         }",
    )
    .unwrap_err();
    assert_eq!(
        err,
        Error::Unresolved(vec!["@gone".into(), "%y".into(), "%nowhere".into()])
    );
}

#[test]
fn test_type_mismatch_reported() {
    let err = assemble(
        "define void @f(i32 %a) {\n\
         \x20 %b = add i64 %a, 1\n\
         \x20 ret void\n\
         }",
    )
    .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_)), "{:?}", err);
}

#[test]
fn test_switch_and_select_roundtrip() {
    roundtrip(
        "define i32 @classify(i32 %x) {\n\
         entry:\n\
         \x20 switch i32 %x, label %other [\n\
         \x20   i32 0, label %zero\n\
         \x20   i32 1, label %one\n\
         \x20 ]\n\
         zero:\n\
         \x20 ret i32 100\n\
         one:\n\
         \x20 ret i32 200\n\
         other:\n\
         \x20 %neg = icmp slt i32 %x, 0\n\
         \x20 %r = select i1 %neg, i32 -1, i32 1\n\
         \x20 ret i32 %r\n\
         }",
    );
}

#[test]
fn test_vector_and_aggregate_ops_roundtrip() {
    roundtrip(
        "define <4 x i32> @v(<4 x i32> %a, <4 x i32> %b) {\n\
         entry:\n\
         \x20 %e = extractelement <4 x i32> %a, i32 0\n\
         \x20 %i = insertelement <4 x i32> %b, i32 %e, i32 3\n\
         \x20 %s = shufflevector <4 x i32> %a, <4 x i32> %i, <4 x i32> zeroinitializer\n\
         \x20 ret <4 x i32> %s\n\
         }",
    );
    roundtrip(
        "%rec = type { i32, { i8, i64 } }\n\
         define i64 @g(%rec %r) {\n\
         entry:\n\
         \x20 %x = extractvalue %rec %r, 1, 1\n\
         \x20 %r2 = insertvalue %rec %r, i64 %x, 1, 1\n\
         \x20 %y = extractvalue %rec %r2, 1, 1\n\
         \x20 ret i64 %y\n\
         }",
    );
}

#[test]
fn test_opaque_pointer_free_ir_with_conversions() {
    roundtrip(
        "define i64 @conv(i32 %x, double %d) {\n\
         entry:\n\
         \x20 %w = sext i32 %x to i64\n\
         \x20 %t = fptosi double %d to i64\n\
         \x20 %sum = add i64 %w, %t\n\
         \x20 ret i64 %sum\n\
         }",
    );
}

#[test]
fn test_discarded_call_result_consumes_slot() {
    let out = roundtrip(
        "declare i32 @g()\n\
         define void @f() {\n\
         entry:\n\
         \x20 call i32 @g()\n\
         \x20 %1 = call i32 @g()\n\
         \x20 ret void\n\
         }",
    );
    // The discarded result took slot 0 and materializes in the output.
    assert!(out.contains("%0 = call i32 @g()"), "{}", out);
}
