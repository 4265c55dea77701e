use super::*;
use crate::lexer;

/// Canonical form of `code` as space-separated token texts.
fn canon(code: &str) -> String {
    canon_with(code, None, false).0
}

fn canon_with(
    code: &str,
    seed: Option<&VariableNameMap>,
    two_pass: bool,
) -> (String, VariableNameMap) {
    let file = parse_stripped(code).unwrap();
    let (out, names) = canonicalize_file(&file, seed, two_pass);
    (joined(&prettyplease::unparse(&out)), names)
}

fn joined(text: &str) -> String {
    lexer::lex(text)
        .unwrap()
        .into_iter()
        .map(|t| t.text)
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn locals_and_params_are_numbered_in_order() {
    assert_eq!(
        canon("fn f(a: u32) { let b = a; let c = b + a; }"),
        "fn f ( VAR0 : u32 ) { let VAR1 = VAR0 ; let VAR2 = VAR1 + VAR0 ; }"
    );
}

#[test]
fn literals_other_than_zero_and_one_are_abstracted() {
    assert_eq!(
        canon(r#"fn f() { let x = 0; let y = 1; let z = 42; let s = "hi"; let t = true; }"#),
        "fn f ( ) { let VAR0 = 0 ; let VAR1 = 1 ; let VAR2 = LITERAL ; let VAR3 = LITERAL ; let VAR4 = true ; }"
    );
}

#[test]
fn uses_attributes_and_docs_are_removed() {
    let out = canon(
        "use std::fmt;\n/// Docs.\n#[inline]\nfn f() {\n    use std::io;\n    #[allow(unused)]\n    let x = 0;\n}\n",
    );
    assert_eq!(out, "fn f ( ) { let VAR0 = 0 ; }");
}

#[test]
fn calls_and_types_keep_their_names() {
    assert_eq!(
        canon("fn f(v: Vec<u8>) { let n = v.len(); helper(n); }"),
        "fn f ( VAR0 : Vec < u8 > ) { let VAR1 = VAR0 . len ( ) ; helper ( VAR1 ) ; }"
    );
}

#[test]
fn closure_and_loop_bindings_are_renamed() {
    assert_eq!(
        canon("fn f(xs: &[u8]) { for x in xs { let g = |y| x + y; } }"),
        "fn f ( VAR0 : & [ u8 ] ) { for VAR1 in VAR0 { let VAR2 = | VAR3 | VAR1 + VAR3 ; } }"
    );
}

#[test]
fn match_arms_and_if_let_bind_names() {
    assert_eq!(
        canon("fn f(o: Option<u8>) -> u8 { if let Some(w) = o { w; } match o { Some(v) => v, None => 0 } }"),
        "fn f ( VAR0 : Option < u8 > ) -> u8 { if let Some ( VAR1 ) = VAR0 { VAR1 ; } match VAR0 { Some ( VAR2 ) => VAR2 , None => 0 , } }"
    );
}

#[test]
fn struct_shorthand_follows_renamed_names() {
    assert_eq!(
        canon("fn f(y: u8) -> S { S { x: y } }"),
        "fn f ( VAR0 : u8 ) -> S { S { x : VAR0 } }"
    );
    assert_eq!(
        canon("fn f(x: u8) -> S { S { x } }"),
        "fn f ( VAR0 : u8 ) -> S { S { VAR0 } }"
    );
    assert_eq!(
        canon("fn f(s: S) { let S { x, .. } = s; x; }"),
        "fn f ( VAR0 : S ) { let S { VAR1 , .. } = VAR0 ; VAR1 ; }"
    );
}

#[test]
fn fields_are_bound_before_methods_in_member_order() {
    let out = canon("fn f() { let a = C; }\nconst C: u8 = 0;\nstruct S { size: u8 }");
    assert_eq!(
        out,
        "fn f ( ) { let VAR2 = VAR0 ; } const VAR0 : u8 = 0 ; struct S { VAR1 : u8 , }"
    );
}

#[test]
fn mapped_members_are_renamed_and_others_kept() {
    assert_eq!(
        canon("struct P { x: i32 }\nfn f(p: P) -> i32 { p.x + p.y }"),
        "struct P { VAR0 : i32 , } fn f ( VAR1 : P ) -> i32 { VAR1 . VAR0 + VAR1 . y }"
    );
    assert_eq!(
        canon("struct P { x: i32 }\nfn f() -> P { P { x: 2 } }"),
        "struct P { VAR0 : i32 , } fn f ( ) -> P { P { VAR0 : LITERAL } }"
    );
    assert_eq!(
        canon("struct P { x: i32 }\nfn f(p: P) { let P { x: v } = p; v; }"),
        "struct P { VAR0 : i32 , } fn f ( VAR1 : P ) { let P { VAR0 : VAR2 } = VAR1 ; VAR2 ; }"
    );
}

#[test]
fn macro_arguments_are_canonicalized() {
    assert_eq!(
        canon(r#"fn f(a: u8) { println!("{}", a); }"#),
        "fn f ( VAR0 : u8 ) { println ! ( LITERAL , VAR0 ) ; }"
    );
}

#[test]
fn unparseable_macro_bodies_are_left_alone() {
    let out = canon("fn f(a: u8) { m!(a => a); }");
    assert!(out.contains("m ! ( a => a )"), "{out}");
}

#[test]
fn uppercase_patterns_are_not_bindings() {
    let out = canon("const MAX: u8 = 9;\nfn f(v: u8) -> u8 { match v { MAX => 1, n => n } }");
    assert_eq!(
        out,
        "const VAR0 : u8 = LITERAL ; fn f ( VAR1 : u8 ) -> u8 { match VAR1 { VAR0 => 1 , VAR2 => VAR2 , } }"
    );
}

#[test]
fn self_is_never_renamed() {
    let out = canon("impl S { fn get(&self, i: usize) -> u8 { self.v[i] } }");
    assert_eq!(
        out,
        "impl S { fn get ( & self , VAR0 : usize ) -> u8 { self . v [ VAR0 ] } }"
    );
}

#[test]
fn seed_keeps_names_and_extends_counter() {
    let (_, seed) = canon_with("fn f(a: u8) { let b = a; }", None, false);
    let (out, names) = canon_with("fn f(a: u8) { let c = a; let b = c; }", Some(&seed), false);
    assert_eq!(
        out,
        "fn f ( VAR0 : u8 ) { let VAR2 = VAR0 ; let VAR1 = VAR2 ; }"
    );
    assert_eq!(names.len(), 3);
}

#[test]
fn second_pass_renames_uses_before_declaration() {
    let code = "fn f() { x; }\nfn h(x: u8) {}";
    let (one, _) = canon_with(code, None, false);
    let (two, _) = canon_with(code, None, true);
    assert_eq!(one, "fn f ( ) { x ; } fn h ( VAR0 : u8 ) { }");
    assert_eq!(two, "fn f ( ) { VAR0 ; } fn h ( VAR0 : u8 ) { }");
}

#[test]
fn canonicalization_is_idempotent() {
    let code = "struct P { x: i32 }\nfn f(p: P, k: u8) -> i32 { let q = p.x * 7; if k > 3 { q } else { 0 } }";
    let (first, names) = canon_with(code, None, true);
    let file = parse_stripped(&first).unwrap();
    let (again, again_names) = canonicalize_file(&file, Some(&names), true);
    assert_eq!(joined(&prettyplease::unparse(&again)), first);
    assert_eq!(again_names.sorted(), names.sorted());
}
