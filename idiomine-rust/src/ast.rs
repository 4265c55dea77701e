//! Conversion of `syn` statements into language-neutral [`AstNode`]s.
//!
//! Node kinds and field names follow `syn`'s own types. Constructs without a
//! dedicated kind fall back to `ExprVerbatim`/`PatVerbatim`, keeping their
//! tokens so every leaf of a chunk stays reachable.

use idiomine_core::ast::{AstNode, AstValue};
use quote::ToTokens;
use syn::{Expr, Pat, Stmt};

use crate::lexer;

/// A field holding the tokens of `node`: one token, a list, or nothing.
fn leaf(node: &impl ToTokens) -> AstValue {
    let mut tokens = lexer::flatten(node.to_token_stream());
    match tokens.len() {
        0 => AstValue::Absent,
        1 => AstValue::Token(tokens.remove(0)),
        _ => AstValue::List(tokens.into_iter().map(AstValue::Token).collect()),
    }
}

/// A field holding the tokens of `node` as a list, possibly empty.
fn leaves(node: &impl ToTokens) -> AstValue {
    AstValue::List(
        lexer::flatten(node.to_token_stream())
            .into_iter()
            .map(AstValue::Token)
            .collect(),
    )
}

fn list<'a, T: 'a>(items: impl IntoIterator<Item = &'a T>, f: impl Fn(&T) -> AstNode) -> AstValue {
    AstValue::List(items.into_iter().map(|item| AstValue::Node(f(item))).collect())
}

fn verbatim(kind: &str, node: &impl ToTokens) -> AstNode {
    AstNode::new(kind).with("tokens", leaves(node))
}

/// A statement sequence as a `Block` node.
#[must_use]
pub fn block_node(stmts: &[Stmt]) -> AstNode {
    AstNode::new("Block").with("stmts", list(stmts, stmt_node))
}

#[must_use]
pub fn stmt_node(stmt: &Stmt) -> AstNode {
    match stmt {
        Stmt::Local(local) => {
            let init = local.init.as_ref();
            let diverge = init.and_then(|i| i.diverge.as_ref());
            AstNode::new("LocalStmt")
                .with("let_token", leaf(&local.let_token))
                .with("pat", pat_node(&local.pat))
                .with("eq_token", init.map_or(AstValue::Absent, |i| leaf(&i.eq_token)))
                .with("init", init.map(|i| expr_node(&i.expr)))
                .with("else_token", diverge.map_or(AstValue::Absent, |(e, _)| leaf(e)))
                .with("diverge", diverge.map(|(_, expr)| expr_node(expr)))
                .with("semi_token", leaf(&local.semi_token))
        }
        Stmt::Expr(expr, semi) => AstNode::new("ExprStmt")
            .with("expr", expr_node(expr))
            .with("semi_token", semi.as_ref().map_or(AstValue::Absent, leaf)),
        Stmt::Macro(stmt) => AstNode::new("MacroStmt")
            .with("mac", macro_node(&stmt.mac))
            .with(
                "semi_token",
                stmt.semi_token.as_ref().map_or(AstValue::Absent, leaf),
            ),
        Stmt::Item(item) => verbatim("ItemStmt", item),
    }
}

fn macro_node(mac: &syn::Macro) -> AstNode {
    AstNode::new("Macro")
        .with("path", leaves(&mac.path))
        .with("bang_token", leaf(&mac.bang_token))
        .with("tokens", leaves(&mac.tokens))
}

fn type_node(ty: &syn::Type) -> AstNode {
    verbatim("Type", ty)
}

fn boxed(expr: &Option<Box<Expr>>) -> AstValue {
    expr.as_deref().map(expr_node).into()
}

#[must_use]
pub fn expr_node(expr: &Expr) -> AstNode {
    match expr {
        Expr::Path(e) if e.qself.is_none() => AstNode::new("ExprPath").with("path", leaves(&e.path)),
        Expr::Lit(e) => AstNode::new("ExprLit").with("lit", leaf(&e.lit)),
        Expr::Binary(e) => AstNode::new("ExprBinary")
            .with("left", expr_node(&e.left))
            .with("op", leaf(&e.op))
            .with("right", expr_node(&e.right)),
        Expr::Unary(e) => AstNode::new("ExprUnary")
            .with("op", leaf(&e.op))
            .with("expr", expr_node(&e.expr)),
        Expr::Assign(e) => AstNode::new("ExprAssign")
            .with("left", expr_node(&e.left))
            .with("eq_token", leaf(&e.eq_token))
            .with("right", expr_node(&e.right)),
        Expr::Call(e) => AstNode::new("ExprCall")
            .with("func", expr_node(&e.func))
            .with("args", list(&e.args, expr_node)),
        Expr::MethodCall(e) => AstNode::new("ExprMethodCall")
            .with("receiver", expr_node(&e.receiver))
            .with("dot_token", leaf(&e.dot_token))
            .with("method", leaf(&e.method))
            .with("turbofish", leaves(&e.turbofish))
            .with("args", list(&e.args, expr_node)),
        Expr::Field(e) => AstNode::new("ExprField")
            .with("base", expr_node(&e.base))
            .with("dot_token", leaf(&e.dot_token))
            .with("member", leaf(&e.member)),
        Expr::Index(e) => AstNode::new("ExprIndex")
            .with("expr", expr_node(&e.expr))
            .with("index", expr_node(&e.index)),
        Expr::Reference(e) => AstNode::new("ExprReference")
            .with("and_token", leaf(&e.and_token))
            .with("mutability", e.mutability.as_ref().map_or(AstValue::Absent, leaf))
            .with("expr", expr_node(&e.expr)),
        Expr::Paren(e) => AstNode::new("ExprParen").with("expr", expr_node(&e.expr)),
        Expr::Tuple(e) => AstNode::new("ExprTuple").with("elems", list(&e.elems, expr_node)),
        Expr::Array(e) => AstNode::new("ExprArray").with("elems", list(&e.elems, expr_node)),
        Expr::Macro(e) => AstNode::new("ExprMacro").with("mac", macro_node(&e.mac)),
        Expr::Closure(e) => AstNode::new("ExprClosure")
            .with("inputs", list(&e.inputs, pat_node))
            .with(
                "output",
                match &e.output {
                    syn::ReturnType::Default => AstValue::Absent,
                    syn::ReturnType::Type(_, ty) => type_node(ty).into(),
                },
            )
            .with("body", expr_node(&e.body)),
        Expr::Cast(e) => AstNode::new("ExprCast")
            .with("expr", expr_node(&e.expr))
            .with("as_token", leaf(&e.as_token))
            .with("ty", type_node(&e.ty)),
        Expr::Try(e) => AstNode::new("ExprTry")
            .with("expr", expr_node(&e.expr))
            .with("question_token", leaf(&e.question_token)),
        Expr::Await(e) => AstNode::new("ExprAwait")
            .with("base", expr_node(&e.base))
            .with("await_token", leaf(&e.await_token)),
        Expr::Struct(e) if e.qself.is_none() => AstNode::new("ExprStruct")
            .with("path", leaves(&e.path))
            .with("fields", list(&e.fields, field_value_node))
            .with("rest", boxed(&e.rest)),
        Expr::Range(e) => AstNode::new("ExprRange")
            .with("start", boxed(&e.start))
            .with("limits", leaf(&e.limits))
            .with("end", boxed(&e.end)),
        Expr::Return(e) => AstNode::new("ExprReturn")
            .with("return_token", leaf(&e.return_token))
            .with("expr", boxed(&e.expr)),
        Expr::Block(e) if e.label.is_none() => {
            AstNode::new("ExprBlock").with("block", block_node(&e.block.stmts))
        }
        Expr::If(e) => AstNode::new("ExprIf")
            .with("if_token", leaf(&e.if_token))
            .with("cond", expr_node(&e.cond))
            .with("then_branch", block_node(&e.then_branch.stmts))
            .with(
                "else_branch",
                e.else_branch.as_ref().map(|(_, expr)| expr_node(expr)),
            ),
        Expr::Let(e) => AstNode::new("ExprLet")
            .with("let_token", leaf(&e.let_token))
            .with("pat", pat_node(&e.pat))
            .with("eq_token", leaf(&e.eq_token))
            .with("expr", expr_node(&e.expr)),
        other => verbatim("ExprVerbatim", other),
    }
}

fn field_value_node(field: &syn::FieldValue) -> AstNode {
    AstNode::new("FieldValue")
        .with("member", leaf(&field.member))
        .with("colon_token", field.colon_token.as_ref().map_or(AstValue::Absent, leaf))
        .with("expr", expr_node(&field.expr))
}

#[must_use]
pub fn pat_node(pat: &Pat) -> AstNode {
    match pat {
        Pat::Ident(p) => AstNode::new("PatIdent")
            .with("by_ref", p.by_ref.as_ref().map_or(AstValue::Absent, leaf))
            .with("mutability", p.mutability.as_ref().map_or(AstValue::Absent, leaf))
            .with("ident", leaf(&p.ident))
            .with("subpat", p.subpat.as_ref().map(|(_, sub)| pat_node(sub))),
        Pat::Type(p) => AstNode::new("PatType")
            .with("pat", pat_node(&p.pat))
            .with("colon_token", leaf(&p.colon_token))
            .with("ty", type_node(&p.ty)),
        Pat::Tuple(p) => AstNode::new("PatTuple").with("elems", list(&p.elems, pat_node)),
        Pat::TupleStruct(p) if p.qself.is_none() => AstNode::new("PatTupleStruct")
            .with("path", leaves(&p.path))
            .with("elems", list(&p.elems, pat_node)),
        Pat::Wild(p) => AstNode::new("PatWild").with("underscore_token", leaf(&p.underscore_token)),
        other => verbatim("PatVerbatim", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idiomine_core::token::Token;
    use std::collections::BTreeSet;

    fn stmts(code: &str) -> Vec<Stmt> {
        let stream = code.parse::<proc_macro2::TokenStream>().unwrap();
        syn::parse::Parser::parse2(syn::Block::parse_within, stream).unwrap()
    }

    fn kinds(value: &AstValue, out: &mut BTreeSet<String>) {
        match value {
            AstValue::Node(node) => {
                out.insert(node.kind.clone());
                for (_, v) in &node.fields {
                    kinds(v, out);
                }
            }
            AstValue::List(items) => items.iter().for_each(|v| kinds(v, out)),
            AstValue::Token(_) | AstValue::Absent => {}
        }
    }

    fn texts(tokens: &[&Token]) -> Vec<String> {
        tokens.iter().map(|t| t.text.clone()).collect()
    }

    #[test]
    fn local_statement_fields() {
        let node = block_node(&stmts("let VAR0 = VAR1 + 1;"));
        let AstValue::List(items) = node.field("stmts").unwrap() else {
            panic!("stmts is a list");
        };
        let AstValue::Node(local) = &items[0] else {
            panic!("statement is a node");
        };
        assert_eq!(local.kind, "LocalStmt");
        let AstValue::Node(init) = local.field("init").unwrap() else {
            panic!("init is a node");
        };
        assert_eq!(init.kind, "ExprBinary");
        assert_eq!(local.field("diverge"), Some(&AstValue::Absent));
    }

    #[test]
    fn token_leaves_cover_the_chunk_in_order() {
        let code = "let VAR0 = VAR1 + 1;\nVAR2.push(VAR0);";
        let node = block_node(&stmts(code));
        assert_eq!(
            texts(&node.tokens()),
            vec!["let", "VAR0", "=", "VAR1", "+", "1", ";", "VAR2", ".", "push", "VAR0", ";"]
        );
        for token in node.tokens() {
            assert_eq!(token.span.slice(code), Some(token.text.as_str()));
        }
    }

    #[test]
    fn unsupported_constructs_keep_their_tokens() {
        let node = block_node(&stmts("loop { break; }"));
        let mut seen = BTreeSet::new();
        kinds(&AstValue::Node(node.clone()), &mut seen);
        assert!(seen.contains("ExprVerbatim"));
        assert_eq!(texts(&node.tokens()), vec!["loop", "{", "break", ";", "}"]);
    }

    #[test]
    fn every_produced_kind_is_in_the_grammar() {
        let code = r#"
            let (a, _) = (b as u8, [c; 2]);
            let Some(d) = e else { return; };
            f(|g: u8| -> u8 { g }, &mut h, -i, j[0], k.l, m?, (n));
            o = S { p: 1, q, ..r };
            if let Some(ref s @ t) = u { v.w::<X>(..y); } else { z!(1); }
            aa.await;
            bb
        "#;
        let node = block_node(&stmts(code));
        let mut seen = BTreeSet::new();
        kinds(&AstValue::Node(node), &mut seen);
        let schema = crate::grammar::schema();
        for kind in &seen {
            assert!(schema.contains(kind), "{kind} missing from grammar");
        }
        for kind in ["LocalStmt", "ExprClosure", "ExprStruct", "FieldValue", "PatIdent", "Macro"] {
            assert!(seen.contains(kind), "{kind} not produced");
        }
    }
}
