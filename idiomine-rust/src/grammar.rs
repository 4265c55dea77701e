//! The built-in grammar: every node kind the converter in [`crate::ast`]
//! produces, with its exported fields in order.

use idiomine_core::ast::{AstSchema, FieldKind};

use FieldKind::{List, Node, Token};

/// `(kind, [(field, field kind)])` for every node kind.
pub const KINDS: &[(&str, &[(&str, FieldKind)])] = &[
    ("Block", &[("stmts", List)]),
    (
        "LocalStmt",
        &[
            ("let_token", Token),
            ("pat", Node),
            ("eq_token", Token),
            ("init", Node),
            ("else_token", Token),
            ("diverge", Node),
            ("semi_token", Token),
        ],
    ),
    ("ExprStmt", &[("expr", Node), ("semi_token", Token)]),
    ("MacroStmt", &[("mac", Node), ("semi_token", Token)]),
    ("ItemStmt", &[("tokens", List)]),
    ("ExprPath", &[("path", List)]),
    ("ExprLit", &[("lit", Token)]),
    ("ExprBinary", &[("left", Node), ("op", Token), ("right", Node)]),
    ("ExprUnary", &[("op", Token), ("expr", Node)]),
    (
        "ExprAssign",
        &[("left", Node), ("eq_token", Token), ("right", Node)],
    ),
    ("ExprCall", &[("func", Node), ("args", List)]),
    (
        "ExprMethodCall",
        &[
            ("receiver", Node),
            ("dot_token", Token),
            ("method", Token),
            ("turbofish", List),
            ("args", List),
        ],
    ),
    (
        "ExprField",
        &[("base", Node), ("dot_token", Token), ("member", Token)],
    ),
    ("ExprIndex", &[("expr", Node), ("index", Node)]),
    (
        "ExprReference",
        &[("and_token", Token), ("mutability", Token), ("expr", Node)],
    ),
    ("ExprParen", &[("expr", Node)]),
    ("ExprTuple", &[("elems", List)]),
    ("ExprArray", &[("elems", List)]),
    ("ExprMacro", &[("mac", Node)]),
    (
        "ExprClosure",
        &[("inputs", List), ("output", Node), ("body", Node)],
    ),
    ("ExprCast", &[("expr", Node), ("as_token", Token), ("ty", Node)]),
    ("ExprTry", &[("expr", Node), ("question_token", Token)]),
    ("ExprAwait", &[("base", Node), ("await_token", Token)]),
    (
        "ExprStruct",
        &[("path", List), ("fields", List), ("rest", Node)],
    ),
    (
        "FieldValue",
        &[("member", Token), ("colon_token", Token), ("expr", Node)],
    ),
    (
        "ExprRange",
        &[("start", Node), ("limits", Token), ("end", Node)],
    ),
    ("ExprReturn", &[("return_token", Token), ("expr", Node)]),
    ("ExprBlock", &[("block", Node)]),
    (
        "ExprIf",
        &[
            ("if_token", Token),
            ("cond", Node),
            ("then_branch", Node),
            ("else_branch", Node),
        ],
    ),
    (
        "ExprLet",
        &[
            ("let_token", Token),
            ("pat", Node),
            ("eq_token", Token),
            ("expr", Node),
        ],
    ),
    ("ExprVerbatim", &[("tokens", List)]),
    (
        "PatIdent",
        &[
            ("by_ref", Token),
            ("mutability", Token),
            ("ident", Token),
            ("subpat", Node),
        ],
    ),
    ("PatType", &[("pat", Node), ("colon_token", Token), ("ty", Node)]),
    ("PatTuple", &[("elems", List)]),
    ("PatTupleStruct", &[("path", List), ("elems", List)]),
    ("PatWild", &[("underscore_token", Token)]),
    ("PatVerbatim", &[("tokens", List)]),
    ("Type", &[("tokens", List)]),
    (
        "Macro",
        &[("path", List), ("bang_token", Token), ("tokens", List)],
    ),
];

/// The registry as a schema.
#[must_use]
pub fn schema() -> AstSchema {
    let mut schema = AstSchema::new();
    for (kind, fields) in KINDS {
        schema.insert(kind, fields);
    }
    schema
}
