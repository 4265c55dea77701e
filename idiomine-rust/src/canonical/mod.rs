//! Identifier and literal canonicalization over a `syn` tree.
//!
//! Every binding a file declares (locals, parameters, closure and pattern
//! bindings, fields, constants and statics) is renamed to `VAR<n>` in
//! first-seen order, and each later reference to the same name follows.
//! Literals other than `0` and `1` become `LITERAL`. `use` items are dropped;
//! attributes and doc comments are removed before parsing.

mod literal;
mod strip;

#[cfg(test)]
mod tests;

use idiomine_core::names::VariableNameMap;
use proc_macro2::Ident;
use quote::ToTokens;
use syn::fold::{self, Fold};
use syn::punctuated::{Pair, Punctuated};
use syn::{Expr, ExprPath, FieldPat, FieldValue, Item, Member, Pat, Stmt};

pub use literal::{is_abstracted, sentinel_path};
pub use strip::{strip_attributes, strip_preamble};

/// Parse `source` into a file with its preamble and attributes removed.
pub fn parse_stripped(source: &str) -> syn::Result<syn::File> {
    let stream = syn::parse_str::<proc_macro2::TokenStream>(strip_preamble(source))?;
    syn::parse2(strip_attributes(stream))
}

/// Canonicalize `file`, continuing from `seed` when given.
///
/// With `two_pass`, a second rewrite runs over the original tree seeded with
/// every name the first pass assigned, so uses that precede their declaration
/// in source order are renamed too.
#[must_use]
pub fn canonicalize_file(
    file: &syn::File,
    seed: Option<&VariableNameMap>,
    two_pass: bool,
) -> (syn::File, VariableNameMap) {
    let mut pass = Canonicalizer::new(seed.cloned().unwrap_or_default());
    let mut out = pass.fold_file(file.clone());
    if two_pass {
        pass = Canonicalizer::new(pass.names);
        out = pass.fold_file(file.clone());
    }
    (out, pass.names)
}

/// The rewriting fold. Holds the name map it extends.
#[derive(Debug, Default)]
pub struct Canonicalizer {
    names: VariableNameMap,
}

impl Canonicalizer {
    #[must_use]
    pub fn new(names: VariableNameMap) -> Self {
        Self { names }
    }

    #[must_use]
    pub fn names(&self) -> &VariableNameMap {
        &self.names
    }

    #[must_use]
    pub fn into_names(self) -> VariableNameMap {
        self.names
    }

    /// Rename a declared identifier, assigning it a canonical name on first
    /// sight.
    fn bind(&mut self, ident: &Ident) -> Ident {
        let name = ident.to_string();
        if name == "_" || name == "self" || self.names.is_canonical(&name) {
            return ident.clone();
        }
        Ident::new(self.names.assign(&name), ident.span())
    }

    /// Rename an identifier only if it is already mapped.
    fn lookup(&self, ident: &Ident) -> Option<Ident> {
        self.names
            .get(&ident.to_string())
            .map(|name| Ident::new(name, ident.span()))
    }

    /// Bind every name a pattern introduces. Uppercase-initial identifiers in
    /// patterns are constants or unit variants and are not bindings.
    fn bind_pat(&mut self, pat: Pat) -> Pat {
        match pat {
            Pat::Ident(mut p) => {
                if !starts_uppercase(&p.ident) {
                    p.ident = self.bind(&p.ident);
                }
                if let Some((at, sub)) = p.subpat.take() {
                    p.subpat = Some((at, Box::new(self.bind_pat(*sub))));
                }
                Pat::Ident(p)
            }
            Pat::Tuple(mut p) => {
                p.elems = map_punctuated(p.elems, |pat| self.bind_pat(pat));
                Pat::Tuple(p)
            }
            Pat::TupleStruct(mut p) => {
                p.elems = map_punctuated(p.elems, |pat| self.bind_pat(pat));
                Pat::TupleStruct(p)
            }
            Pat::Slice(mut p) => {
                p.elems = map_punctuated(p.elems, |pat| self.bind_pat(pat));
                Pat::Slice(p)
            }
            Pat::Or(mut p) => {
                p.cases = map_punctuated(p.cases, |pat| self.bind_pat(pat));
                Pat::Or(p)
            }
            Pat::Paren(mut p) => {
                p.pat = Box::new(self.bind_pat(*p.pat));
                Pat::Paren(p)
            }
            Pat::Reference(mut p) => {
                p.pat = Box::new(self.bind_pat(*p.pat));
                Pat::Reference(p)
            }
            Pat::Type(mut p) => {
                p.pat = Box::new(self.bind_pat(*p.pat));
                Pat::Type(p)
            }
            Pat::Struct(mut p) => {
                p.fields = map_punctuated(p.fields, |mut field| {
                    field.pat = Box::new(self.bind_pat(*field.pat));
                    expand_field_pat(field)
                });
                Pat::Struct(p)
            }
            other => other,
        }
    }

    /// Fold members of a structural scope. Field-like members are visited
    /// first so their names are assigned before any method body uses them;
    /// the original member order is kept in the output.
    fn fold_members<T>(
        &mut self,
        members: Vec<T>,
        field_like: impl Fn(&T) -> bool,
        mut fold_member: impl FnMut(&mut Self, T) -> T,
    ) -> Vec<T> {
        let mut slots: Vec<Option<T>> = Vec::with_capacity(members.len());
        let mut deferred = Vec::new();
        for (i, member) in members.into_iter().enumerate() {
            if field_like(&member) {
                slots.push(Some(fold_member(self, member)));
            } else {
                slots.push(None);
                deferred.push((i, member));
            }
        }
        for (i, member) in deferred {
            slots[i] = Some(fold_member(self, member));
        }
        slots.into_iter().flatten().collect()
    }

    fn fold_items(&mut self, items: Vec<Item>) -> Vec<Item> {
        let items = items
            .into_iter()
            .filter(|item| !matches!(item, Item::Use(_)))
            .collect();
        self.fold_members(
            items,
            |item| {
                matches!(
                    item,
                    Item::Struct(_)
                        | Item::Enum(_)
                        | Item::Union(_)
                        | Item::Const(_)
                        | Item::Static(_)
                        | Item::Type(_)
                )
            },
            |this, item| this.fold_item(item),
        )
    }
}

fn starts_uppercase(ident: &Ident) -> bool {
    ident
        .to_string()
        .trim_start_matches("r#")
        .starts_with(char::is_uppercase)
}

fn map_punctuated<T, P>(items: Punctuated<T, P>, mut f: impl FnMut(T) -> T) -> Punctuated<T, P> {
    items
        .into_pairs()
        .map(|pair| {
            let (value, punct) = pair.into_tuple();
            Pair::new(f(value), punct)
        })
        .collect()
}

/// A field pattern is written shorthand exactly when its binding reads the
/// same as its member.
fn expand_field_pat(mut field: FieldPat) -> FieldPat {
    let shorthand = match (&*field.pat, &field.member) {
        (Pat::Ident(p), Member::Named(member)) => p.ident == *member && p.subpat.is_none(),
        _ => false,
    };
    if shorthand {
        field.colon_token = None;
    } else if field.colon_token.is_none() {
        field.colon_token = Some(Default::default());
    }
    field
}

impl Fold for Canonicalizer {
    fn fold_file(&mut self, file: syn::File) -> syn::File {
        syn::File {
            shebang: None,
            attrs: Vec::new(),
            items: self.fold_items(file.items),
        }
    }

    fn fold_item_mod(&mut self, mut module: syn::ItemMod) -> syn::ItemMod {
        if let Some((brace, items)) = module.content.take() {
            module.content = Some((brace, self.fold_items(items)));
        }
        module
    }

    fn fold_item_impl(&mut self, mut imp: syn::ItemImpl) -> syn::ItemImpl {
        let items = std::mem::take(&mut imp.items);
        let mut imp = fold::fold_item_impl(self, imp);
        imp.items = self.fold_members(
            items,
            |item| matches!(item, syn::ImplItem::Const(_) | syn::ImplItem::Type(_)),
            |this, item| this.fold_impl_item(item),
        );
        imp
    }

    fn fold_item_trait(&mut self, mut tr: syn::ItemTrait) -> syn::ItemTrait {
        let items = std::mem::take(&mut tr.items);
        let mut tr = fold::fold_item_trait(self, tr);
        tr.items = self.fold_members(
            items,
            |item| matches!(item, syn::TraitItem::Const(_) | syn::TraitItem::Type(_)),
            |this, item| this.fold_trait_item(item),
        );
        tr
    }

    fn fold_block(&mut self, mut block: syn::Block) -> syn::Block {
        block
            .stmts
            .retain(|stmt| !matches!(stmt, Stmt::Item(Item::Use(_))));
        fold::fold_block(self, block)
    }

    // Declarations

    fn fold_signature(&mut self, mut sig: syn::Signature) -> syn::Signature {
        sig.inputs = map_punctuated(sig.inputs, |arg| match arg {
            syn::FnArg::Typed(mut typed) => {
                typed.pat = Box::new(self.bind_pat(*typed.pat));
                syn::FnArg::Typed(typed)
            }
            receiver => receiver,
        });
        fold::fold_signature(self, sig)
    }

    fn fold_expr_closure(&mut self, mut closure: syn::ExprClosure) -> syn::ExprClosure {
        closure.inputs = map_punctuated(closure.inputs, |pat| self.bind_pat(pat));
        fold::fold_expr_closure(self, closure)
    }

    fn fold_expr_for_loop(&mut self, mut for_loop: syn::ExprForLoop) -> syn::ExprForLoop {
        // The iterated expression is evaluated outside the loop binding.
        for_loop.expr = Box::new(self.fold_expr(*for_loop.expr));
        for_loop.pat = Box::new(self.bind_pat(*for_loop.pat));
        for_loop.pat = Box::new(self.fold_pat(*for_loop.pat));
        for_loop.body = self.fold_block(for_loop.body);
        for_loop
    }

    fn fold_local(&mut self, mut local: syn::Local) -> syn::Local {
        local.pat = self.bind_pat(local.pat);
        fold::fold_local(self, local)
    }

    fn fold_arm(&mut self, mut arm: syn::Arm) -> syn::Arm {
        arm.pat = self.bind_pat(arm.pat);
        fold::fold_arm(self, arm)
    }

    fn fold_expr_let(&mut self, mut expr: syn::ExprLet) -> syn::ExprLet {
        expr.pat = Box::new(self.bind_pat(*expr.pat));
        fold::fold_expr_let(self, expr)
    }

    fn fold_field(&mut self, mut field: syn::Field) -> syn::Field {
        if let Some(ident) = &field.ident {
            field.ident = Some(self.bind(ident));
        }
        fold::fold_field(self, field)
    }

    fn fold_item_const(&mut self, mut item: syn::ItemConst) -> syn::ItemConst {
        item.ident = self.bind(&item.ident);
        fold::fold_item_const(self, item)
    }

    fn fold_item_static(&mut self, mut item: syn::ItemStatic) -> syn::ItemStatic {
        item.ident = self.bind(&item.ident);
        fold::fold_item_static(self, item)
    }

    fn fold_impl_item_const(&mut self, mut item: syn::ImplItemConst) -> syn::ImplItemConst {
        item.ident = self.bind(&item.ident);
        fold::fold_impl_item_const(self, item)
    }

    fn fold_trait_item_const(&mut self, mut item: syn::TraitItemConst) -> syn::TraitItemConst {
        item.ident = self.bind(&item.ident);
        fold::fold_trait_item_const(self, item)
    }

    // References

    fn fold_expr(&mut self, expr: Expr) -> Expr {
        match expr {
            Expr::Lit(lit) if is_abstracted(&lit.lit) => Expr::Path(sentinel_path(lit.lit.span())),
            Expr::Path(path) => Expr::Path(self.rename_expr_path(path)),
            other => fold::fold_expr(self, other),
        }
    }

    fn fold_pat(&mut self, pat: Pat) -> Pat {
        match pat {
            Pat::Lit(lit) if is_abstracted(&lit.lit) => Pat::Path(sentinel_path(lit.lit.span())),
            Pat::Ident(mut p) => {
                if let Some(renamed) = self.lookup(&p.ident) {
                    p.ident = renamed;
                }
                if let Some((at, sub)) = p.subpat.take() {
                    p.subpat = Some((at, Box::new(self.fold_pat(*sub))));
                }
                Pat::Ident(p)
            }
            other => fold::fold_pat(self, other),
        }
    }

    /// Named members are uses of a field name wherever they appear.
    fn fold_member(&mut self, member: Member) -> Member {
        match member {
            Member::Named(ident) => Member::Named(self.lookup(&ident).unwrap_or(ident)),
            other => other,
        }
    }

    fn fold_field_pat(&mut self, field: FieldPat) -> FieldPat {
        expand_field_pat(fold::fold_field_pat(self, field))
    }

    fn fold_field_value(&mut self, field: FieldValue) -> FieldValue {
        let mut field = fold::fold_field_value(self, field);
        let shorthand = match (&field.expr, &field.member) {
            (Expr::Path(path), Member::Named(member)) => path.path.is_ident(member),
            _ => false,
        };
        if field.colon_token.is_none() && !shorthand {
            field.colon_token = Some(Default::default());
        }
        field
    }

    /// Macro arguments are canonicalized when they parse as a comma-separated
    /// expression list; any other body is left as written.
    fn fold_macro(&mut self, mut mac: syn::Macro) -> syn::Macro {
        if mac.tokens.is_empty() {
            return mac;
        }
        if let Ok(args) = mac.parse_body_with(Punctuated::<Expr, syn::Token![,]>::parse_terminated)
        {
            let args = map_punctuated(args, |expr| self.fold_expr(expr));
            mac.tokens = args.to_token_stream();
        }
        mac
    }
}

impl Canonicalizer {
    fn rename_expr_path(&self, mut path: ExprPath) -> ExprPath {
        if path.qself.is_some()
            || path.path.leading_colon.is_some()
            || path.path.segments.len() != 1
        {
            return path;
        }
        if let Some(segment) = path.path.segments.first_mut()
            && segment.arguments.is_none()
            && let Some(renamed) = self.lookup(&segment.ident)
        {
            segment.ident = renamed;
        }
        path
    }
}
