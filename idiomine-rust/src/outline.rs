use idiomine_core::span::Span;
use idiomine_core::syntax::{OutlineNode, SyntaxKind, SyntaxOutline};
use syn::spanned::Spanned;
use syn::visit::{self, Visit};

/// Outline of every statement, item, block and expression in `file`, with
/// spans relative to the text `file` was parsed from.
#[must_use]
pub fn build(file: &syn::File) -> SyntaxOutline {
    let mut builder = OutlineBuilder::default();
    builder.visit_file(file);
    SyntaxOutline::new(builder.nodes)
}

#[derive(Default)]
struct OutlineBuilder {
    nodes: Vec<OutlineNode>,
    depth: usize,
}

impl OutlineBuilder {
    fn enter(&mut self, kind: SyntaxKind, node: &impl Spanned) {
        let range = node.span().byte_range();
        self.nodes.push(OutlineNode {
            kind,
            span: Span::from_bounds(range.start, range.end),
            depth: self.depth,
        });
        self.depth += 1;
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}

impl<'ast> Visit<'ast> for OutlineBuilder {
    fn visit_item(&mut self, node: &'ast syn::Item) {
        self.enter(SyntaxKind::Item, node);
        visit::visit_item(self, node);
        self.leave();
    }

    fn visit_impl_item(&mut self, node: &'ast syn::ImplItem) {
        self.enter(SyntaxKind::Item, node);
        visit::visit_impl_item(self, node);
        self.leave();
    }

    fn visit_trait_item(&mut self, node: &'ast syn::TraitItem) {
        self.enter(SyntaxKind::Item, node);
        visit::visit_trait_item(self, node);
        self.leave();
    }

    fn visit_block(&mut self, node: &'ast syn::Block) {
        self.enter(SyntaxKind::Block, node);
        visit::visit_block(self, node);
        self.leave();
    }

    fn visit_stmt(&mut self, node: &'ast syn::Stmt) {
        let kind = match node {
            syn::Stmt::Local(_) => SyntaxKind::LocalDeclaration,
            syn::Stmt::Expr(_, Some(_)) | syn::Stmt::Macro(_) => SyntaxKind::ExpressionStatement,
            syn::Stmt::Expr(_, None) => SyntaxKind::TailExpression,
            // Items record themselves.
            syn::Stmt::Item(_) => {
                visit::visit_stmt(self, node);
                return;
            }
        };
        self.enter(kind, node);
        visit::visit_stmt(self, node);
        self.leave();
    }

    fn visit_expr(&mut self, node: &'ast syn::Expr) {
        self.enter(SyntaxKind::Expression, node);
        visit::visit_expr(self, node);
        self.leave();
    }

    fn visit_arm(&mut self, node: &'ast syn::Arm) {
        self.enter(SyntaxKind::MatchArm, node);
        visit::visit_arm(self, node);
        self.leave();
    }

    fn visit_field(&mut self, node: &'ast syn::Field) {
        self.enter(SyntaxKind::Field, node);
        visit::visit_field(self, node);
        self.leave();
    }

    fn visit_variant(&mut self, node: &'ast syn::Variant) {
        self.enter(SyntaxKind::Field, node);
        visit::visit_variant(self, node);
        self.leave();
    }
}
