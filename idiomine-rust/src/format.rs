//! Uniform pretty-printing of canonical trees.

use std::panic::{self, AssertUnwindSafe};

use proc_macro2::TokenStream;
use quote::ToTokens;
use tracing::debug;

/// A canonical file rendered to text and parsed back, so that every span
/// points into `text`.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub text: String,
    pub stream: TokenStream,
    pub file: syn::File,
}

/// Render `file` in one consistent layout.
///
/// `prettyplease` is used when it can print the tree; trees it rejects fall
/// back to the plain token text.
#[must_use]
pub fn unify_format(file: &syn::File) -> String {
    match panic::catch_unwind(AssertUnwindSafe(|| prettyplease::unparse(file))) {
        Ok(text) => text,
        Err(_) => {
            debug!("pretty printer rejected tree, using token text");
            token_text(file)
        }
    }
}

/// Space-separated token text of `file`.
#[must_use]
pub fn token_text(file: &syn::File) -> String {
    let mut text = file.to_token_stream().to_string();
    text.push('\n');
    text
}

/// Render `file` and parse the result again.
pub fn render(file: &syn::File) -> syn::Result<Rendered> {
    let text = unify_format(file);
    match reparse(text) {
        Ok(rendered) => Ok(rendered),
        Err(err) => {
            debug!(error = %err, "formatted text does not reparse, using token text");
            reparse(token_text(file))
        }
    }
}

fn reparse(text: String) -> syn::Result<Rendered> {
    let stream = syn::parse_str::<TokenStream>(&text)?;
    let file = syn::parse2(stream.clone())?;
    Ok(Rendered { text, stream, file })
}
