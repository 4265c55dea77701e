use proc_macro2::{Delimiter, Group, TokenStream, TokenTree};

/// Drop a leading byte order mark and shebang line.
///
/// `#![...]` on the first line is an inner attribute, not a shebang.
#[must_use]
pub fn strip_preamble(source: &str) -> &str {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    if let Some(rest) = source.strip_prefix("#!")
        && !rest.trim_start().starts_with('[')
    {
        return rest.find('\n').map_or("", |i| &rest[i..]);
    }
    source
}

/// Remove every outer (`#[..]`) and inner (`#![..]`) attribute, doc comments
/// included, at any nesting depth.
#[must_use]
pub fn strip_attributes(stream: TokenStream) -> TokenStream {
    let tokens: Vec<TokenTree> = stream.into_iter().collect();
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if let Some(len) = attribute_len(&tokens[i..]) {
            i += len;
            continue;
        }
        out.push(match &tokens[i] {
            TokenTree::Group(g) => {
                let mut group = Group::new(g.delimiter(), strip_attributes(g.stream()));
                group.set_span(g.span());
                TokenTree::Group(group)
            }
            other => other.clone(),
        });
        i += 1;
    }
    out.into_iter().collect()
}

/// Number of token trees of an attribute starting at `tokens[0]`.
fn attribute_len(tokens: &[TokenTree]) -> Option<usize> {
    let TokenTree::Punct(hash) = tokens.first()? else {
        return None;
    };
    if hash.as_char() != '#' {
        return None;
    }
    let mut len = 1;
    if let Some(TokenTree::Punct(bang)) = tokens.get(1)
        && bang.as_char() == '!'
    {
        len = 2;
    }
    match tokens.get(len)? {
        TokenTree::Group(g) if g.delimiter() == Delimiter::Bracket => Some(len + 1),
        _ => None,
    }
}
