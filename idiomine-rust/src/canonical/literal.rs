use idiomine_core::names::LITERAL_SENTINEL;
use proc_macro2::Span;

/// Whether a literal is replaced by the sentinel. `0` and `1` survive in
/// every literal form; booleans are keywords and always survive.
#[must_use]
pub fn is_abstracted(lit: &syn::Lit) -> bool {
    match lit {
        syn::Lit::Int(i) => !is_zero_or_one(i.base10_digits()),
        syn::Lit::Float(f) => !f
            .base10_digits()
            .parse::<f64>()
            .is_ok_and(|v| v == 0.0 || v == 1.0),
        syn::Lit::Str(s) => !is_zero_or_one(&s.value()),
        syn::Lit::ByteStr(b) => !matches!(b.value().as_slice(), b"0" | b"1"),
        syn::Lit::Char(c) => !matches!(c.value(), '0' | '1'),
        syn::Lit::Byte(b) => !matches!(b.value(), b'0' | b'1'),
        syn::Lit::CStr(_) => true,
        syn::Lit::Bool(_) => false,
        _ => false,
    }
}

fn is_zero_or_one(text: &str) -> bool {
    text == "0" || text == "1"
}

/// The sentinel as a single-segment path.
#[must_use]
pub fn sentinel_path(span: Span) -> syn::ExprPath {
    syn::ExprPath {
        attrs: Vec::new(),
        qself: None,
        path: syn::Ident::new(LITERAL_SENTINEL, span).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(code: &str) -> syn::Lit {
        syn::parse_str(code).unwrap()
    }

    #[test]
    fn zero_and_one_survive_in_every_form() {
        for code in ["0", "1", "0u8", "0x1", "1.0", "0.0", "'0'", "'1'", "\"0\"", "b'1'", "b\"0\""] {
            assert!(!is_abstracted(&lit(code)), "{code} should survive");
        }
    }

    #[test]
    fn other_values_are_abstracted() {
        for code in ["2", "42u64", "3.14", "'a'", "\"hello\"", "b'x'", "b\"xy\"", "c\"s\""] {
            assert!(is_abstracted(&lit(code)), "{code} should be abstracted");
        }
    }

    #[test]
    fn booleans_survive() {
        assert!(!is_abstracted(&lit("true")));
        assert!(!is_abstracted(&lit("false")));
    }
}
