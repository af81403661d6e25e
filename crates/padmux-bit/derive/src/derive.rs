use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Expr, ExprLit, Fields, Lit};

/// Highest bit position representable by the `u64` mask storage.
const MAX_POSITION: u64 = 63;

pub(crate) fn handle_derive_bit(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;

    let Data::Enum(data) = input.data else {
        return syn::Error::new(Span::call_site(), "Bit can be derived only for enums")
            .to_compile_error()
            .into();
    };

    // Resolve every variant to its bit position
    let mut positions: Vec<(syn::Ident, u64)> = Vec::with_capacity(data.variants.len());
    let mut next = 0u64;
    for variant in data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return syn::Error::new_spanned(
                &variant.ident,
                "Bit supports only fieldless enum variants",
            )
            .to_compile_error()
            .into();
        }
        let position = match &variant.discriminant {
            Some((_, expr)) => match discriminant_value(expr) {
                Some(value) => value,
                None => {
                    return syn::Error::new_spanned(
                        expr,
                        "Bit discriminants must be integer literals",
                    )
                    .to_compile_error()
                    .into();
                }
            },
            None => next,
        };
        if position > MAX_POSITION {
            return syn::Error::new_spanned(
                &variant.ident,
                format!("bit position {position} does not fit into 64 bits"),
            )
            .to_compile_error()
            .into();
        }
        next = position + 1;
        positions.push((variant.ident, position));
    }

    let bit_arms = positions.iter().map(|(v, pos)| {
        quote! { #name::#v => 1u64 << #pos }
    });
    let index_arms = positions.iter().map(|(v, pos)| {
        let pos = *pos as u32;
        quote! { #pos => ::core::option::Option::Some(#name::#v) }
    });

    let expanded = quote! {
        impl ::padmux_bit_mask::Bitable for #name {
            #[inline]
            fn bit(&self) -> u64 {
                match self { #( #bit_arms, )* }
            }

            #[inline]
            fn index(&self) -> u32 { self.bit().trailing_zeros() }

            #[inline]
            fn from_index(index: u32) -> ::core::option::Option<Self> {
                match index {
                    #( #index_arms, )*
                    _ => ::core::option::Option::None,
                }
            }
        }
    };

    TokenStream::from(expanded)
}

fn discriminant_value(expr: &Expr) -> Option<u64> {
    match expr {
        Expr::Lit(ExprLit { lit: Lit::Int(int), .. }) => int.base10_parse::<u64>().ok(),
        Expr::Group(group) => discriminant_value(&group.expr),
        Expr::Paren(paren) => discriminant_value(&paren.expr),
        _ => None,
    }
}
