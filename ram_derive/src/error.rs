//! Derive macro for fault enums.
//!
//! # Usage
//!
//! ```ignore
//! use ram_derive::Error;
//!
//! #[derive(Debug, Error)]
//! pub enum Fault {
//!     #[error("division by zero")]
//!     DivisionByZero,
//!
//!     #[error("no instruction at position {0}")]
//!     InvalidProgramCounter(usize),
//!
//!     #[error("step limit of {limit} reached")]
//!     StepLimitExceeded { limit: u64 },
//! }
//! ```
//!
//! Only fields referenced by the message are bound, so a variant may carry
//! diagnostic data that its message leaves out.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, LitStr, Variant, parse_macro_input};

pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Error can only be derived for enums",
        ));
    };

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let arms = data
        .variants
        .iter()
        .map(display_arm)
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    #(#arms)*
                }
            }
        }

        impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {}
    })
}

/// Builds the `match` arm that formats one variant.
fn display_arm(variant: &Variant) -> syn::Result<TokenStream2> {
    let ident = &variant.ident;
    let message = error_message(variant)?;
    let text = message.value();

    let arm = match &variant.fields {
        Fields::Unit => quote! {
            Self::#ident => ::std::write!(f, #message),
        },
        Fields::Named(fields) => {
            let used: Vec<_> = fields
                .named
                .iter()
                .filter_map(|field| field.ident.as_ref())
                .filter(|field| references(&text, &field.to_string()))
                .collect();
            quote! {
                Self::#ident { #(#used,)* .. } => ::std::write!(f, #message, #(#used = #used),*),
            }
        }
        Fields::Unnamed(fields) => {
            let mut patterns = Vec::with_capacity(fields.unnamed.len());
            let mut used = Vec::new();
            for index in 0..fields.unnamed.len() {
                if references(&text, &index.to_string()) {
                    let binding = format_ident!("_{}", index);
                    patterns.push(quote!(#binding));
                    used.push(binding);
                } else {
                    patterns.push(quote!(_));
                }
            }
            let format = LitStr::new(&rename_positional(&text), message.span());
            quote! {
                Self::#ident(#(#patterns),*) => ::std::write!(f, #format, #(#used = #used),*),
            }
        }
    };

    Ok(arm)
}

/// Reads the `#[error("...")]` message of a variant.
fn error_message(variant: &Variant) -> syn::Result<LitStr> {
    let attr = variant
        .attrs
        .iter()
        .find(|attr| attr.path().is_ident("error"))
        .ok_or_else(|| {
            syn::Error::new_spanned(
                &variant.ident,
                format!(
                    "missing #[error(\"...\")] attribute on variant `{}`",
                    variant.ident
                ),
            )
        })?;

    attr.parse_args::<LitStr>().map_err(|_| {
        syn::Error::new_spanned(
            attr,
            "expected a string literal, e.g. #[error(\"division by zero\")]",
        )
    })
}

/// Whether `message` interpolates the argument `name`, with or without a
/// format specifier.
fn references(message: &str, name: &str) -> bool {
    arguments(message).contains(&name)
}

/// Names of the arguments interpolated by `message`. `{{` escapes are skipped.
fn arguments(message: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = message;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        if let Some(escaped) = after.strip_prefix('{') {
            rest = escaped;
            continue;
        }
        let end = after.find(['}', ':']).unwrap_or(after.len());
        names.push(&after[..end]);
        rest = &after[end..];
    }
    names
}

/// Rewrites positional placeholders `{N}` to the `_N` bindings of a tuple
/// variant, leaving escaped braces untouched.
fn rename_positional(message: &str) -> String {
    let mut out = String::with_capacity(message.len() + 4);
    let mut rest = message;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..=open]);
        let after = &rest[open + 1..];
        if let Some(escaped) = after.strip_prefix('{') {
            out.push('{');
            rest = escaped;
            continue;
        }
        let end = after.find(['}', ':']).unwrap_or(after.len());
        let name = &after[..end];
        if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
            out.push('_');
        }
        out.push_str(name);
        rest = &after[end..];
    }
    out.push_str(rest);
    out
}
