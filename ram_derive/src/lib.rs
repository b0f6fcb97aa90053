//! Derive macros for the RAM machine crate.
//!
//! Provides:
//! - `#[derive(Error)]` - `Display` and `std::error::Error` for fault enums

mod error;

use proc_macro::TokenStream;

/// Implements `Display` and `Error` for an enum whose variants each carry an
/// `#[error("...")]` message.
#[proc_macro_derive(Error, attributes(error))]
pub fn derive_error(input: TokenStream) -> TokenStream {
    error::derive_error(input)
}
