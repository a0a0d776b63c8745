//! ipojo-macros
//!
//! Proc macros for the ipojo ecosystem.
//!
//! - `delegate_registry_view`: fills in whichever `Registry` methods an
//!   `impl Registry for ...` block leaves unwritten with passthroughs to a
//!   named inner field, so a filtering facade over a registry only has to
//!   override the methods it actually needs to intercept.
#![warn(missing_docs)]

mod delegate;

use proc_macro::TokenStream;

/// Attribute macro: `#[delegate_registry_view(inner)]` on an
/// `impl Registry for Wrapper` block, where `inner` names a field of
/// `Wrapper` that itself implements `Registry`.
#[proc_macro_attribute]
pub fn delegate_registry_view(attr: TokenStream, item: TokenStream) -> TokenStream {
    delegate::delegate_registry_view_impl(attr, item)
}
