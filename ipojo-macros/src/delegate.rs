use std::collections::HashSet;

use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{crate_name, FoundCrate};
use quote::quote;
use syn::{parse_macro_input, ImplItem, ItemImpl, Path};

fn resolve_path(crate_name_str: &str, fallback: TokenStream2) -> Path {
    match crate_name(crate_name_str) {
        Ok(FoundCrate::Itself) => syn::parse2(fallback).expect("fallback path parses"),
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            syn::parse_quote! { #ident }
        }
        Err(_) => syn::parse2(fallback).expect("fallback path parses"),
    }
}

fn core_path() -> Path {
    resolve_path("ipojo-core", quote! { ipojo_core })
}

fn types_path() -> Path {
    resolve_path("ipojo-types", quote! { ipojo_types })
}

/// Every method on `ipojo_core::Registry`, the source of truth this macro
/// generates passthroughs from. Kept in sync with that trait by hand; see
/// its doc comments for behavior.
fn registry_methods(core: &Path, types: &Path, field: &Ident) -> Vec<(&'static str, TokenStream2)> {
    vec![
        (
            "add_service_listener",
            quote! {
                fn add_service_listener(
                    &self,
                    class: &str,
                    filter: Option<#types::LdapFilter>,
                    listener: std::sync::Arc<dyn #core::ServiceListener>,
                ) -> #core::ListenerId {
                    self.#field.add_service_listener(class, filter, listener)
                }
            },
        ),
        (
            "remove_service_listener",
            quote! {
                fn remove_service_listener(&self, id: #core::ListenerId) {
                    self.#field.remove_service_listener(id);
                }
            },
        ),
        (
            "get_service_reference",
            quote! {
                fn get_service_reference(
                    &self,
                    class: &str,
                    filter: Option<&#types::LdapFilter>,
                ) -> Option<#types::Reference> {
                    self.#field.get_service_reference(class, filter)
                }
            },
        ),
        (
            "get_service_references",
            quote! {
                fn get_service_references(
                    &self,
                    class: &str,
                    filter: Option<&#types::LdapFilter>,
                ) -> Vec<#types::Reference> {
                    self.#field.get_service_references(class, filter)
                }
            },
        ),
        (
            "get_all_service_references",
            quote! {
                fn get_all_service_references(
                    &self,
                    class: &str,
                    filter: Option<&#types::LdapFilter>,
                ) -> Vec<#types::Reference> {
                    self.#field.get_all_service_references(class, filter)
                }
            },
        ),
        (
            "get_service",
            quote! {
                fn get_service(&self, reference: &#types::Reference) -> Option<#core::ServiceObject> {
                    self.#field.get_service(reference)
                }
            },
        ),
        (
            "unget_service",
            quote! {
                fn unget_service(&self, reference: &#types::Reference) -> bool {
                    self.#field.unget_service(reference)
                }
            },
        ),
    ]
}

/// Fill in whichever `Registry` methods an `impl Registry for ...` block
/// left unwritten with passthroughs to `self.<field>`, where `field` is the
/// attribute argument. Methods the block already defines are left alone, so
/// a caller overrides exactly the query methods it needs to filter (§4.3)
/// and gets the rest for free.
pub fn delegate_registry_view_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let field = parse_macro_input!(attr as Ident);
    let mut item_impl = parse_macro_input!(item as ItemImpl);

    let present: HashSet<String> = item_impl
        .items
        .iter()
        .filter_map(|i| match i {
            ImplItem::Fn(f) => Some(f.sig.ident.to_string()),
            _ => None,
        })
        .collect();

    let core = core_path();
    let types = types_path();

    for (name, generated) in registry_methods(&core, &types, &field) {
        if present.contains(name) {
            continue;
        }
        item_impl.items.push(ImplItem::Verbatim(generated));
    }

    quote!(#item_impl).into()
}
