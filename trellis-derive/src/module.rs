use crate::attributes::ModuleAttributes;
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{DeriveInput, Error, Result};

const MODULE: &str = "module";

fn module_attributes(input: &DeriveInput) -> Result<ModuleAttributes> {
    let mut attributes = input
        .attrs
        .iter()
        .filter(|attribute| attribute.path().is_ident(MODULE));

    let result = attributes
        .next()
        .map(ModuleAttributes::try_from)
        .transpose()?
        .unwrap_or_default();

    if let Some(duplicate) = attributes.next() {
        return Err(Error::new(
            duplicate.span(),
            "Module manifest is already defined!",
        ));
    }

    Ok(result)
}

pub fn expand_module(input: &DeriveInput) -> Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "Generic modules are not supported!",
        ));
    }

    let ident = &input.ident;
    let ModuleAttributes {
        providers,
        controllers,
    } = module_attributes(input)?;

    Ok(quote! {
        #[automatically_derived]
        impl trellis::module::Module for #ident {
            fn manifest() -> trellis::module::ModuleManifest {
                trellis::module::ModuleManifest::new(
                    ::std::vec![#(trellis_di::metadata::ClassId::of::<#providers>()),*],
                    ::std::vec![#(trellis_di::metadata::ClassId::of::<#controllers>()),*],
                )
            }
        }

        const _: () = {
            fn annotate(
                store: &mut trellis_di::metadata::MetadataStore,
            ) -> ::std::result::Result<(), trellis_di::error::MetadataError> {
                trellis::module::mark_module(
                    store,
                    trellis_di::metadata::ClassId::of::<#ident>(),
                    <#ident as trellis::module::Module>::manifest(),
                );
                ::std::result::Result::Ok(())
            }

            trellis_di::metadata::internal::submit! {
                trellis_di::metadata::internal::MetadataRegisterer {
                    register: annotate
                }
            };
        };
    })
}
