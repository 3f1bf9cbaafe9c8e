use crate::attributes::{DefaultDefinition, FieldAttributes};
use itertools::Itertools;
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{
    Attribute, Data, DataStruct, DeriveInput, Error, Field, Fields, FieldsNamed, FieldsUnnamed,
    Ident, Result, Type,
};

const COMPONENT: &str = "component";
const INJECTABLE: &str = "injectable";

fn field_attributes(field: &Field) -> Result<Option<FieldAttributes>> {
    field
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident(COMPONENT))
        .map(FieldAttributes::try_from)
        .next()
        .transpose()
}

fn dependency_type(field: &Field) -> Result<Option<&Type>> {
    Ok(match field_attributes(field)? {
        Some(FieldAttributes {
            default: Some(_), ..
        }) => None,
        _ => Some(&field.ty),
    })
}

fn generate_construction(field: &Field) -> Result<TokenStream> {
    if let Some(attributes) = field_attributes(field)? {
        match &attributes.default {
            Some(DefaultDefinition::Expr(path)) => return Ok(quote!(#path())),
            Some(DefaultDefinition::Default) => {
                return Ok(quote!(::std::default::Default::default()))
            }
            None => {}
        }
    }

    let ty = &field.ty;
    Ok(quote! {
        dependencies.next_typed::<<#ty as ::std::ops::Deref>::Target>()?
    })
}

fn make_named_struct(fields: &FieldsNamed) -> Result<TokenStream> {
    let fields: Vec<_> = fields
        .named
        .iter()
        .map(|field| -> Result<TokenStream> {
            let ident = &field.ident;
            let instance = generate_construction(field)?;
            Ok(quote! {
                #ident: #instance
            })
        })
        .try_collect()?;

    Ok(quote! {
        Self {
            #(#fields),*
        }
    })
}

fn make_unnamed_struct(fields: &FieldsUnnamed) -> Result<TokenStream> {
    let fields: Vec<_> = fields
        .unnamed
        .iter()
        .map(generate_construction)
        .try_collect()?;

    Ok(quote! {
        Self(#(#fields),*)
    })
}

fn is_injectable(attributes: &[Attribute]) -> Result<bool> {
    let mut injectable = false;
    for attribute in attributes
        .iter()
        .filter(|attribute| attribute.path().is_ident(INJECTABLE))
    {
        attribute.meta.require_path_only()?;
        injectable = true;
    }

    Ok(injectable)
}

fn generate_annotation(ident: &Ident) -> TokenStream {
    quote! {
        fn annotate(
            store: &mut trellis_di::metadata::MetadataStore,
        ) -> ::std::result::Result<(), trellis_di::error::MetadataError> {
            trellis_di::metadata::mark_injectable(
                store,
                trellis_di::metadata::ClassId::of::<#ident>(),
            );
            ::std::result::Result::Ok(())
        }

        trellis_di::metadata::internal::submit! {
            trellis_di::metadata::internal::MetadataRegisterer {
                register: annotate
            }
        };
    }
}

pub fn expand_component(input: &DeriveInput) -> Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "Generic components are not supported!",
        ));
    }

    if let Data::Struct(DataStruct { fields, .. }) = &input.data {
        let ident = &input.ident;
        let generation = match fields {
            Fields::Named(fields) => make_named_struct(fields)?,
            Fields::Unnamed(fields) => make_unnamed_struct(fields)?,
            Fields::Unit => quote! { Self },
        };

        let dependencies: Vec<_> = fields
            .iter()
            .filter_map(|field| dependency_type(field).transpose())
            .try_collect()?;

        let annotation = if is_injectable(&input.attrs)? {
            generate_annotation(ident)
        } else {
            quote!()
        };

        Ok(quote! {
            #[automatically_derived]
            impl trellis_di::component::Injectable for #ident {}

            #[automatically_derived]
            impl trellis_di::component::Component for #ident {
                fn dependencies() -> ::std::vec::Vec<trellis_di::metadata::ClassId> {
                    ::std::vec![#(trellis_di::metadata::ClassId::of::<<#dependencies as ::std::ops::Deref>::Target>()),*]
                }

                #[allow(unused_variables)]
                fn create(
                    dependencies: &mut trellis_di::instance_provider::ResolvedDependencies,
                ) -> ::std::result::Result<Self, trellis_di::error::ComponentInstanceProviderError> {
                    ::std::result::Result::Ok(#generation)
                }
            }

            const _: () = {
                fn register() -> trellis_di::component_registry::ComponentDefinition {
                    trellis_di::component_registry::ComponentDefinition::of::<#ident>()
                }

                trellis_di::component_registry::internal::submit! {
                    trellis_di::component_registry::internal::ComponentDefinitionRegisterer {
                        register
                    }
                };

                #annotation
            };
        })
    } else {
        Err(Error::new(
            input.span(),
            "Can only derive Component on structs!",
        ))
    }
}
