use crate::attributes::ControllerAttributes;
use itertools::Itertools;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{
    Attribute, Error, FnArg, Ident, ImplItem, ImplItemFn, Item, ItemImpl, LitStr, Receiver,
    Result, Signature, Type,
};

const GET: &str = "get";
const POST: &str = "post";

struct Route {
    verb: Ident,
    path: LitStr,
}

fn is_route_attribute(attribute: &Attribute) -> bool {
    attribute.path().is_ident(GET) || attribute.path().is_ident(POST)
}

fn parse_route(attribute: &Attribute) -> Result<Route> {
    let verb = if attribute.path().is_ident(GET) {
        "Get"
    } else {
        "Post"
    };

    Ok(Route {
        verb: Ident::new(verb, attribute.span()),
        path: attribute.parse_args()?,
    })
}

// removes route attributes, since they are not real attributes
fn extract_route(method: &mut ImplItemFn) -> Result<Option<Route>> {
    let (routes, attrs): (Vec<_>, Vec<_>) = method
        .attrs
        .drain(..)
        .partition(is_route_attribute);

    method.attrs = attrs;

    let mut routes = routes.iter();
    let route = routes.next().map(parse_route).transpose()?;
    if let Some(duplicate) = routes.next() {
        return Err(Error::new(
            duplicate.span(),
            "Only one route can be defined per method!",
        ));
    }

    Ok(route)
}

fn is_invocable(signature: &Signature) -> bool {
    signature.asyncness.is_none()
        && signature.generics.params.is_empty()
        && signature.inputs.len() == 1
        && matches!(
            signature.inputs.first(),
            Some(FnArg::Receiver(Receiver {
                reference: Some(_),
                mutability: None,
                colon_token: None,
                ..
            }))
        )
}

fn reject_route_attributes(attributes: &[Attribute]) -> Result<()> {
    match attributes.iter().find(|attribute| is_route_attribute(attribute)) {
        Some(attribute) => Err(Error::new(
            attribute.span(),
            "Routes can only be defined on methods!",
        )),
        None => Ok(()),
    }
}

struct Handler {
    ident: Ident,
    handler: Ident,
    name: String,
    route: Route,
}

fn collect_handlers(item: &mut ItemImpl) -> Result<Vec<Handler>> {
    let mut handlers = vec![];
    for impl_item in &mut item.items {
        match impl_item {
            ImplItem::Fn(method) => {
                let route = match extract_route(method)? {
                    Some(route) => route,
                    None => continue,
                };

                if !is_invocable(&method.sig) {
                    return Err(Error::new(
                        method.sig.span(),
                        "Route handlers can only take &self and cannot be async or generic!",
                    ));
                }

                let ident = method.sig.ident.clone();
                let name = ident.unraw().to_string();
                handlers.push(Handler {
                    handler: format_ident!("__trellis_handler_{}", name),
                    ident,
                    name,
                    route,
                });
            }
            ImplItem::Const(item) => reject_route_attributes(&item.attrs)?,
            ImplItem::Type(item) => reject_route_attributes(&item.attrs)?,
            _ => {}
        }
    }

    Ok(handlers)
}

fn generate_handler(ty: &Type, handler: &Handler) -> TokenStream {
    let ident = &handler.ident;
    let handler = &handler.handler;

    quote! {
        fn #handler(
            instance: &trellis_di::instance_provider::ComponentInstanceAnyPtr,
        ) -> ::std::result::Result<(), trellis_di::instance_provider::ErrorPtr> {
            let controller = trellis::controller::downcast_controller::<#ty>(instance)?;
            trellis::controller::IntoHandlerResult::into_handler_result(controller.#ident())
        }
    }
}

pub fn generate_controller(item: Item, args: &ControllerAttributes) -> Result<TokenStream> {
    let mut item = match item {
        Item::Impl(item) => item,
        item => {
            return Err(Error::new(
                item.span(),
                "Only impl blocks can be marked as a controller!",
            ))
        }
    };

    if item.trait_.is_some() {
        return Err(Error::new(
            item.span(),
            "Only inherent impl blocks can be marked as a controller!",
        ));
    }

    if !item.generics.params.is_empty() {
        return Err(Error::new(
            item.generics.span(),
            "Generic controllers are not supported!",
        ));
    }

    let handlers = collect_handlers(&mut item)?;
    let ty = &item.self_ty;

    let handler_functions = handlers
        .iter()
        .map(|handler| generate_handler(ty, handler))
        .collect_vec();

    let names = handlers.iter().map(|handler| &handler.name).collect_vec();
    let handler_idents = handlers.iter().map(|handler| &handler.handler).collect_vec();

    let routes = handlers
        .iter()
        .map(|handler| {
            let name = &handler.name;
            let Route { verb, path } = &handler.route;
            quote! {
                trellis::controller::mark_route(
                    store,
                    trellis_di::metadata::MethodId::new(class, #name),
                    trellis::controller::HttpVerb::#verb,
                    #path,
                )?;
            }
        })
        .collect_vec();

    let base_path = args.path.as_ref().map(|path| {
        quote! {
            trellis::controller::mark_controller(store, class, #path);
        }
    });

    Ok(quote! {
        #item

        const _: () = {
            #(#handler_functions)*

            fn annotate(
                store: &mut trellis_di::metadata::MetadataStore,
            ) -> ::std::result::Result<(), trellis_di::error::MetadataError> {
                let class = trellis_di::metadata::ClassId::of::<#ty>();
                #base_path

                trellis::controller::declare_prototype(
                    store,
                    trellis::controller::ControllerPrototype::new(class)
                        #(.with_method(#names, #handler_idents))*,
                )?;

                #(#routes)*

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
