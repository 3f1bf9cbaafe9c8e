mod attributes;
mod controller;
mod module;

use crate::attributes::ControllerAttributes;
use crate::controller::generate_controller;
use crate::module::expand_module;
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Error, Item};

/// Marks an impl block as a controller. Methods marked with `#[get("/path")]` or
/// `#[post("/path")]` become route handlers, prefixed with the optional `path` of the controller.
/// A type can have only one controller impl block.
#[proc_macro_attribute]
pub fn controller(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args as ControllerAttributes);
    let item = parse_macro_input!(input as Item);
    let controller = generate_controller(item, &args).unwrap_or_else(Error::into_compile_error);

    (quote! {
        #controller
    })
    .into()
}

/// Declares a module with `#[module(providers = [..], controllers = [..])]`.
#[proc_macro_derive(Module, attributes(module))]
pub fn generate_module(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_module(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}
