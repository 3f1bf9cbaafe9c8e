use syn::meta::ParseNestedMeta;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{bracketed, Attribute, Error, LitStr, Result, Token, Type};

#[derive(Default)]
pub struct ControllerAttributes {
    pub path: Option<LitStr>,
}

impl Parse for ControllerAttributes {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut result = Self::default();
        while !input.is_empty() {
            let lookahead = input.lookahead1();
            if lookahead.peek(kw::path) {
                if result.path.is_some() {
                    return Err(Error::new(input.span(), "Path is already defined!"));
                }

                result.path = Some(input.parse::<LitArg<kw::path, LitStr>>()?.value);
            } else if lookahead.peek(Token![,]) {
                let _ = input.parse::<Token![,]>()?;
            } else {
                return Err(lookahead.error());
            }
        }

        Ok(result)
    }
}

struct LitArg<T, A> {
    value: A,
    _p: std::marker::PhantomData<T>,
}

impl<T: Parse, A: Parse> Parse for LitArg<T, A> {
    fn parse(input: ParseStream) -> Result<Self> {
        let _ = input.parse::<T>()?;
        let _ = input.parse::<Token![=]>()?;
        let value = input.parse()?;
        Ok(Self {
            value,
            _p: std::marker::PhantomData,
        })
    }
}

mod kw {
    use syn::custom_keyword;

    custom_keyword!(path);
}

#[derive(Default)]
pub struct ModuleAttributes {
    pub providers: Vec<Type>,
    pub controllers: Vec<Type>,
}

impl TryFrom<&Attribute> for ModuleAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> std::result::Result<Self, Self::Error> {
        let mut providers = None;
        let mut controllers = None;

        value.parse_nested_meta(|meta| {
            if meta.path.is_ident("providers") {
                set_types(&meta, &mut providers, "Providers")
            } else if meta.path.is_ident("controllers") {
                set_types(&meta, &mut controllers, "Controllers")
            } else {
                Err(meta.error("Unsupported module attribute!"))
            }
        })?;

        Ok(Self {
            providers: providers.unwrap_or_default(),
            controllers: controllers.unwrap_or_default(),
        })
    }
}

fn set_types(meta: &ParseNestedMeta, target: &mut Option<Vec<Type>>, name: &str) -> Result<()> {
    if target.is_some() {
        return Err(meta.error(format!("{name} are already defined!")));
    }

    *target = Some(parse_type_list(meta.value()?)?);
    Ok(())
}

fn parse_type_list(input: ParseStream) -> Result<Vec<Type>> {
    let content;
    bracketed!(content in input);

    Ok(Punctuated::<Type, Token![,]>::parse_terminated(&content)?
        .into_iter()
        .collect())
}
