use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;

use syn::punctuated::Punctuated;
use syn::spanned::Spanned as _;
use syn::{
    Attribute, Data, DeriveInput, Error, FnArg, GenericArgument, ImplItem, ItemImpl, MetaList,
    Pat, PathArguments, Token, Type,
};

const IMPLEMENTS_ATTR: &str = "implements";
const FACTORY_ATTR: &str = "factory";

fn extract_arc_type(ty: &Type) -> Option<Type> {
    if let Type::Path(type_path) = ty
        && let Some(segment) = type_path.path.segments.last()
        && segment.ident == "Arc"
        && let PathArguments::AngleBracketed(args) = &segment.arguments
        && let Some(GenericArgument::Type(inner)) = args.args.first()
    {
        return Some(inner.clone());
    }
    None
}

fn parse_interfaces(list: &MetaList) -> Result<Vec<Type>, Error> {
    let types = list.parse_args_with(Punctuated::<Type, Token![,]>::parse_terminated)?;
    for ty in &types {
        if !matches!(ty, Type::TraitObject(_)) {
            return Err(Error::new(ty.span(), "Interfaces must be trait objects, e.g. `dyn Trait`"));
        }
    }
    Ok(types.into_iter().collect())
}

fn extract_interfaces(attrs: &[Attribute]) -> Result<Vec<Type>, Error> {
    let mut interfaces = Vec::new();
    for attr in attrs {
        if attr.path().is_ident(IMPLEMENTS_ATTR) {
            interfaces.extend(parse_interfaces(attr.meta.require_list()?)?);
        }
    }
    Ok(interfaces)
}

/// Dependency key and argument extraction for one constructor parameter.
///
/// `Arc<dyn Trait>` parameters depend on the interface, any other `Arc<T>`
/// on the concrete type.
fn dependency(ty: &Type, index: usize) -> Option<(TokenStream2, TokenStream2)> {
    let inner = extract_arc_type(ty)?;
    if let Type::TraitObject(_) = inner {
        Some((
            quote! { ::triode::TypeKey::interface::<#inner>() },
            quote! { args.interface::<#inner>(#index)? },
        ))
    } else {
        Some((
            quote! { ::triode::TypeKey::of::<#inner>() },
            quote! { args.get::<#inner>(#index)? },
        ))
    }
}

fn component_impl(
    self_ty: &TokenStream2,
    keys: &[TokenStream2],
    construct_body: TokenStream2,
    interfaces: &[Type],
) -> TokenStream2 {
    quote! {
        impl ::triode::Component for #self_ty {
            fn dependencies() -> ::std::vec::Vec<::triode::TypeKey> {
                ::std::vec![#(#keys),*]
            }

            #[allow(unused_variables)]
            fn construct(
                args: &::triode::Arguments
            ) -> ::std::result::Result<Self, ::triode::StdError> {
                #construct_body
            }

            fn interfaces() -> ::triode::Interfaces<Self> {
                ::triode::Interfaces::new()
                    #(.with::<#interfaces>(|v| v))*
            }
        }
    }
}

/// Derive macro for the Component trait.
///
/// Every field must be an `Arc<T>` or `Arc<dyn Trait>` resolved from the
/// container. Interfaces are declared with `#[implements(dyn A, dyn B)]`.
#[proc_macro_derive(Component, attributes(implements))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    handle_derive_component(input).unwrap_or_else(|e| e.to_compile_error().into())
}

/// Attribute macro for impl blocks with a factory method.
///
/// ```ignore
/// #[component(implements(dyn Store))]
/// impl FileStore {
///     #[factory]
///     fn open(config: Arc<Config>) -> Result<Self, std::io::Error> { ... }
/// }
/// ```
#[proc_macro_attribute]
pub fn component(attr: TokenStream, item: TokenStream) -> TokenStream {
    let interfaces = if attr.is_empty() {
        Vec::new()
    } else {
        let list = syn::parse_macro_input!(attr as MetaList);
        if !list.path.is_ident(IMPLEMENTS_ATTR) {
            return Error::new(list.path.span(), "Expected `implements(...)`")
                .to_compile_error()
                .into();
        }
        match parse_interfaces(&list) {
            Ok(v) => v,
            Err(e) => return e.to_compile_error().into(),
        }
    };
    match syn::parse::<ItemImpl>(item) {
        Ok(item_impl) => handle_component_impl(item_impl, interfaces)
            .unwrap_or_else(|e| e.to_compile_error().into()),
        Err(_) => Error::new(
            proc_macro2::Span::call_site(),
            "#[component] can only be applied to impl blocks",
        )
        .to_compile_error()
        .into(),
    }
}

fn handle_derive_component(input: DeriveInput) -> Result<TokenStream, Error> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "Generic components are not supported",
        ));
    }
    let fields = match &input.data {
        Data::Struct(s) => &s.fields,
        _ => return Err(Error::new(name.span(), "Only structs are supported")),
    };
    let interfaces = extract_interfaces(&input.attrs)?;

    let mut keys = Vec::new();
    let mut field_lets = Vec::new();
    let mut field_inits = Vec::new();

    let construct = match fields {
        syn::Fields::Named(fields) => {
            for (index, field) in fields.named.iter().enumerate() {
                let Some(field_ident) = field.ident.as_ref() else {
                    continue;
                };
                let Some((key, arg)) = dependency(&field.ty, index) else {
                    return Err(Error::new(
                        field.ty.span(),
                        "Component dependencies must be of type Arc<T> or Arc<dyn Trait>",
                    ));
                };
                keys.push(key);
                field_lets.push(quote! { let #field_ident = #arg; });
                field_inits.push(quote! { #field_ident });
            }
            quote! { Self { #(#field_inits,)* } }
        }
        syn::Fields::Unnamed(_) => {
            return Err(Error::new(name.span(), "Tuple structs are not supported"));
        }
        syn::Fields::Unit => quote! { Self },
    };

    let body = quote! {
        #(#field_lets)*
        ::std::result::Result::Ok(#construct)
    };
    Ok(component_impl(&quote! { #name }, &keys, body, &interfaces).into())
}

fn handle_component_impl(input: ItemImpl, interfaces: Vec<Type>) -> Result<TokenStream, Error> {
    if input.trait_.is_some() {
        return Err(Error::new(input.span(), "Trait impls are not supported"));
    }

    let self_ty = &input.self_ty;
    let mut factory = None;
    for item in &input.items {
        if let ImplItem::Fn(method) = item
            && method.attrs.iter().any(|a| a.path().is_ident(FACTORY_ATTR))
        {
            if factory.is_some() {
                return Err(Error::new(method.span(), "Only one factory method allowed"));
            }
            factory = Some(method);
        }
    }
    let Some(method) = factory else {
        return Err(Error::new(input.span(), "No factory method found"));
    };

    let method_name = &method.sig.ident;
    if method.sig.asyncness.is_some() {
        return Err(Error::new(
            method.sig.asyncness.span(),
            "Factory methods must be synchronous",
        ));
    }
    let is_result = match &method.sig.output {
        syn::ReturnType::Default => {
            return Err(Error::new(
                method.sig.span(),
                "Factory method must have a return type",
            ));
        }
        syn::ReturnType::Type(_, ty) => is_result_type(ty),
    };

    let mut keys = Vec::new();
    let mut arg_lets = Vec::new();
    let mut arg_names = Vec::new();
    for (index, fn_arg) in method.sig.inputs.iter().enumerate() {
        let FnArg::Typed(pat_type) = fn_arg else {
            return Err(Error::new(
                fn_arg.span(),
                "Factory method cannot have self parameter",
            ));
        };
        let Pat::Ident(pat_ident) = pat_type.pat.as_ref() else {
            return Err(Error::new(
                pat_type.pat.span(),
                "Only simple bindings supported",
            ));
        };
        let Some((key, arg)) = dependency(&pat_type.ty, index) else {
            return Err(Error::new(
                pat_type.ty.span(),
                "Arguments must be of type Arc<T> or Arc<dyn Trait>",
            ));
        };
        let arg_name = &pat_ident.ident;
        keys.push(key);
        arg_lets.push(quote! { let #arg_name = #arg; });
        arg_names.push(quote! { #arg_name });
    }

    let mut cleaned_input = input.clone();
    for item in &mut cleaned_input.items {
        if let ImplItem::Fn(method) = item {
            method.attrs.retain(|a| !a.path().is_ident(FACTORY_ATTR));
        }
    }

    let call = quote! { Self::#method_name(#(#arg_names),*) };
    let body = if is_result {
        quote! {
            #(#arg_lets)*
            #call.map_err(|e| e.into())
        }
    } else {
        quote! {
            #(#arg_lets)*
            ::std::result::Result::Ok(#call)
        }
    };
    let component = component_impl(&quote! { #self_ty }, &keys, body, &interfaces);

    Ok(quote! {
        #cleaned_input

        #component
    }
    .into())
}

fn is_result_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty
        && let Some(segment) = type_path.path.segments.last()
    {
        return segment.ident == "Result";
    }
    false
}
