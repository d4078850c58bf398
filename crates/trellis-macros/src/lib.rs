//! # Trellis Macros
//!
//! Procedural macros for declaring constructible components.
//!
//! ## Available Macros
//!
//! - `#[injectable]` - Derive `Injectable` from a constructor marked `#[inject]`

use darling::{ast::NestedMeta, FromMeta};
use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{
    parse_macro_input, Attribute, FnArg, GenericArgument, ImplItem, ImplItemFn, ItemImpl, Pat,
    PathArguments, ReturnType, Type,
};

/// Injectable attribute arguments.
#[derive(Debug, Default, FromMeta)]
struct InjectableArgs {
    #[darling(default)]
    name: Option<String>,
}

/// Dependency attribute arguments.
#[derive(Debug, FromMeta)]
struct DepArgs {
    name: String,
}

enum Injected {
    /// `Arc<T>`, downcast to `T`.
    Typed(Type),
    /// `Instance`, passed through.
    Instance,
}

struct Param {
    name: String,
    kind: Injected,
}

struct Constructor {
    ident: syn::Ident,
    params: Vec<Param>,
    fallible: bool,
}

/// Derive `Injectable` for a component.
///
/// Put `#[injectable]` on an inherent impl block and `#[inject]` on the
/// constructor. Every constructor parameter is a dependency resolved by the
/// parameter's name, or by `#[dep(name = "...")]` when given. Parameters must
/// be `Arc<T>` or `Instance`. The constructor returns `Self` or
/// `Result<Self, E>` with `E: Into<ComponentError>`.
///
/// The type must implement `Component` itself.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use trellis_macros::injectable;
/// use trellis_protocols::Component;
///
/// struct Greeter {
///     greeting: Arc<String>,
/// }
///
/// impl Component for Greeter {}
///
/// #[injectable]
/// impl Greeter {
///     #[inject]
///     pub fn new(#[dep(name = "greetingText")] greeting: Arc<String>) -> Self {
///         Self { greeting }
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn injectable(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr_args = match NestedMeta::parse_meta_list(attr.into()) {
        Ok(v) => v,
        Err(e) => return TokenStream::from(e.to_compile_error()),
    };

    let args = match InjectableArgs::from_list(&attr_args) {
        Ok(v) => v,
        Err(e) => return TokenStream::from(e.write_errors()),
    };

    let mut input = parse_macro_input!(item as ItemImpl);
    match expand_injectable(args, &mut input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(e) => TokenStream::from(e.to_compile_error()),
    }
}

fn expand_injectable(args: InjectableArgs, input: &mut ItemImpl) -> syn::Result<TokenStream2> {
    if input.trait_.is_some() {
        return Err(syn::Error::new(
            input.span(),
            "#[injectable] goes on an inherent impl block",
        ));
    }
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "#[injectable] does not support generic components",
        ));
    }

    let self_ty = input.self_ty.clone();
    let type_name = match &*self_ty {
        Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    }
    .ok_or_else(|| syn::Error::new(self_ty.span(), "expected a named type"))?;

    let mut constructor = None;
    for item in &mut input.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        if !take_attr(&mut method.attrs, "inject") {
            continue;
        }
        if constructor.is_some() {
            return Err(syn::Error::new(
                method.sig.ident.span(),
                "only one constructor can be marked #[inject]",
            ));
        }
        constructor = Some(parse_constructor(method, &type_name)?);
    }
    let constructor = constructor.ok_or_else(|| {
        syn::Error::new(
            Span::call_site(),
            "#[injectable] needs a constructor marked #[inject]",
        )
    })?;

    let class_name = args.name.unwrap_or(type_name);
    let fn_ident = &constructor.ident;
    let names: Vec<&str> = constructor.params.iter().map(|p| p.name.as_str()).collect();
    let signature = format!("fn {}({})", fn_ident, names.join(", "));

    let deps = if constructor.params.is_empty() {
        format_ident!("_deps")
    } else {
        format_ident!("deps")
    };
    let vars: Vec<syn::Ident> = (0..constructor.params.len())
        .map(|i| format_ident!("__dep{}", i))
        .collect();
    let bindings = constructor
        .params
        .iter()
        .zip(&vars)
        .enumerate()
        .map(|(i, (param, var))| match &param.kind {
            Injected::Typed(inner) => quote! { let #var = #deps.get::<#inner>(#i)?; },
            Injected::Instance => quote! { let #var = #deps.instance(#i)?; },
        });

    let call = if constructor.fallible {
        quote! {
            <#self_ty>::#fn_ident(#(#vars),*)
                .map_err(|e| ::trellis_protocols::ContainerError::construction(#class_name, e))
        }
    } else {
        quote! { Ok(<#self_ty>::#fn_ident(#(#vars),*)) }
    };

    Ok(quote! {
        #input

        impl ::trellis_protocols::Injectable for #self_ty {
            fn component_class() -> ::trellis_protocols::ComponentClass {
                ::trellis_protocols::ComponentClass::new(
                    #class_name,
                    #signature,
                    |#deps: ::trellis_protocols::Dependencies|
                        -> ::std::result::Result<#self_ty, ::trellis_protocols::ContainerError> {
                        #(#bindings)*
                        #call
                    },
                )
            }
        }
    })
}

fn parse_constructor(method: &mut ImplItemFn, type_name: &str) -> syn::Result<Constructor> {
    if let Some(receiver) = method.sig.receiver() {
        return Err(syn::Error::new(
            receiver.span(),
            "an #[inject] constructor cannot take self",
        ));
    }

    let mut params = Vec::new();
    for input in &mut method.sig.inputs {
        let FnArg::Typed(pat_type) = input else {
            continue;
        };

        let renamed = match take_dep_attr(&mut pat_type.attrs) {
            Some(attr) => Some(
                DepArgs::from_meta(&attr.meta)
                    .map_err(|e| syn::Error::new(attr.span(), e.to_string()))?
                    .name,
            ),
            None => None,
        };
        let name = match (renamed, &*pat_type.pat) {
            (Some(name), _) => name,
            (None, Pat::Ident(pat)) => pat.ident.unraw().to_string(),
            (None, other) => {
                return Err(syn::Error::new(
                    other.span(),
                    "use a plain identifier or #[dep(name = \"...\")]",
                ));
            }
        };

        let kind = injected_kind(&pat_type.ty).ok_or_else(|| {
            syn::Error::new(
                pat_type.ty.span(),
                "injected parameters must be Arc<T> or Instance",
            )
        })?;
        params.push(Param { name, kind });
    }

    let fallible = match &method.sig.output {
        ReturnType::Type(_, ty) => returns_result(ty, type_name).ok_or_else(|| {
            syn::Error::new(ty.span(), "an #[inject] constructor returns Self or Result<Self, E>")
        })?,
        ReturnType::Default => {
            return Err(syn::Error::new(
                method.sig.span(),
                "an #[inject] constructor returns Self or Result<Self, E>",
            ));
        }
    };

    Ok(Constructor {
        ident: method.sig.ident.clone(),
        params,
        fallible,
    })
}

/// `Some(true)` for `Result<..>`, `Some(false)` for `Self`, `None` otherwise.
fn returns_result(ty: &Type, type_name: &str) -> Option<bool> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident == "Self" || segment.ident == type_name {
        Some(false)
    } else if segment.ident == "Result" {
        Some(true)
    } else {
        None
    }
}

fn injected_kind(ty: &Type) -> Option<Injected> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident == "Instance" {
        return Some(Injected::Instance);
    }
    if segment.ident != "Arc" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match (args.args.len(), args.args.first()) {
        (1, Some(GenericArgument::Type(inner))) => Some(Injected::Typed(inner.clone())),
        _ => None,
    }
}

/// Remove the attribute `name` from `attrs`. Returns whether it was there.
fn take_attr(attrs: &mut Vec<Attribute>, name: &str) -> bool {
    let before = attrs.len();
    attrs.retain(|attr| !attr.path().is_ident(name));
    attrs.len() != before
}

fn take_dep_attr(attrs: &mut Vec<Attribute>) -> Option<Attribute> {
    let index = attrs.iter().position(|attr| attr.path().is_ident("dep"))?;
    Some(attrs.remove(index))
}
