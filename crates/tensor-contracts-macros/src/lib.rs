//! # tensor-contracts-macros
//!
//! The `#[typechecked]` attribute: declares the tensor type of arguments and
//! of the return value, and checks them on every call once
//! `tensor_contracts::enable()` has been called.
//!
//! ```rust,ignore
//! use tensor_contracts_macros::typechecked;
//!
//! #[typechecked(x = "batch, n", y = "batch, m", returns = "batch, n, m")]
//! pub fn outer(x: &Tensor, y: &Tensor) -> Tensor {
//!     // ...
//! }
//! ```
//!
//! ## How It Works
//!
//! 1. Every literal is parsed with `TensorType::parse` while the macro
//!    expands, so a malformed or unsupported literal is a compile error
//!    pointing at the literal.
//!
//! 2. The body is wrapped in a `CallGuard`. Arguments are checked in
//!    declaration order, then the body runs, then the return value is checked
//!    against the same per-call bindings.
//!
//! 3. A failed check panics with `<module>::<function>: <diagnostic>`.
//!    While checking is disabled the guard is inert.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Expr, FnArg, ItemFn, Lit, LitStr, MetaNameValue, Pat, ReturnType, Token, Type};

/// Key naming the return value.
const RETURNS: &str = "returns";

/// One `name = "literal"` pair of the attribute.
struct Annotation {
    name: String,
    literal: LitStr,
}

/// Declares the tensor types of a function's arguments and return value.
///
/// Keys are argument names (`self` for the receiver) or `returns`; values are
/// type literals such as `"batch: ..., c, f32"` or `"NamedTensorType[rows]"`.
/// Unannotated arguments are not checked.
///
/// # Compile-Time Behavior
///
/// Fails to compile when a key names no argument, a key repeats, a literal
/// does not parse, `returns` is used while a parameter is also called
/// `returns`, or the function is `async` or `const`.
///
/// # Panics
///
/// The wrapped function panics when checking is enabled and a call violates
/// its declared types.
#[proc_macro_attribute]
pub fn typechecked(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input_fn = match syn::parse::<ItemFn>(item) {
        Ok(f) => f,
        Err(e) => return e.to_compile_error().into(),
    };
    match expand(attr.into(), &input_fn) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(attr: TokenStream2, input_fn: &ItemFn) -> syn::Result<TokenStream2> {
    let sig = &input_fn.sig;
    if let Some(token) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            token,
            "#[typechecked] does not support async functions",
        ));
    }
    if let Some(token) = &sig.constness {
        return Err(syn::Error::new_spanned(
            token,
            "#[typechecked] does not support const functions",
        ));
    }

    let annotations = parse_annotations(attr)?;
    let params = parameter_names(input_fn);

    let mut returns = None;
    let mut by_param: Vec<Option<&Annotation>> = vec![None; params.len()];
    for annotation in &annotations {
        if annotation.name == RETURNS {
            if params.iter().any(|p| p == RETURNS) {
                return Err(syn::Error::new_spanned(
                    &annotation.literal,
                    "`returns` names the return value; a parameter called `returns` \
                     cannot be annotated",
                ));
            }
            returns = Some(annotation);
            continue;
        }
        let Some(index) = params.iter().position(|p| *p == annotation.name) else {
            return Err(syn::Error::new_spanned(
                &annotation.literal,
                format!("`{}` is not an argument of `{}`", annotation.name, sig.ident),
            ));
        };
        by_param[index] = Some(annotation);
    }
    if returns.is_some() && matches!(sig.output, ReturnType::Default) {
        return Err(syn::Error::new_spanned(
            &sig.ident,
            "`returns` is declared but the function returns nothing",
        ));
    }

    let argument_checks = by_param.iter().flatten().map(|annotation| {
        let name = &annotation.name;
        let literal = &annotation.literal;
        let ident = argument_ident(name, literal.span());
        quote! {
            (#name, #literal, ::tensor_contracts::Inspect::inspect(&#ident))
        }
    });

    let fn_attrs = &input_fn.attrs;
    let fn_vis = &input_fn.vis;
    let block = &input_fn.block;
    let function = sig.ident.to_string();
    let body = match &sig.output {
        ReturnType::Type(_, ty) if !matches!(**ty, Type::ImplTrait(_)) => {
            quote! { (move || -> #ty #block)() }
        }
        _ => quote! { (move || #block)() },
    };
    let return_check = returns.map(|annotation| {
        let literal = &annotation.literal;
        quote! {
            if let Err(e) = __tc_guard.check_return(
                #literal,
                ::tensor_contracts::Inspect::inspect(&__tc_ret),
            ) {
                panic!("{}: {}", __tc_guard.function(), e);
            }
        }
    });

    Ok(quote! {
        #(#fn_attrs)*
        #fn_vis #sig {
            let mut __tc_guard = ::tensor_contracts::CallGuard::begin(
                concat!(module_path!(), "::", #function),
            );
            if let Err(e) = __tc_guard.check_arguments(&[#(#argument_checks),*]) {
                panic!("{}: {}", __tc_guard.function(), e);
            }
            #[allow(clippy::redundant_closure_call)]
            let __tc_ret = #body;
            #return_check
            __tc_ret
        }
    })
}

/// Parses `name = "literal", ...` and validates every literal.
fn parse_annotations(attr: TokenStream2) -> syn::Result<Vec<Annotation>> {
    let pairs = Punctuated::<MetaNameValue, Token![,]>::parse_terminated.parse2(attr)?;
    let mut annotations: Vec<Annotation> = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let Some(ident) = pair.path.get_ident() else {
            return Err(syn::Error::new_spanned(
                &pair.path,
                "expected an argument name or `returns`",
            ));
        };
        let name = ident.to_string();
        let name = name.strip_prefix("r#").map_or(name.clone(), str::to_string);
        let literal = match pair.value {
            Expr::Lit(expr) => match expr.lit {
                Lit::Str(s) => s,
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "expected a string literal with the tensor type",
                    ));
                }
            },
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "expected a string literal with the tensor type",
                ));
            }
        };
        if annotations.iter().any(|a| a.name == name) {
            return Err(syn::Error::new_spanned(
                ident,
                format!("`{name}` is annotated twice"),
            ));
        }
        if let Err(e) = tensor_contracts::TensorType::parse(&literal.value()) {
            return Err(syn::Error::new_spanned(
                &literal,
                format!("invalid tensor type: {e}"),
            ));
        }
        annotations.push(Annotation { name, literal });
    }
    Ok(annotations)
}

/// Names of the parameters in declaration order; `self` for a receiver.
/// Destructured parameters get an empty name and cannot be annotated.
fn parameter_names(input_fn: &ItemFn) -> Vec<String> {
    input_fn
        .sig
        .inputs
        .iter()
        .map(|arg| match arg {
            FnArg::Receiver(_) => "self".to_string(),
            FnArg::Typed(pat) => match &*pat.pat {
                Pat::Ident(p) => {
                    let name = p.ident.to_string();
                    name.strip_prefix("r#").map_or(name.clone(), str::to_string)
                }
                _ => String::new(),
            },
        })
        .collect()
}

/// Keywords other than `self` need the raw form to be used as a binding.
fn argument_ident(name: &str, span: proc_macro2::Span) -> syn::Ident {
    if name != "self" && syn::parse_str::<syn::Ident>(name).is_err() {
        return syn::Ident::new_raw(name, span);
    }
    syn::Ident::new(name, span)
}
