//! See [`Object`].
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, Index, Member, parse_macro_input};

static OBJECT_ATTRIBUTE_NAME: &str = "object";

// -----------------------------------------------------------------------------
// Crate Path

/// The path of `pl_reflect` as seen from the calling crate: `::pl_reflect`,
/// or `::pl_core::reflect` for crates depending on the engine crate.
fn pl_reflect() -> syn::Path {
    pl_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("pl_reflect"))
}

// -----------------------------------------------------------------------------
// Macros

/// # Object Derivation
///
/// `#[derive(Object)]` implements `pl_reflect::object::Object` for a
/// struct holding its base-class sub-object in a field marked
/// `#[object(base)]`. The field is either an `ObjectBase`, for classes
/// deriving directly from `Object`, or another type implementing `Object`.
///
/// ```rust, ignore
/// #[derive(Object)]
/// struct Camera {
///     #[object(base)]
///     base: ObjectBase,
///     fov: f32,
/// }
///
/// #[derive(Object)]
/// struct OrthoCamera(#[object(base)] Camera, f32);
/// ```
///
/// Exactly one field must be marked. Enums and unions are not supported.
#[proc_macro_derive(Object, attributes(object))]
pub fn derive_object(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    match impl_object(&ast) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

// -----------------------------------------------------------------------------
// Implementation

fn impl_object(ast: &DeriveInput) -> syn::Result<TokenStream2> {
    let base = find_base(ast)?;
    let pl_reflect = pl_reflect();

    let ident = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let object_ = quote! { #pl_reflect::object::Object };
    let box_ = quote! { #pl_reflect::__macro_exports::Box };
    let any_ = quote! { #pl_reflect::__macro_exports::Any };

    Ok(quote! {
        impl #impl_generics #object_ for #ident #ty_generics #where_clause {
            #[inline]
            fn object_base(&self) -> &#pl_reflect::object::ObjectBase {
                #object_::object_base(&self.#base)
            }

            #[inline]
            fn object_base_mut(&mut self) -> &mut #pl_reflect::object::ObjectBase {
                #object_::object_base_mut(&mut self.#base)
            }

            #[inline]
            fn as_any(&self) -> &dyn #any_ {
                self
            }

            #[inline]
            fn as_any_mut(&mut self) -> &mut dyn #any_ {
                self
            }

            #[inline]
            fn into_any(self: #box_<Self>) -> #box_<dyn #any_> {
                self
            }
        }
    })
}

// Finds the single field marked `#[object(base)]`.
fn find_base(ast: &DeriveInput) -> syn::Result<Member> {
    let fields = match &ast.data {
        Data::Struct(data) => &data.fields,
        Data::Enum(data) => {
            return Err(syn::Error::new(
                data.enum_token.span(),
                "`Object` can only be derived for structs",
            ));
        }
        Data::Union(data) => {
            return Err(syn::Error::new(
                data.union_token.span(),
                "`Object` can only be derived for structs",
            ));
        }
    };

    let mut found: Option<Member> = None;
    for (index, field) in fields.iter().enumerate() {
        if !is_base(&field.attrs)? {
            continue;
        }
        if found.is_some() {
            return Err(syn::Error::new(
                field.span(),
                "only one field can be `#[object(base)]`",
            ));
        }
        found = Some(match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(Index {
                index: index as u32,
                span: field.span(),
            }),
        });
    }

    found.ok_or_else(|| {
        let span = match fields {
            Fields::Unit => ast.ident.span(),
            _ => fields.span(),
        };
        syn::Error::new(
            span,
            "`#[derive(Object)]` needs a field marked `#[object(base)]`",
        )
    })
}

fn is_base(attrs: &[syn::Attribute]) -> syn::Result<bool> {
    let mut base = false;
    for attr in attrs {
        if !attr.path().is_ident(OBJECT_ATTRIBUTE_NAME) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("base") {
                base = true;
                Ok(())
            } else {
                Err(meta.error("unknown `object` attribute, expected `base`"))
            }
        })?;
    }
    Ok(base)
}
