//! Patch derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, GenericArgument, PathArguments, Result, Type};

use crate::attrs::{get_patch_attrs, get_rename_all, get_serde_field_attrs};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Patch can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Patch can only be derived for structs",
            ));
        }
    };

    let rename_all = get_rename_all(&input.attrs)?;

    let mut members = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;
        let member_name = ident.unraw().to_string();
        let patch = get_patch_attrs(field)?;
        let serde = get_serde_field_attrs(field)?;

        let public = matches!(field.vis, syn::Visibility::Public(_));
        if !public || serde.skip || patch.skip {
            members.push(quote! { sqlpatch::Member::excluded(#member_name) });
            continue;
        }

        let decoder = if patch.decode_self {
            quote! { sqlpatch::Decoder::custom::<#ty>() }
        } else {
            let ty = widened(ty);
            quote! { sqlpatch::Decoder::structural::<#ty>() }
        };

        let property = serde
            .rename
            .or_else(|| rename_all.map(|rule| rule.apply(&member_name)))
            .map(|p| quote! { .property(#p) });
        let column = patch.column.map(|c| quote! { .column(#c) });

        members.push(quote! {
            sqlpatch::Member::new(#member_name, #decoder)
                #property
                #column
        });
    }

    let type_name = name.unraw().to_string();

    Ok(quote! {
        impl #impl_generics sqlpatch::Describe for #name #ty_generics #where_clause {
            fn describe() -> sqlpatch::TypeDescription {
                sqlpatch::TypeDescription::record(
                    #type_name,
                    ::std::vec![#(#members),*],
                )
            }
        }
    })
}

/// Primitives without a `ToSql` impl, bound through `sqlpatch::Widen`.
const WIDENED: &[&str] = &["u8", "u16", "u64", "usize", "i128", "u128", "char"];

/// Wrap `T` and `Option<T>` in `Widen` when `T` is one of [`WIDENED`].
fn widened(ty: &Type) -> TokenStream {
    if let Some(inner) = option_inner(ty)
        && is_widened(inner)
    {
        return quote! { ::std::option::Option<sqlpatch::Widen<#inner>> };
    }
    if is_widened(ty) {
        return quote! { sqlpatch::Widen<#ty> };
    }
    quote! { #ty }
}

fn is_widened(ty: &Type) -> bool {
    match ty {
        Type::Path(p) if p.qself.is_none() => p
            .path
            .get_ident()
            .is_some_and(|ident| WIDENED.contains(&ident.to_string().as_str())),
        _ => false,
    }
}

fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(p) = ty else {
        return None;
    };
    let segment = p.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}
