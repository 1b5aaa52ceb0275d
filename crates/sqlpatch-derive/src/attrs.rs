//! Attribute parsing for the Patch derive macro.

use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutyKebabCase, ToShoutySnakeCase, ToSnakeCase,
    ToUpperCamelCase,
};
use syn::meta::ParseNestedMeta;
use syn::{LitStr, Result};

/// `#[patch(...)]` on a field.
#[derive(Default)]
pub(crate) struct PatchAttrs {
    pub(crate) column: Option<String>,
    pub(crate) skip: bool,
    pub(crate) decode_self: bool,
}

impl syn::parse::Parse for PatchAttrs {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attrs = PatchAttrs::default();

        loop {
            if input.is_empty() {
                break;
            }

            let ident: syn::Ident = input.parse()?;
            match ident.to_string().as_str() {
                "skip" => attrs.skip = true,
                "decode_self" => attrs.decode_self = true,
                "column" => {
                    let _: syn::Token![=] = input.parse()?;
                    let value: LitStr = input.parse()?;
                    if value.value().is_empty() {
                        return Err(syn::Error::new(value.span(), "column must not be empty"));
                    }
                    attrs.column = Some(value.value());
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown patch attribute `{other}`"),
                    ));
                }
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(attrs)
    }
}

pub(crate) fn get_patch_attrs(field: &syn::Field) -> Result<PatchAttrs> {
    let mut merged = PatchAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("patch") {
            continue;
        }
        let parsed: PatchAttrs = attr.parse_args()?;
        merged.skip |= parsed.skip;
        merged.decode_self |= parsed.decode_self;
        if parsed.column.is_some() {
            merged.column = parsed.column;
        }
    }
    Ok(merged)
}

/// The subset of `#[serde(...)]` field attributes that affects the JSON shape.
#[derive(Default)]
pub(crate) struct SerdeFieldAttrs {
    pub(crate) rename: Option<String>,
    pub(crate) skip: bool,
}

pub(crate) fn get_serde_field_attrs(field: &syn::Field) -> Result<SerdeFieldAttrs> {
    let mut out = SerdeFieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if let Some(name) = deserialize_name(&meta)? {
                    out.rename = Some(name);
                }
            } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_deserializing") {
                out.skip = true;
            } else if meta.path.is_ident("flatten") {
                return Err(meta.error("#[serde(flatten)] is not supported by Patch"));
            } else {
                skip_meta_value(&meta)?;
            }
            Ok(())
        })?;
    }
    Ok(out)
}

/// Container-level `#[serde(rename_all = "...")]`.
#[derive(Clone, Copy)]
pub(crate) enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn from_lit(lit: &LitStr) -> Result<Self> {
        Ok(match lit.value().as_str() {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "PascalCase" => Self::Pascal,
            "camelCase" => Self::Camel,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            "SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
            other => {
                return Err(syn::Error::new(
                    lit.span(),
                    format!("unknown rename rule `{other}`"),
                ));
            }
        })
    }

    pub(crate) fn apply(self, name: &str) -> String {
        match self {
            Self::Lower => name.to_lowercase(),
            Self::Upper => name.to_uppercase(),
            Self::Pascal => name.to_upper_camel_case(),
            Self::Camel => name.to_lower_camel_case(),
            Self::Snake => name.to_snake_case(),
            Self::ScreamingSnake => name.to_shouty_snake_case(),
            Self::Kebab => name.to_kebab_case(),
            Self::ScreamingKebab => name.to_shouty_kebab_case(),
        }
    }
}

pub(crate) fn get_rename_all(attrs: &[syn::Attribute]) -> Result<Option<RenameRule>> {
    let mut rule = None;
    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                if let Some(lit) = deserialize_lit(&meta)? {
                    rule = Some(RenameRule::from_lit(&lit)?);
                }
            } else {
                skip_meta_value(&meta)?;
            }
            Ok(())
        })?;
    }
    Ok(rule)
}

fn deserialize_name(meta: &ParseNestedMeta) -> Result<Option<String>> {
    Ok(deserialize_lit(meta)?.map(|lit| lit.value()))
}

/// `key = "x"` or `key(deserialize = "x", serialize = "y")`.
fn deserialize_lit(meta: &ParseNestedMeta) -> Result<Option<LitStr>> {
    if meta.input.peek(syn::Token![=]) {
        return Ok(Some(meta.value()?.parse()?));
    }
    let mut found = None;
    meta.parse_nested_meta(|inner| {
        let lit: LitStr = inner.value()?.parse()?;
        if inner.path.is_ident("deserialize") {
            found = Some(lit);
        }
        Ok(())
    })?;
    Ok(found)
}

/// Consume whatever follows a serde key we do not care about.
fn skip_meta_value(meta: &ParseNestedMeta) -> Result<()> {
    if meta.input.peek(syn::Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        let _: proc_macro2::TokenStream = content.parse()?;
    }
    Ok(())
}
