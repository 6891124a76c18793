//! Derive macro mapping Rust structs to `oxide-orm` entities.
//!
//! This crate provides `#[derive(Entity)]`, which records the layout of a
//! struct (field names, offsets, storage classes, tags) so the registry can
//! build its table metadata without any runtime reflection.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, LitStr, Type};

/// Derives the `Entity` trait for a struct with named fields.
///
/// # Attributes
///
/// - `#[table(name = "table_name")]` - Specifies the SQL table name (optional,
///   defaults to snake_case of the struct name)
///
/// # Field Attributes
///
/// - `#[orm("column=first")]` - Raw `key=value,...` tag; `column` overrides
///   the column name (defaults to snake_case of the field name)
///
/// Every field type must implement `FieldValue`. Enums, tuple structs and
/// generic structs are rejected.
#[proc_macro_derive(Entity, attributes(table, orm))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_entity_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_entity_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Entity derive does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity derive only supports structs",
            ));
        }
    };

    let table_name = match get_table_name(&input.attrs)? {
        Some(name) => quote! { ::core::option::Option::Some(#name) },
        None => quote! { ::core::option::Option::None },
    };

    let mut infos: Vec<FieldInfo> = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(ident) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "unnamed field"));
        };
        infos.push(FieldInfo {
            name: ident.to_string(),
            ident,
            ty: field.ty.clone(),
            tag: get_tag(&field.attrs)?,
        });
    }

    let descriptors: Vec<TokenStream2> = infos
        .iter()
        .map(|info| {
            let FieldInfo {
                ident, ty, name, tag, ..
            } = info;
            quote! {
                ::oxide_orm_core::FieldDescriptor {
                    name: #name,
                    tag: #tag,
                    offset: ::core::mem::offset_of!(#struct_name, #ident),
                    kind: <#ty as ::oxide_orm_core::FieldValue>::KIND,
                    nullable: <#ty as ::oxide_orm_core::FieldValue>::NULLABLE,
                    read: ::oxide_orm_core::read_at::<#ty>,
                    write: ::oxide_orm_core::write_at::<#ty>,
                }
            }
        })
        .collect();

    let getters: Vec<TokenStream2> = infos
        .iter()
        .map(|FieldInfo { ident, ty, name, .. }| {
            quote! {
                #name => ::core::option::Option::Some(
                    <#ty as ::oxide_orm_core::FieldValue>::to_value(&self.#ident)
                ),
            }
        })
        .collect();

    let setters: Vec<TokenStream2> = infos
        .iter()
        .map(|FieldInfo { ident, ty, name, .. }| {
            quote! {
                #name => ::core::option::Option::Some(
                    <#ty as ::oxide_orm_core::FieldValue>::from_value(value)
                        .map(|v| self.#ident = v)
                ),
            }
        })
        .collect();

    let expanded = quote! {
        // SAFETY: every offset comes from `offset_of!` on the field whose
        // type instantiates `read_at` and `write_at`.
        #[allow(unsafe_code)]
        unsafe impl ::oxide_orm_core::Entity for #struct_name {
            const TABLE_NAME: ::core::option::Option<&'static str> = #table_name;

            const FIELDS: &'static [::oxide_orm_core::FieldDescriptor] = &[
                #(#descriptors),*
            ];

            fn get_field(&self, name: &str) -> ::core::option::Option<::oxide_orm_core::SqlValue> {
                match name {
                    #(#getters)*
                    _ => ::core::option::Option::None,
                }
            }

            #[allow(unused_variables)]
            fn set_field(
                &mut self,
                name: &str,
                value: ::oxide_orm_core::SqlValue,
            ) -> ::core::option::Option<::oxide_orm_core::Result<()>> {
                match name {
                    #(#setters)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    };

    Ok(expanded)
}

struct FieldInfo {
    ident: Ident,
    ty: Type,
    name: String,
    tag: String,
}

fn get_table_name(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    for attr in attrs {
        if attr.path().is_ident("table") {
            let mut table_name = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: Expr = meta.value()?.parse()?;
                    if let Expr::Lit(lit) = value {
                        if let Lit::Str(s) = lit.lit {
                            table_name = Some(s.value());
                            return Ok(());
                        }
                    }
                    return Err(meta.error("expected a string literal"));
                }
                Err(meta.error("unsupported table attribute"))
            })?;
            if table_name.is_some() {
                return Ok(table_name);
            }
        }
    }
    Ok(None)
}

// Tags are validated when the registry parses the model, so a malformed one
// surfaces as `OrmError::InvalidTag` rather than a compile error.
fn get_tag(attrs: &[Attribute]) -> syn::Result<String> {
    let mut tags = Vec::new();
    for attr in attrs {
        if attr.path().is_ident("orm") {
            let tag: LitStr = attr.parse_args()?;
            tags.push(tag.value());
        }
    }
    Ok(tags.join(","))
}
