//! Procedural macros for RelModel Rust.
//!
//! `#[derive(Record)]` gives a struct the field accessors that relationship
//! resolution uses, generated at compile time:
//!
//! - `Record`: `get_field` / `set_field` by name
//! - `FromValue`: build the struct from a `Value::Record`, so it can be the
//!   target of a relationship field (`Option<Author>`, `Vec<Role>`)
//! - `ToValue` plus inherent `to_row` / `from_row`
//!
//! Generated code refers to `relmodel_core`, which must be a dependency of
//! the crate using the derive.

use proc_macro::TokenStream;

mod parse;

use parse::{RecordDef, is_option_type, parse_record};

/// Derive macro for the `Record` trait.
///
/// # Attributes
///
/// - `#[record(rename = "name")]` - Expose the field under another name
/// - `#[record(readonly)]` - Readable, but `set_field` fails with `NotSettable`
/// - `#[record(skip)]` - Hide the field from the accessors (filled with `Default`)
/// - `#[record(relation)]` - Field holds resolved related data and may be
///   missing from a source row (filled with `Default`)
///
/// # Example
///
/// ```ignore
/// use relmodel::Record;
///
/// #[derive(Debug, Default, Record)]
/// struct Post {
///     #[record(readonly)]
///     id: i64,
///     author_id: i64,
///     #[record(relation)]
///     author: Option<Author>,
/// }
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);

    let record = match parse_record(&input) {
        Ok(r) => r,
        Err(e) => return e.to_compile_error().into(),
    };

    generate_record_impl(&record).into()
}

fn generate_record_impl(record: &RecordDef) -> proc_macro2::TokenStream {
    let name = &record.name;
    let (impl_generics, ty_generics, where_clause) = record.generics.split_for_impl();

    let get_field_body = generate_get_field(record);
    let set_field_body = generate_set_field(record);
    let to_row_body = generate_to_row(record);
    let from_row_body = generate_from_row(record);

    quote::quote! {
        impl #impl_generics relmodel_core::Record for #name #ty_generics #where_clause {
            fn get_field(&self, name: &str) -> ::core::option::Option<relmodel_core::Value> {
                #get_field_body
            }

            fn set_field(
                &mut self,
                name: &str,
                value: relmodel_core::Value,
            ) -> ::core::result::Result<(), relmodel_core::AssignError> {
                #set_field_body
            }
        }

        impl #impl_generics #name #ty_generics #where_clause {
            /// Render this record as a row keyed by record field name.
            pub fn to_row(&self) -> relmodel_core::Row {
                #to_row_body
            }

            /// Build this record from a row, matching field names in either casing.
            #[allow(clippy::result_large_err)]
            pub fn from_row(row: &relmodel_core::Row) -> relmodel_core::Result<Self> {
                #from_row_body
            }
        }

        impl #impl_generics relmodel_core::ToValue for #name #ty_generics #where_clause {
            fn to_value(&self) -> relmodel_core::Value {
                relmodel_core::Value::Record(::std::boxed::Box::new(self.to_row()))
            }
        }

        impl #impl_generics relmodel_core::FromValue for #name #ty_generics #where_clause {
            fn from_value(value: &relmodel_core::Value) -> relmodel_core::Result<Self> {
                let row = <relmodel_core::Row as relmodel_core::FromValue>::from_value(value)?;
                Self::from_row(&row)
            }
        }
    }
}

/// Reads try the snake_case form of the requested name, then the name as given.
fn generate_get_field(record: &RecordDef) -> proc_macro2::TokenStream {
    let arms: Vec<_> = record
        .visible_fields()
        .map(|field| {
            let ident = &field.ident;
            let field_name = &field.name;
            quote::quote! {
                #field_name => {
                    return ::core::option::Option::Some(
                        relmodel_core::ToValue::to_value(&self.#ident),
                    );
                }
            }
        })
        .collect();

    if arms.is_empty() {
        return quote::quote! {
            let _ = name;
            ::core::option::Option::None
        };
    }

    quote::quote! {
        let snake = relmodel_core::naming::to_snake_case(name);
        for candidate in [snake.as_str(), name] {
            match candidate {
                #(#arms)*
                _ => {}
            }
        }
        ::core::option::Option::None
    }
}

/// Writes match the exact field name and convert through `FromValue`.
fn generate_set_field(record: &RecordDef) -> proc_macro2::TokenStream {
    let arms: Vec<_> = record
        .visible_fields()
        .map(|field| {
            let ident = &field.ident;
            let field_name = &field.name;
            let ty = &field.ty;
            if field.readonly {
                quote::quote! {
                    #field_name => ::core::result::Result::Err(
                        relmodel_core::AssignError::NotSettable(name.to_string()),
                    ),
                }
            } else {
                quote::quote! {
                    #field_name => {
                        match <#ty as relmodel_core::FromValue>::from_value(&value) {
                            ::core::result::Result::Ok(converted) => {
                                self.#ident = converted;
                                ::core::result::Result::Ok(())
                            }
                            ::core::result::Result::Err(_) => ::core::result::Result::Err(
                                relmodel_core::AssignError::TypeMismatch {
                                    field: name.to_string(),
                                    expected: ::std::any::type_name::<#ty>(),
                                    actual: value.type_name(),
                                },
                            ),
                        }
                    }
                }
            }
        })
        .collect();

    quote::quote! {
        match name {
            #(#arms)*
            _ => {
                let _ = value;
                ::core::result::Result::Err(
                    relmodel_core::AssignError::UnknownField(name.to_string()),
                )
            }
        }
    }
}

fn generate_to_row(record: &RecordDef) -> proc_macro2::TokenStream {
    let pairs: Vec<_> = record
        .visible_fields()
        .map(|field| {
            let ident = &field.ident;
            let field_name = &field.name;
            quote::quote! {
                (#field_name, relmodel_core::ToValue::to_value(&self.#ident))
            }
        })
        .collect();

    quote::quote! {
        let pairs: ::std::vec::Vec<(&str, relmodel_core::Value)> = ::std::vec![#(#pairs),*];
        relmodel_core::Row::from_pairs(pairs)
    }
}

/// Optional, relation and skipped fields fall back to `Default` when their
/// column is absent; any other missing column is a type error.
fn generate_from_row(record: &RecordDef) -> proc_macro2::TokenStream {
    let name = &record.name;

    let extractions: Vec<_> = record
        .fields
        .iter()
        .map(|field| {
            let ident = &field.ident;
            let field_name = &field.name;
            let ty = &field.ty;

            if field.skip {
                return quote::quote! { #ident: ::core::default::Default::default() };
            }

            let missing = if field.relation || is_option_type(ty) {
                quote::quote! { ::core::default::Default::default() }
            } else {
                quote::quote! {
                    return ::core::result::Result::Err(relmodel_core::Error::Type(
                        relmodel_core::TypeError {
                            expected: ::std::any::type_name::<#ty>(),
                            actual: ::std::format!("column '{}' not found", #field_name),
                            column: ::core::option::Option::Some(#field_name.to_string()),
                        },
                    ))
                }
            };

            quote::quote! {
                #ident: match relmodel_core::Record::get_field(row, #field_name) {
                    ::core::option::Option::Some(value) => {
                        <#ty as relmodel_core::FromValue>::from_value(&value)
                            .map_err(|e| e.in_column(#field_name))?
                    }
                    ::core::option::Option::None => { #missing }
                }
            }
        })
        .collect();

    quote::quote! {
        ::core::result::Result::Ok(#name {
            #(#extractions,)*
        })
    }
}
