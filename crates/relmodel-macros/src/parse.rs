//! Parsing logic for the Record derive macro.
//!
//! Extracts field-level `#[record(...)]` attributes from the derive input
//! into `RecordDef` and `FieldDef` for code generation.

use syn::{Attribute, Data, DeriveInput, Error, Fields, Generics, Ident, Lit, Result, Type};

/// Parsed definition of a struct with `#[derive(Record)]`.
#[derive(Debug)]
pub struct RecordDef {
    pub name: Ident,
    pub generics: Generics,
    pub fields: Vec<FieldDef>,
}

/// Parsed definition of one named field.
#[derive(Debug)]
pub struct FieldDef {
    /// The Rust field identifier.
    pub ident: Ident,
    /// The record-level name: the identifier, or its `rename`.
    pub name: String,
    pub ty: Type,
    /// Readable but rejected by `set_field`.
    pub readonly: bool,
    /// Invisible to the record accessors; filled with `Default` on load.
    pub skip: bool,
    /// Holds resolved related data, so it may be absent from a source row.
    pub relation: bool,
}

impl RecordDef {
    /// Fields visible through the record accessors.
    pub fn visible_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| !f.skip)
    }
}

#[derive(Default)]
struct FieldAttrs {
    rename: Option<String>,
    readonly: bool,
    skip: bool,
    relation: bool,
}

/// Parse a `DeriveInput` into a `RecordDef`.
pub fn parse_record(input: &DeriveInput) -> Result<RecordDef> {
    let Data::Struct(data) = &input.data else {
        return Err(Error::new_spanned(
            &input.ident,
            "Record can only be derived for structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(Error::new_spanned(
            &input.ident,
            "Record requires a struct with named fields",
        ));
    };

    let mut fields: Vec<FieldDef> = Vec::with_capacity(named.named.len());
    for field in &named.named {
        let Some(ident) = field.ident.clone() else {
            return Err(Error::new_spanned(field, "expected a named field"));
        };
        let attrs = parse_field_attrs(&field.attrs)?;
        let name = attrs
            .rename
            .unwrap_or_else(|| ident.to_string().trim_start_matches("r#").to_string());

        if !attrs.skip && fields.iter().any(|f| !f.skip && f.name == name) {
            return Err(Error::new_spanned(
                &ident,
                format!("duplicate record field name '{}'", name),
            ));
        }

        fields.push(FieldDef {
            ident,
            name,
            ty: field.ty.clone(),
            readonly: attrs.readonly,
            skip: attrs.skip,
            relation: attrs.relation,
        });
    }

    Ok(RecordDef {
        name: input.ident.clone(),
        generics: input.generics.clone(),
        fields,
    })
}

/// Parse all `#[record(...)]` attributes on a field.
fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("record") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let path = &meta.path;

            if path.is_ident("readonly") {
                result.readonly = true;
            } else if path.is_ident("skip") {
                result.skip = true;
            } else if path.is_ident("relation") {
                result.relation = true;
            } else if path.is_ident("rename") {
                if result.rename.is_some() {
                    return Err(Error::new_spanned(path, "duplicate record attribute: rename"));
                }
                let value: Lit = meta.value()?.parse()?;
                match value {
                    Lit::Str(lit_str) if !lit_str.value().is_empty() => {
                        result.rename = Some(lit_str.value());
                    }
                    other => {
                        return Err(Error::new_spanned(
                            other,
                            "expected a non-empty string literal for rename",
                        ));
                    }
                }
            } else {
                let name = path
                    .get_ident()
                    .map_or_else(|| "?".to_string(), ToString::to_string);
                return Err(Error::new_spanned(
                    path,
                    format!(
                        "unknown record attribute `{}`; expected one of rename, readonly, skip, relation",
                        name
                    ),
                ));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

/// Check if a type is `Option<T>`.
pub fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_parse_field_attributes() {
        let input: DeriveInput = parse_quote! {
            struct Post {
                #[record(readonly)]
                id: i64,
                #[record(rename = "AuthorID")]
                author_id: Option<i64>,
                #[record(relation)]
                author: Option<Author>,
                #[record(skip)]
                cache: String,
            }
        };
        let def = parse_record(&input).unwrap();

        assert_eq!(def.name, "Post");
        let names: Vec<_> = def.visible_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "AuthorID", "author"]);
        assert!(def.fields[0].readonly);
        assert!(def.fields[2].relation);
        assert!(def.fields[3].skip);
    }

    #[test]
    fn test_raw_identifier_name() {
        let input: DeriveInput = parse_quote! {
            struct Item {
                r#type: String,
            }
        };
        let def = parse_record(&input).unwrap();
        assert_eq!(def.fields[0].name, "type");
    }

    #[test]
    fn test_rejects_enums_and_tuple_structs() {
        let input: DeriveInput = parse_quote! {
            enum Kind { A, B }
        };
        assert!(parse_record(&input).is_err());

        let input: DeriveInput = parse_quote! {
            struct Pair(i64, i64);
        };
        assert!(parse_record(&input).is_err());
    }

    #[test]
    fn test_rejects_unknown_attribute_and_duplicates() {
        let input: DeriveInput = parse_quote! {
            struct Post {
                #[record(primary_key)]
                id: i64,
            }
        };
        let err = parse_record(&input).unwrap_err();
        assert!(err.to_string().contains("unknown record attribute"));

        let input: DeriveInput = parse_quote! {
            struct Post {
                id: i64,
                #[record(rename = "id")]
                legacy_id: i64,
            }
        };
        let err = parse_record(&input).unwrap_err();
        assert!(err.to_string().contains("duplicate record field name"));
    }

    #[test]
    fn test_is_option_type() {
        let ty: Type = parse_quote!(Option<Author>);
        assert!(is_option_type(&ty));
        let ty: Type = parse_quote!(std::option::Option<i64>);
        assert!(is_option_type(&ty));
        let ty: Type = parse_quote!(Vec<Role>);
        assert!(!is_option_type(&ty));
    }
}
