//! Relationship descriptors.
//!
//! A descriptor carries everything needed to resolve one relationship: the
//! related table, the join columns and (for many-to-many) the pivot table.
//! Descriptors are usually declared once as `const` schema metadata and
//! reused for every resolution call, but they can also be built at runtime or
//! deserialized from configuration.
//!
//! ```
//! use relmodel_core::{Relationship, RelationshipKind};
//!
//! const POST_AUTHOR: Relationship =
//!     Relationship::belongs_to("author", "authors", "author_id", "id");
//!
//! assert_eq!(POST_AUTHOR.kind(), RelationshipKind::BelongsTo);
//! assert!(POST_AUTHOR.validate().is_ok());
//! ```

use crate::error::{ConfigError, Error, Result};
use crate::naming::to_snake_case;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

type Ident = Cow<'static, str>;

fn default_key() -> Ident {
    Cow::Borrowed("id")
}

/// The kind of a relationship, without its metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    /// The source record holds the foreign key; resolves to one record.
    BelongsTo,
    /// The related table holds the foreign key; resolves to one record.
    HasOne,
    /// The related table holds the foreign key; resolves to a list.
    HasMany,
    /// Joined through a pivot table; resolves to a list.
    BelongsToMany,
}

impl RelationshipKind {
    /// The snake_case tag used in configuration.
    pub const fn as_str(self) -> &'static str {
        match self {
            RelationshipKind::BelongsTo => "belongs_to",
            RelationshipKind::HasOne => "has_one",
            RelationshipKind::HasMany => "has_many",
            RelationshipKind::BelongsToMany => "belongs_to_many",
        }
    }

    /// Does this kind resolve to a list rather than a single record?
    pub const fn is_list(self) -> bool {
        matches!(
            self,
            RelationshipKind::HasMany | RelationshipKind::BelongsToMany
        )
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipKind {
    type Err = Error;

    /// Accepts the snake_case tag or its PascalCase spelling.
    fn from_str(s: &str) -> Result<Self> {
        match to_snake_case(s.trim()).as_str() {
            "belongs_to" => Ok(RelationshipKind::BelongsTo),
            "has_one" => Ok(RelationshipKind::HasOne),
            "has_many" => Ok(RelationshipKind::HasMany),
            "belongs_to_many" => Ok(RelationshipKind::BelongsToMany),
            _ => Err(Error::config(format!("unknown relationship kind '{}'", s))),
        }
    }
}

/// Metadata for a relationship joined on a single foreign key.
///
/// Column meaning depends on the kind:
///
/// | kind      | `foreign_key` lives on | `owner_key` lives on |
/// |-----------|------------------------|----------------------|
/// | BelongsTo | source table           | related table        |
/// | HasOne    | related table          | source table         |
/// | HasMany   | related table          | source table         |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyedRelation {
    /// Relationship name; also the field the resolved value is written to.
    pub name: Ident,
    pub related_table: Ident,
    pub foreign_key: Ident,
    #[serde(default = "default_key")]
    pub owner_key: Ident,
    /// Primary key of the related table, used to order HasOne candidates.
    #[serde(default = "default_key")]
    pub related_key: Ident,
}

/// Metadata for a many-to-many relationship through a pivot table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotRelation {
    pub name: Ident,
    pub related_table: Ident,
    pub pivot_table: Ident,
    /// Pivot column referencing the source record's `owner_key`.
    pub parent_column: Ident,
    /// Pivot column referencing the related record's `related_key`.
    pub related_column: Ident,
    #[serde(default = "default_key")]
    pub owner_key: Ident,
    #[serde(default = "default_key")]
    pub related_key: Ident,
}

/// A relationship descriptor.
///
/// Deserializes from an object tagged with `"kind"`:
///
/// ```
/// use relmodel_core::Relationship;
///
/// let rel = Relationship::from_json(
///     r#"{"kind": "has_many", "name": "comments", "related_table": "comments",
///         "foreign_key": "post_id"}"#,
/// ).unwrap();
/// assert_eq!(rel.name(), "comments");
/// assert_eq!(rel.source_key(), "id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Relationship {
    #[serde(alias = "BelongsTo")]
    BelongsTo(KeyedRelation),
    #[serde(alias = "HasOne")]
    HasOne(KeyedRelation),
    #[serde(alias = "HasMany")]
    HasMany(KeyedRelation),
    #[serde(alias = "BelongsToMany")]
    BelongsToMany(PivotRelation),
}

const fn keyed(
    name: &'static str,
    related_table: &'static str,
    foreign_key: &'static str,
    owner_key: &'static str,
) -> KeyedRelation {
    KeyedRelation {
        name: Cow::Borrowed(name),
        related_table: Cow::Borrowed(related_table),
        foreign_key: Cow::Borrowed(foreign_key),
        owner_key: Cow::Borrowed(owner_key),
        related_key: Cow::Borrowed("id"),
    }
}

impl Relationship {
    /// The source record holds `foreign_key`, matched against `owner_key` on
    /// `related_table`.
    pub const fn belongs_to(
        name: &'static str,
        related_table: &'static str,
        foreign_key: &'static str,
        owner_key: &'static str,
    ) -> Self {
        Relationship::BelongsTo(keyed(name, related_table, foreign_key, owner_key))
    }

    /// `related_table.foreign_key` references the source record's `owner_key`;
    /// at most one related record is kept.
    pub const fn has_one(
        name: &'static str,
        related_table: &'static str,
        foreign_key: &'static str,
        owner_key: &'static str,
    ) -> Self {
        Relationship::HasOne(keyed(name, related_table, foreign_key, owner_key))
    }

    /// `related_table.foreign_key` references the source record's `owner_key`.
    pub const fn has_many(
        name: &'static str,
        related_table: &'static str,
        foreign_key: &'static str,
        owner_key: &'static str,
    ) -> Self {
        Relationship::HasMany(keyed(name, related_table, foreign_key, owner_key))
    }

    /// Joined through `pivot_table`; both owner keys default to `"id"`.
    pub const fn belongs_to_many(
        name: &'static str,
        related_table: &'static str,
        pivot_table: &'static str,
        parent_column: &'static str,
        related_column: &'static str,
    ) -> Self {
        Relationship::BelongsToMany(PivotRelation {
            name: Cow::Borrowed(name),
            related_table: Cow::Borrowed(related_table),
            pivot_table: Cow::Borrowed(pivot_table),
            parent_column: Cow::Borrowed(parent_column),
            related_column: Cow::Borrowed(related_column),
            owner_key: Cow::Borrowed("id"),
            related_key: Cow::Borrowed("id"),
        })
    }

    /// Set the related table's primary key column.
    #[must_use]
    pub fn with_related_key(mut self, key: impl Into<Ident>) -> Self {
        match &mut self {
            Relationship::BelongsTo(r) | Relationship::HasOne(r) | Relationship::HasMany(r) => {
                r.related_key = key.into();
            }
            Relationship::BelongsToMany(r) => r.related_key = key.into(),
        }
        self
    }

    /// Set the source-side key of a many-to-many relationship.
    ///
    /// Keyed relationships take their owner key in the constructor, so this
    /// only affects `BelongsToMany`.
    #[must_use]
    pub fn with_owner_key(mut self, key: impl Into<Ident>) -> Self {
        if let Relationship::BelongsToMany(r) = &mut self {
            r.owner_key = key.into();
        }
        self
    }

    /// Parse a descriptor from JSON. Any failure, including an unknown
    /// `"kind"`, is a configuration error.
    #[allow(clippy::result_large_err)]
    pub fn from_json(json: &str) -> Result<Self> {
        let rel: Relationship = serde_json::from_str(json).map_err(|e| {
            Error::Config(ConfigError {
                message: format!("invalid relationship descriptor: {}", e),
                source: Some(Box::new(e)),
            })
        })?;
        rel.validate()?;
        Ok(rel)
    }

    pub const fn kind(&self) -> RelationshipKind {
        match self {
            Relationship::BelongsTo(_) => RelationshipKind::BelongsTo,
            Relationship::HasOne(_) => RelationshipKind::HasOne,
            Relationship::HasMany(_) => RelationshipKind::HasMany,
            Relationship::BelongsToMany(_) => RelationshipKind::BelongsToMany,
        }
    }

    /// Relationship name, which is also the field written on each record.
    pub fn name(&self) -> &str {
        match self {
            Relationship::BelongsTo(r) | Relationship::HasOne(r) | Relationship::HasMany(r) => {
                &r.name
            }
            Relationship::BelongsToMany(r) => &r.name,
        }
    }

    pub fn related_table(&self) -> &str {
        match self {
            Relationship::BelongsTo(r) | Relationship::HasOne(r) | Relationship::HasMany(r) => {
                &r.related_table
            }
            Relationship::BelongsToMany(r) => &r.related_table,
        }
    }

    /// Primary key column of the related table.
    pub fn related_key(&self) -> &str {
        match self {
            Relationship::BelongsTo(r) | Relationship::HasOne(r) | Relationship::HasMany(r) => {
                &r.related_key
            }
            Relationship::BelongsToMany(r) => &r.related_key,
        }
    }

    /// Field read from each source record to find its related rows.
    pub fn source_key(&self) -> &str {
        match self {
            Relationship::BelongsTo(r) => &r.foreign_key,
            Relationship::HasOne(r) | Relationship::HasMany(r) => &r.owner_key,
            Relationship::BelongsToMany(r) => &r.owner_key,
        }
    }

    /// Table queried with the source keys: the related table, or the pivot
    /// table for many-to-many.
    pub fn lookup_table(&self) -> &str {
        match self {
            Relationship::BelongsTo(r) | Relationship::HasOne(r) | Relationship::HasMany(r) => {
                &r.related_table
            }
            Relationship::BelongsToMany(r) => &r.pivot_table,
        }
    }

    /// Column of [`lookup_table`](Self::lookup_table) matched against the
    /// source keys.
    pub fn lookup_column(&self) -> &str {
        match self {
            Relationship::BelongsTo(r) => &r.owner_key,
            Relationship::HasOne(r) | Relationship::HasMany(r) => &r.foreign_key,
            Relationship::BelongsToMany(r) => &r.parent_column,
        }
    }

    /// Check that every identifier the resolution needs is present.
    ///
    /// Resolution calls this before issuing any query.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        let kind = self.kind();
        let required: Vec<(&str, &str)> = match self {
            Relationship::BelongsTo(r) | Relationship::HasOne(r) | Relationship::HasMany(r) => {
                vec![
                    ("name", &*r.name),
                    ("related table", &*r.related_table),
                    ("foreign key", &*r.foreign_key),
                    ("owner key", &*r.owner_key),
                    ("related key", &*r.related_key),
                ]
            }
            Relationship::BelongsToMany(r) => vec![
                ("name", &*r.name),
                ("related table", &*r.related_table),
                ("pivot table", &*r.pivot_table),
                ("parent column", &*r.parent_column),
                ("related column", &*r.related_column),
                ("owner key", &*r.owner_key),
                ("related key", &*r.related_key),
            ],
        };

        for (label, value) in required {
            if value.trim().is_empty() {
                let name = self.name();
                let message = if name.trim().is_empty() {
                    format!("{} relationship has an empty {}", kind, label)
                } else {
                    format!("{} relationship '{}' has an empty {}", kind, name, label)
                };
                return Err(Error::config(message));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_const_descriptors() {
        const AUTHOR: Relationship =
            Relationship::belongs_to("author", "authors", "author_id", "id");
        const PROFILE: Relationship = Relationship::has_one("profile", "profiles", "user_id", "id");
        const ROLES: Relationship =
            Relationship::belongs_to_many("roles", "roles", "user_roles", "user_id", "role_id");

        assert_eq!(AUTHOR.kind(), RelationshipKind::BelongsTo);
        assert_eq!(AUTHOR.source_key(), "author_id");
        assert_eq!(AUTHOR.lookup_table(), "authors");
        assert_eq!(AUTHOR.lookup_column(), "id");

        assert_eq!(PROFILE.source_key(), "id");
        assert_eq!(PROFILE.lookup_column(), "user_id");
        assert!(!PROFILE.kind().is_list());

        assert_eq!(ROLES.lookup_table(), "user_roles");
        assert_eq!(ROLES.lookup_column(), "user_id");
        assert_eq!(ROLES.related_table(), "roles");
        assert!(ROLES.kind().is_list());
    }

    #[test]
    fn test_builder_keys() {
        let rel = Relationship::has_one("profile", "profiles", "user_id", "id")
            .with_related_key("profile_id");
        assert_eq!(rel.related_key(), "profile_id");

        let rel = Relationship::belongs_to_many("tags", "tags", "post_tags", "post_id", "tag_id")
            .with_owner_key("uuid")
            .with_related_key(String::from("tag_uuid"));
        assert_eq!(rel.source_key(), "uuid");
        assert_eq!(rel.related_key(), "tag_uuid");
    }

    #[test]
    fn test_validate_reports_empty_field() {
        let rel = Relationship::has_many("comments", "comments", "", "id");
        let err = rel.validate().unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(
            err.to_string(),
            "Configuration error: has_many relationship 'comments' has an empty foreign key"
        );

        let rel = Relationship::belongs_to_many("roles", "roles", " ", "user_id", "role_id");
        assert!(
            rel.validate()
                .unwrap_err()
                .to_string()
                .contains("empty pivot table")
        );

        let rel = Relationship::belongs_to("", "authors", "author_id", "id");
        assert!(
            rel.validate()
                .unwrap_err()
                .to_string()
                .contains("belongs_to relationship has an empty name")
        );
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!(
            "belongs_to".parse::<RelationshipKind>().unwrap(),
            RelationshipKind::BelongsTo
        );
        assert_eq!(
            "BelongsToMany".parse::<RelationshipKind>().unwrap(),
            RelationshipKind::BelongsToMany
        );
        assert_eq!(
            " HasOne ".parse::<RelationshipKind>().unwrap(),
            RelationshipKind::HasOne
        );
        let err = "morph_to".parse::<RelationshipKind>().unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_from_json_defaults_and_aliases() {
        let rel = Relationship::from_json(
            r#"{"kind": "BelongsToMany", "name": "roles", "related_table": "roles",
                "pivot_table": "user_roles", "parent_column": "user_id",
                "related_column": "role_id"}"#,
        )
        .unwrap();
        assert_eq!(
            rel,
            Relationship::belongs_to_many("roles", "roles", "user_roles", "user_id", "role_id")
        );
    }

    #[test]
    fn test_from_json_rejects_unknown_kind_and_empty_fields() {
        let err = Relationship::from_json(
            r#"{"kind": "morph_to", "name": "x", "related_table": "y", "foreign_key": "z"}"#,
        )
        .unwrap_err();
        assert!(err.is_config_error());

        let err = Relationship::from_json(
            r#"{"kind": "has_many", "name": "x", "related_table": "", "foreign_key": "z"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("empty related table"));
    }

    #[test]
    fn test_serialize_uses_snake_case_tag() {
        let rel = Relationship::has_many("comments", "comments", "post_id", "id");
        let json = serde_json::to_value(&rel).unwrap();
        assert_eq!(json["kind"], "has_many");
        assert_eq!(json["foreign_key"], "post_id");
        assert_eq!(json["related_key"], "id");
    }
}
