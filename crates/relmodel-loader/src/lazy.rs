//! Single-record resolution strategies.
//!
//! These mirror the batch strategies for exactly one record and share their
//! grouping rules, so resolving records one at a time gives the same values
//! as resolving them together.

use crate::batch::{
    PivotLinks, assign, extract_key, fetch_in, index_first, index_one, join_pivot, list_value,
    pivot_links, single_value,
};
use crate::config::LoaderConfig;
use crate::report::LoadReport;
use relmodel_core::{Record, Relationship, Result, RowFetcher, Value};
use std::slice;

/// Resolve `relationship` for one record and write the result onto it.
///
/// Returns `None` without querying when the record's key is zero or missing.
pub(crate) fn resolve<R: Record + ?Sized, F: RowFetcher + ?Sized>(
    fetcher: &mut F,
    record: &mut R,
    relationship: &Relationship,
    config: &LoaderConfig,
    report: &mut LoadReport,
) -> Result<Option<Value>> {
    let Some((key, value)) = extract_key(&*record, relationship.source_key(), 0, report) else {
        tracing::trace!("Zero or missing key, nothing to resolve");
        return Ok(None);
    };
    report.keys = 1;

    let resolved = match relationship {
        Relationship::BelongsTo(rel) => {
            report.queries += 1;
            let row = fetcher.fetch_row(&rel.related_table, &rel.owner_key, &value)?;
            single_value(row.as_ref())
        }
        Relationship::HasOne(rel) => {
            report.queries += 1;
            let rows =
                fetcher.fetch_rows(&rel.related_table, &rel.foreign_key, slice::from_ref(&value))?;
            let mut candidates =
                index_one(rows, &rel.foreign_key, &rel.related_key, config.tie_break);
            single_value(candidates.remove(&key).as_ref())
        }
        Relationship::HasMany(rel) => {
            report.queries += 1;
            let rows =
                fetcher.fetch_rows(&rel.related_table, &rel.foreign_key, slice::from_ref(&value))?;
            list_value(&rows)
        }
        Relationship::BelongsToMany(rel) => {
            report.queries += 1;
            let pivots =
                fetcher.fetch_rows(&rel.pivot_table, &rel.parent_column, slice::from_ref(&value))?;
            let PivotLinks { links, related } = pivot_links(&pivots, rel);
            if related.is_empty() {
                list_value(&[])
            } else {
                let rows = fetch_in(
                    fetcher,
                    &rel.related_table,
                    &rel.related_key,
                    &related,
                    config,
                    report,
                )?;
                let mut by_parent = join_pivot(links, &index_first(rows, &rel.related_key));
                list_value(&by_parent.remove(&key).unwrap_or_default())
            }
        }
    };

    assign(record, 0, relationship.name(), resolved.clone(), report);
    Ok(Some(resolved))
}
