//! Batch resolution strategies.
//!
//! Each strategy follows the same shape:
//!
//! 1. Read the key from every source record, skipping zero keys, and group
//!    record indices by normalised key.
//! 2. Fetch all related rows with one `IN` lookup (two for many-to-many).
//!    No fetch is issued when there are no keys.
//! 3. Group fetched rows by their join column.
//! 4. Write the resolved value onto every keyed record. Assignment failures
//!    are recorded in the report and do not stop the batch.
//!
//! All fetches complete before the first assignment, so a failed fetch
//! leaves every record untouched.

use crate::config::{LoaderConfig, TieBreak};
use crate::key::KeyValue;
use crate::report::{LoadReport, LoadWarning};
use relmodel_core::{KeyedRelation, PivotRelation, Record, Result, Row, RowFetcher, Value};
use std::collections::{HashMap, HashSet};

/// Source records sharing one key.
#[derive(Debug)]
pub(crate) struct KeyGroup {
    pub key: KeyValue,
    /// The key as read from the first record, used as the query parameter.
    pub value: Value,
    pub records: Vec<usize>,
}

/// Keys of a batch, in first-seen order.
#[derive(Debug, Default)]
pub(crate) struct SourceKeys {
    pub groups: Vec<KeyGroup>,
}

impl SourceKeys {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn params(&self) -> Vec<Value> {
        self.groups.iter().map(|g| g.value.clone()).collect()
    }
}

/// Read one record's key. Zero keys are skipped silently; missing or
/// unusable keys are skipped with a warning.
pub(crate) fn extract_key<R: Record + ?Sized>(
    record: &R,
    field: &str,
    index: usize,
    report: &mut LoadReport,
) -> Option<(KeyValue, Value)> {
    let Some(value) = record.get_field(field) else {
        report.skipped += 1;
        report.warn(LoadWarning::MissingKey {
            record: index,
            field: field.to_string(),
        });
        return None;
    };

    if value.is_zero() {
        report.skipped += 1;
        return None;
    }

    match KeyValue::from_value(&value) {
        Some(key) => Some((key, value)),
        None => {
            report.skipped += 1;
            report.warn(LoadWarning::UnsupportedKey {
                record: index,
                field: field.to_string(),
                type_name: value.type_name(),
            });
            None
        }
    }
}

pub(crate) fn collect_keys<R: Record>(
    records: &[R],
    field: &str,
    report: &mut LoadReport,
) -> SourceKeys {
    let mut keys = SourceKeys::default();
    let mut position: HashMap<KeyValue, usize> = HashMap::new();

    for (index, record) in records.iter().enumerate() {
        let Some((key, value)) = extract_key(record, field, index, report) else {
            continue;
        };
        if let Some(&pos) = position.get(&key) {
            keys.groups[pos].records.push(index);
        } else {
            position.insert(key.clone(), keys.groups.len());
            keys.groups.push(KeyGroup {
                key,
                value,
                records: vec![index],
            });
        }
    }

    report.keys = keys.len();
    keys
}

/// Fetch `table` rows whose `column` is in `params`, split into chunks of
/// `max_batch_size`. `params` must not be empty.
pub(crate) fn fetch_in<F: RowFetcher + ?Sized>(
    fetcher: &mut F,
    table: &str,
    column: &str,
    params: &[Value],
    config: &LoaderConfig,
    report: &mut LoadReport,
) -> Result<Vec<Row>> {
    let chunk_size = config.max_batch_size.unwrap_or(params.len()).max(1);
    let mut rows = Vec::new();
    for chunk in params.chunks(chunk_size) {
        report.queries += 1;
        let fetched = fetcher.fetch_rows(table, column, chunk)?;
        tracing::trace!(
            table = table,
            column = column,
            keys = chunk.len(),
            rows = fetched.len(),
            "Fetched related rows"
        );
        rows.extend(fetched);
    }
    Ok(rows)
}

pub(crate) fn row_key(row: &Row, column: &str) -> Option<KeyValue> {
    row.get_field(column)
        .and_then(|value| KeyValue::from_value(&value))
}

/// Index rows by `column`, keeping the first row per key.
pub(crate) fn index_first(rows: Vec<Row>, column: &str) -> HashMap<KeyValue, Row> {
    let mut index = HashMap::with_capacity(rows.len());
    for row in rows {
        if let Some(key) = row_key(&row, column) {
            index.entry(key).or_insert(row);
        }
    }
    index
}

/// Index rows by `column`, keeping one row per key chosen by `tie_break`.
pub(crate) fn index_one(
    rows: Vec<Row>,
    column: &str,
    related_key: &str,
    tie_break: TieBreak,
) -> HashMap<KeyValue, Row> {
    if tie_break == TieBreak::FirstFetched {
        return index_first(rows, column);
    }

    let mut best: HashMap<KeyValue, (Option<KeyValue>, Row)> = HashMap::with_capacity(rows.len());
    for row in rows {
        let Some(key) = row_key(&row, column) else {
            continue;
        };
        let rank = row_key(&row, related_key);
        match best.get_mut(&key) {
            Some((current, kept)) => {
                let better = match (&rank, &*current) {
                    (Some(new), Some(old)) => new < old,
                    (Some(_), None) => true,
                    (None, _) => false,
                };
                if better {
                    *current = rank;
                    *kept = row;
                }
            }
            None => {
                best.insert(key, (rank, row));
            }
        }
    }
    best.into_iter().map(|(key, (_, row))| (key, row)).collect()
}

/// Index rows by `column`, keeping every row in fetch order.
pub(crate) fn index_many(rows: Vec<Row>, column: &str) -> HashMap<KeyValue, Vec<Row>> {
    let mut index: HashMap<KeyValue, Vec<Row>> = HashMap::new();
    for row in rows {
        if let Some(key) = row_key(&row, column) {
            index.entry(key).or_default().push(row);
        }
    }
    index
}

/// `(parent key, related key)` pairs from pivot rows, in pivot order.
pub(crate) struct PivotLinks {
    pub links: Vec<(KeyValue, KeyValue)>,
    /// Distinct related keys, in first-seen order.
    pub related: Vec<Value>,
}

pub(crate) fn pivot_links(rows: &[Row], rel: &PivotRelation) -> PivotLinks {
    let mut links = Vec::with_capacity(rows.len());
    let mut related = Vec::new();
    let mut seen: HashSet<KeyValue> = HashSet::new();

    for row in rows {
        let parent = row_key(row, &rel.parent_column);
        let value = row.get_field(&rel.related_column);
        let target = value.as_ref().and_then(KeyValue::from_value);
        let (Some(parent), Some(target), Some(value)) = (parent, target, value) else {
            tracing::trace!(pivot_table = %rel.pivot_table, "Pivot row without usable keys ignored");
            continue;
        };
        if seen.insert(target.clone()) {
            related.push(value);
        }
        links.push((parent, target));
    }

    PivotLinks { links, related }
}

/// Walk pivot links and replace related keys with related rows. Duplicate
/// links collapse; links to rows that were not found are dropped.
pub(crate) fn join_pivot(
    links: Vec<(KeyValue, KeyValue)>,
    related: &HashMap<KeyValue, Row>,
) -> HashMap<KeyValue, Vec<Row>> {
    let mut by_parent: HashMap<KeyValue, Vec<Row>> = HashMap::new();
    let mut seen: HashSet<(KeyValue, KeyValue)> = HashSet::new();
    let mut dangling = 0usize;

    for (parent, target) in links {
        let Some(row) = related.get(&target) else {
            dangling += 1;
            continue;
        };
        if seen.insert((parent.clone(), target)) {
            by_parent.entry(parent).or_default().push(row.clone());
        }
    }

    if dangling > 0 {
        tracing::debug!(dangling = dangling, "Pivot rows reference missing related rows");
    }
    by_parent
}

pub(crate) fn single_value(row: Option<&Row>) -> Value {
    row.map_or(Value::Null, |r| Value::Record(Box::new(r.clone())))
}

pub(crate) fn list_value(rows: &[Row]) -> Value {
    Value::Array(
        rows.iter()
            .map(|r| Value::Record(Box::new(r.clone())))
            .collect(),
    )
}

/// Write `value` to one record, recording a warning on failure.
pub(crate) fn assign<R: Record + ?Sized>(
    record: &mut R,
    index: usize,
    name: &str,
    value: Value,
    report: &mut LoadReport,
) {
    match record.set_field(name, value) {
        Ok(()) => report.assigned += 1,
        Err(error) => report.warn(LoadWarning::Assign {
            record: index,
            error,
        }),
    }
}

fn distribute<R: Record>(
    records: &mut [R],
    keys: &SourceKeys,
    name: &str,
    report: &mut LoadReport,
    value_for: impl Fn(&KeyValue) -> Value,
) {
    for group in &keys.groups {
        let value = value_for(&group.key);
        for &index in &group.records {
            if let Some(record) = records.get_mut(index) {
                assign(record, index, name, value.clone(), report);
            }
        }
    }
}

fn log_start(report: &LoadReport, table: &str) {
    tracing::info!(
        relationship = %report.relationship,
        kind = %report.kind,
        related_table = table,
        parent_count = report.records,
        key_count = report.keys,
        "Batch loading relationship"
    );
}

/// BelongsTo: source `foreign_key` → related `owner_key`.
pub(crate) fn belongs_to<R: Record, F: RowFetcher + ?Sized>(
    fetcher: &mut F,
    records: &mut [R],
    rel: &KeyedRelation,
    config: &LoaderConfig,
    report: &mut LoadReport,
) -> Result<()> {
    let keys = collect_keys(records, &rel.foreign_key, report);
    log_start(report, &rel.related_table);
    if keys.is_empty() {
        return Ok(());
    }

    let rows = fetch_in(
        fetcher,
        &rel.related_table,
        &rel.owner_key,
        &keys.params(),
        config,
        report,
    )?;
    let related = index_first(rows, &rel.owner_key);

    distribute(records, &keys, &rel.name, report, |key| {
        single_value(related.get(key))
    });
    Ok(())
}

/// HasOne: source `owner_key` ← related `foreign_key`, one row per key.
pub(crate) fn has_one<R: Record, F: RowFetcher + ?Sized>(
    fetcher: &mut F,
    records: &mut [R],
    rel: &KeyedRelation,
    config: &LoaderConfig,
    report: &mut LoadReport,
) -> Result<()> {
    let keys = collect_keys(records, &rel.owner_key, report);
    log_start(report, &rel.related_table);
    if keys.is_empty() {
        return Ok(());
    }

    let rows = fetch_in(
        fetcher,
        &rel.related_table,
        &rel.foreign_key,
        &keys.params(),
        config,
        report,
    )?;
    let related = index_one(rows, &rel.foreign_key, &rel.related_key, config.tie_break);

    distribute(records, &keys, &rel.name, report, |key| {
        single_value(related.get(key))
    });
    Ok(())
}

/// HasMany: source `owner_key` ← related `foreign_key`, every row per key.
pub(crate) fn has_many<R: Record, F: RowFetcher + ?Sized>(
    fetcher: &mut F,
    records: &mut [R],
    rel: &KeyedRelation,
    config: &LoaderConfig,
    report: &mut LoadReport,
) -> Result<()> {
    let keys = collect_keys(records, &rel.owner_key, report);
    log_start(report, &rel.related_table);
    if keys.is_empty() {
        return Ok(());
    }

    let rows = fetch_in(
        fetcher,
        &rel.related_table,
        &rel.foreign_key,
        &keys.params(),
        config,
        report,
    )?;
    let related = index_many(rows, &rel.foreign_key);

    distribute(records, &keys, &rel.name, report, |key| {
        list_value(related.get(key).map(Vec::as_slice).unwrap_or_default())
    });
    Ok(())
}

/// BelongsToMany: source `owner_key` → pivot rows → related rows.
pub(crate) fn belongs_to_many<R: Record, F: RowFetcher + ?Sized>(
    fetcher: &mut F,
    records: &mut [R],
    rel: &PivotRelation,
    config: &LoaderConfig,
    report: &mut LoadReport,
) -> Result<()> {
    let keys = collect_keys(records, &rel.owner_key, report);
    log_start(report, &rel.related_table);
    if keys.is_empty() {
        return Ok(());
    }

    let pivots = fetch_in(
        fetcher,
        &rel.pivot_table,
        &rel.parent_column,
        &keys.params(),
        config,
        report,
    )?;
    let PivotLinks { links, related } = pivot_links(&pivots, rel);

    if related.is_empty() {
        tracing::debug!(
            pivot_table = %rel.pivot_table,
            "No pivot rows matched, assigning empty lists"
        );
        // Every record gets a list here, keyed or not.
        for (index, record) in records.iter_mut().enumerate() {
            assign(record, index, &rel.name, list_value(&[]), report);
        }
        return Ok(());
    }

    let rows = fetch_in(
        fetcher,
        &rel.related_table,
        &rel.related_key,
        &related,
        config,
        report,
    )?;
    let by_parent = join_pivot(links, &index_first(rows, &rel.related_key));

    distribute(records, &keys, &rel.name, report, |key| {
        list_value(by_parent.get(key).map(Vec::as_slice).unwrap_or_default())
    });
    Ok(())
}
