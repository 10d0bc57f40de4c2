//! In-memory row store and anonymity classification.
//!
//! [`Dataset::ingest`] turns the caller's records into typed rows keyed by
//! their full dimension tuple and stamps each row's anonymity up front: a
//! cell is anonymous when its incidence meets the threshold (or is an exact
//! zero under `allow_zeroes`), and every non-anonymous cell starts redacted.
//! Everything after ingestion only flips clear rows to redacted.

use std::collections::BTreeMap;

use shroud_core::{DimensionTuple, DimensionValue, Error, Result, SuppressionConfig};

use crate::row::{Row, SMALL_CELL_REASON};

/// One input record: a mapping from column name to JSON value.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// The typed in-memory table the engine operates on.
#[derive(Debug, Clone)]
pub struct Dataset {
    rows: Vec<Row>,
    index: BTreeMap<DimensionTuple, usize>,
}

impl Dataset {
    /// Builds a dataset from raw records and classifies each row.
    ///
    /// Missing dimension values become the null category. Columns that are
    /// neither dimensions nor the incidence are carried through as
    /// passthrough columns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] when the incidence column is
    /// missing, non-integer, or negative, or when two records share the same
    /// dimension tuple.
    pub fn ingest(records: &[Record], config: &SuppressionConfig) -> Result<Self> {
        let mut rows = Vec::with_capacity(records.len());
        let mut index = BTreeMap::new();

        for record in records {
            let row = ingest_record(record, config)?;
            if index.contains_key(&row.dims) {
                return Err(Error::malformed_input(format!(
                    "duplicate dimension tuple {}",
                    row.dims.canonical_string()
                )));
            }
            index.insert(row.dims.clone(), rows.len());
            rows.push(row);
        }

        Ok(Self { rows, index })
    }

    /// Returns the rows in ingestion order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when the dataset has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks up a row by its dimension tuple.
    #[must_use]
    pub fn get(&self, dims: &DimensionTuple) -> Option<&Row> {
        self.index.get(dims).map(|&i| &self.rows[i])
    }

    /// Mutable lookup for the redaction merger.
    pub(crate) fn get_mut(&mut self, dims: &DimensionTuple) -> Option<&mut Row> {
        let index = self.index.get(dims).copied()?;
        Some(&mut self.rows[index])
    }

    /// Number of redacted rows in the whole dataset.
    #[must_use]
    pub fn redacted_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_redacted).count()
    }

    /// Redacted-row counts per summable slice.
    ///
    /// A slice groups the rows that agree on every non-summable dimension,
    /// the widest set of cells a consumer can combine into a published
    /// total. With no non-summable dimensions there is a single slice
    /// covering the dataset (keyed by the empty tuple).
    #[must_use]
    pub fn redacted_count_by_slice(
        &self,
        non_summable: &[String],
    ) -> BTreeMap<DimensionTuple, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            let key = row.dims.project(non_summable);
            let entry = counts.entry(key).or_insert(0);
            if row.is_redacted {
                *entry += 1;
            }
        }
        counts
    }
}

fn ingest_record(record: &Record, config: &SuppressionConfig) -> Result<Row> {
    let mut dims = DimensionTuple::new();
    for name in &config.dimensions {
        let value = match record.get(name) {
            None => DimensionValue::Null,
            Some(v) => DimensionValue::from_json(name, v)?,
        };
        dims.insert(name.clone(), value);
    }

    let incidence = parse_incidence(record, &config.incidence_column, &dims)?;

    let extra: BTreeMap<String, serde_json::Value> = record
        .iter()
        .filter(|(name, _)| {
            *name != &config.incidence_column && !config.dimensions.contains(*name)
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    let is_anonymous =
        incidence >= config.threshold || (config.allow_zeroes && incidence == 0);

    let mut row = Row {
        dims,
        incidence,
        is_anonymous,
        is_redacted: false,
        redaction_reason: None,
        peer_group: Default::default(),
        redacted_peers: Default::default(),
        extra,
    };

    if !is_anonymous {
        // Primary redaction: the cell itself is small. Its peer group is its
        // own tuple projected onto the full dimension set.
        row.is_redacted = true;
        row.redaction_reason = Some(SMALL_CELL_REASON.to_string());
        row.peer_group.insert(row.dims.clone());
    }

    Ok(row)
}

fn parse_incidence(
    record: &Record,
    column: &str,
    dims: &DimensionTuple,
) -> Result<u64> {
    let value = record.get(column).ok_or_else(|| {
        Error::malformed_input(format!(
            "record {} is missing incidence column '{column}'",
            dims.canonical_string()
        ))
    })?;

    let number = value.as_number().ok_or_else(|| {
        Error::malformed_input(format!(
            "record {} has non-numeric incidence {value}",
            dims.canonical_string()
        ))
    })?;

    number.as_u64().ok_or_else(|| {
        Error::malformed_input(format!(
            "record {} has non-integer or negative incidence {number}",
            dims.canonical_string()
        ))
    })
}
