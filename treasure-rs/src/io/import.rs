use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{debug, info, warn};
use thiserror::Error;

use crate::entities::{
    Allocation, CapacityPolicy, Catalog, FilledTreasure, GemCounts, GemKind, N_GEMS, TreasureKind,
    fits_capacity,
};
use crate::pricing::PriceModel;

const FIELDS_WITH_PRICE: usize = 2 + N_GEMS;
const FIELDS_WITHOUT_PRICE: usize = 1 + N_GEMS;

/// A treasure with a count per gem, as read from one line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// 1-based line number in the source
    pub line: usize,
    pub treasure: TreasureKind,
    pub reference_price: Option<u64>,
    pub gems: GemCounts,
}

/// Why a line was dropped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("line {line}: expected 7 or 8 fields, found {found}")]
    FieldCount { line: usize, found: usize },
    #[error("line {line}: '{value}' is not a non-negative integer")]
    InvalidNumber { line: usize, value: String },
    #[error("line {line}: unknown treasure '{name}'")]
    UnknownTreasure { line: usize, name: String },
}

#[derive(Clone, Debug, Default)]
pub struct ParsedRecords {
    pub records: Vec<Record>,
    pub errors: Vec<RecordError>,
}

/// Parses every line of `text`. Malformed lines are reported in
/// [`ParsedRecords::errors`] and otherwise skipped.
pub fn parse_records(text: &str) -> ParsedRecords {
    let mut parsed = ParsedRecords::default();
    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match parse_line(i + 1, trimmed) {
            Ok(record) => parsed.records.push(record),
            Err(e) => {
                warn!("[IMPORT] skipping {e}");
                parsed.errors.push(e);
            }
        }
    }
    parsed
}

pub fn read_records(path: &Path) -> Result<ParsedRecords> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read record file: {}", path.display()))?;
    let parsed = parse_records(&text);
    info!(
        "[IMPORT] read {} records from {} ({} skipped)",
        parsed.records.len(),
        path.display(),
        parsed.errors.len()
    );
    Ok(parsed)
}

fn parse_line(line: usize, text: &str) -> Result<Record, RecordError> {
    let fields = text.split('/').map(str::trim).collect_vec();

    let (name, reference, counts) = match fields.len() {
        FIELDS_WITH_PRICE => (fields[0], Some(fields[1]), &fields[2..]),
        FIELDS_WITHOUT_PRICE => (fields[0], None, &fields[1..]),
        found => return Err(RecordError::FieldCount { line, found }),
    };

    let treasure = TreasureKind::resolve(name).ok_or_else(|| RecordError::UnknownTreasure {
        line,
        name: name.to_string(),
    })?;
    let reference_price = reference.map(|r| parse_number(line, r)).transpose()?;

    let mut gems = GemCounts::EMPTY;
    for (gem, value) in GemKind::ALL.into_iter().zip(counts) {
        let qty = parse_number(line, value)?;
        let qty = u32::try_from(qty).map_err(|_| RecordError::InvalidNumber {
            line,
            value: value.to_string(),
        })?;
        gems.set(gem, qty);
    }

    Ok(Record {
        line,
        treasure,
        reference_price,
        gems,
    })
}

fn parse_number(line: usize, value: &str) -> Result<u64, RecordError> {
    value.parse::<u64>().map_err(|_| RecordError::InvalidNumber {
        line,
        value: value.to_string(),
    })
}

impl Record {
    /// Logs a diagnostic if the reference price disagrees with the computed one
    fn check_reference(&self, computed: u64) {
        if let Some(reference) = self.reference_price {
            if reference != computed {
                debug!(
                    "[IMPORT] line {}: reference price {} of {} differs from computed price {}",
                    self.line, reference, self.treasure, computed
                );
            }
        }
    }
}

impl ParsedRecords {
    /// Builds a catalog from the records, in line order
    pub fn to_catalog(&self, model: PriceModel, policy: CapacityPolicy) -> Catalog {
        for r in self.records.iter() {
            r.check_reference(model.evaluate(r.treasure, &r.gems).final_price);
        }
        Catalog::build(
            model,
            self.records.iter().map(|r| (r.treasure, r.gems)),
            policy,
        )
    }

    /// Interprets the records as a list of filled treasures, in line order
    pub fn to_allocation(&self, model: &PriceModel) -> Allocation {
        self.records
            .iter()
            .map(|r| {
                if !fits_capacity(r.treasure, &r.gems) {
                    warn!(
                        "[IMPORT] line {}: gems {} do not fit the sockets of {}",
                        r.line, r.gems, r.treasure
                    );
                }
                let filled = FilledTreasure::new(r.treasure, r.gems, model);
                r.check_reference(filled.final_price());
                filled
            })
            .collect()
    }
}
