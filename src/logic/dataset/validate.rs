//! Data model invariants. A violation means a bug upstream, so these
//! return `InvariantViolation` instead of trying to repair anything.

use std::collections::HashSet;

use super::error::{DatasetError, DatasetResult};
use super::record::DomainRecord;

/// Every `domain` appears at most once
pub fn ensure_unique_domains(records: &[DomainRecord], context: &str) -> DatasetResult<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for (row, record) in records.iter().enumerate() {
        if !seen.insert(record.domain.as_str()) {
            return Err(DatasetError::InvariantViolation(format!(
                "{}: duplicate domain {:?} at row {}",
                context, record.domain, row
            )));
        }
    }
    Ok(())
}

/// Ids are exactly 0..N in row order
pub fn ensure_contiguous_ids(records: &[DomainRecord], context: &str) -> DatasetResult<()> {
    for (row, record) in records.iter().enumerate() {
        match record.id {
            Some(id) if id == row as i64 => {}
            Some(id) => {
                return Err(DatasetError::InvariantViolation(format!(
                    "{}: id {} at row {} (ids must be contiguous from 0)",
                    context, id, row
                )))
            }
            None => {
                return Err(DatasetError::InvariantViolation(format!(
                    "{}: missing id at row {}",
                    context, row
                )))
            }
        }
    }
    Ok(())
}

/// Ratios stay inside [0, 1]
pub fn ensure_ratios_in_range(records: &[DomainRecord], context: &str) -> DatasetResult<()> {
    for record in records {
        let ratios = [record.numeric_ratio, record.consonant_ratio, record.vowel_ratio];
        if ratios.iter().any(|r| !(0.0..=1.0).contains(r)) {
            return Err(DatasetError::InvariantViolation(format!(
                "{}: ratio out of range for {:?}",
                context, record.domain
            )));
        }
    }
    Ok(())
}
