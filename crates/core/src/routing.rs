//! Route point ordering, vehicle load and waybill numbering.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::CoreError;
use crate::types::DbId;

/// Validate that `requested` is a permutation of `existing`.
///
/// Used when a logistician reorders the stops of a delivery task: every stop
/// must appear exactly once and no foreign ids may sneak in.
pub fn validate_reorder(existing: &[DbId], requested: &[DbId]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(requested.len());
    for id in requested {
        if !seen.insert(*id) {
            return Err(CoreError::Validation(format!(
                "Route point {id} appears more than once"
            )));
        }
    }

    let existing_set: HashSet<DbId> = existing.iter().copied().collect();
    if let Some(unknown) = requested.iter().find(|id| !existing_set.contains(id)) {
        return Err(CoreError::Validation(format!(
            "Route point {unknown} does not belong to this task"
        )));
    }
    if requested.len() != existing.len() {
        return Err(CoreError::Validation(format!(
            "Expected {} route points, got {}",
            existing.len(),
            requested.len()
        )));
    }
    Ok(())
}

/// Refuse a route whose cargo is heavier than the vehicle can carry.
pub fn check_vehicle_load(payload_kg: f64, load_kg: f64) -> Result<(), CoreError> {
    if load_kg > payload_kg {
        return Err(CoreError::Validation(format!(
            "Route load of {load_kg:.1} kg exceeds vehicle payload of {payload_kg:.1} kg"
        )));
    }
    Ok(())
}

/// Waybill (TTN) number for a task: `TTN-YYYYMMDD-000042`.
pub fn ttn_number(task_id: DbId, date: NaiveDate) -> String {
    format!("TTN-{}-{task_id:06}", date.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permutation_is_accepted() {
        assert!(validate_reorder(&[1, 2, 3], &[3, 1, 2]).is_ok());
        assert!(validate_reorder(&[], &[]).is_ok());
    }

    #[test]
    fn duplicates_unknowns_and_gaps_are_rejected() {
        assert!(validate_reorder(&[1, 2, 3], &[1, 1, 2]).is_err());
        assert!(validate_reorder(&[1, 2, 3], &[1, 2, 4]).is_err());
        assert!(validate_reorder(&[1, 2, 3], &[1, 2]).is_err());
    }

    #[test]
    fn load_within_payload() {
        assert!(check_vehicle_load(1500.0, 1500.0).is_ok());
        let err = check_vehicle_load(1500.0, 1500.5).unwrap_err();
        assert!(err.to_string().contains("exceeds vehicle payload"));
    }

    #[test]
    fn ttn_number_format() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(ttn_number(42, date), "TTN-20260309-000042");
    }
}
