//! Bucket row records by the value of a field.
//!
//! # Architecture
//!
//! ```text
//! Rows (file order)                  →  Grouped (first-seen key order)
//! ┌──────────────────────────────┐      ┌──────────────────────────┐
//! │ Name: A, Designation: Eng    │      │ "Eng":    [A, C]         │
//! │ Name: B, Designation: Sales  │  →   │ "Sales":  [B]            │
//! │ Name: C, Designation: Eng    │      │ "Others": [D]            │
//! │ Name: D                      │      └──────────────────────────┘
//! └──────────────────────────────┘
//! ```
//!
//! Every input row lands in exactly one group, and rows keep their input
//! order inside a group.

use indexmap::IndexMap;
use serde_json::Value;

use crate::parser::RowRecord;

/// Column used to group uploaded business cards.
pub const DESIGNATION_FIELD: &str = "Designation";

/// Group key for rows without a usable value.
pub const FALLBACK_GROUP: &str = "Others";

/// Group key -> rows, keys in order of first appearance.
pub type GroupedRecords = IndexMap<String, Vec<RowRecord>>;

/// Group rows by their `Designation` column.
pub fn group_by_designation(records: Vec<RowRecord>) -> GroupedRecords {
    group_by_field(records, DESIGNATION_FIELD)
}

/// Group rows by the value of `field`.
///
/// Strings are used as-is, numbers and `true` by their JSON text.
/// Missing, `null`, empty, zero and `false` values go to [`FALLBACK_GROUP`].
pub fn group_by_field(records: Vec<RowRecord>, field: &str) -> GroupedRecords {
    let mut grouped = GroupedRecords::new();

    for record in records {
        let key = group_key(&record, field);
        grouped.entry(key).or_default().push(record);
    }

    grouped
}

/// Rows back in group-then-row order.
pub fn flatten(grouped: &GroupedRecords) -> Vec<RowRecord> {
    grouped.values().flatten().cloned().collect()
}

fn group_key(record: &RowRecord, field: &str) -> String {
    match record.get(field) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        Some(Value::Bool(true)) => true.to_string(),
        _ => FALLBACK_GROUP.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> RowRecord {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn sample() -> Vec<RowRecord> {
        vec![
            row(json!({ "Name": "A", "Designation": "Eng" })),
            row(json!({ "Name": "B", "Designation": "Sales" })),
            row(json!({ "Name": "C", "Designation": "Eng" })),
            row(json!({ "Name": "D" })),
            row(json!({ "Name": "E", "Designation": "" })),
            row(json!({ "Name": "F", "Designation": null })),
        ]
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let grouped = group_by_designation(sample());

        let keys: Vec<&str> = grouped.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Eng", "Sales", "Others"]);
    }

    #[test]
    fn test_order_preserved_within_group() {
        let grouped = group_by_designation(sample());

        let eng: Vec<&Value> = grouped["Eng"].iter().map(|r| &r["Name"]).collect();
        assert_eq!(eng, vec!["A", "C"]);
    }

    #[test]
    fn test_missing_or_empty_goes_to_others() {
        let grouped = group_by_designation(sample());

        let others: Vec<&Value> = grouped["Others"].iter().map(|r| &r["Name"]).collect();
        assert_eq!(others, vec!["D", "E", "F"]);
    }

    #[test]
    fn test_non_string_keys() {
        let rows = vec![
            row(json!({ "Designation": 3 })),
            row(json!({ "Designation": true })),
            row(json!({ "Designation": 3 })),
        ];
        let grouped = group_by_designation(rows);

        assert_eq!(grouped["3"].len(), 2);
        assert_eq!(grouped["true"].len(), 1);
    }

    #[test]
    fn test_zero_and_false_go_to_others() {
        let rows = vec![
            row(json!({ "Name": "A", "Designation": 0 })),
            row(json!({ "Name": "B", "Designation": false })),
            row(json!({ "Name": "C", "Designation": 0.0 })),
            row(json!({ "Name": "D", "Designation": 7 })),
        ];
        let grouped = group_by_designation(rows);

        let keys: Vec<&str> = grouped.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Others", "7"]);
        assert_eq!(grouped["Others"].len(), 3);
    }

    #[test]
    fn test_every_row_in_exactly_one_group() {
        let input = sample();
        let grouped = group_by_designation(input.clone());

        let total: usize = grouped.values().map(Vec::len).sum();
        assert_eq!(total, input.len());

        let mut flat = flatten(&grouped);
        let mut original = input;
        let by_name = |r: &RowRecord| r["Name"].as_str().unwrap_or_default().to_string();
        flat.sort_by_key(by_name);
        original.sort_by_key(by_name);
        assert_eq!(flat, original);
    }

    #[test]
    fn test_regrouping_is_stable() {
        let grouped = group_by_designation(sample());
        let regrouped = group_by_designation(flatten(&grouped));

        assert_eq!(grouped, regrouped);
    }

    #[test]
    fn test_custom_field() {
        let rows = vec![
            row(json!({ "Team": "Blue" })),
            row(json!({ "Team": "Red" })),
            row(json!({ "Designation": "Eng" })),
        ];
        let grouped = group_by_field(rows, "Team");

        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[FALLBACK_GROUP].len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_designation(Vec::new()).is_empty());
    }
}
