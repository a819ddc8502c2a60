//! Transformer - applies a confirmed mapping to parsed rows

use crate::domain::{CellValue, ImportSpec, MappingSet, RawRow, TransformedRow};

/// Re-key every raw row by target field and coerce mapped cells
///
/// A cell is coerced by the target's registered transform only when the raw
/// value is present; blank cells pass through untouched and nothing is
/// default-filled. Unmapped target fields stay absent from the output row.
/// Output length and order match the input, and the input is never mutated.
pub fn apply_mappings(
    rows: &[RawRow],
    mappings: &MappingSet,
    spec: &ImportSpec,
) -> Vec<TransformedRow> {
    rows.iter()
        .map(|row| transform_row(row, mappings, spec))
        .collect()
}

fn transform_row(row: &RawRow, mappings: &MappingSet, spec: &ImportSpec) -> TransformedRow {
    let mut out = TransformedRow::new();

    for mapping in mappings.iter() {
        let raw = row
            .get(&mapping.source)
            .cloned()
            .unwrap_or(CellValue::Empty);

        let value = match spec.transform_for(&mapping.target) {
            Some(transform) if !raw.is_blank() => transform.apply(&raw),
            _ => raw,
        };

        out.insert(mapping.target.clone(), value);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Entity;
    use rust_decimal::Decimal;

    fn raw_row(cells: &[(&str, CellValue)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn customer_mappings() -> MappingSet {
        let mut mappings = MappingSet::new();
        mappings.set("name", Some("Customer Name".to_string()));
        mappings.set("gstin", Some("GST".to_string()));
        mappings.set("email", Some("Email".to_string()));
        mappings
    }

    #[test]
    fn test_transform_applied_to_present_values() {
        let spec = Entity::Customers.spec();
        let rows = vec![raw_row(&[
            ("Customer Name", CellValue::Text("  Acme Traders ".to_string())),
            ("GST", CellValue::Text("27aapfu0939f1zv".to_string())),
            ("Email", CellValue::Text("acme@example.com".to_string())),
        ])];

        let out = apply_mappings(&rows, &customer_mappings(), spec);
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].get("name"),
            Some(&CellValue::Text("Acme Traders".to_string()))
        );
        assert_eq!(
            out[0].get("gstin"),
            Some(&CellValue::Text("27AAPFU0939F1ZV".to_string()))
        );
        // email has no registered transform and passes through
        assert_eq!(
            out[0].get("email"),
            Some(&CellValue::Text("acme@example.com".to_string()))
        );
    }

    #[test]
    fn test_blank_values_skip_the_transform() {
        let spec = Entity::Customers.spec();
        let rows = vec![raw_row(&[
            ("Customer Name", CellValue::Text("Acme".to_string())),
            ("GST", CellValue::Empty),
        ])];

        let mut mappings = MappingSet::new();
        mappings.set("name", Some("Customer Name".to_string()));
        mappings.set("gstin", Some("GST".to_string()));

        let out = apply_mappings(&rows, &mappings, spec);
        assert_eq!(out[0].get("gstin"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_missing_source_column_becomes_empty() {
        let spec = Entity::Customers.spec();
        let rows = vec![raw_row(&[("Customer Name", CellValue::Text("Acme".to_string()))])];

        let mut mappings = MappingSet::new();
        mappings.set("name", Some("Customer Name".to_string()));
        mappings.set("email", Some("NoSuchColumn".to_string()));

        let out = apply_mappings(&rows, &mappings, spec);
        assert_eq!(out[0].get("email"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_unmapped_fields_stay_absent() {
        let spec = Entity::Customers.spec();
        let rows = vec![raw_row(&[("Customer Name", CellValue::Text("Acme".to_string()))])];

        let mut mappings = MappingSet::new();
        mappings.set("name", Some("Customer Name".to_string()));

        let out = apply_mappings(&rows, &mappings, spec);
        assert_eq!(out[0].len(), 1);
        assert!(out[0].get("phone").is_none());
    }

    #[test]
    fn test_numeric_coercion_fallback() {
        let spec = Entity::Items.spec();
        let rows = vec![
            raw_row(&[
                ("Item", CellValue::Text("Widget".to_string())),
                ("Selling Price", CellValue::Text("₹1,250.00".to_string())),
            ]),
            raw_row(&[
                ("Item", CellValue::Text("Gadget".to_string())),
                ("Selling Price", CellValue::Text("call for price".to_string())),
            ]),
        ];

        let mut mappings = MappingSet::new();
        mappings.set("name", Some("Item".to_string()));
        mappings.set("selling_price", Some("Selling Price".to_string()));

        let out = apply_mappings(&rows, &mappings, spec);
        assert_eq!(
            out[0].get("selling_price"),
            Some(&CellValue::Number(Decimal::new(125000, 2)))
        );
        assert_eq!(
            out[1].get("selling_price"),
            Some(&CellValue::Number(Decimal::ZERO))
        );
    }

    #[test]
    fn test_length_and_order_preserved() {
        let spec = Entity::Customers.spec();
        let rows: Vec<RawRow> = (0..5)
            .map(|i| raw_row(&[("Customer Name", CellValue::Text(format!("c{}", i)))]))
            .collect();

        let mut mappings = MappingSet::new();
        mappings.set("name", Some("Customer Name".to_string()));

        let out = apply_mappings(&rows, &mappings, spec);
        assert_eq!(out.len(), 5);
        for (i, row) in out.iter().enumerate() {
            assert_eq!(
                row.get("name"),
                Some(&CellValue::Text(format!("c{}", i)))
            );
        }
    }

    #[test]
    fn test_rerun_is_repeatable() {
        let spec = Entity::Customers.spec();
        let rows = vec![raw_row(&[
            ("Customer Name", CellValue::Text("Acme".to_string())),
            ("GST", CellValue::Text("x".to_string())),
        ])];
        let mappings = customer_mappings();

        let first = apply_mappings(&rows, &mappings, spec);
        let second = apply_mappings(&rows, &mappings, spec);
        assert_eq!(first, second);
    }
}
