use serde::{Deserialize, Serialize};

/// Column definition from a statement's result manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultColumn {
    /// Column name as returned by the warehouse.
    pub name: String,
    /// Warehouse type name (e.g. "STRING", "DECIMAL", "DATE", "TIMESTAMP").
    pub type_name: String,
}

/// Execution metadata for a completed statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementMetadata {
    /// Statement ID assigned by the warehouse.
    pub statement_id: String,
    /// Final execution state ("SUCCEEDED", "FAILED", "CANCELED").
    pub state: String,
    /// Total rows in the result, when reported.
    pub total_row_count: u64,
}

/// Structured result set from a warehouse statement execution.
///
/// Rows are stored as `Vec<Option<String>>` where `None` represents SQL NULL.
/// Cell ordering in each row matches the `columns` vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column definitions in result-set order.
    pub columns: Vec<ResultColumn>,
    /// Row data. Each inner vector has the same length as `columns`.
    pub rows: Vec<Vec<Option<String>>>,
    /// Statement execution metadata.
    pub metadata: StatementMetadata,
}

impl QueryResult {
    /// Returns the number of data rows in the result set.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns in the result set.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the result set contains no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds the zero-based index of a column by name (case-sensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Retrieves the value at the given row index and column name.
    ///
    /// Returns `None` if the row index is out of bounds, the column name
    /// does not exist, or the cell value is SQL NULL.
    pub fn get_value(&self, row: usize, col: &str) -> Option<&str> {
        let col_idx = self.column_index(col)?;
        let row_data = self.rows.get(row)?;
        row_data.get(col_idx)?.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> QueryResult {
        QueryResult {
            columns: vec![
                ResultColumn { name: "FECHA".into(), type_name: "DATE".into() },
                ResultColumn { name: "centro".into(), type_name: "STRING".into() },
                ResultColumn { name: "stock".into(), type_name: "DECIMAL".into() },
            ],
            rows: vec![
                vec![Some("2024-01-01".into()), Some("Cancha Norte".into()), Some("12.5".into())],
                vec![Some("2024-01-01".into()), Some("Cancha Sur".into()), None],
                vec![Some("2024-01-02".into()), None, Some("7.0".into())],
            ],
            metadata: StatementMetadata {
                statement_id: "stmt-123".into(),
                state: "SUCCEEDED".into(),
                total_row_count: 3,
            },
        }
    }

    fn empty_result() -> QueryResult {
        QueryResult {
            columns: vec![],
            rows: vec![],
            metadata: StatementMetadata {
                statement_id: "stmt-0".into(),
                state: "SUCCEEDED".into(),
                total_row_count: 0,
            },
        }
    }

    #[test]
    fn construction_and_accessors() {
        let r = sample_result();
        assert_eq!(r.row_count(), 3);
        assert_eq!(r.column_count(), 3);
        assert!(!r.is_empty());
        assert_eq!(r.metadata.state, "SUCCEEDED");
    }

    #[test]
    fn column_index_lookup() {
        let r = sample_result();
        assert_eq!(r.column_index("FECHA"), Some(0));
        assert_eq!(r.column_index("stock"), Some(2));
        assert_eq!(r.column_index("missing"), None);
    }

    #[test]
    fn get_value_handles_null_and_out_of_bounds() {
        let r = sample_result();
        assert_eq!(r.get_value(0, "centro"), Some("Cancha Norte"));
        assert_eq!(r.get_value(1, "stock"), None);
        assert_eq!(r.get_value(2, "centro"), None);
        assert_eq!(r.get_value(99, "FECHA"), None);
        assert_eq!(r.get_value(0, "nope"), None);
    }

    #[test]
    fn empty_result_accessors() {
        let r = empty_result();
        assert_eq!(r.row_count(), 0);
        assert!(r.is_empty());
        assert_eq!(r.column_index("any"), None);
        assert_eq!(r.get_value(0, "any"), None);
    }

    #[test]
    fn serde_roundtrip() {
        let r = sample_result();
        let json = serde_json::to_string(&r).expect("serialize");
        let back: QueryResult = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.row_count(), r.row_count());
        assert_eq!(back.metadata.statement_id, r.metadata.statement_id);
        assert_eq!(back.get_value(0, "centro"), r.get_value(0, "centro"));
    }
}
