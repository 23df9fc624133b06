use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::result::QueryResult;

/// Convert a query result into JSON row objects.
///
/// One object per row, keyed by the column names the warehouse returned, in
/// result-set order. Cell values are typed by the column's warehouse type:
///
/// - `DATE` → ISO-8601 date string (`YYYY-MM-DD`)
/// - `TIMESTAMP`, `TIMESTAMP_NTZ` → ISO-8601 datetime string
/// - `DECIMAL`, `DOUBLE`, `FLOAT`, `REAL` → JSON number (f64, with fallback
///   to the raw string when unparseable)
/// - `INT`, `BIGINT`, `SMALLINT`, `TINYINT`, `LONG` → JSON integer
///   (with fallback to the raw string)
/// - `BOOLEAN` → JSON bool (with fallback to the raw string)
/// - SQL NULL → JSON null
/// - Everything else → the string unchanged
pub fn rows_to_objects(result: &QueryResult) -> Vec<Map<String, Value>> {
    let mut objects = Vec::with_capacity(result.rows.len());

    for row in &result.rows {
        let mut object = Map::with_capacity(result.columns.len());
        for (i, col) in result.columns.iter().enumerate() {
            let value = match row.get(i) {
                Some(Some(cell)) => normalize_value(cell, &col.type_name),
                _ => Value::Null,
            };
            object.insert(col.name.clone(), value);
        }
        objects.push(object);
    }

    objects
}

/// Normalize a single cell according to the column's warehouse type name.
fn normalize_value(value: &str, type_name: &str) -> Value {
    let normalized_type = type_name.to_uppercase();

    match normalized_type.as_str() {
        "DATE" => match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            Err(_) => Value::String(value.to_string()),
        },
        "TIMESTAMP" | "TIMESTAMP_NTZ" => match parse_timestamp(value) {
            Some(ts) => Value::String(ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            None => Value::String(value.to_string()),
        },
        // Decimal-like types become floating-point numbers.
        "DECIMAL" | "DOUBLE" | "FLOAT" | "REAL" => value
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string())),
        "INT" | "BIGINT" | "SMALLINT" | "TINYINT" | "LONG" => value
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .unwrap_or_else(|_| Value::String(value.to_string())),
        "BOOLEAN" => match value.to_lowercase().as_str() {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            _ => Value::String(value.to_string()),
        },
        // Strings and unknown types pass through unchanged.
        _ => Value::String(value.to_string()),
    }
}

/// Parse a timestamp string into a naive datetime.
///
/// Tries multiple formats in order:
/// 1. RFC3339: `"2024-01-01T10:30:00Z"` (offset dropped after parsing)
/// 2. Space-separated: `"2024-01-01 10:30:00"` (with optional fraction)
/// 3. Just date: `"2024-01-01"` (assumes midnight)
///
/// Returns `None` if all formats fail.
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(ndt);
    }

    if let Ok(nd) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return nd.and_hms_opt(0, 0, 0);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{ResultColumn, StatementMetadata};

    fn test_metadata() -> StatementMetadata {
        StatementMetadata {
            statement_id: "stmt-test".to_string(),
            state: "SUCCEEDED".to_string(),
            total_row_count: 1,
        }
    }

    fn single_row_result(
        columns: Vec<(&str, &str)>,
        row: Vec<Option<&str>>,
    ) -> QueryResult {
        QueryResult {
            columns: columns
                .into_iter()
                .map(|(name, type_name)| ResultColumn {
                    name: name.to_string(),
                    type_name: type_name.to_string(),
                })
                .collect(),
            rows: vec![row.into_iter().map(|c| c.map(str::to_string)).collect()],
            metadata: test_metadata(),
        }
    }

    #[test]
    fn date_decimal_and_string_normalization() {
        let result = single_row_result(
            vec![("FECHA", "DATE"), ("stock", "DECIMAL"), ("centro", "STRING")],
            vec![Some("2024-01-01"), Some("12.5"), Some("Cancha Norte")],
        );

        let objects = rows_to_objects(&result);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0]["FECHA"], Value::String("2024-01-01".into()));
        assert_eq!(objects[0]["stock"], serde_json::json!(12.5));
        assert_eq!(objects[0]["centro"], Value::String("Cancha Norte".into()));
    }

    #[test]
    fn timestamp_becomes_iso8601() {
        let result = single_row_result(
            vec![("OV", "TIMESTAMP")],
            vec![Some("2024-03-15 08:05:30")],
        );

        let objects = rows_to_objects(&result);
        assert_eq!(objects[0]["OV"], Value::String("2024-03-15T08:05:30".into()));
    }

    #[test]
    fn rfc3339_timestamp_is_accepted() {
        let result = single_row_result(
            vec![("ts", "TIMESTAMP")],
            vec![Some("2024-03-15T08:05:30Z")],
        );

        let objects = rows_to_objects(&result);
        assert_eq!(objects[0]["ts"], Value::String("2024-03-15T08:05:30".into()));
    }

    #[test]
    fn fractional_seconds_survive() {
        let result = single_row_result(
            vec![("ts", "TIMESTAMP")],
            vec![Some("2024-03-15 08:05:30.250")],
        );

        let objects = rows_to_objects(&result);
        assert_eq!(
            objects[0]["ts"],
            Value::String("2024-03-15T08:05:30.250".into())
        );
    }

    #[test]
    fn integers_and_booleans() {
        let result = single_row_result(
            vec![("nro", "BIGINT"), ("turno", "INT"), ("activo", "BOOLEAN")],
            vec![Some("123456"), Some("2"), Some("true")],
        );

        let objects = rows_to_objects(&result);
        assert_eq!(objects[0]["nro"], serde_json::json!(123456));
        assert_eq!(objects[0]["turno"], serde_json::json!(2));
        assert_eq!(objects[0]["activo"], Value::Bool(true));
    }

    #[test]
    fn null_cell_becomes_json_null() {
        let result = single_row_result(
            vec![("sector", "STRING"), ("stock", "DECIMAL")],
            vec![None, Some("3.5")],
        );

        let objects = rows_to_objects(&result);
        assert_eq!(objects[0]["sector"], Value::Null);
        assert_eq!(objects[0]["stock"], serde_json::json!(3.5));
    }

    #[test]
    fn unparseable_numeric_falls_back_to_string() {
        let result = single_row_result(
            vec![("stock", "DECIMAL"), ("nro", "BIGINT")],
            vec![Some("not-a-number"), Some("12.5")],
        );

        let objects = rows_to_objects(&result);
        assert_eq!(objects[0]["stock"], Value::String("not-a-number".into()));
        assert_eq!(objects[0]["nro"], Value::String("12.5".into()));
    }

    #[test]
    fn unknown_type_passes_through() {
        let result = single_row_result(vec![("x", "INTERVAL")], vec![Some("2 days")]);

        let objects = rows_to_objects(&result);
        assert_eq!(objects[0]["x"], Value::String("2 days".into()));
    }

    #[test]
    fn empty_result_yields_empty_vec() {
        let result = QueryResult {
            columns: vec![ResultColumn {
                name: "FECHA".into(),
                type_name: "DATE".into(),
            }],
            rows: vec![],
            metadata: test_metadata(),
        };

        assert!(rows_to_objects(&result).is_empty());
    }

    #[test]
    fn column_order_is_preserved() {
        let result = single_row_result(
            vec![("z_last", "STRING"), ("a_first", "STRING")],
            vec![Some("1"), Some("2")],
        );

        let objects = rows_to_objects(&result);
        let keys: Vec<&String> = objects[0].keys().collect();
        assert_eq!(keys, vec!["z_last", "a_first"]);
    }
}
