//! Parameterized SQL statements.
//!
//! User-supplied values travel as named Databricks parameter markers
//! (`:fecha`, `:centro_0`, ...) bound alongside the statement text. SQL text
//! itself only ever contains trusted template content.

use serde::Serialize;

/// A single named bind parameter for the statement execution API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementParam {
    /// Marker name without the leading `:`.
    pub name: String,
    /// Value, always transported as a string.
    pub value: String,
    /// Databricks type name the value should be coerced to (`STRING`, `DATE`).
    #[serde(rename = "type")]
    pub type_name: String,
}

impl StatementParam {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            type_name: "STRING".to_string(),
        }
    }

    pub fn date(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            type_name: "DATE".to_string(),
        }
    }
}

/// SQL text plus its bound parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub text: String,
    pub params: Vec<StatementParam>,
}

impl Statement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, param: StatementParam) -> Self {
        self.params.push(param);
        self
    }

    pub fn bind_all(mut self, params: impl IntoIterator<Item = StatementParam>) -> Self {
        self.params.extend(params);
        self
    }

    /// Look up a bound parameter value by marker name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }
}

/// Expand a list of values into numbered markers for an `IN (...)` clause.
///
/// Returns the SQL fragment (`:centro_0, :centro_1`) and the bound params.
pub fn in_list_markers(prefix: &str, values: &[String]) -> (String, Vec<StatementParam>) {
    let mut fragments = Vec::with_capacity(values.len());
    let mut params = Vec::with_capacity(values.len());
    for (i, value) in values.iter().enumerate() {
        let name = format!("{prefix}_{i}");
        fragments.push(format!(":{name}"));
        params.push(StatementParam::string(name, value.clone()));
    }
    (fragments.join(", "), params)
}
