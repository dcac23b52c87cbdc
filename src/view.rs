// src/view.rs
//! Result normalization
//!
//! Turns whatever the execution service returned into one of three
//! presentation shapes. Never fails: anything that doesn't look like a
//! row set is shown raw.

use serde::Serialize;
use serde_json::{Map, Value};

/// Presentation-ready result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ViewModel {
    Tabular {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
        footer: Footer,
    },
    Empty {
        footer: Footer,
    },
    Raw {
        value: Value,
    },
}

/// `count` and `engine` as reported by the service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Footer {
    pub count: Option<i64>,
    pub engine: Option<String>,
}

impl Footer {
    fn from_result(map: &Map<String, Value>) -> Self {
        Self {
            count: map.get("count").and_then(Value::as_i64),
            engine: map.get("engine").and_then(Value::as_str).map(String::from),
        }
    }
}

impl std::fmt::Display for Footer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.count, self.engine.as_deref()) {
            (Some(count), Some(engine)) => write!(f, "{} row(s) · engine: {}", count, engine),
            (Some(count), None) => write!(f, "{} row(s)", count),
            (None, Some(engine)) => write!(f, "engine: {}", engine),
            (None, None) => Ok(()),
        }
    }
}

impl ViewModel {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tabular { .. } => "tabular",
            Self::Empty { .. } => "empty",
            Self::Raw { .. } => "raw",
        }
    }
}

/// Map an execution result onto a view model
pub fn normalize(result: &Value) -> ViewModel {
    let Some(map) = result.as_object() else {
        return raw(result);
    };
    let Some(Value::Array(rows)) = map.get("result") else {
        return raw(result);
    };

    let footer = Footer::from_result(map);
    let Some(first) = rows.first() else {
        return ViewModel::Empty { footer };
    };
    let Some(first) = first.as_object() else {
        return raw(result);
    };

    let columns: Vec<String> = first.keys().cloned().collect();
    let mut table = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(row) = row.as_object() else {
            return raw(result);
        };
        table.push(
            columns
                .iter()
                .map(|c| row.get(c).map(display_value).unwrap_or_default())
                .collect(),
        );
    }

    ViewModel::Tabular {
        columns,
        rows: table,
        footer,
    }
}

fn raw(result: &Value) -> ViewModel {
    ViewModel::Raw {
        value: result.clone(),
    }
}

/// Cell text for a JSON value
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_row_table() {
        let view = normalize(&json!({
            "result": [{"id": 1, "name": "a"}],
            "count": 1,
            "engine": "bplustree"
        }));
        assert_eq!(
            view,
            ViewModel::Tabular {
                columns: vec!["id".into(), "name".into()],
                rows: vec![vec!["1".into(), "a".into()]],
                footer: Footer { count: Some(1), engine: Some("bplustree".into()) },
            }
        );
    }

    #[test]
    fn test_columns_follow_first_row_order() {
        let view = normalize(&json!({
            "result": [
                {"zeta": 1, "alpha": 2, "mid": 3},
                {"mid": 6, "zeta": 4, "alpha": 5}
            ]
        }));
        let ViewModel::Tabular { columns, rows, .. } = view else {
            panic!("expected table");
        };
        assert_eq!(columns, vec!["zeta", "alpha", "mid"]);
        assert_eq!(rows[1], vec!["4", "5", "6"]);
    }

    #[test]
    fn test_cell_coercion() {
        let view = normalize(&json!({
            "result": [{"a": null, "b": true, "c": 1.5, "d": [1.0, 2.0], "e": "x"}, {"a": 1}]
        }));
        let ViewModel::Tabular { rows, .. } = view else {
            panic!("expected table");
        };
        assert_eq!(rows[0], vec!["NULL", "true", "1.5", "[1.0,2.0]", "x"]);
        // later rows are not re-verified against the first row's columns
        assert_eq!(rows[1], vec!["1", "", "", "", ""]);
    }

    #[test]
    fn test_empty_result() {
        let view = normalize(&json!({
            "message": "Record not found", "result": [], "count": 0, "engine": "bplustree"
        }));
        assert_eq!(
            view,
            ViewModel::Empty {
                footer: Footer { count: Some(0), engine: Some("bplustree".into()) }
            }
        );
    }

    #[test]
    fn test_raw_fallbacks() {
        let cases = [
            json!("Created record: song"),
            json!({"table": "song", "inserted": 10, "skipped": 0}),
            json!({"result": "not a list"}),
            json!({"result": [1, 2, 3]}),
            json!({"result": [{"a": 1}, "stray"]}),
            json!(null),
            json!([{"a": 1}]),
        ];
        for case in cases {
            let view = normalize(&case);
            assert_eq!(view, ViewModel::Raw { value: case.clone() }, "{}", case);
        }
    }

    #[test]
    fn test_footer_display() {
        let footer = Footer { count: Some(3), engine: Some("isam".into()) };
        assert_eq!(footer.to_string(), "3 row(s) · engine: isam");
        assert_eq!(Footer::default().to_string(), "");
    }
}
