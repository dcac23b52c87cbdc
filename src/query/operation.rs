//! Operation descriptors produced by the parsing service
//!
//! The wire form is a free JSON object with an integer `op` tag. It is
//! kept verbatim so fields this console does not know about still reach
//! the execution service. `Operation` is the typed view over it.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::error::ValidationError;

/// Op codes that must carry the selected index engine as `idx`
pub const INDEX_REQUIRING_OPS: [i64; 3] = [1, 2, 4];

/// Raw descriptor returned by the parsing service
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedOperation(Value);

impl ParsedOperation {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// The descriptor's fields, if it is an object at all
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    /// Integer op code, if present and usable
    pub fn op_code(&self) -> Option<i64> {
        self.fields()?.get("op")?.as_i64()
    }

    /// Fields plus op code, or the reason the descriptor can't be dispatched
    pub fn validated(&self) -> Result<(&Map<String, Value>, i64), ValidationError> {
        let fields = self.fields().ok_or(ValidationError::InvalidQueryObject)?;
        let op = fields
            .get("op")
            .and_then(Value::as_i64)
            .ok_or(ValidationError::InvalidQueryObject)?;
        Ok((fields, op))
    }

    /// Typed view keyed by op code
    pub fn operation(&self) -> Result<Operation, ValidationError> {
        let (_, op) = self.validated()?;
        Ok(Operation::decode(op, &self.0))
    }
}

impl From<Value> for ParsedOperation {
    fn from(raw: Value) -> Self {
        Self::new(raw)
    }
}

/// Row filter as emitted by the parser
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Predicate {
    Eq { value: Value },
    Between { from: Value, to: Value },
    #[serde(other)]
    Unsupported,
}

/// Column declaration of a CREATE TABLE
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

#[derive(Debug, Default, Deserialize)]
struct Body {
    table: Option<String>,
    #[serde(default)]
    columns: Option<Value>,
    #[serde(rename = "where")]
    predicate: Option<Predicate>,
    values: Option<Vec<Vec<Value>>>,
    index: Option<Map<String, Value>>,
    file: Option<String>,
}

/// Closed set of operations, one variant per op code
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// op 0
    CreateTable {
        table: Option<String>,
        columns: Vec<ColumnDef>,
    },
    /// op 1
    Select {
        table: Option<String>,
        columns: Vec<String>,
        predicate: Option<Predicate>,
    },
    /// op 2
    Insert {
        table: Option<String>,
        rows: usize,
    },
    /// op 3
    CreateIndex {
        table: Option<String>,
        engine: Option<String>,
        file: Option<String>,
    },
    /// op 4
    Delete {
        table: Option<String>,
        predicate: Option<Predicate>,
    },
    /// Any op code this console has no shape for
    Other { code: i64 },
}

impl Operation {
    /// Decode the typed view. Fields with an unexpected shape are
    /// dropped from the view; the raw descriptor is untouched.
    pub fn decode(code: i64, raw: &Value) -> Self {
        let body: Body = serde_json::from_value(raw.clone()).unwrap_or_else(|e| {
            tracing::debug!(op = code, error = %e, "descriptor fields did not match known shape");
            Body {
                table: raw.get("table").and_then(Value::as_str).map(String::from),
                ..Body::default()
            }
        });

        match code {
            0 => Self::CreateTable {
                table: body.table,
                columns: body
                    .columns
                    .and_then(|c| serde_json::from_value(c).ok())
                    .unwrap_or_default(),
            },
            1 => Self::Select {
                table: body.table,
                columns: body
                    .columns
                    .and_then(|c| serde_json::from_value(c).ok())
                    .unwrap_or_default(),
                predicate: body.predicate,
            },
            2 => Self::Insert {
                table: body.table,
                rows: body.values.map(|v| v.len()).unwrap_or(0),
            },
            3 => Self::CreateIndex {
                table: body.table,
                engine: body
                    .index
                    .as_ref()
                    .and_then(|i| i.get("type"))
                    .and_then(Value::as_str)
                    .map(String::from),
                file: body.file,
            },
            4 => Self::Delete {
                table: body.table,
                predicate: body.predicate,
            },
            code => Self::Other { code },
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::CreateTable { .. } => 0,
            Self::Select { .. } => 1,
            Self::Insert { .. } => 2,
            Self::CreateIndex { .. } => 3,
            Self::Delete { .. } => 4,
            Self::Other { code } => *code,
        }
    }

    /// Whether dispatch must carry the selected index engine
    pub fn requires_index(&self) -> bool {
        requires_index(self.code())
    }

    pub fn table(&self) -> Option<&str> {
        match self {
            Self::CreateTable { table, .. }
            | Self::Select { table, .. }
            | Self::Insert { table, .. }
            | Self::CreateIndex { table, .. }
            | Self::Delete { table, .. } => table.as_deref(),
            Self::Other { .. } => None,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Self::CreateTable { .. } => "create table",
            Self::Select { .. } => "select",
            Self::Insert { .. } => "insert",
            Self::CreateIndex { .. } => "create index",
            Self::Delete { .. } => "delete",
            Self::Other { .. } => "op",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other { code } => write!(f, "op {}", code)?,
            other => f.write_str(other.verb())?,
        }
        if let Some(table) = self.table() {
            write!(f, " on {}", table)?;
        }
        match self {
            Self::Insert { rows, .. } if *rows > 0 => write!(f, " ({} row(s))", rows),
            Self::CreateIndex { engine: Some(engine), .. } => write!(f, " using {}", engine),
            Self::Select { predicate: Some(Predicate::Eq { .. }), .. }
            | Self::Delete { predicate: Some(Predicate::Eq { .. }), .. } => f.write_str(" where key ="),
            Self::Select { predicate: Some(Predicate::Between { .. }), .. } => {
                f.write_str(" where key between")
            }
            _ => Ok(()),
        }
    }
}

/// Op-code rule shared by the typed and raw paths
pub fn requires_index(code: i64) -> bool {
    INDEX_REQUIRING_OPS.contains(&code)
}
