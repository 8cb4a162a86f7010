//! Configuration table values.
//!
//! Recipe and build-state data reaches the task as a tree of tagged values.
//! Every accessor is fallible: asking a value for the wrong kind returns a
//! [`ValueError`] instead of panicking, so callers can map the failure onto
//! their own error taxonomy.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The kind of a [`Value`], used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Integer,
    Boolean,
    List,
    Table,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Boolean => "boolean",
            ValueKind::List => "list",
            ValueKind::Table => "table",
        };
        f.write_str(name)
    }
}

/// Error accessing a configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("key `{key}` not found")]
    NotFound { key: String },

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("unsupported value type `{type_name}`")]
    Unsupported { type_name: String },
}

/// A single configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Boolean(bool),
    List(Vec<Value>),
    Table(ValueTable),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Integer(_) => ValueKind::Integer,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::List(_) => ValueKind::List,
            Value::Table(_) => ValueKind::Table,
        }
    }

    pub fn as_str(&self) -> Result<&str, ValueError> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(other.mismatch(ValueKind::String)),
        }
    }

    pub fn as_integer(&self) -> Result<i64, ValueError> {
        match self {
            Value::Integer(i) => Ok(*i),
            other => Err(other.mismatch(ValueKind::Integer)),
        }
    }

    pub fn as_bool(&self) -> Result<bool, ValueError> {
        match self {
            Value::Boolean(b) => Ok(*b),
            other => Err(other.mismatch(ValueKind::Boolean)),
        }
    }

    pub fn as_list(&self) -> Result<&[Value], ValueError> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(other.mismatch(ValueKind::List)),
        }
    }

    pub fn as_table(&self) -> Result<&ValueTable, ValueError> {
        match self {
            Value::Table(table) => Ok(table),
            other => Err(other.mismatch(ValueKind::Table)),
        }
    }

    /// Read a list whose every element is a string.
    pub fn as_string_list(&self) -> Result<Vec<String>, ValueError> {
        self.as_list()?
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect()
    }

    /// Read a list of strings as paths.
    pub fn as_path_list(&self) -> Result<Vec<PathBuf>, ValueError> {
        self.as_list()?
            .iter()
            .map(|item| item.as_str().map(PathBuf::from))
            .collect()
    }

    fn mismatch(&self, expected: ValueKind) -> ValueError {
        ValueError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<ValueTable> for Value {
    fn from(value: ValueTable) -> Self {
        Value::Table(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<toml::Value> for Value {
    type Error = ValueError;

    fn try_from(value: toml::Value) -> Result<Self, Self::Error> {
        match value {
            toml::Value::String(s) => Ok(Value::String(s)),
            toml::Value::Integer(i) => Ok(Value::Integer(i)),
            toml::Value::Boolean(b) => Ok(Value::Boolean(b)),
            toml::Value::Array(items) => items
                .into_iter()
                .map(Value::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            toml::Value::Table(table) => ValueTable::try_from(table).map(Value::Table),
            other => Err(ValueError::Unsupported {
                type_name: other.type_str().to_string(),
            }),
        }
    }
}

/// An immutable-by-convention table of named values.
///
/// Entries iterate in key order, which is the table-defined order used
/// whenever the task walks a table (for example the test dependencies).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueTable {
    entries: BTreeMap<String, Value>,
}

impl ValueTable {
    pub fn new() -> Self {
        ValueTable {
            entries: BTreeMap::new(),
        }
    }

    /// Builder-style insert, mostly for constructing fixtures.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Result<&Value, ValueError> {
        self.entries.get(key).ok_or_else(|| ValueError::NotFound {
            key: key.to_string(),
        })
    }

    pub fn try_get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Get a nested table by key.
    pub fn table(&self, key: &str) -> Result<&ValueTable, ValueError> {
        self.get(key)?.as_table()
    }

    /// Look up a dotted key such as `MSVC.ClToolPath`.
    ///
    /// A literal entry with the full dotted name wins; otherwise each segment
    /// descends one table level.
    pub fn lookup(&self, dotted: &str) -> Option<&Value> {
        if let Some(value) = self.entries.get(dotted) {
            return Some(value);
        }

        let mut segments = dotted.split('.');
        let first = segments.next()?;
        let mut current = self.entries.get(first)?;
        for segment in segments {
            current = current.as_table().ok()?.entries.get(segment)?;
        }
        Some(current)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a table from TOML source.
    pub fn from_toml_str(source: &str) -> anyhow::Result<Self> {
        let table: toml::Table = toml::from_str(source)?;
        Ok(ValueTable::try_from(table)?)
    }
}

impl TryFrom<toml::Table> for ValueTable {
    type Error = ValueError;

    fn try_from(table: toml::Table) -> Result<Self, Self::Error> {
        let mut entries = BTreeMap::new();
        for (key, value) in table {
            entries.insert(key, Value::try_from(value)?);
        }
        Ok(ValueTable { entries })
    }
}
