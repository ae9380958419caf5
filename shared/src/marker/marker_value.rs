use crate::Identity;

/// A value stored under a marker key in an object's persisted data
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkerValue {
    Bool(bool),
    Int(i64),
    Identity(Identity),
    Text(String),
}

impl MarkerValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MarkerValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            MarkerValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_identity(&self) -> Option<Identity> {
        match self {
            MarkerValue::Identity(value) => Some(*value),
            _ => None,
        }
    }

    /// Short name of the variant, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            MarkerValue::Bool(_) => "bool",
            MarkerValue::Int(_) => "int",
            MarkerValue::Identity(_) => "identity",
            MarkerValue::Text(_) => "text",
        }
    }
}

impl From<bool> for MarkerValue {
    fn from(value: bool) -> Self {
        MarkerValue::Bool(value)
    }
}

impl From<i64> for MarkerValue {
    fn from(value: i64) -> Self {
        MarkerValue::Int(value)
    }
}

impl From<Identity> for MarkerValue {
    fn from(value: Identity) -> Self {
        MarkerValue::Identity(value)
    }
}

impl From<&str> for MarkerValue {
    fn from(value: &str) -> Self {
        MarkerValue::Text(value.to_string())
    }
}
