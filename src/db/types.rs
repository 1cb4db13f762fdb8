use serde::Serialize;

/// Owned, display-ready projection of a wire value. Everything downstream of
/// the executor renders from these; tiberius types never leak past it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::Null => "".to_string(),
            Value::Bool(value) => value.to_string(),
            Value::Int(value) => format_number(*value),
            Value::Float(value) => value.to_string(),
            Value::Text(value) => value.clone(),
        }
    }

    /// Like `as_display`, minus the digit grouping that would corrupt
    /// numeric cells in a CSV file.
    pub fn as_csv(&self) -> String {
        match self {
            Value::Null => "".to_string(),
            Value::Int(value) => value.to_string(),
            _ => self.as_display(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
}

fn format_number(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let lead = digits.len() % 3;
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (idx, ch) in digits.chars().enumerate() {
        if idx != 0 && (idx + 3 - lead) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
