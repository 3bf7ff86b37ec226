//! Missing-value detection and per-column type inference.

use serde_json::{Number, Value};

/// Cell contents treated as missing. Matches pandas' default `na_values`.
pub const NA_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing(cell: &str) -> bool {
    NA_MARKERS.contains(&cell)
}

/// Type shared by every non-missing cell of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Text,
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

/// Infer the narrowest type that fits every present cell.
///
/// Integers widen to floats; booleans and text never mix with numbers. A
/// column with no present cells is `Text`, which leaves all its values null.
pub fn infer_column_type<'a, I>(cells: I) -> ColumnType
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut inferred: Option<ColumnType> = None;

    for cell in cells.into_iter().flatten() {
        let trimmed = cell.trim();
        let cell_type = if trimmed.parse::<i64>().is_ok() {
            ColumnType::Integer
        } else if trimmed.parse::<f64>().is_ok() {
            ColumnType::Float
        } else if parse_bool(trimmed).is_some() {
            ColumnType::Boolean
        } else {
            return ColumnType::Text;
        };

        inferred = Some(match (inferred, cell_type) {
            (None, t) => t,
            (Some(a), b) if a == b => a,
            (Some(ColumnType::Integer), ColumnType::Float)
            | (Some(ColumnType::Float), ColumnType::Integer) => ColumnType::Float,
            _ => return ColumnType::Text,
        });
    }

    inferred.unwrap_or(ColumnType::Text)
}

/// Convert a cell to JSON according to its column's type.
///
/// Missing cells and non-finite floats become `null`.
pub fn to_json(cell: Option<&str>, column_type: ColumnType) -> Value {
    let Some(cell) = cell else {
        return Value::Null;
    };
    let trimmed = cell.trim();

    match column_type {
        ColumnType::Integer => trimmed
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::Null),
        ColumnType::Float => trimmed
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ColumnType::Boolean => parse_bool(trimmed).map(Value::Bool).unwrap_or(Value::Null),
        ColumnType::Text => Value::String(cell.to_string()),
    }
}
