// src/process/row.rs

use crate::columns::Value;
use crate::error::{IngestError, Result};
use crate::process::{date_parser, utils};
use crate::region::Region;
use crate::schema::{column_type, ColumnType, COLUMN_COUNT, RAW_FIELDS};

/// Integer sentinel for fields that are not a valid integer.
pub const INT_SENTINEL: i64 = -1;
/// Float sentinel for fields that are not a valid decimal.
pub const FLOAT_SENTINEL: f64 = -1.0;

/// Convert one raw CSV row into the 65 typed values of the schema.
///
/// Numeric fields never fail: anything unparsable becomes the sentinel. The
/// accident date has no sentinel, so a bad date (or a short row) is a
/// `RowParse` error carrying `line`. Fields past the 64th are ignored.
pub fn parse_row<S: AsRef<str>>(fields: &[S], region: Region, line: u64) -> Result<Vec<Value>> {
    if fields.len() < RAW_FIELDS {
        return Err(IngestError::RowParse {
            row: line,
            reason: format!("{} fields, expected {}", fields.len(), RAW_FIELDS),
        });
    }

    let mut out = Vec::with_capacity(COLUMN_COUNT);
    for (idx, raw) in fields.iter().take(RAW_FIELDS).enumerate() {
        let raw = raw.as_ref();
        let value = match column_type(idx) {
            ColumnType::Int => Value::Int(utils::parse_int(raw).unwrap_or(INT_SENTINEL)),
            ColumnType::Float => Value::Float(utils::parse_decimal(raw).unwrap_or(FLOAT_SENTINEL)),
            ColumnType::Date => match date_parser::parse_accident_date(raw) {
                Some(d) => Value::Date(d),
                None => {
                    return Err(IngestError::RowParse {
                        row: line,
                        reason: format!("invalid date {:?}", raw),
                    })
                }
            },
            ColumnType::Str => Value::Str(raw.to_string()),
        };
        out.push(value);
    }
    out.push(Value::Str(region.code().to_string()));
    Ok(out)
}
