// src/schema/mod.rs
//
// The accident CSVs carry 64 positional fields and no header row. Names
// follow the publisher's field codes; a 65th `region` column is synthetic.

pub mod arrow;
pub mod types;

pub use self::arrow::{arrow_schema, map_to_arrow_type};
pub use self::types::{Column, ColumnType};

/// Number of positional fields in a raw CSV row.
pub const RAW_FIELDS: usize = 64;
/// Raw fields plus the synthetic region column.
pub const COLUMN_COUNT: usize = RAW_FIELDS + 1;
/// Index of the accident date (`p2a`).
pub const DATE_COLUMN: usize = 3;
/// Index of the synthetic region column.
pub const REGION_COLUMN: usize = RAW_FIELDS;

pub const COLUMN_NAMES: [&str; COLUMN_COUNT] = [
    "p1", "p36", "p37", "p2a", "weekday(p2a)", "p2b", "p6", "p7", "p8", "p9", "p10", "p11",
    "p12", "p13a", "p13b", "p13c", "p14", "p15", "p16", "p17", "p18", "p19", "p20", "p21",
    "p22", "p23", "p24", "p27", "p28", "p34", "p35", "p39", "p44", "p45a", "p47", "p48a",
    "p49", "p50a", "p50b", "p51", "p52", "p53", "p55a", "p57", "p58", "a", "b", "d", "e",
    "f", "g", "h", "i", "j", "k", "l", "n", "o", "p", "q", "r", "s", "t", "p5a", "region",
];

/// Type of the column at `idx`.
///
/// Identifiers, counters and coded enums are integers. `a`, `b`, `d`..`g` and
/// `o` are measurements that may use a decimal comma. The remaining letter
/// fields are free text (street names, coordinate pairs as published).
pub const fn column_type(idx: usize) -> ColumnType {
    match idx {
        DATE_COLUMN => ColumnType::Date,
        0..=2 | 4..=44 | 60 | 61 | 63 => ColumnType::Int,
        45..=50 | 57 => ColumnType::Float,
        _ => ColumnType::Str,
    }
}

/// The full 65-column schema in order.
pub fn columns() -> impl Iterator<Item = Column> {
    COLUMN_NAMES
        .iter()
        .enumerate()
        .map(|(i, &name)| Column {
            name,
            ty: column_type(i),
        })
}

/// Position of the column called `name`.
pub fn column_index(name: &str) -> Option<usize> {
    COLUMN_NAMES.iter().position(|&n| n == name)
}
