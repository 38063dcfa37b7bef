// src/schema/types.rs

/// Storage type of one column, fixed by the schema table.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ColumnType {
    Int,
    Float,
    Date,
    Str,
}

/// A single column definition: its name and storage type.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}
