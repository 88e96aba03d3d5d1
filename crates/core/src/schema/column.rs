//! Column definition for sqlkv table schemas.

use crate::types::ColumnType;

/// A column definition in a table schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    /// Column name.
    name: String,
    /// Type of the column.
    column_type: ColumnType,
    /// Column position in the declaration (0-based).
    index: usize,
}

impl Column {
    /// Creates a new column definition.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            index: 0,
        }
    }

    /// Sets the column position.
    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Returns the column name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the column type.
    #[inline]
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Returns the column position.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns whether the store assigns this column's values.
    #[inline]
    pub fn is_auto_int(&self) -> bool {
        self.column_type == ColumnType::AutoInt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_new() {
        let col = Column::new("id", ColumnType::Int).with_index(2);
        assert_eq!(col.name(), "id");
        assert_eq!(col.column_type(), ColumnType::Int);
        assert_eq!(col.index(), 2);
        assert!(!col.is_auto_int());
    }

    #[test]
    fn test_column_auto_int() {
        assert!(Column::new("rid", ColumnType::AutoInt).is_auto_int());
    }
}
