//! Index definition for sqlkv table schemas.

/// Name of the unique index that carries a demoted primary key.
pub const PK_INDEX_NAME: &str = "_pk_";

/// Index kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// Several rows may share an encoded key.
    Plain,
    /// An encoded key maps to at most one primary key.
    Unique,
}

impl IndexKind {
    /// Returns the stable code used when an index is persisted.
    pub fn code(&self) -> i64 {
        match self {
            IndexKind::Plain => 0,
            IndexKind::Unique => 1,
        }
    }

    /// Returns the kind for a persisted code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(IndexKind::Plain),
            1 => Some(IndexKind::Unique),
            _ => None,
        }
    }
}

/// A secondary index over an ordered list of columns.
///
/// Column order is significant: the first column varies slowest in the
/// encoded key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Index {
    /// Index name.
    name: String,
    /// Table name this index belongs to.
    table_name: String,
    /// Columns included in this index, in key order.
    columns: Vec<String>,
    /// Whether this index enforces uniqueness.
    kind: IndexKind,
}

impl Index {
    /// Creates a new plain index definition.
    pub fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
        columns: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            columns,
            kind: IndexKind::Plain,
        }
    }

    /// Creates a new unique index definition.
    pub fn unique(
        name: impl Into<String>,
        table_name: impl Into<String>,
        columns: Vec<String>,
    ) -> Self {
        Self::new(name, table_name, columns).kind(IndexKind::Unique)
    }

    /// Sets the index kind.
    pub fn kind(mut self, kind: IndexKind) -> Self {
        self.kind = kind;
        self
    }

    /// Returns the index name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the table name.
    #[inline]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the normalized name (table.index).
    pub fn normalized_name(&self) -> String {
        format!("{}.{}", self.table_name, self.name)
    }

    /// Returns the indexed column names.
    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the index kind.
    #[inline]
    pub fn get_kind(&self) -> IndexKind {
        self.kind
    }

    /// Returns whether this index enforces uniqueness.
    #[inline]
    pub fn is_unique(&self) -> bool {
        self.kind == IndexKind::Unique
    }

    /// Returns whether this index carries the declared primary key.
    #[inline]
    pub fn is_pk_index(&self) -> bool {
        self.name == PK_INDEX_NAME
    }

    /// Returns whether this is a single-column index.
    #[inline]
    pub fn is_single_column(&self) -> bool {
        self.columns.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index() {
        let idx = Index::unique("idx_user_email", "users", vec!["email".into()]);

        assert_eq!(idx.name(), "idx_user_email");
        assert_eq!(idx.table_name(), "users");
        assert_eq!(idx.normalized_name(), "users.idx_user_email");
        assert!(idx.is_unique());
        assert_eq!(idx.get_kind(), IndexKind::Unique);
        assert!(idx.is_single_column());
        assert!(!idx.is_pk_index());
    }

    #[test]
    fn test_composite_index() {
        let idx = Index::new(
            "idx_name",
            "users",
            vec!["last_name".into(), "first_name".into()],
        );

        assert!(!idx.is_unique());
        assert!(!idx.is_single_column());
        assert_eq!(idx.columns(), ["last_name", "first_name"]);
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(IndexKind::from_code(IndexKind::Plain.code()), Some(IndexKind::Plain));
        assert_eq!(IndexKind::from_code(IndexKind::Unique.code()), Some(IndexKind::Unique));
        assert_eq!(IndexKind::from_code(9), None);
    }
}
