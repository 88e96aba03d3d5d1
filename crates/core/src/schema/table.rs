//! Table definition for sqlkv schemas.

use super::column::Column;
use super::index::{Index, IndexKind, PK_INDEX_NAME};
use crate::error::{Error, Result};
use crate::types::ColumnType;
use hashbrown::HashMap;

/// Name of the primary key synthesized when no usable key is declared.
pub const HIDDEN_PK_NAME: &str = "_rid_";

/// Longest table, column or index name. Names are written as bounded blobs.
pub const MAX_NAME_LEN: usize = 127;

/// The row key of a table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimaryKey {
    name: String,
    column_type: ColumnType,
    hidden: bool,
}

impl PrimaryKey {
    /// Creates a primary key over a declared column.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            hidden: false,
        }
    }

    /// Creates the synthesized `_rid_` key.
    pub fn hidden() -> Self {
        Self {
            name: HIDDEN_PK_NAME.into(),
            column_type: ColumnType::AutoInt,
            hidden: true,
        }
    }

    /// Returns the key column name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the key type, always `Int` or `AutoInt`.
    #[inline]
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Returns whether the key was synthesized.
    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Returns whether the store assigns key values.
    #[inline]
    pub fn is_auto_int(&self) -> bool {
        self.column_type == ColumnType::AutoInt
    }
}

/// A verified table schema. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name.
    name: String,
    /// Column definitions in declaration order.
    columns: Vec<Column>,
    /// Row key.
    primary_key: PrimaryKey,
    /// Index definitions.
    indices: Vec<Index>,
}

impl TableSchema {
    /// Reassembles a schema that was validated before it was persisted.
    pub fn restore(
        name: impl Into<String>,
        columns: Vec<Column>,
        primary_key: PrimaryKey,
        indices: Vec<Index>,
    ) -> Self {
        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.with_index(i))
            .collect();
        Self {
            name: name.into(),
            columns,
            primary_key,
            indices,
        }
    }

    /// Returns the table name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the primary key descriptor.
    #[inline]
    pub fn primary_key(&self) -> &PrimaryKey {
        &self.primary_key
    }

    /// Returns the indices.
    #[inline]
    pub fn indices(&self) -> &[Index] {
        &self.indices
    }

    /// Gets a column by name.
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Gets a column position by name.
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Gets an index by name.
    pub fn get_index(&self, name: &str) -> Option<&Index> {
        self.indices.iter().find(|i| i.name() == name)
    }

    /// Returns the unique index holding a demoted primary key, if any.
    pub fn pk_index(&self) -> Option<&Index> {
        self.get_index(PK_INDEX_NAME)
    }
}

struct IndexRequest {
    name: String,
    columns: Vec<String>,
    kind: IndexKind,
}

/// Builder collecting a table declaration.
///
/// Nothing is checked until [`SchemaBuilder::validate`], which either
/// returns a complete [`TableSchema`] or the first problem found. The
/// builder never touches a store.
pub struct SchemaBuilder {
    name: String,
    types: Vec<ColumnType>,
    column_names: Vec<String>,
    pks: Vec<String>,
    indices: Vec<IndexRequest>,
}

impl SchemaBuilder {
    /// Creates a new builder for table `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            column_names: Vec::new(),
            pks: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Declares columns from parallel type and name lists.
    pub fn columns(mut self, types: &[ColumnType], names: &[&str]) -> Self {
        self.types.extend_from_slice(types);
        self.column_names
            .extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Declares a single column.
    pub fn add_column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.types.push(column_type);
        self.column_names.push(name.into());
        self
    }

    /// Declares the primary key columns, in key order.
    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.pks = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Declares a secondary index.
    pub fn add_index(mut self, name: impl Into<String>, columns: &[&str], unique: bool) -> Self {
        self.indices.push(IndexRequest {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            kind: if unique {
                IndexKind::Unique
            } else {
                IndexKind::Plain
            },
        });
        self
    }

    /// Returns the table name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validates a name follows naming rules.
    fn check_naming_rules(name: &str) -> Result<()> {
        let first = match name.chars().next() {
            Some(c) => c,
            None => return Err(Error::invalid_schema("Name cannot be empty")),
        };
        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(Error::invalid_schema(format!(
                "Name must start with letter or underscore: {}",
                name
            )));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::invalid_schema(format!(
                "Name contains invalid characters: {}",
                name
            )));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(Error::invalid_schema(format!(
                "Name longer than {} bytes: {}",
                MAX_NAME_LEN, name
            )));
        }
        Ok(())
    }

    /// Validates the declaration and derives the primary key and index
    /// layout. Stops at the first failure.
    pub fn validate(&self) -> Result<TableSchema> {
        Self::check_naming_rules(&self.name)?;

        if self.types.len() != self.column_names.len() {
            return Err(Error::schema_mismatch(
                self.types.len(),
                self.column_names.len(),
            ));
        }

        let mut mapping: HashMap<&str, ColumnType> = HashMap::with_capacity(self.types.len());
        let mut num_auto_int = 0usize;
        for (name, ty) in self.column_names.iter().zip(self.types.iter()) {
            Self::check_naming_rules(name)?;
            if name == HIDDEN_PK_NAME {
                return Err(Error::invalid_schema(format!(
                    "Column name is reserved: {}",
                    name
                )));
            }
            if *ty == ColumnType::AutoInt {
                num_auto_int += 1;
            }
            if mapping.insert(name.as_str(), *ty).is_some() {
                return Err(Error::duplicate_column(name.as_str()));
            }
        }

        let mut num_auto_int_in_pk = 0usize;
        for (i, pk) in self.pks.iter().enumerate() {
            let ty = mapping
                .get(pk.as_str())
                .copied()
                .ok_or_else(|| Error::pk_not_found(pk.as_str()))?;
            if self.pks[..i].contains(pk) {
                return Err(Error::invalid_schema(format!(
                    "Primary key column listed twice: {}",
                    pk
                )));
            }
            if ty == ColumnType::AutoInt {
                num_auto_int_in_pk += 1;
            }
        }

        if num_auto_int != num_auto_int_in_pk {
            return Err(Error::auto_int_pk(
                "AutoInt column must be declared as the primary key",
            ));
        }
        if num_auto_int > 1 {
            return Err(Error::auto_int_pk("Table has more than one AutoInt column"));
        }
        if num_auto_int == 1 && self.pks.len() != 1 {
            return Err(Error::auto_int_pk(
                "AutoInt column must be the only primary key column",
            ));
        }

        let mut indices = Vec::with_capacity(self.indices.len() + 1);
        let primary_key = match self.pks.as_slice() {
            [] => PrimaryKey::hidden(),
            [pk] if mapping
                .get(pk.as_str())
                .is_some_and(|ty| ty.is_direct_primary_key()) =>
            {
                PrimaryKey::new(pk.as_str(), mapping[pk.as_str()])
            }
            declared => {
                // Keep the declared key's uniqueness behind the hidden key.
                indices.push(Index::unique(PK_INDEX_NAME, &self.name, declared.to_vec()));
                PrimaryKey::hidden()
            }
        };

        for req in &self.indices {
            Self::check_naming_rules(&req.name)?;
            if req.name == PK_INDEX_NAME {
                return Err(Error::invalid_schema(format!(
                    "Index name is reserved: {}",
                    req.name
                )));
            }
            if indices.iter().any(|idx: &Index| idx.name() == req.name) {
                return Err(Error::invalid_schema(format!(
                    "Index already exists: {}",
                    req.name
                )));
            }
            if req.columns.is_empty() {
                return Err(Error::invalid_schema(format!(
                    "Index has no columns: {}",
                    req.name
                )));
            }
            for (i, col) in req.columns.iter().enumerate() {
                if !mapping.contains_key(col.as_str()) {
                    return Err(Error::invalid_schema(format!(
                        "Column not found: {}",
                        col
                    )));
                }
                if req.columns[..i].contains(col) {
                    return Err(Error::invalid_schema(format!(
                        "Index column listed twice: {}",
                        col
                    )));
                }
            }
            indices.push(Index::new(&req.name, &self.name, req.columns.clone()).kind(req.kind));
        }

        let columns = self
            .column_names
            .iter()
            .zip(self.types.iter())
            .map(|(name, ty)| Column::new(name.as_str(), *ty))
            .collect();

        Ok(TableSchema::restore(
            self.name.as_str(),
            columns,
            primary_key,
            indices,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c_d_e(pks: &[&str]) -> Result<TableSchema> {
        SchemaBuilder::new("a")
            .columns(
                &[ColumnType::Int, ColumnType::Float, ColumnType::Blob],
                &["c", "d", "e"],
            )
            .primary_key(pks)
            .validate()
    }

    #[test]
    fn test_int_primary_key_used_directly() {
        let table = c_d_e(&["c"]).unwrap();

        assert_eq!(table.name(), "a");
        assert_eq!(table.columns().len(), 3);
        assert_eq!(table.primary_key().name(), "c");
        assert_eq!(table.primary_key().column_type(), ColumnType::Int);
        assert!(!table.primary_key().is_hidden());
        assert!(table.indices().is_empty());
        assert!(table.pk_index().is_none());
    }

    #[test]
    fn test_float_primary_key_demoted() {
        let table = c_d_e(&["d"]).unwrap();

        assert_eq!(table.primary_key().name(), HIDDEN_PK_NAME);
        assert_eq!(table.primary_key().column_type(), ColumnType::AutoInt);
        assert!(table.primary_key().is_hidden());

        let pk_index = table.pk_index().unwrap();
        assert!(pk_index.is_unique());
        assert_eq!(pk_index.table_name(), "a");
        assert_eq!(pk_index.columns(), ["d"]);
    }

    #[test]
    fn test_blob_primary_key_demoted() {
        let table = c_d_e(&["e"]).unwrap();
        assert!(table.primary_key().is_hidden());
        assert_eq!(table.pk_index().unwrap().columns(), ["e"]);
    }

    #[test]
    fn test_composite_primary_key_demoted_in_order() {
        let table = c_d_e(&["e", "c"]).unwrap();

        assert_eq!(table.primary_key().name(), HIDDEN_PK_NAME);
        let pk_index = table.pk_index().unwrap();
        assert!(pk_index.is_unique());
        assert_eq!(pk_index.columns(), ["e", "c"]);
    }

    #[test]
    fn test_no_primary_key_synthesized() {
        let table = c_d_e(&[]).unwrap();
        assert_eq!(table.primary_key(), &PrimaryKey::hidden());
        assert!(table.indices().is_empty());
    }

    #[test]
    fn test_auto_int_primary_key() {
        let table = SchemaBuilder::new("users")
            .add_column("id", ColumnType::AutoInt)
            .add_column("name", ColumnType::Blob)
            .primary_key(&["id"])
            .validate()
            .unwrap();

        assert_eq!(table.primary_key().name(), "id");
        assert!(table.primary_key().is_auto_int());
        assert!(!table.primary_key().is_hidden());
        assert!(table.get_column("id").unwrap().is_auto_int());
    }

    #[test]
    fn test_two_auto_int_columns() {
        let result = SchemaBuilder::new("t")
            .columns(&[ColumnType::AutoInt, ColumnType::AutoInt], &["a", "b"])
            .primary_key(&["a", "b"])
            .validate();
        assert!(matches!(result, Err(Error::SchemaAutoIntPk { .. })));

        let result = SchemaBuilder::new("t")
            .columns(&[ColumnType::AutoInt, ColumnType::AutoInt], &["a", "b"])
            .primary_key(&["a"])
            .validate();
        assert!(matches!(result, Err(Error::SchemaAutoIntPk { .. })));
    }

    #[test]
    fn test_auto_int_not_in_primary_key() {
        let result = SchemaBuilder::new("t")
            .columns(&[ColumnType::AutoInt, ColumnType::Int], &["a", "b"])
            .primary_key(&["b"])
            .validate();
        assert!(matches!(result, Err(Error::SchemaAutoIntPk { .. })));

        let result = SchemaBuilder::new("t")
            .columns(&[ColumnType::AutoInt, ColumnType::Int], &["a", "b"])
            .validate();
        assert!(matches!(result, Err(Error::SchemaAutoIntPk { .. })));
    }

    #[test]
    fn test_auto_int_in_composite_primary_key() {
        let result = SchemaBuilder::new("t")
            .columns(&[ColumnType::AutoInt, ColumnType::Int], &["a", "b"])
            .primary_key(&["a", "b"])
            .validate();
        assert!(matches!(result, Err(Error::SchemaAutoIntPk { .. })));
    }

    #[test]
    fn test_duplicate_column() {
        let result = SchemaBuilder::new("t")
            .columns(&[ColumnType::Int, ColumnType::Blob], &["id", "id"])
            .validate();
        assert_eq!(result.unwrap_err(), Error::duplicate_column("id"));
    }

    #[test]
    fn test_mismatched_columns() {
        let result = SchemaBuilder::new("t")
            .columns(&[ColumnType::Int, ColumnType::Blob], &["id"])
            .validate();
        assert_eq!(result.unwrap_err(), Error::schema_mismatch(2, 1));
    }

    #[test]
    fn test_primary_key_not_found() {
        let result = c_d_e(&["a"]);
        assert_eq!(result.unwrap_err(), Error::pk_not_found("a"));
    }

    #[test]
    fn test_primary_key_listed_twice() {
        let result = c_d_e(&["c", "c"]);
        assert!(matches!(result, Err(Error::InvalidSchema { .. })));
    }

    #[test]
    fn test_mismatch_checked_before_duplicates() {
        let result = SchemaBuilder::new("t")
            .columns(&[ColumnType::Int], &["x", "x"])
            .validate();
        assert!(matches!(result, Err(Error::SchemaMismatchColumns { .. })));
    }

    #[test]
    fn test_invalid_names() {
        assert!(SchemaBuilder::new("").validate().is_err());
        assert!(SchemaBuilder::new("1abc").validate().is_err());
        assert!(SchemaBuilder::new("a-b").validate().is_err());
        assert!(SchemaBuilder::new("x".repeat(MAX_NAME_LEN + 1))
            .validate()
            .is_err());
        assert!(SchemaBuilder::new("x".repeat(MAX_NAME_LEN))
            .validate()
            .is_ok());

        let result = SchemaBuilder::new("t")
            .add_column("123invalid", ColumnType::Int)
            .validate();
        assert!(matches!(result, Err(Error::InvalidSchema { .. })));
    }

    #[test]
    fn test_hidden_key_name_reserved() {
        let result = SchemaBuilder::new("t")
            .add_column(HIDDEN_PK_NAME, ColumnType::Int)
            .validate();
        assert!(matches!(result, Err(Error::InvalidSchema { .. })));
    }

    #[test]
    fn test_secondary_indices() {
        let table = SchemaBuilder::new("users")
            .add_column("id", ColumnType::Int)
            .add_column("email", ColumnType::Blob)
            .add_column("score", ColumnType::Float)
            .primary_key(&["id"])
            .add_index("uq_email", &["email"], true)
            .add_index("idx_score_email", &["score", "email"], false)
            .validate()
            .unwrap();

        assert_eq!(table.indices().len(), 2);
        assert!(table.get_index("uq_email").unwrap().is_unique());
        let idx = table.get_index("idx_score_email").unwrap();
        assert!(!idx.is_unique());
        assert_eq!(idx.columns(), ["score", "email"]);
    }

    #[test]
    fn test_secondary_index_errors() {
        let base = || {
            SchemaBuilder::new("t")
                .add_column("a", ColumnType::Int)
                .add_column("b", ColumnType::Blob)
                .primary_key(&["b"])
        };

        let reserved = base().add_index(PK_INDEX_NAME, &["a"], true).validate();
        assert!(matches!(reserved, Err(Error::InvalidSchema { .. })));

        let missing = base().add_index("idx", &["zz"], false).validate();
        assert!(matches!(missing, Err(Error::InvalidSchema { .. })));

        let empty = base().add_index("idx", &[], false).validate();
        assert!(matches!(empty, Err(Error::InvalidSchema { .. })));

        let repeated = base().add_index("idx", &["a", "a"], false).validate();
        assert!(matches!(repeated, Err(Error::InvalidSchema { .. })));

        let twice = base()
            .add_index("idx", &["a"], false)
            .add_index("idx", &["b"], false)
            .validate();
        assert!(matches!(twice, Err(Error::InvalidSchema { .. })));
    }

    #[test]
    fn test_table_get_column() {
        let table = c_d_e(&["c"]).unwrap();

        assert_eq!(table.get_column("d").unwrap().column_type(), ColumnType::Float);
        assert_eq!(table.get_column_index("e"), Some(2));
        assert!(table.get_column("unknown").is_none());
        assert_eq!(table.columns()[1].index(), 1);
    }
}
