//! Metadata catalog lookups.
//!
//! The resolver only needs two questions answered: "which column has this id"
//! and "which table has this id". [`MetadataCatalog`] captures that seam so
//! callers can plug in whatever store they hold; [`Metadata`] is the in-memory
//! catalog loaded from a `{"tables": [...]}` document.

use std::collections::HashMap;

use actionform_types::{FieldDescriptor, FieldId, TableDescriptor, TableId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Read-only access to field and table descriptors.
pub trait MetadataCatalog {
    fn field(&self, id: FieldId) -> Option<&FieldDescriptor>;
    fn table(&self, id: TableId) -> Option<&TableDescriptor>;
}

/// In-memory catalog indexed by table and field id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "MetadataDocument", into = "MetadataDocument")]
pub struct Metadata {
    tables: IndexMap<TableId, TableDescriptor>,
    field_locations: HashMap<FieldId, (TableId, usize)>,
}

#[derive(Serialize, Deserialize)]
struct MetadataDocument {
    #[serde(default)]
    tables: Vec<TableDescriptor>,
}

impl Metadata {
    /// Builds a catalog from table listings, stamping each field with its owning table.
    pub fn from_tables(tables: impl IntoIterator<Item = TableDescriptor>) -> Self {
        let mut metadata = Self::default();
        for table in tables {
            metadata.insert_table(table);
        }
        metadata
    }

    /// Adds or replaces a table.
    pub fn insert_table(&mut self, mut table: TableDescriptor) {
        if let Some(previous) = self.tables.get(&table.id) {
            for field in &previous.fields {
                if matches!(self.field_locations.get(&field.id), Some((owner, _)) if *owner == table.id) {
                    self.field_locations.remove(&field.id);
                }
            }
        }
        for (index, field) in table.fields.iter_mut().enumerate() {
            field.table_id = Some(table.id);
            self.field_locations.insert(field.id, (table.id, index));
        }
        self.tables.insert(table.id, table);
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableDescriptor> {
        self.tables.values()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl MetadataCatalog for Metadata {
    fn field(&self, id: FieldId) -> Option<&FieldDescriptor> {
        let (table_id, index) = self.field_locations.get(&id)?;
        self.tables.get(table_id)?.fields.get(*index)
    }

    fn table(&self, id: TableId) -> Option<&TableDescriptor> {
        self.tables.get(&id)
    }
}

impl From<MetadataDocument> for Metadata {
    fn from(document: MetadataDocument) -> Self {
        Self::from_tables(document.tables)
    }
}

impl From<Metadata> for MetadataDocument {
    fn from(metadata: Metadata) -> Self {
        Self {
            tables: metadata.tables.into_values().collect(),
        }
    }
}
