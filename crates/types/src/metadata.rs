//! Field and table descriptors served by the metadata catalog.

use serde::{Deserialize, Serialize};

pub type FieldId = u64;
pub type TableId = u64;

/// A column known to the metadata catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub id: FieldId,
    /// Owning table, filled in by the catalog when loaded from a table listing.
    #[serde(default)]
    pub table_id: Option<TableId>,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    /// Storage type such as `type/Integer` or `type/Text`.
    #[serde(default)]
    pub base_type: String,
    /// Optional semantic annotation such as `type/PK` or `type/Category`.
    #[serde(default)]
    pub semantic_type: Option<String>,
}

/// A table and its columns, in catalog order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableDescriptor {
    pub id: TableId,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl TableDescriptor {
    /// Finds a column by exact name, falling back to a case-insensitive match.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .or_else(|| self.fields.iter().find(|field| field.name.eq_ignore_ascii_case(name)))
    }
}
