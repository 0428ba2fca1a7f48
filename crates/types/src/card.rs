//! Cards (saved questions, models, and query actions) and their dataset queries.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    form::FormSettings,
    metadata::TableId,
    parameter::{FieldReference, Parameter},
};

/// A saved question or query action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Card {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dataset_query: Option<DatasetQuery>,
    /// Explicit parameter list; empty for cards that derive parameters from template tags.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Form settings saved alongside the card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization_settings: Option<FormSettings>,
}

impl Card {
    /// Template tags of a native query, in authoring order. `None` for structured queries.
    pub fn template_tags(&self) -> Option<&IndexMap<String, TemplateTag>> {
        match &self.dataset_query {
            Some(DatasetQuery::Native { native, .. }) => Some(&native.template_tags),
            _ => None,
        }
    }

    pub fn structured_query(&self) -> Option<&StructuredQuery> {
        match &self.dataset_query {
            Some(DatasetQuery::Query { query, .. }) => Some(query),
            _ => None,
        }
    }
}

/// The query definition of a card, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DatasetQuery {
    Native {
        #[serde(default)]
        database: Option<u64>,
        native: NativeQuery,
    },
    Query {
        #[serde(default)]
        database: Option<u64>,
        query: StructuredQuery,
    },
}

/// Raw query text plus the template tags referenced by `{{...}}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NativeQuery {
    #[serde(default)]
    pub query: String,
    #[serde(rename = "template-tags", default)]
    pub template_tags: IndexMap<String, TemplateTag>,
}

/// A structured (GUI-built) query. Nested `source-query` chains end at a source table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StructuredQuery {
    #[serde(rename = "source-table", default, skip_serializing_if = "Option::is_none")]
    pub source_table: Option<TableId>,
    #[serde(rename = "source-query", default, skip_serializing_if = "Option::is_none")]
    pub source_query: Option<Box<StructuredQuery>>,
}

impl StructuredQuery {
    /// Follows `source-query` nesting down to the innermost source table.
    pub fn root_source_table(&self) -> Option<TableId> {
        let mut query = self;
        loop {
            if let Some(table_id) = query.source_table {
                return Some(table_id);
            }
            query = query.source_query.as_deref()?;
        }
    }
}

/// A `{{...}}` placeholder declared by a native query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct TemplateTag {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    pub r#type: TemplateTagType,
    /// Column bound by a field-filter (`dimension`) tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<FieldReference>,
    /// Parameter widget type for field-filter tags (for example, `string/=`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TemplateTagType {
    Text,
    Number,
    Date,
    Dimension,
    Card,
    Snippet,
}
