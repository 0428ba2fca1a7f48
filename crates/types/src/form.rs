//! Per-parameter form configuration persisted with an action.
//!
//! `FormSettings` is a value type: edits produce a new value through
//! [`FormSettings::with_field`] rather than mutating a shared instance, so
//! callers can compare snapshots to detect changes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod validation;

/// How an action is presented on a dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActionDisplayType {
    #[default]
    Button,
    Form,
}

/// Value family of a form field, used for validation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Date,
    Category,
}

/// Widget used to collect a field's value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    String,
    Text,
    Number,
    Date,
    DateTime,
    MonthYear,
    QuarterYear,
    Category,
    Select,
    Radio,
    Boolean,
}

/// Display and validation configuration for one parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldSettings {
    /// Id of the parameter these settings belong to.
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub input_type: InputType,
    /// Display position; unset until assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl FieldSettings {
    /// Blank settings for `id`: visible, optional, string-typed, no order.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            title: String::new(),
            description: String::new(),
            placeholder: String::new(),
            field_type: FieldType::String,
            input_type: InputType::String,
            order: None,
            required: false,
            hidden: false,
            default_value: None,
        }
    }
}

/// Form configuration keyed by parameter id, in insertion order.
///
/// Entries for parameters that are no longer present stay in the map so their
/// configuration survives if the parameter comes back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FormSettings {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub display_type: Option<ActionDisplayType>,
    #[serde(default)]
    pub fields: IndexMap<String, FieldSettings>,
}

impl FormSettings {
    pub fn field(&self, id: &str) -> Option<&FieldSettings> {
        self.fields.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.fields.contains_key(id)
    }

    /// Highest assigned order, or 0 when no entry has one.
    pub fn max_order(&self) -> u32 {
        self.fields.values().filter_map(|field| field.order).max().unwrap_or(0)
    }

    /// Returns a copy with `settings` stored under `settings.id`, replacing any previous entry.
    pub fn with_field(&self, settings: FieldSettings) -> Self {
        let mut next = self.clone();
        next.fields.insert(settings.id.clone(), settings);
        next
    }
}
