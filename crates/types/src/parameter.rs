//! Parameters, their query targets, and the resolved UI parameter snapshot.
//!
//! Targets travel over the wire as nested JSON arrays, for example
//! `["variable", ["template-tag", "order_id"]]` or
//! `["dimension", ["field", 10, null]]`. They are parsed into
//! [`ParameterTarget`] at the serde boundary so downstream code matches on
//! variants instead of inspecting array positions.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Value, json};
use thiserror::Error;

use crate::metadata::{FieldDescriptor, FieldId};

/// A named, typed placeholder declared by a card or query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Parameter {
    /// Opaque identifier, unique within the owning card.
    pub id: String,
    /// Display name (for example, "Order ID").
    #[serde(default)]
    pub name: String,
    /// Reference name used in URLs and submitted payloads (for example, "order_id").
    #[serde(default)]
    pub slug: String,
    /// Semantic value type such as `string/=`, `number/=` or `date/single`.
    #[serde(default)]
    pub r#type: String,
    /// Optional binding into the query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ParameterTarget>,
    /// Currently bound value, populated from the value store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Author-supplied default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Whether the query requires a value for this parameter.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
}

impl Parameter {
    /// Creates a parameter with the given id and semantic type and no target.
    pub fn new(id: impl Into<String>, r#type: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            slug: id.clone(),
            id,
            r#type: r#type.into(),
            target: None,
            value: None,
            default: None,
            required: false,
        }
    }

    /// Builder-style setter for the target.
    pub fn with_target(mut self, target: ParameterTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// The section of the semantic type before the first `/` (`"number"` for `number/=`).
    pub fn type_family(&self) -> &str {
        self.r#type.split('/').next().unwrap_or_default()
    }
}

/// Where a parameter's value is bound inside a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum ParameterTarget {
    /// Substituted directly into native query text through a template tag.
    Variable {
        /// Template tag name.
        tag: String,
    },
    /// Bound to a structured dimension (a column, or a field-filter template tag).
    Dimension(DimensionRef),
}

/// The reference wrapped by a `dimension` target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimensionRef {
    /// `["field", <id | name>, <options>]`
    Field(FieldReference),
    /// `["template-tag", <name>]`
    TemplateTag(String),
}

/// A column reference: `["field", 10, null]` or `["field", "TOTAL", {"base-type": "type/Float"}]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct FieldReference {
    /// The column identifier.
    pub field: FieldRef,
    /// Reference options (base type, temporal unit, join alias, ...).
    pub options: Option<Value>,
}

/// Identifies a column either by catalog id or by name within a source table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldRef {
    Id(FieldId),
    Name(String),
}

/// Raised when a target or field reference does not match a known wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetParseError {
    #[error("expected a JSON array, got {0}")]
    NotAnArray(Value),
    #[error("unknown target kind '{0}'")]
    UnknownKind(String),
    #[error("unknown reference kind '{0}'")]
    UnknownReference(String),
    #[error("variable targets must reference a template tag")]
    VariableWithoutTag,
    #[error("malformed reference: {0}")]
    Malformed(Value),
}

impl TryFrom<Value> for ParameterTarget {
    type Error = TargetParseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let items = match value {
            Value::Array(items) => items,
            other => return Err(TargetParseError::NotAnArray(other)),
        };
        let mut items = items.into_iter();
        let kind = items.next();
        let reference = items.next();

        match (kind, reference) {
            (Some(Value::String(kind)), Some(reference)) => match kind.as_str() {
                "variable" => match DimensionRef::try_from(reference)? {
                    DimensionRef::TemplateTag(tag) => Ok(Self::Variable { tag }),
                    DimensionRef::Field(_) => Err(TargetParseError::VariableWithoutTag),
                },
                "dimension" => Ok(Self::Dimension(DimensionRef::try_from(reference)?)),
                _ => Err(TargetParseError::UnknownKind(kind)),
            },
            (kind, reference) => Err(TargetParseError::Malformed(Value::Array(
                kind.into_iter().chain(reference).collect(),
            ))),
        }
    }
}

impl From<ParameterTarget> for Value {
    fn from(target: ParameterTarget) -> Self {
        match target {
            ParameterTarget::Variable { tag } => json!(["variable", ["template-tag", tag]]),
            ParameterTarget::Dimension(reference) => json!(["dimension", Value::from(reference)]),
        }
    }
}

impl TryFrom<Value> for DimensionRef {
    type Error = TargetParseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if !value.is_array() {
            return Err(TargetParseError::NotAnArray(value));
        }
        let kind = value.get(0).and_then(Value::as_str).map(str::to_owned);
        match kind.as_deref() {
            Some("template-tag") => match value.get(1).and_then(Value::as_str).map(str::to_owned) {
                Some(name) => Ok(Self::TemplateTag(name)),
                None => Err(TargetParseError::Malformed(value)),
            },
            Some("field") => Ok(Self::Field(FieldReference::try_from(value)?)),
            Some(other) => Err(TargetParseError::UnknownReference(other.to_string())),
            None => Err(TargetParseError::Malformed(value)),
        }
    }
}

impl From<DimensionRef> for Value {
    fn from(reference: DimensionRef) -> Self {
        match reference {
            DimensionRef::Field(field) => field.into(),
            DimensionRef::TemplateTag(name) => json!(["template-tag", name]),
        }
    }
}

impl TryFrom<Value> for FieldReference {
    type Error = TargetParseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let items = match value {
            Value::Array(items) => items,
            other => return Err(TargetParseError::NotAnArray(other)),
        };
        let malformed = || TargetParseError::Malformed(Value::Array(items.clone()));
        if items.first().and_then(Value::as_str) != Some("field") {
            return Err(malformed());
        }
        let field = match items.get(1) {
            Some(Value::Number(number)) => FieldRef::Id(number.as_u64().ok_or_else(malformed)?),
            Some(Value::String(name)) => FieldRef::Name(name.clone()),
            _ => return Err(malformed()),
        };
        let options = items.get(2).filter(|options| !options.is_null()).cloned();
        Ok(Self { field, options })
    }
}

impl From<FieldReference> for Value {
    fn from(reference: FieldReference) -> Self {
        let field = match reference.field {
            FieldRef::Id(id) => Value::from(id),
            FieldRef::Name(name) => Value::String(name),
        };
        json!(["field", field, reference.options.unwrap_or(Value::Null)])
    }
}

/// Outcome of resolving a parameter's target against the query and catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The target maps to a concrete column.
    Field(FieldDescriptor),
    /// No concrete column; the value is substituted into query text.
    VariableTemplateTag,
}

/// A parameter together with the result of resolving its target.
///
/// Built fresh on every resolution pass. Consumers match on [`Resolution`] to
/// decide between a structured field editor and a free-text editor.
#[derive(Debug, Clone, PartialEq)]
pub struct UiParameter {
    pub parameter: Parameter,
    pub resolution: Resolution,
}

impl UiParameter {
    /// Resolved field descriptors: one entry when the target maps to a column, none otherwise.
    pub fn fields(&self) -> &[FieldDescriptor] {
        match &self.resolution {
            Resolution::Field(field) => std::slice::from_ref(field),
            Resolution::VariableTemplateTag => &[],
        }
    }

    pub fn has_variable_template_tag_target(&self) -> bool {
        matches!(self.resolution, Resolution::VariableTemplateTag)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UiParameterWire<'a> {
    #[serde(flatten)]
    parameter: &'a Parameter,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [FieldDescriptor]>,
    has_variable_template_tag_target: bool,
}

impl Serialize for UiParameter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = self.fields();
        UiParameterWire {
            parameter: &self.parameter,
            fields: (!fields.is_empty()).then_some(fields),
            has_variable_template_tag_target: self.has_variable_template_tag_target(),
        }
        .serialize(serializer)
    }
}
