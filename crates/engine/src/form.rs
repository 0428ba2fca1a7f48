//! Form editor session and renderable field descriptions.
//!
//! [`FormEditorSession`] owns the parameter list and settings for one form
//! being edited. It runs reconciliation once per parameter change and applies
//! user edits by replacing the settings value, so the settings held by the
//! session are always a complete snapshot for the current parameters.

use actionform_types::{FieldSettings, FormSettings, InputType, Parameter, validate_field_value};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use tracing::debug;

use crate::{
    ordering::sorted_parameters,
    reconcile::{default_form_settings, reconcile},
    resolve::ParameterValues,
};

/// Widget used to render one form field.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    Input,
    TextArea,
    Numeric,
    Date,
    DateTime,
    MonthYear,
    QuarterYear,
    Select,
    Radio,
    Boolean,
}

impl From<InputType> for WidgetKind {
    fn from(input_type: InputType) -> Self {
        match input_type {
            InputType::String => Self::Input,
            InputType::Text => Self::TextArea,
            InputType::Number => Self::Numeric,
            InputType::Date => Self::Date,
            InputType::DateTime => Self::DateTime,
            InputType::MonthYear => Self::MonthYear,
            InputType::QuarterYear => Self::QuarterYear,
            InputType::Category | InputType::Select => Self::Select,
            InputType::Radio => Self::Radio,
            InputType::Boolean => Self::Boolean,
        }
    }
}

/// Everything a renderer needs to draw one input.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FormFieldSpec {
    /// Key under which the value is submitted (the parameter slug).
    pub name: String,
    pub title: String,
    pub description: String,
    pub placeholder: String,
    pub required: bool,
    pub widget: WidgetKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

/// Describes the input for `parameter` using its settings.
pub fn form_field(parameter: &Parameter, settings: &FieldSettings) -> FormFieldSpec {
    let title = if settings.title.trim().is_empty() {
        parameter.name.clone()
    } else {
        settings.title.clone()
    };
    let name = if parameter.slug.is_empty() {
        parameter.id.clone()
    } else {
        parameter.slug.clone()
    };

    FormFieldSpec {
        name,
        title,
        description: settings.description.clone(),
        placeholder: settings.placeholder.clone(),
        required: settings.required,
        widget: settings.input_type.into(),
        default_value: settings.default_value.clone(),
    }
}

/// Editing state for one action form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormEditorSession {
    params: Vec<Parameter>,
    settings: FormSettings,
}

impl FormEditorSession {
    /// Starts a session from saved settings, or from [`default_form_settings`] when none were saved.
    pub fn new(params: Vec<Parameter>, passed: Option<FormSettings>) -> Self {
        let initial = passed.unwrap_or_else(default_form_settings);
        let settings = reconcile(&params, &initial).into_owned();
        Self { params, settings }
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    /// Replaces the parameter list and reconciles once. Returns true when the settings changed.
    pub fn set_parameters(&mut self, params: Vec<Parameter>) -> bool {
        let changed = match reconcile(&params, &self.settings) {
            Cow::Borrowed(_) => None,
            Cow::Owned(next) => Some(next),
        };
        self.params = params;
        match changed {
            Some(next) => {
                debug!(fields = next.fields.len(), "form settings reconciled");
                self.settings = next;
                true
            }
            None => false,
        }
    }

    /// Applies a user edit to one field's settings.
    pub fn update_field(&mut self, settings: FieldSettings) {
        self.settings = self.settings.with_field(settings);
    }

    /// Parameters in display order.
    pub fn sorted_parameters(&self) -> Vec<Parameter> {
        sorted_parameters(&self.params, &self.settings)
    }

    /// True when the form has no parameters and should show the empty placeholder.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Visible fields in display order.
    pub fn form_fields(&self) -> Vec<FormFieldSpec> {
        self.sorted_parameters()
            .iter()
            .filter_map(|parameter| {
                let settings = self.settings.field(&parameter.id)?;
                (!settings.hidden).then(|| form_field(parameter, settings))
            })
            .collect()
    }

    /// Checks submitted values keyed by parameter id. Returns error messages keyed by id; empty means valid.
    ///
    /// Hidden fields are not validated.
    pub fn validate_values(&self, values: &ParameterValues) -> IndexMap<String, String> {
        self.sorted_parameters()
            .iter()
            .filter_map(|parameter| {
                let settings = self.settings.field(&parameter.id).filter(|settings| !settings.hidden)?;
                validate_field_value(values.get(&parameter.id), settings)
                    .err()
                    .map(|message| (parameter.id.clone(), message))
            })
            .collect()
    }
}
