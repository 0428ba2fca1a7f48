//! # Form Document Model
//!
//! A form document bundles everything the pipeline needs for one action form:
//! the card, a snapshot of the metadata catalog, the currently bound parameter
//! values, and any previously saved form settings. Documents are authored in
//! YAML or JSON.
//!
//! ```yaml
//! card:
//!   name: Reset order quantity
//!   dataset_query:
//!     type: native
//!     native:
//!       query: "UPDATE orders SET quantity = 0 WHERE id = {{order_id}}"
//!       template-tags:
//!         order_id: { id: fake-uuid, name: order_id, display-name: Order ID, type: number }
//! parameter_values:
//!   fake-uuid: 42
//! ```

use actionform_types::{Card, FormSettings, UiParameter};
use serde::{Deserialize, Serialize};

use crate::{
    card::parameters_from_card,
    form::FormEditorSession,
    metadata::Metadata,
    resolve::{ParameterValues, card_ui_parameters},
};

/// Inputs for one action form, as loaded from disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FormDocument {
    /// The card whose parameters drive the form. Absent cards produce an empty form.
    #[serde(default)]
    pub card: Option<Card>,
    /// Catalog snapshot used for target resolution.
    #[serde(default)]
    pub metadata: Metadata,
    /// Currently bound values keyed by parameter id.
    #[serde(default)]
    pub parameter_values: ParameterValues,
    /// Previously saved settings. Takes precedence over the card's own `visualization_settings`.
    #[serde(default)]
    pub form_settings: Option<FormSettings>,
}

impl FormDocument {
    /// Resolves the card's parameters against the document's catalog and values.
    pub fn ui_parameters(&self) -> Vec<UiParameter> {
        card_ui_parameters(self.card.as_ref(), &self.metadata, &self.parameter_values, None)
    }

    /// Opens an editor session seeded with the card's parameters and saved settings.
    pub fn editor_session(&self) -> FormEditorSession {
        let params = self.card.as_ref().map(parameters_from_card).unwrap_or_default();
        let saved = self
            .form_settings
            .clone()
            .or_else(|| self.card.as_ref().and_then(|card| card.visualization_settings.clone()));
        FormEditorSession::new(params, saved)
    }
}
