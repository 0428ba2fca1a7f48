//! # Actionform Engine
//!
//! The engine keeps an action form's field configuration in sync with the
//! parameters of the query behind it. It is a set of pure functions over
//! immutable snapshots, cheap enough to run on every UI update.
//!
//! ## Key Features
//!
//! - **Parameter Resolution**: Binds values and resolves each parameter's target to a
//!   concrete column, or flags it as a variable template-tag target
//! - **Settings Reconciliation**: Adds default field settings for new parameters without
//!   touching existing entries
//! - **Field Ordering**: Stable display order driven by the settings' `order`
//! - **Form Sessions**: Editing state, renderable field descriptions, and value validation
//!
//! ## Usage
//!
//! ```rust
//! use actionform_engine::parse_form_document;
//!
//! let temp_dir = tempfile::tempdir()?;
//! let document_path = temp_dir.path().join("form.yaml");
//! std::fs::write(&document_path, r#"
//! card:
//!   name: "Update quantity"
//!   parameters:
//!     - { id: qty, name: Quantity, slug: qty, type: "number/=" }
//! "#)?;
//!
//! let document = parse_form_document(&document_path)?;
//! let session = document.editor_session();
//! assert_eq!(session.form_fields().len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`card`**: Parameters declared by a card or derived from its template tags
//! - **`metadata`**: The catalog seam and an in-memory catalog
//! - **`resolve`**: Target resolution and value binding
//! - **`reconcile`**: Settings reconciliation
//! - **`ordering`**: Display order comparator
//! - **`form`**: Editor session, field descriptions, validation
//! - **`model`**: The on-disk form document

use std::{fs, path::Path};

use anyhow::{Context, Result};

pub mod card;
pub mod form;
pub mod metadata;
pub mod model;
pub mod ordering;
pub mod reconcile;
pub mod resolve;

pub use card::parameters_from_card;
pub use form::{FormEditorSession, FormFieldSpec, WidgetKind, form_field};
pub use metadata::{Metadata, MetadataCatalog};
pub use model::FormDocument;
pub use ordering::{sort_action_params, sorted_parameters};
pub use reconcile::{add_missing_settings, default_field_settings, default_form_settings, has_new_params, reconcile};
pub use resolve::{ParameterResolver, ParameterValues, card_ui_parameters, parameter_target_field, value_populated_parameters};

/// Loads a form document from the filesystem.
///
/// YAML is a superset of JSON, so both formats are read by the same parser
/// regardless of the file extension.
///
/// # Errors
///
/// This function will return an error if:
/// - The file cannot be read from the filesystem
/// - The content is not valid YAML or JSON
/// - The structure does not match the form document format
pub fn parse_form_document(file_path: impl AsRef<Path>) -> Result<FormDocument> {
    let file_path = file_path.as_ref();
    let content = fs::read_to_string(file_path).with_context(|| format!("Failed to read form document: {}", file_path.display()))?;
    parse_form_document_str(&content).with_context(|| format!("Failed to parse form document: {}", file_path.display()))
}

/// Parses a form document from YAML or JSON text.
pub fn parse_form_document_str(content: &str) -> Result<FormDocument> {
    if content.trim().is_empty() {
        return Ok(FormDocument::default());
    }
    let document = serde_yaml::from_str(content)?;
    Ok(document)
}
