//! Shared type definitions for the action form pipeline.
//!
//! The models here mirror the JSON shapes exchanged with the analytics backend:
//! cards and their dataset queries, parameters and their targets, the metadata
//! catalog's field descriptors, and the per-parameter form settings persisted
//! alongside an action.

pub mod card;
pub mod form;
pub mod metadata;
pub mod parameter;

pub use card::{Card, DatasetQuery, NativeQuery, StructuredQuery, TemplateTag, TemplateTagType};
pub use form::{ActionDisplayType, FieldSettings, FieldType, FormSettings, InputType, validation::validate_field_value};
pub use metadata::{FieldDescriptor, FieldId, TableDescriptor, TableId};
pub use parameter::{DimensionRef, FieldRef, FieldReference, Parameter, ParameterTarget, Resolution, TargetParseError, UiParameter};
