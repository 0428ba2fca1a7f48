//! # Parameter Resolution
//!
//! Turns a card's parameters into [`UiParameter`] snapshots for the form layer.
//! Each pass binds current values from the value store and resolves every
//! parameter's target against the card's query and the metadata catalog:
//!
//! - `["dimension", ["field", 10, null]]` resolves through the catalog by id.
//! - `["dimension", ["field", "TOTAL", ...]]` resolves by column name in the
//!   structured query's source table.
//! - `["dimension", ["template-tag", "category"]]` resolves through the field
//!   bound by that field-filter tag.
//! - Variable targets and parameters without a target never resolve and are
//!   flagged with [`Resolution::VariableTemplateTag`].
//!
//! ## Usage
//!
//! ```rust
//! use actionform_engine::{Metadata, ParameterValues, card_ui_parameters};
//! use actionform_types::{Card, Parameter};
//!
//! let card = Card {
//!     parameters: vec![Parameter::new("a", "string/=")],
//!     ..Card::default()
//! };
//! let resolved = card_ui_parameters(Some(&card), &Metadata::default(), &ParameterValues::new(), None);
//! assert!(resolved[0].has_variable_template_tag_target());
//! ```

use actionform_types::{Card, DimensionRef, FieldDescriptor, FieldRef, FieldReference, Parameter, ParameterTarget, Resolution, TemplateTagType, UiParameter};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::trace;

use crate::{card::parameters_from_card, metadata::MetadataCatalog};

/// Currently bound values keyed by parameter id.
pub type ParameterValues = IndexMap<String, Value>;

/// Resolves parameter targets for one card against a metadata catalog.
pub struct ParameterResolver<'a, C: MetadataCatalog + ?Sized> {
    card: &'a Card,
    metadata: &'a C,
}

impl<'a, C: MetadataCatalog + ?Sized> ParameterResolver<'a, C> {
    pub fn new(card: &'a Card, metadata: &'a C) -> Self {
        Self { card, metadata }
    }

    /// Produces one UI parameter per input parameter, in input order.
    pub fn resolve(&self, parameters: &[Parameter], values: &ParameterValues) -> Vec<UiParameter> {
        value_populated_parameters(parameters, values)
            .into_iter()
            .map(|parameter| {
                let resolution = match self.target_field(parameter.target.as_ref()) {
                    Some(field) => Resolution::Field(field.clone()),
                    None => Resolution::VariableTemplateTag,
                };
                trace!(
                    parameter = %parameter.id,
                    resolved = matches!(resolution, Resolution::Field(_)),
                    "resolved parameter target"
                );
                UiParameter { parameter, resolution }
            })
            .collect()
    }

    /// Finds the concrete column a target refers to, if any.
    pub fn target_field(&self, target: Option<&ParameterTarget>) -> Option<&'a FieldDescriptor> {
        match target? {
            ParameterTarget::Variable { .. } => None,
            ParameterTarget::Dimension(DimensionRef::Field(reference)) => self.field_for_reference(reference),
            ParameterTarget::Dimension(DimensionRef::TemplateTag(tag_name)) => self.field_for_template_tag(tag_name),
        }
    }

    fn field_for_reference(&self, reference: &FieldReference) -> Option<&'a FieldDescriptor> {
        match &reference.field {
            FieldRef::Id(field_id) => self.metadata.field(*field_id),
            FieldRef::Name(column_name) => {
                let table_id = self.card.structured_query()?.root_source_table()?;
                self.metadata.table(table_id)?.field_by_name(column_name)
            }
        }
    }

    fn field_for_template_tag(&self, tag_name: &str) -> Option<&'a FieldDescriptor> {
        let tags = self.card.template_tags()?;
        // Targets written by older clients reference the tag by id rather than name.
        let tag = tags.get(tag_name).or_else(|| tags.values().find(|tag| tag.id == tag_name))?;
        if tag.r#type != TemplateTagType::Dimension {
            return None;
        }
        self.field_for_reference(tag.dimension.as_ref()?)
    }
}

/// Resolves the UI parameters for a card.
///
/// `parameters` defaults to [`parameters_from_card`]. An absent card yields an
/// empty list.
pub fn card_ui_parameters<C: MetadataCatalog + ?Sized>(
    card: Option<&Card>,
    metadata: &C,
    values: &ParameterValues,
    parameters: Option<&[Parameter]>,
) -> Vec<UiParameter> {
    let Some(card) = card else {
        return Vec::new();
    };
    let resolver = ParameterResolver::new(card, metadata);
    match parameters {
        Some(parameters) => resolver.resolve(parameters, values),
        None => resolver.resolve(&parameters_from_card(card), values),
    }
}

/// Looks up the column a parameter target refers to within `card`.
pub fn parameter_target_field<'a, C: MetadataCatalog + ?Sized>(
    target: Option<&ParameterTarget>,
    metadata: &'a C,
    card: &'a Card,
) -> Option<&'a FieldDescriptor> {
    ParameterResolver::new(card, metadata).target_field(target)
}

/// Copies `parameters`, binding each one's value from `values`.
///
/// Ids without a bound value fall back to the parameter's default when the
/// parameter is required; otherwise the value is left unset.
pub fn value_populated_parameters(parameters: &[Parameter], values: &ParameterValues) -> Vec<Parameter> {
    parameters
        .iter()
        .map(|parameter| {
            let bound = values.get(&parameter.id).filter(|value| !value.is_null()).cloned();
            let value = bound.or_else(|| parameter.default.clone().filter(|_| parameter.required));
            Parameter {
                value,
                ..parameter.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Metadata, tests::orders_metadata};
    use actionform_types::{DatasetQuery, NativeQuery, StructuredQuery, TemplateTag};
    use serde_json::json;

    fn structured_card(parameters: Vec<Parameter>) -> Card {
        Card {
            id: Some(3),
            name: "Orders".to_string(),
            dataset_query: Some(DatasetQuery::Query {
                database: Some(1),
                query: StructuredQuery {
                    source_table: None,
                    source_query: Some(Box::new(StructuredQuery {
                        source_table: Some(2),
                        source_query: None,
                    })),
                },
            }),
            parameters,
            visualization_settings: None,
        }
    }

    fn field_target(field: FieldRef) -> ParameterTarget {
        ParameterTarget::Dimension(DimensionRef::Field(FieldReference { field, options: None }))
    }

    #[test]
    fn absent_card_resolves_to_nothing() {
        let resolved = card_ui_parameters(None, &orders_metadata(), &ParameterValues::new(), None);
        assert!(resolved.is_empty());
    }

    #[test]
    fn empty_parameter_list_resolves_to_nothing() {
        let card = structured_card(Vec::new());
        let resolved = card_ui_parameters(Some(&card), &orders_metadata(), &ParameterValues::new(), Some(&[]));
        assert!(resolved.is_empty());
    }

    #[test]
    fn field_id_target_resolves_through_catalog() {
        let metadata = orders_metadata();
        let card = structured_card(vec![Parameter::new("a", "number/=").with_target(field_target(FieldRef::Id(11)))]);

        let resolved = card_ui_parameters(Some(&card), &metadata, &ParameterValues::new(), None);

        assert_eq!(resolved.len(), 1);
        assert!(!resolved[0].has_variable_template_tag_target());
        assert_eq!(resolved[0].fields(), std::slice::from_ref(metadata.field(11).expect("QUANTITY")));
    }

    #[test]
    fn field_name_target_resolves_in_nested_source_table() {
        let card = structured_card(vec![
            Parameter::new("a", "number/=").with_target(field_target(FieldRef::Name("quantity".to_string()))),
        ]);

        let resolved = card_ui_parameters(Some(&card), &orders_metadata(), &ParameterValues::new(), None);
        assert_eq!(resolved[0].fields()[0].id, 11);
    }

    #[test]
    fn unknown_field_and_variable_targets_stay_unresolved() {
        let card = structured_card(vec![
            Parameter::new("missing", "number/=").with_target(field_target(FieldRef::Id(404))),
            Parameter::new("variable", "string/=").with_target(ParameterTarget::Variable {
                tag: "order_id".to_string(),
            }),
            Parameter::new("untargeted", "string/="),
        ]);

        let resolved = card_ui_parameters(Some(&card), &orders_metadata(), &ParameterValues::new(), None);

        let ids: Vec<_> = resolved.iter().map(|parameter| parameter.parameter.id.as_str()).collect();
        assert_eq!(ids, vec!["missing", "variable", "untargeted"]);
        assert!(resolved.iter().all(UiParameter::has_variable_template_tag_target));
        assert!(resolved.iter().all(|parameter| parameter.fields().is_empty()));
    }

    #[test]
    fn field_filter_tag_resolves_through_its_dimension() {
        let mut template_tags = IndexMap::new();
        template_tags.insert(
            "order".to_string(),
            TemplateTag {
                id: "tag-uuid".to_string(),
                name: "order".to_string(),
                display_name: "Order".to_string(),
                r#type: TemplateTagType::Dimension,
                dimension: Some(FieldReference {
                    field: FieldRef::Id(10),
                    options: None,
                }),
                widget_type: Some("id".to_string()),
                default: None,
                required: false,
            },
        );
        let card = Card {
            dataset_query: Some(DatasetQuery::Native {
                database: Some(1),
                native: NativeQuery {
                    query: "SELECT * FROM orders WHERE {{order}}".to_string(),
                    template_tags,
                },
            }),
            ..Card::default()
        };
        let metadata = orders_metadata();

        let by_name = ParameterTarget::Dimension(DimensionRef::TemplateTag("order".to_string()));
        let by_id = ParameterTarget::Dimension(DimensionRef::TemplateTag("tag-uuid".to_string()));
        assert_eq!(parameter_target_field(Some(&by_name), &metadata, &card).map(|field| field.id), Some(10));
        assert_eq!(parameter_target_field(Some(&by_id), &metadata, &card).map(|field| field.id), Some(10));

        let derived = card_ui_parameters(Some(&card), &metadata, &ParameterValues::new(), None);
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].fields()[0].name, "ID");
    }

    #[test]
    fn values_bind_by_id_and_required_defaults_fill_gaps() {
        let mut required = Parameter::new("required", "number/=");
        required.required = true;
        required.default = Some(json!(5));
        let mut optional = Parameter::new("optional", "number/=");
        optional.default = Some(json!(7));
        let bound = Parameter::new("bound", "string/=");

        let mut values = ParameterValues::new();
        values.insert("bound".to_string(), json!("hello"));
        values.insert("unrelated".to_string(), json!(1));

        let populated = value_populated_parameters(&[required, optional, bound], &values);

        assert_eq!(populated[0].value, Some(json!(5)));
        assert_eq!(populated[1].value, None);
        assert_eq!(populated[2].value, Some(json!("hello")));
    }

    #[test]
    fn resolution_works_through_a_trait_object() {
        let metadata: Box<dyn MetadataCatalog> = Box::new(Metadata::default());
        let card = structured_card(vec![Parameter::new("a", "string/=")]);
        let resolved = card_ui_parameters(Some(&card), metadata.as_ref(), &ParameterValues::new(), None);
        assert!(resolved[0].has_variable_template_tag_target());
    }
}
