//! Parameters declared by a card.
//!
//! Cards saved with an explicit parameter list use it as-is. Native query cards
//! saved without one derive their parameters from the query's template tags.

use actionform_types::{Card, DimensionRef, Parameter, ParameterTarget, TemplateTag, TemplateTagType};

/// Returns the parameters a card exposes, in declaration order.
pub fn parameters_from_card(card: &Card) -> Vec<Parameter> {
    if !card.parameters.is_empty() {
        return card.parameters.clone();
    }

    card.template_tags()
        .map(|tags| tags.values().filter_map(parameter_from_template_tag).collect())
        .unwrap_or_default()
}

/// Builds the parameter for one template tag. Card and snippet tags embed other
/// queries and never surface as parameters.
pub fn parameter_from_template_tag(tag: &TemplateTag) -> Option<Parameter> {
    let target = match tag.r#type {
        TemplateTagType::Card | TemplateTagType::Snippet => return None,
        TemplateTagType::Dimension => ParameterTarget::Dimension(DimensionRef::TemplateTag(tag.name.clone())),
        TemplateTagType::Text | TemplateTagType::Number | TemplateTagType::Date => ParameterTarget::Variable { tag: tag.name.clone() },
    };

    let id = if tag.id.is_empty() { tag.name.clone() } else { tag.id.clone() };
    let name = if tag.display_name.is_empty() {
        tag.name.clone()
    } else {
        tag.display_name.clone()
    };

    Some(Parameter {
        id,
        name,
        slug: tag.name.clone(),
        r#type: parameter_type_for_tag(tag),
        target: Some(target),
        value: None,
        default: tag.default.clone(),
        required: tag.required,
    })
}

fn parameter_type_for_tag(tag: &TemplateTag) -> String {
    if let Some(widget_type) = tag.widget_type.as_deref().filter(|widget_type| !widget_type.is_empty()) {
        return widget_type.to_string();
    }
    match tag.r#type {
        TemplateTagType::Number => "number/=",
        TemplateTagType::Date => "date/single",
        TemplateTagType::Dimension => "category",
        _ => "string/=",
    }
    .to_string()
}
