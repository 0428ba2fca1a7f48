//! Display order for form parameters.

use std::cmp::Ordering;

use actionform_types::{FormSettings, Parameter};

/// Sort key for one parameter: entries with an order first (ascending), then
/// entries without an order, then parameters with no settings entry at all.
fn order_key(settings: &FormSettings, parameter: &Parameter) -> (u8, u32) {
    match settings.field(&parameter.id) {
        Some(field) => match field.order {
            Some(order) => (0, order),
            None => (1, 0),
        },
        None => (2, 0),
    }
}

/// Builds a comparator ordering parameters by their settings.
///
/// Parameters that compare equal keep their relative order when used with a
/// stable sort such as [`slice::sort_by`].
pub fn sort_action_params(settings: &FormSettings) -> impl Fn(&Parameter, &Parameter) -> Ordering + '_ {
    move |left, right| order_key(settings, left).cmp(&order_key(settings, right))
}

/// Returns `params` sorted for display, leaving the input untouched.
pub fn sorted_parameters(params: &[Parameter], settings: &FormSettings) -> Vec<Parameter> {
    let mut sorted = params.to_vec();
    sorted.sort_by(sort_action_params(settings));
    sorted
}
