//! Form settings reconciliation.
//!
//! Whenever a form's parameter list changes, every parameter must end up with
//! exactly one [`FieldSettings`] entry. [`reconcile`] adds default entries for
//! parameters that lack one and leaves everything else alone:
//!
//! - existing entries are never removed, including entries whose parameter
//!   has since disappeared, and never altered except for order compaction
//!   once `u32` orders run out;
//! - new entries take orders `max + 1 ..= max + n`, in parameter order;
//! - when nothing is missing the input is handed back borrowed, so callers can
//!   skip downstream work with a cheap `Cow::Borrowed` check.

use std::{borrow::Cow, collections::HashSet};

use actionform_types::{ActionDisplayType, FieldSettings, FieldType, FormSettings, InputType, Parameter};
use tracing::{debug, warn};

/// Returns true when at least one parameter has no settings entry.
pub fn has_new_params(params: &[Parameter], settings: &FormSettings) -> bool {
    params.iter().any(|parameter| !settings.contains(&parameter.id))
}

/// Brings `settings` up to date with `params`.
///
/// Returns `Cow::Borrowed(settings)` when every parameter already has an
/// entry, and an owned copy with the missing defaults merged in otherwise.
pub fn reconcile<'a>(params: &[Parameter], settings: &'a FormSettings) -> Cow<'a, FormSettings> {
    if has_new_params(params, settings) {
        Cow::Owned(add_missing_settings(settings, params))
    } else {
        Cow::Borrowed(settings)
    }
}

/// Returns a copy of `settings` with a default entry for each parameter that has none.
///
/// Repeated ids within `params` receive a single entry. When the new orders
/// would pass `u32::MAX`, existing orders are first compacted to `1..=k`
/// keeping their relative display order, and new entries follow from `k + 1`.
pub fn add_missing_settings(settings: &FormSettings, params: &[Parameter]) -> FormSettings {
    let mut added = HashSet::new();
    let missing: Vec<&Parameter> = params
        .iter()
        .filter(|parameter| !settings.contains(&parameter.id) && added.insert(parameter.id.as_str()))
        .collect();

    let mut next = settings.clone();
    if missing.is_empty() {
        return next;
    }

    let count = u32::try_from(missing.len()).unwrap_or(u32::MAX);
    let mut last_order = settings.max_order();
    if last_order.checked_add(count).is_none() {
        last_order = compact_orders(&mut next);
        warn!(compacted_to = last_order, "field orders exhausted; renumbered existing entries");
    }

    for parameter in missing {
        last_order = last_order.saturating_add(1);
        next.fields.insert(parameter.id.clone(), default_field_settings(parameter, last_order));
    }

    debug!(added = added.len(), total = next.fields.len(), "added default field settings");
    next
}

/// Renumbers ordered entries to `1..=k` in their current display order. Returns `k`.
fn compact_orders(settings: &mut FormSettings) -> u32 {
    let mut ordered: Vec<(u32, usize)> = settings
        .fields
        .values()
        .enumerate()
        .filter_map(|(index, field)| field.order.map(|order| (order, index)))
        .collect();
    ordered.sort_unstable();

    let mut last_order = 0;
    for (_, index) in ordered {
        if let Some((_, field)) = settings.fields.get_index_mut(index) {
            last_order += 1;
            field.order = Some(last_order);
        }
    }
    last_order
}

/// Settings for a form with no configured fields.
pub fn default_form_settings() -> FormSettings {
    FormSettings {
        display_type: Some(ActionDisplayType::Button),
        fields: Default::default(),
    }
}

/// Default entry for `parameter`: visible, optional, blank copy, typed from the
/// parameter's semantic type.
pub fn default_field_settings(parameter: &Parameter, order: u32) -> FieldSettings {
    let (field_type, input_type) = field_types_for(parameter);
    FieldSettings {
        field_type,
        input_type,
        order: Some(order),
        ..FieldSettings::new(parameter.id.clone())
    }
}

fn field_types_for(parameter: &Parameter) -> (FieldType, InputType) {
    match parameter.type_family() {
        "number" => (FieldType::Number, InputType::Number),
        "date" => (FieldType::Date, InputType::Date),
        "category" => (FieldType::Category, InputType::Category),
        _ => (FieldType::String, InputType::String),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ordered(id: &str, order: u32) -> FieldSettings {
        FieldSettings {
            order: Some(order),
            ..FieldSettings::new(id)
        }
    }

    #[test]
    fn empty_settings_get_sequential_orders() {
        let params = [Parameter::new("a", "string/="), Parameter::new("b", "string/=")];
        let settings = FormSettings::default();

        let reconciled = reconcile(&params, &settings);

        assert!(matches!(reconciled, Cow::Owned(_)));
        assert_eq!(reconciled.field("a").and_then(|field| field.order), Some(1));
        assert_eq!(reconciled.field("b").and_then(|field| field.order), Some(2));
        let a = reconciled.field("a").expect("a settings");
        assert!(!a.hidden);
        assert!(!a.required);
        assert!(a.title.is_empty() && a.placeholder.is_empty() && a.description.is_empty() && a.name.is_empty());
    }

    #[test]
    fn stale_entries_are_retained_and_orders_continue_from_max() {
        let settings = FormSettings::default().with_field(ordered("a", 5)).with_field(ordered("z", 1));
        let params = [Parameter::new("a", "string/="), Parameter::new("b", "string/=")];

        let reconciled = reconcile(&params, &settings).into_owned();

        assert_eq!(reconciled.fields.len(), 3);
        assert_eq!(reconciled.field("a"), settings.field("a"));
        assert_eq!(reconciled.field("z"), settings.field("z"));
        assert_eq!(reconciled.field("b").and_then(|field| field.order), Some(6));
    }

    #[test]
    fn known_parameters_pass_settings_through_by_reference() {
        let settings = FormSettings::default().with_field(ordered("a", 1));
        let params = [Parameter::new("a", "string/=")];

        let reconciled = reconcile(&params, &settings);

        match reconciled {
            Cow::Borrowed(borrowed) => assert!(std::ptr::eq(borrowed, &settings)),
            Cow::Owned(_) => panic!("expected pass-through"),
        }
    }

    #[test]
    fn defaults_follow_parameter_type() {
        let settings = add_missing_settings(
            &FormSettings::default(),
            &[Parameter::new("n", "number/="), Parameter::new("d", "date/single"), Parameter::new("s", "string/contains")],
        );
        assert_eq!(settings.field("n").map(|field| field.input_type), Some(InputType::Number));
        assert_eq!(settings.field("d").map(|field| field.field_type), Some(FieldType::Date));
        assert_eq!(settings.field("s").map(|field| field.input_type), Some(InputType::String));
    }

    #[test]
    fn duplicate_new_ids_receive_one_entry() {
        let params = [Parameter::new("a", "string/="), Parameter::new("a", "number/=")];
        let settings = add_missing_settings(&FormSettings::default(), &params);
        assert_eq!(settings.fields.len(), 1);
        assert_eq!(settings.field("a").map(|field| field.field_type), Some(FieldType::String));
        assert_eq!(settings.max_order(), 1);
    }

    #[test]
    fn exhausted_orders_are_compacted_before_appending() {
        let settings = FormSettings::default()
            .with_field(ordered("z", u32::MAX))
            .with_field(ordered("y", 7))
            .with_field(FieldSettings::new("unordered"));
        let params = [Parameter::new("a", "string/="), Parameter::new("b", "string/=")];

        let reconciled = reconcile(&params, &settings);

        let order_of = |id: &str| reconciled.field(id).and_then(|field| field.order);
        assert_eq!(order_of("y"), Some(1));
        assert_eq!(order_of("z"), Some(2));
        assert_eq!(order_of("unordered"), None);
        assert_eq!(order_of("a"), Some(3));
        assert_eq!(order_of("b"), Some(4));
    }

    #[test]
    fn orders_up_to_the_limit_are_left_alone() {
        let settings = FormSettings::default().with_field(ordered("z", u32::MAX - 1));
        let reconciled = reconcile(&[Parameter::new("a", "string/=")], &settings);
        assert_eq!(reconciled.field("z").and_then(|field| field.order), Some(u32::MAX - 1));
        assert_eq!(reconciled.field("a").and_then(|field| field.order), Some(u32::MAX));
    }

    #[test]
    fn default_form_settings_render_as_button() {
        let settings = default_form_settings();
        assert_eq!(settings.display_type, Some(ActionDisplayType::Button));
        assert!(settings.fields.is_empty());
    }

    fn arbitrary_settings() -> impl Strategy<Value = FormSettings> {
        proptest::collection::btree_map("[a-e]", proptest::option::of(0u32..20), 0..5).prop_map(|entries| FormSettings {
            display_type: None,
            fields: entries
                .into_iter()
                .map(|(id, order)| {
                    let settings = FieldSettings {
                        order,
                        title: format!("title-{id}"),
                        ..FieldSettings::new(id.clone())
                    };
                    (id, settings)
                })
                .collect(),
        })
    }

    fn arbitrary_params() -> impl Strategy<Value = Vec<Parameter>> {
        proptest::sample::subsequence(vec!["a", "b", "c", "d", "e", "f", "g"], 0..7)
            .prop_map(|ids| ids.into_iter().map(|id| Parameter::new(id, "string/=")).collect())
    }

    proptest! {
        #[test]
        fn reconcile_is_additive(settings in arbitrary_settings(), params in arbitrary_params()) {
            let reconciled = reconcile(&params, &settings);
            for (id, existing) in &settings.fields {
                prop_assert_eq!(reconciled.field(id), Some(existing));
            }
            for parameter in &params {
                prop_assert!(reconciled.contains(&parameter.id));
            }
        }

        #[test]
        fn reconcile_is_idempotent(settings in arbitrary_settings(), params in arbitrary_params()) {
            let once = reconcile(&params, &settings).into_owned();
            let twice = reconcile(&params, &once);
            prop_assert!(matches!(twice, Cow::Borrowed(_)));
            prop_assert_eq!(twice.as_ref(), &once);
        }

        #[test]
        fn new_entries_take_consecutive_orders(settings in arbitrary_settings(), params in arbitrary_params()) {
            let max = settings.max_order();
            let reconciled = reconcile(&params, &settings);
            let new_orders: Vec<_> = params
                .iter()
                .filter(|parameter| !settings.contains(&parameter.id))
                .map(|parameter| reconciled.field(&parameter.id).and_then(|field| field.order))
                .collect();
            let expected: Vec<_> = (1..=new_orders.len() as u32).map(|offset| Some(max + offset)).collect();
            prop_assert_eq!(new_orders, expected);
        }
    }
}
