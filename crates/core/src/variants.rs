//! Variant resolution engine.
//!
//! Pure functions over a [`Product`] and a candidate [`SelectedOptions`]:
//! which variant a selection names, which option values can still be chosen,
//! and where to land when a click names a combination that does not exist.
//! Absence of a match is an ordinary outcome, so nothing here returns an
//! error.

use crate::types::{Product, SelectedOptions, Variant, VariantId};

/// Availability of one option value under the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueAvailability {
    /// The option value.
    pub value: String,
    /// Whether the current selection has this value.
    pub selected: bool,
    /// Whether choosing it can lead to an available variant.
    pub selectable: bool,
}

/// Availability of every value of one option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionAvailability {
    /// The option name.
    pub name: String,
    /// Values in the option's display order.
    pub values: Vec<ValueAvailability>,
}

/// The variant whose options exactly equal a complete `selection`.
///
/// Returns `None` when the selection is incomplete or names a combination no
/// variant has. The match may be unavailable for sale; callers decide what
/// that means for add-to-cart.
#[must_use]
pub fn resolve<'p>(product: &'p Product, selection: &SelectedOptions) -> Option<&'p Variant> {
    if !selection.is_complete_for(product) {
        return None;
    }
    product
        .variants
        .iter()
        .find(|variant| &variant.selected_options == selection)
}

/// Whether `candidate` for `option_name` can lead to an available variant.
///
/// True iff some available variant has `candidate` for `option_name` and
/// agrees with `selection` on every other chosen option. The selection's own
/// entry for `option_name` is ignored.
#[must_use]
pub fn is_value_selectable(
    product: &Product,
    selection: &SelectedOptions,
    option_name: &str,
    candidate: &str,
) -> bool {
    product.variants.iter().any(|variant| {
        variant.available_for_sale
            && variant.has_option(option_name, candidate)
            && selection
                .iter()
                .filter(|chosen| chosen.name != option_name)
                .all(|chosen| variant.has_option(&chosen.name, &chosen.value))
    })
}

/// First available variant with `new_value` for `option_name`.
///
/// Used after [`resolve`] fails for a click. Every other chosen value is
/// discarded so the click itself is always honored; the returned selection is
/// the fallback variant's full option set. `selection` is accepted for
/// symmetry with the other operations and does not influence the result.
#[must_use]
pub fn pick_fallback<'p>(
    product: &'p Product,
    _selection: &SelectedOptions,
    option_name: &str,
    new_value: &str,
) -> Option<(&'p Variant, SelectedOptions)> {
    product
        .variants
        .iter()
        .find(|variant| variant.available_for_sale && variant.has_option(option_name, new_value))
        .map(|variant| (variant, variant.selected_options.clone()))
}

/// The variant a freshly loaded product page starts on.
///
/// A `requested` id (e.g. from a shared link) wins when the product has it;
/// otherwise the first available variant; otherwise the first variant.
#[must_use]
pub fn initial_variant<'p>(
    product: &'p Product,
    requested: Option<&VariantId>,
) -> Option<&'p Variant> {
    requested
        .and_then(|id| product.variant(id))
        .or_else(|| product.variants.iter().find(|v| v.available_for_sale))
        .or_else(|| product.variants.first())
}

/// Selected and selectable flags for every visible option value.
#[must_use]
pub fn option_availability(product: &Product, selection: &SelectedOptions) -> Vec<OptionAvailability> {
    product
        .visible_options()
        .map(|option| OptionAvailability {
            name: option.name.clone(),
            values: option
                .values
                .iter()
                .map(|value| ValueAvailability {
                    value: value.clone(),
                    selected: selection.has(&option.name, value),
                    selectable: is_value_selectable(product, selection, &option.name, value),
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::test_support::{pouch, product, selection, variant};

    #[test]
    fn test_resolve_exact_match() {
        let product = pouch();
        let found = resolve(&product, &selection(&[("Thickness", "Thick"), ("Color", "Clear")]));
        assert_eq!(found.unwrap().id.as_str(), "thick-clear");
    }

    #[test]
    fn test_resolve_returns_unavailable_match() {
        let product = pouch();
        let found = resolve(&product, &selection(&[("Thickness", "Thin"), ("Color", "Black")]));
        let found = found.unwrap();
        assert_eq!(found.id.as_str(), "thin-black");
        assert!(!found.available_for_sale);
    }

    #[test]
    fn test_resolve_missing_combination() {
        let product = pouch();
        assert!(resolve(&product, &selection(&[("Thickness", "Thick"), ("Color", "Black")])).is_none());
    }

    #[test]
    fn test_resolve_incomplete_selection() {
        let product = pouch();
        assert!(resolve(&product, &selection(&[("Thickness", "Thin")])).is_none());
        assert!(resolve(&product, &SelectedOptions::new()).is_none());
    }

    #[test]
    fn test_resolve_rejects_extra_option_names() {
        let product = pouch();
        let extra = selection(&[("Thickness", "Thin"), ("Color", "Clear"), ("Size", "M")]);
        assert!(resolve(&product, &extra).is_none());
    }

    #[test]
    fn test_resolve_matches_every_declared_combination() {
        let product = pouch();
        for thickness in ["Thin", "Thick"] {
            for color in ["Clear", "Black"] {
                let s = selection(&[("Thickness", thickness), ("Color", color)]);
                let expected = product.variants.iter().find(|v| v.selected_options == s);
                assert_eq!(resolve(&product, &s), expected, "{thickness}/{color}");
            }
        }
    }

    #[test]
    fn test_is_value_selectable() {
        let product = pouch();
        let current = selection(&[("Thickness", "Thin"), ("Color", "Clear")]);

        // Thin/Black exists but is sold out.
        assert!(!is_value_selectable(&product, &current, "Color", "Black"));
        assert!(is_value_selectable(&product, &current, "Color", "Clear"));
        assert!(is_value_selectable(&product, &current, "Thickness", "Thick"));
        assert!(is_value_selectable(&product, &current, "Thickness", "Thin"));
    }

    #[test]
    fn test_is_value_selectable_ignores_own_prior_value() {
        let product = pouch();
        for prior in ["Clear", "Black"] {
            let current = selection(&[("Thickness", "Thick"), ("Color", prior)]);
            assert!(is_value_selectable(&product, &current, "Color", "Clear"));
            assert!(!is_value_selectable(&product, &current, "Color", "Black"));
        }
    }

    #[test]
    fn test_is_value_selectable_unknown_value() {
        let product = pouch();
        assert!(!is_value_selectable(&product, &SelectedOptions::new(), "Color", "Red"));
    }

    #[test]
    fn test_pick_fallback_resets_other_options() {
        let product = product(
            &[("Thickness", &["Thin", "Thick"]), ("Color", &["Clear", "Black"])],
            vec![
                variant("thin-clear", &[("Thickness", "Thin"), ("Color", "Clear")], true),
                variant("thick-black", &[("Thickness", "Thick"), ("Color", "Black")], true),
            ],
        );
        let current = selection(&[("Thickness", "Thin"), ("Color", "Black")]);

        let (found, options) = pick_fallback(&product, &current, "Color", "Black").unwrap();
        assert_eq!(found.id.as_str(), "thick-black");
        assert_eq!(options, selection(&[("Thickness", "Thick"), ("Color", "Black")]));
    }

    #[test]
    fn test_pick_fallback_skips_unavailable() {
        let product = pouch();
        let current = selection(&[("Thickness", "Thick"), ("Color", "Black")]);
        assert!(pick_fallback(&product, &current, "Color", "Black").is_none());
    }

    #[test]
    fn test_pick_fallback_result_has_requested_value() {
        let product = pouch();
        for (name, value) in [("Thickness", "Thin"), ("Thickness", "Thick"), ("Color", "Clear")] {
            let (found, options) = pick_fallback(&product, &SelectedOptions::new(), name, value).unwrap();
            assert!(found.available_for_sale);
            assert!(found.has_option(name, value));
            assert_eq!(options, found.selected_options);
        }
    }

    #[test]
    fn test_initial_variant_prefers_requested() {
        let product = pouch();
        let requested = VariantId::new("thin-black");
        let found = initial_variant(&product, Some(&requested)).unwrap();
        assert_eq!(found.id, requested);
    }

    #[test]
    fn test_initial_variant_unknown_request_falls_through() {
        let product = pouch();
        let requested = VariantId::new("gone");
        let found = initial_variant(&product, Some(&requested)).unwrap();
        assert_eq!(found.id.as_str(), "thin-clear");
    }

    #[test]
    fn test_initial_variant_first_available() {
        let product = product(
            &[("Color", &["Black", "Clear"])],
            vec![
                variant("black", &[("Color", "Black")], false),
                variant("clear", &[("Color", "Clear")], true),
            ],
        );
        assert_eq!(initial_variant(&product, None).unwrap().id.as_str(), "clear");
    }

    #[test]
    fn test_initial_variant_all_sold_out() {
        let product = product(
            &[("Color", &["Black", "Clear"])],
            vec![
                variant("black", &[("Color", "Black")], false),
                variant("clear", &[("Color", "Clear")], false),
            ],
        );
        assert_eq!(initial_variant(&product, None).unwrap().id.as_str(), "black");
    }

    #[test]
    fn test_option_availability_flags() {
        let product = pouch();
        let current = selection(&[("Thickness", "Thin"), ("Color", "Clear")]);
        let options = option_availability(&product, &current);

        assert_eq!(options.len(), 2);
        let color = &options[1];
        assert_eq!(color.name, "Color");
        assert_eq!(
            color.values,
            vec![
                ValueAvailability {
                    value: "Clear".to_owned(),
                    selected: true,
                    selectable: true,
                },
                ValueAvailability {
                    value: "Black".to_owned(),
                    selected: false,
                    selectable: false,
                },
            ]
        );
    }

    #[test]
    fn test_option_availability_hides_default_title() {
        let product = product(
            &[("Title", &["Default Title"])],
            vec![variant("only", &[("Title", "Default Title")], true)],
        );
        let current = selection(&[("Title", "Default Title")]);
        assert!(option_availability(&product, &current).is_empty());
        assert_eq!(resolve(&product, &current).unwrap().id.as_str(), "only");
    }
}
