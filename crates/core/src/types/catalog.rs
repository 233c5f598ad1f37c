//! Catalog records: products, options, and variants.
//!
//! These are the validated shapes the Shopify gateway produces. Everything
//! downstream (variant resolution, cart display) assumes they are well formed:
//! one selected option per product option on every variant, and variants that
//! are pairwise distinct in their selected options.

use serde::{Deserialize, Serialize};
use url::Url;

use super::id::{ProductId, VariantId};
use super::money::Money;

/// Name Shopify gives the single synthetic option of a product without options.
pub const DEFAULT_OPTION_NAME: &str = "Title";

// =============================================================================
// Images
// =============================================================================

/// Product or variant image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: Url,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
}

// =============================================================================
// Options
// =============================================================================

/// Product option definition (e.g., "Espessura" with its values).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    /// Option name (e.g., "Color").
    pub name: String,
    /// Available values in display order (e.g., `["Clear", "Black"]`).
    pub values: Vec<String>,
}

/// One option name/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Color").
    pub name: String,
    /// Chosen value (e.g., "Clear").
    pub value: String,
}

impl SelectedOption {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Mapping from option name to one chosen value.
///
/// Entries keep insertion order so a variant's options read in the product's
/// option order, but equality ignores order: two selections are equal when
/// they map the same names to the same values.
#[derive(Debug, Clone, Default, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<SelectedOption>", into = "Vec<SelectedOption>")]
pub struct SelectedOptions(Vec<SelectedOption>);

impl SelectedOptions {
    /// An empty selection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Value chosen for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|opt| opt.name == name)
            .map(|opt| opt.value.as_str())
    }

    /// Choose `value` for `name`, replacing any previous choice in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|opt| opt.name == name) {
            Some(existing) => existing.value = value,
            None => self.0.push(SelectedOption { name, value }),
        }
    }

    /// Whether `name` is chosen with exactly `value`.
    #[must_use]
    pub fn has(&self, name: &str, value: &str) -> bool {
        self.get(name) == Some(value)
    }

    /// Whether every option of `product` has an entry.
    #[must_use]
    pub fn is_complete_for(&self, product: &Product) -> bool {
        product
            .options
            .iter()
            .all(|option| self.get(&option.name).is_some())
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SelectedOption> {
        self.0.iter()
    }

    /// Number of chosen options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is chosen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Values joined the way Shopify titles variants ("Thin / Clear").
    #[must_use]
    pub fn label(&self) -> String {
        self.0
            .iter()
            .map(|opt| opt.value.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

impl PartialEq for SelectedOptions {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().all(|opt| other.has(&opt.name, &opt.value))
    }
}

impl FromIterator<SelectedOption> for SelectedOptions {
    fn from_iter<I: IntoIterator<Item = SelectedOption>>(iter: I) -> Self {
        let mut selection = Self::new();
        for opt in iter {
            selection.set(opt.name, opt.value);
        }
        selection
    }
}

/// A repeated name keeps its first position and its last value, as with `set`.
impl From<Vec<SelectedOption>> for SelectedOptions {
    fn from(options: Vec<SelectedOption>) -> Self {
        options.into_iter().collect()
    }
}

impl From<SelectedOptions> for Vec<SelectedOption> {
    fn from(selection: SelectedOptions) -> Self {
        selection.0
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for SelectedOptions {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut selection = Self::new();
        for (name, value) in iter {
            selection.set(name, value);
        }
        selection
    }
}

// =============================================================================
// Variants and products
// =============================================================================

/// A product variant (specific combination of options).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant ID (the cart's merchandise id).
    pub id: VariantId,
    /// Variant title (combination of option values).
    pub title: String,
    /// One entry per product option, in the product's option order.
    pub selected_options: SelectedOptions,
    /// Current price.
    pub price: Money,
    /// Whether this variant is available for sale.
    pub available_for_sale: bool,
    /// Variant image.
    pub image: Option<Image>,
}

impl Variant {
    /// Whether this variant has `value` for option `name`.
    #[must_use]
    pub fn has_option(&self, name: &str, value: &str) -> bool {
        self.selected_options.has(name, value)
    }
}

/// Price range for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Minimum price among all variants.
    pub min_variant_price: Money,
    /// Maximum price among all variants.
    pub max_variant_price: Money,
}

/// A product in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// URL handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Plain text description.
    pub description: String,
    /// Whether any variant is available.
    pub available_for_sale: bool,
    /// Option axes in display order.
    pub options: Vec<ProductOption>,
    /// Variants in declared order (at least one).
    pub variants: Vec<Variant>,
    /// Product images in display order.
    pub images: Vec<Image>,
    /// Price range across variants.
    pub price_range: PriceRange,
}

impl Product {
    /// The image shown before any variant image takes over.
    #[must_use]
    pub fn featured_image(&self) -> Option<&Image> {
        self.images.first()
    }

    /// Look up a variant by id.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|variant| &variant.id == id)
    }

    /// Look up an option by name.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&ProductOption> {
        self.options.iter().find(|option| option.name == name)
    }

    /// Options a shopper actually chooses between.
    ///
    /// Hides the synthetic "Title" option Shopify adds to products that have
    /// no real options.
    pub fn visible_options(&self) -> impl Iterator<Item = &ProductOption> {
        self.options
            .iter()
            .filter(|option| option.name != DEFAULT_OPTION_NAME)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_options_deserialize_collapses_repeated_names() {
        let json = r#"[
            {"name": "Color", "value": "Black"},
            {"name": "Thickness", "value": "Thin"},
            {"name": "Color", "value": "Clear"}
        ]"#;
        let parsed: SelectedOptions = serde_json::from_str(json).unwrap();
        let expected: SelectedOptions =
            [("Color", "Clear"), ("Thickness", "Thin")].into_iter().collect();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.get("Color"), Some("Clear"));
        assert_eq!(parsed, expected);
        assert_eq!(expected, parsed);
        assert_eq!(
            serde_json::to_value(&parsed).unwrap(),
            serde_json::json!([
                {"name": "Color", "value": "Clear"},
                {"name": "Thickness", "value": "Thin"}
            ])
        );
    }

    #[test]
    fn test_selected_options_set_replaces_in_place() {
        let mut selection: SelectedOptions =
            [("Thickness", "Thin"), ("Color", "Clear")].into_iter().collect();
        selection.set("Thickness", "Thick");

        let names: Vec<_> = selection.iter().map(|opt| opt.name.as_str()).collect();
        assert_eq!(names, ["Thickness", "Color"]);
        assert_eq!(selection.get("Thickness"), Some("Thick"));
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_selected_options_equality_ignores_order() {
        let a: SelectedOptions = [("Thickness", "Thin"), ("Color", "Clear")].into_iter().collect();
        let b: SelectedOptions = [("Color", "Clear"), ("Thickness", "Thin")].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_selected_options_equality_requires_same_names() {
        let a: SelectedOptions = [("Color", "Clear")].into_iter().collect();
        let b: SelectedOptions = [("Color", "Clear"), ("Thickness", "Thin")].into_iter().collect();
        assert_ne!(a, b);
        assert_ne!(b, a);
    }

    #[test]
    fn test_selected_options_label() {
        let selection: SelectedOptions =
            [("Thickness", "Thin"), ("Color", "Clear")].into_iter().collect();
        assert_eq!(selection.label(), "Thin / Clear");
    }

    #[test]
    fn test_selected_options_serialize_as_list() {
        let selection: SelectedOptions = [("Color", "Black")].into_iter().collect();
        let json = serde_json::to_value(&selection).unwrap();
        assert_eq!(json, serde_json::json!([{"name": "Color", "value": "Black"}]));
    }
}
