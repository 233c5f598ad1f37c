//! Per-product selection state.
//!
//! A display surface keeps one [`VariantSelection`] per product page and feeds
//! it option clicks. The product itself is passed into every call rather than
//! stored, so the same selection can be re-evaluated after the catalog entry
//! is refreshed.

use crate::types::{Image, Product, SelectedOptions, Variant, VariantId};
use crate::variants::{self, OptionAvailability};

/// What an option click did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    /// The clicked combination exists and is now current.
    Resolved,
    /// The combination does not exist; the first available variant with the
    /// clicked value replaced the whole selection.
    FellBack,
    /// Nothing available carries the clicked value; the selection is unchanged.
    Rejected,
}

/// What add-to-cart would act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddTarget<'p> {
    /// The current variant can be added.
    Ready(&'p Variant),
    /// The current variant exists but is sold out.
    Unavailable(&'p Variant),
    /// No variant is selected.
    NoVariant,
}

/// Selected options, current variant, and displayed image for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSelection {
    selected: SelectedOptions,
    current: Option<VariantId>,
    image: Option<Image>,
}

impl VariantSelection {
    /// Start a selection on the product's initial variant.
    ///
    /// See [`variants::initial_variant`] for the precedence of `requested`.
    #[must_use]
    pub fn new(product: &Product, requested: Option<&VariantId>) -> Self {
        let mut selection = Self {
            selected: SelectedOptions::new(),
            current: None,
            image: product.featured_image().cloned(),
        };
        if let Some(initial) = variants::initial_variant(product, requested) {
            selection.select_variant(initial, initial.selected_options.clone());
        }
        selection
    }

    /// Apply a click on `value` for option `option_name`.
    pub fn choose(&mut self, product: &Product, option_name: &str, value: &str) -> SelectionChange {
        let mut candidate = self.selected.clone();
        candidate.set(option_name, value);

        if let Some(found) = variants::resolve(product, &candidate) {
            self.select_variant(found, candidate);
            return SelectionChange::Resolved;
        }

        match variants::pick_fallback(product, &candidate, option_name, value) {
            Some((fallback, options)) => {
                self.select_variant(fallback, options);
                SelectionChange::FellBack
            }
            None => SelectionChange::Rejected,
        }
    }

    /// Display a specific image (thumbnail click).
    pub fn show_image(&mut self, image: Image) {
        self.image = Some(image);
    }

    /// The chosen option values.
    #[must_use]
    pub const fn selected(&self) -> &SelectedOptions {
        &self.selected
    }

    /// The image currently displayed.
    #[must_use]
    pub const fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    /// The current variant, looked up in `product`.
    #[must_use]
    pub fn current_variant<'p>(&self, product: &'p Product) -> Option<&'p Variant> {
        self.current.as_ref().and_then(|id| product.variant(id))
    }

    /// The add-to-cart target, with availability spelled out.
    #[must_use]
    pub fn add_target<'p>(&self, product: &'p Product) -> AddTarget<'p> {
        match self.current_variant(product) {
            Some(variant) if variant.available_for_sale => AddTarget::Ready(variant),
            Some(variant) => AddTarget::Unavailable(variant),
            None => AddTarget::NoVariant,
        }
    }

    /// Option pills with selected/selectable flags for the current selection.
    #[must_use]
    pub fn options(&self, product: &Product) -> Vec<OptionAvailability> {
        variants::option_availability(product, &self.selected)
    }

    fn select_variant(&mut self, variant: &Variant, options: SelectedOptions) {
        self.selected = options;
        self.current = Some(variant.id.clone());
        if let Some(image) = &variant.image {
            self.image = Some(image.clone());
        }
    }
}
