//! Stepped quantity picker.
//!
//! Packaging is sold in lots: the product page steps the quantity in fixed
//! increments and never lets it drop below the minimum lot.

use std::num::NonZeroU32;

/// Quantity chosen on a product page before add-to-cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityPicker {
    value: NonZeroU32,
    step: NonZeroU32,
    min: NonZeroU32,
}

impl QuantityPicker {
    /// Create a picker starting at `initial`, raised to `min` if below it.
    #[must_use]
    pub fn new(initial: NonZeroU32, step: NonZeroU32, min: NonZeroU32) -> Self {
        Self {
            value: initial.max(min),
            step,
            min,
        }
    }

    /// Current quantity.
    #[must_use]
    pub const fn value(&self) -> NonZeroU32 {
        self.value
    }

    /// Add one step, saturating at `u32::MAX`.
    pub fn increment(&mut self) -> NonZeroU32 {
        self.value = self.value.saturating_add(self.step.get());
        self.value
    }

    /// Remove one step, never going below the minimum.
    pub fn decrement(&mut self) -> NonZeroU32 {
        let lowered = self.value.get().saturating_sub(self.step.get());
        self.value = NonZeroU32::new(lowered).map_or(self.min, |v| v.max(self.min));
        self.value
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn nz(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn test_steps_in_lots() {
        let mut picker = QuantityPicker::new(nz(500), nz(100), nz(100));
        assert_eq!(picker.increment().get(), 600);
        assert_eq!(picker.decrement().get(), 500);
        assert_eq!(picker.decrement().get(), 400);
    }

    #[test]
    fn test_never_below_minimum() {
        let mut picker = QuantityPicker::new(nz(200), nz(100), nz(100));
        assert_eq!(picker.decrement().get(), 100);
        assert_eq!(picker.decrement().get(), 100);
    }

    #[test]
    fn test_initial_raised_to_minimum() {
        let picker = QuantityPicker::new(nz(1), nz(100), nz(100));
        assert_eq!(picker.value().get(), 100);
    }

    #[test]
    fn test_step_larger_than_value() {
        let mut picker = QuantityPicker::new(nz(5), nz(10), nz(1));
        assert_eq!(picker.decrement().get(), 1);
    }
}
