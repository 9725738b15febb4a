//! The pending, unsubmitted purchase selection.
//!
//! [`Cart`] is the pure model: an ordered list of lines with the mutation
//! rules of the marketplace (re-adding increments, quantities floor at 1,
//! checkout clears one provider group at a time). Persistence and change
//! notification live in the storefront crate; nothing here does I/O.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{MealId, ProviderId};

/// Display label for the bucket of lines whose meal has no provider.
pub const UNKNOWN_PROVIDER: &str = "unknown";

/// One cart line: a meal reference plus a display snapshot captured at
/// add time.
///
/// The snapshot (`name`, `price`, `image`) is never refreshed from the
/// catalog; a stale name or price is tolerated until checkout, when the
/// backend reprices the order authoritatively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Meal identifier; unique within the cart.
    pub id: MealId,
    /// Seller grouping; `None` lands in the unknown bucket.
    #[serde(default)]
    pub provider_id: Option<ProviderId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    pub qty: u32,
}

impl CartLine {
    /// Line subtotal (`price * qty`).
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.qty)
    }
}

/// Snapshot of a meal at add-to-cart time.
#[derive(Debug, Clone)]
pub struct MealSnapshot {
    pub id: MealId,
    pub provider_id: Option<ProviderId>,
    pub name: String,
    pub price: Decimal,
    pub image: Option<String>,
}

/// A provider's slice of the cart, as rendered on the cart page.
#[derive(Debug)]
pub struct ProviderGroup<'a> {
    /// `None` is the unknown bucket.
    pub provider_id: Option<&'a ProviderId>,
    pub lines: Vec<&'a CartLine>,
}

impl ProviderGroup<'_> {
    /// Subtotal across the group's lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(|line| line.subtotal()).sum()
    }
}

/// The ordered list of cart lines.
///
/// Serializes transparently as a JSON array, which is exactly the record
/// the storefront persists under its fixed storage key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of items (sum of quantities), for the badge.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.qty).sum()
    }

    /// Total across all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Add one unit of a meal.
    ///
    /// If a line with the same meal id already exists its quantity is
    /// incremented by 1 (a stored quantity of 0 counts as 1 first);
    /// otherwise a new line with `qty = 1` is appended.
    pub fn add(&mut self, snapshot: MealSnapshot) {
        match self.lines.iter_mut().find(|line| line.id == snapshot.id) {
            Some(line) => line.qty = line.qty.max(1) + 1,
            None => self.lines.push(CartLine {
                id: snapshot.id,
                provider_id: snapshot.provider_id,
                name: snapshot.name,
                price: snapshot.price,
                image: snapshot.image,
                qty: 1,
            }),
        }
    }

    /// Remove the line with the given meal id, if present.
    pub fn remove(&mut self, id: &MealId) {
        self.lines.retain(|line| line.id != *id);
    }

    /// Set a line's quantity, floored at 1. Unknown ids are ignored.
    pub fn set_qty(&mut self, id: &MealId, qty: u32) {
        if let Some(line) = self.lines.iter_mut().find(|line| line.id == *id) {
            line.qty = qty.max(1);
        }
    }

    /// Remove every line belonging to the given provider.
    ///
    /// `None` clears the unknown bucket. Used after that provider's items
    /// have been submitted as an order.
    pub fn clear_for_provider(&mut self, provider_id: Option<&ProviderId>) {
        self.lines
            .retain(|line| line.provider_id.as_ref() != provider_id);
    }

    /// Group lines by provider, preserving first-seen provider order.
    #[must_use]
    pub fn group_by_provider(&self) -> Vec<ProviderGroup<'_>> {
        let mut groups: Vec<ProviderGroup<'_>> = Vec::new();
        for line in &self.lines {
            let provider_id = line.provider_id.as_ref();
            match groups
                .iter_mut()
                .find(|group| group.provider_id == provider_id)
            {
                Some(group) => group.lines.push(line),
                None => groups.push(ProviderGroup {
                    provider_id,
                    lines: vec![line],
                }),
            }
        }
        groups
    }
}
