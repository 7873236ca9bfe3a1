//! Shopping cart lines, merging, minimums, and totals.
//!
//! A cart line snapshots the product fields the cart page needs, so the cart
//! still renders if a product later disappears from the catalog. Prices are
//! not trusted from the snapshot: [`Cart::reprice`] recomputes every line for
//! the current shopper before the cart is shown or checked out, so the price
//! on the cart page is the price on the order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, Product, SelectedOptions};
use crate::pricing::{Inflation, PriceTable, has_inflation_choice, resolve_unit_price};
use crate::settings::ShopSettings;
use crate::{AccountType, Money, ProductId};

/// Errors from cart edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("cart line {0} does not exist")]
    NoSuchLine(usize),

    #[error("Minimum order for this item is {min_order} units")]
    BelowMinimum { min_order: u32 },
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub image: String,
    /// Price per unit for the shopper who last viewed the cart.
    pub unit_price: Money,
    /// Price sources, kept so lines can be repriced without the catalog.
    #[serde(default)]
    pub prices: PriceTable,
    pub quantity: u32,
    #[serde(default)]
    pub selected_options: SelectedOptions,
    /// Inflation choice; `None` for products without one.
    #[serde(default)]
    pub inflation: Option<Inflation>,
    pub min_order: u32,
    #[serde(default)]
    pub stock: Option<u32>,
}

impl CartItem {
    /// Build a line for a product as the given shopper sees it.
    ///
    /// Options are sanitized against the product, and the inflation choice is
    /// dropped for shoppers who aren't offered one.
    #[must_use]
    pub fn from_product(
        product: &Product,
        account: AccountType,
        settings: &ShopSettings,
        quantity: u32,
        selected_options: &SelectedOptions,
        inflation: Inflation,
    ) -> Self {
        let selected_options = product.sanitize_options(selected_options);
        let inflation = has_inflation_choice(&product.prices, account).then_some(inflation);
        Self {
            product_id: product.id,
            name: product.name.clone(),
            category: product.category.clone(),
            image: product.option_image(&selected_options).to_string(),
            unit_price: product.unit_price(account, inflation.unwrap_or_default(), settings),
            prices: product.prices.clone(),
            quantity,
            selected_options,
            inflation,
            min_order: product.minimum_order(account, settings),
            stock: product.stock,
        }
    }

    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }

    /// Lines are the same purchase if product, options, and inflation match.
    #[must_use]
    pub fn same_line(&self, other: &Self) -> bool {
        self.product_id == other.product_id
            && self.selected_options == other.selected_options
            && self.inflation == other.inflation
    }

    #[must_use]
    pub const fn below_minimum(&self) -> bool {
        self.quantity < self.min_order
    }

    /// Option tags for display, e.g. `["color: gold", "number: 7"]`.
    #[must_use]
    pub fn option_tags(&self) -> Vec<String> {
        self.selected_options
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .chain(self.inflation.map(|i| i.label().to_string()))
            .collect()
    }
}

/// What a quantity change did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityChange {
    Updated { quantity: u32 },
    Removed { name: String },
}

/// A line whose quantity was lowered to the available stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAdjustment {
    pub name: String,
    pub stock: u32,
}

/// The shopper's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a line, merging into an existing line for the same purchase.
    ///
    /// Returns the quantity of the resulting line.
    pub fn add(&mut self, item: CartItem) -> u32 {
        if let Some(existing) = self.items.iter_mut().find(|line| line.same_line(&item)) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
            existing.quantity
        } else {
            let quantity = item.quantity;
            self.items.push(item);
            quantity
        }
    }

    /// Change a line's quantity by `delta`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NoSuchLine` for an unknown index, and
    /// `CartError::BelowMinimum` when a wholesale shopper would drop below the
    /// line's minimum.
    pub fn change_quantity(
        &mut self,
        index: usize,
        delta: i64,
        account: AccountType,
    ) -> Result<QuantityChange, CartError> {
        let item = self.items.get_mut(index).ok_or(CartError::NoSuchLine(index))?;
        let new_quantity = i64::from(item.quantity).saturating_add(delta);

        if account.is_wholesale() && new_quantity < i64::from(item.min_order) {
            return Err(CartError::BelowMinimum {
                min_order: item.min_order,
            });
        }

        if new_quantity <= 0 {
            let removed = self.items.remove(index);
            return Ok(QuantityChange::Removed { name: removed.name });
        }

        let quantity = u32::try_from(new_quantity).unwrap_or(u32::MAX);
        item.quantity = quantity;
        Ok(QuantityChange::Updated { quantity })
    }

    /// Remove a line, returning it.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NoSuchLine` for an unknown index.
    pub fn remove(&mut self, index: usize) -> Result<CartItem, CartError> {
        if index >= self.items.len() {
            return Err(CartError::NoSuchLine(index));
        }
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total number of units.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |sum, item| sum.saturating_add(item.quantity))
    }

    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Lines under their minimum. Only wholesale carts have minimums.
    #[must_use]
    pub fn items_below_minimum(&self, account: AccountType) -> Vec<&CartItem> {
        if !account.is_wholesale() {
            return Vec::new();
        }
        self.items.iter().filter(|item| item.below_minimum()).collect()
    }

    /// Recompute prices and minimums for the current shopper.
    ///
    /// Lines whose product is still in the catalog pick up its current price
    /// sources and stock; others are repriced from their snapshot. Inflation
    /// choices are dropped for shoppers who aren't offered one and defaulted
    /// for shoppers who are. Lines that become identical are merged.
    pub fn reprice(&mut self, catalog: &Catalog, account: AccountType) {
        let settings = catalog.settings();
        let items = std::mem::take(&mut self.items);

        for mut item in items {
            if let Some(product) = catalog.find(item.product_id) {
                item.prices = product.prices.clone();
                item.stock = product.stock;
                item.min_order = product.minimum_order(account, settings);
            } else if !account.is_wholesale() {
                item.min_order = 1;
            }

            item.inflation = has_inflation_choice(&item.prices, account)
                .then(|| item.inflation.unwrap_or_default());
            item.unit_price = resolve_unit_price(
                &item.prices,
                account,
                item.inflation.unwrap_or_default(),
                settings,
            );
            self.add(item);
        }
    }

    /// Lower quantities that exceed known stock.
    pub fn clamp_to_stock(&mut self) -> Vec<StockAdjustment> {
        self.items
            .iter_mut()
            .filter_map(|item| {
                let stock = item.stock?;
                (item.quantity > stock).then(|| {
                    item.quantity = stock;
                    StockAdjustment {
                        name: item.name.clone(),
                        stock,
                    }
                })
            })
            .collect()
    }

    /// Drop lines whose quantity became zero (e.g. out of stock).
    pub fn retain_nonempty(&mut self) {
        self.items.retain(|item| item.quantity > 0);
    }
}

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fulfillment {
    /// Retail and admin orders are picked up in store.
    Pickup,
    /// Wholesale orders ship.
    Shipping,
}

/// Subtotal, shipping, and total for a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartTotals {
    pub item_count: u32,
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
    pub fulfillment: Fulfillment,
    /// Amount a wholesale shopper must add to ship for free.
    pub free_shipping_remaining: Option<Money>,
}

impl CartTotals {
    #[must_use]
    pub fn compute(cart: &Cart, account: AccountType, settings: &ShopSettings) -> Self {
        let subtotal = cart.subtotal();
        let item_count = cart.count();

        if !account.is_wholesale() {
            return Self {
                item_count,
                subtotal,
                shipping: Money::ZERO,
                total: subtotal,
                fulfillment: Fulfillment::Pickup,
                free_shipping_remaining: None,
            };
        }

        let threshold = settings.free_shipping_threshold();
        let shipping = if subtotal >= threshold {
            Money::ZERO
        } else {
            settings.shipping_fee()
        };
        let free_shipping_remaining =
            (subtotal > Money::ZERO && subtotal < threshold).then(|| threshold - subtotal);

        Self {
            item_count,
            subtotal,
            shipping,
            total: subtotal + shipping,
            fulfillment: Fulfillment::Shipping,
            free_shipping_remaining,
        }
    }

    /// Shipping column text: `Pickup`, `FREE`, or the fee.
    #[must_use]
    pub fn shipping_label(&self) -> String {
        match self.fulfillment {
            Fulfillment::Pickup => "Pickup".to_string(),
            Fulfillment::Shipping if self.shipping.is_zero() => "FREE".to_string(),
            Fulfillment::Shipping => self.shipping.to_string(),
        }
    }
}
