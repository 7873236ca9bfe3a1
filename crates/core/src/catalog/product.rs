//! Catalog products and their per-account rules.

use serde::{Deserialize, Serialize};

use super::ordered::{OrderedMap, Text};
use crate::pricing::{Inflation, PriceTable, resolve_unit_price};
use crate::settings::ShopSettings;
use crate::{AccountType, Money, ProductId};

/// Image used when a product has neither an image map entry nor an image.
pub const DEFAULT_IMAGE: &str = "img/default-balloon.jpg";

/// Option groups as written in the catalog (`"numbers": [0, 1, 2]`).
pub type ProductOptions = OrderedMap<Vec<Text>>;

/// Images keyed by color, then by number.
pub type ImageMap = OrderedMap<OrderedMap<String>>;

/// Options chosen for a cart line, keyed by normalized option name.
pub type SelectedOptions = OrderedMap<String>;

/// Wholesale minimum quantities for categories without a product-level rule.
const CATEGORY_MINIMUMS: &[(&str, u32)] = &[
    ("NUMBER BALLOONS", 5),
    ("18\" foil balloon", 10),
    ("LETTER BALLOONS", 5),
    ("34\" foil balloon", 50),
    ("12\" latex balloon", 1),
    ("Standard", 50),
    ("Clearance", 1),
];

/// A product from `web.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub prices: PriceTable,
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub options: ProductOptions,
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub image_map: ImageMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_order_quantity: Option<u32>,
    #[serde(default = "default_true")]
    pub show_in_retail: bool,
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub details: OrderedMap<Text>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

const fn default_true() -> bool {
    true
}

/// How an option group is presented on the product page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Swatch picker.
    Color,
    /// Drop-down.
    Select,
}

/// An option group with its normalized name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGroup<'a> {
    /// Normalized key (`number`, `color`, `design`, ...).
    pub key: String,
    pub label: String,
    pub kind: OptionKind,
    pub values: &'a [Text],
}

/// Normalize plural option keys to the singular form used in cart lines.
#[must_use]
pub fn normalize_option_key(key: &str) -> String {
    match key {
        "numbers" => "number".to_string(),
        "colors" => "color".to_string(),
        "designs" => "design".to_string(),
        other => other.to_string(),
    }
}

fn option_label(key: &str) -> String {
    let mut chars = key.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

impl Product {
    /// Whether an account may see this product.
    ///
    /// Retail shoppers (including anonymous visitors) don't see
    /// wholesale-exclusive products; wholesale and admin accounts see all.
    #[must_use]
    pub const fn visible_to(&self, account: AccountType) -> bool {
        self.show_in_retail || !matches!(account, AccountType::Retail)
    }

    /// Whether the shopper must visit the product page to choose options.
    #[must_use]
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// Option groups in document order with normalized keys.
    #[must_use]
    pub fn option_groups(&self) -> Vec<OptionGroup<'_>> {
        self.options
            .iter()
            .map(|(key, values)| {
                let key = normalize_option_key(key);
                let kind = if key == "color" {
                    OptionKind::Color
                } else {
                    OptionKind::Select
                };
                OptionGroup {
                    label: option_label(&key),
                    key,
                    kind,
                    values: values.as_slice(),
                }
            })
            .collect()
    }

    /// Keep only selections that name a real option value, and default each
    /// group to its first value when nothing valid was chosen.
    #[must_use]
    pub fn sanitize_options(&self, chosen: &SelectedOptions) -> SelectedOptions {
        self.option_groups()
            .into_iter()
            .filter_map(|group| {
                let picked = chosen
                    .get(&group.key)
                    .filter(|value| group.values.iter().any(|v| v.as_str() == value.as_str()))
                    .cloned()
                    .or_else(|| group.values.first().map(|v| v.as_str().to_string()))?;
                Some((group.key, picked))
            })
            .collect()
    }

    /// Unit price for this shopper.
    #[must_use]
    pub fn unit_price(
        &self,
        account: AccountType,
        inflation: Inflation,
        settings: &ShopSettings,
    ) -> Money {
        resolve_unit_price(&self.prices, account, inflation, settings)
    }

    /// Minimum quantity this account must buy.
    ///
    /// Only wholesale accounts have minimums. The product's own rule wins, then
    /// its category's rule, then the shop default.
    #[must_use]
    pub fn minimum_order(&self, account: AccountType, settings: &ShopSettings) -> u32 {
        if !account.is_wholesale() {
            return 1;
        }

        if let Some(min) = self.minimum_order_quantity.filter(|min| *min > 0) {
            return min;
        }

        CATEGORY_MINIMUMS
            .iter()
            .find(|(category, _)| *category == self.category)
            .map_or_else(|| settings.default_minimum_order(), |(_, min)| *min)
    }

    fn fallback_image(&self) -> &str {
        self.image
            .as_deref()
            .filter(|image| !image.is_empty())
            .unwrap_or(DEFAULT_IMAGE)
    }

    /// Image for listings: the first color at the default number.
    #[must_use]
    pub fn listing_image(&self) -> &str {
        let default_number = self
            .options
            .get("numbers")
            .or_else(|| self.options.get("number"))
            .and_then(|values| values.first())
            .map_or("0", Text::as_str);

        self.image_map
            .first()
            .and_then(|(_, numbers)| numbers.get(default_number))
            .map_or_else(|| self.fallback_image(), String::as_str)
    }

    /// Image for a chosen color and number.
    ///
    /// Falls back to the first image of the chosen color, then to the plain
    /// product image.
    #[must_use]
    pub fn option_image(&self, selected: &SelectedOptions) -> &str {
        let colors = selected
            .get("color")
            .and_then(|color| self.image_map.get(color))
            .or_else(|| self.image_map.first().map(|(_, numbers)| numbers));

        let Some(numbers) = colors else {
            return self.fallback_image();
        };

        let number = selected.get("number").map_or("0", String::as_str);
        numbers
            .get(number)
            .or_else(|| numbers.first().map(|(_, image)| image))
            .map_or_else(|| self.fallback_image(), String::as_str)
    }

    /// Case-insensitive match against name, description, and category.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [&self.name, &self.description, &self.category]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    /// Category with catalog escape backslashes removed.
    #[must_use]
    pub fn clean_category(&self) -> String {
        self.category.replace('\\', "")
    }
}
