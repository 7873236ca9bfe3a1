//! Placed orders, the admin order views, and wholesale account requests.

use std::fmt::Write as _;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::{Cart, CartItem, CartTotals};
use crate::checkout::{CheckoutError, ValidCheckout};
use crate::hours;
use crate::{
    AccountType, Email, Money, OrderId, OrderStatus, PaymentStatus, Phone, WholesaleRequestId,
    WholesaleRequestStatus,
};

/// An order as stored in the shop's order list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    /// Shop-local time the order was placed.
    pub date: NaiveDateTime,
    pub account_type: AccountType,
    pub name: String,
    pub email: Email,
    pub address: String,
    pub phone: Phone,
    pub cart: Vec<CartItem>,
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_hours_message: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDateTime>,
}

impl Order {
    /// Build a pending order from a validated checkout.
    ///
    /// Pickup orders record the store status at the time of ordering.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` for an empty cart.
    pub fn place(
        checkout: ValidCheckout,
        cart: &Cart,
        totals: &CartTotals,
        account_type: AccountType,
        now: NaiveDateTime,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let store = checkout.pickup.map(|_| hours::status(now));

        Ok(Self {
            order_id: OrderId::generate(now.and_utc()),
            date: now,
            account_type,
            name: checkout.name,
            email: checkout.email,
            address: checkout.address,
            phone: checkout.phone,
            cart: cart.items().to_vec(),
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            total: totals.total,
            pickup_date: checkout.pickup.map(|p| p.date),
            pickup_time: checkout.pickup.map(|p| p.time),
            store_status: store.as_ref().map(|s| s.as_str().to_string()),
            store_hours_message: store.as_ref().map(hours::StoreStatus::message),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_date: None,
        })
    }

    /// Total number of units ordered.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart
            .iter()
            .fold(0u32, |sum, item| sum.saturating_add(item.quantity))
    }

    /// `Gold 0 (x2); Latex Pack (x1)`.
    #[must_use]
    pub fn items_summary(&self) -> String {
        self.cart
            .iter()
            .map(|item| format!("{} (x{})", item.name, item.quantity))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Date as shown in the admin list and export, e.g. `1/5/2026, 2:30:00 PM`.
    #[must_use]
    pub fn display_date(&self) -> String {
        self.date.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
    }

    #[must_use]
    pub fn pickup_time_label(&self) -> Option<String> {
        self.pickup_time.map(hours::format_clock)
    }
}

/// Orders matching an optional status, newest first.
#[must_use]
pub fn filter_by_status(orders: &[Order], status: Option<OrderStatus>) -> Vec<&Order> {
    let mut matching: Vec<&Order> = orders
        .iter()
        .filter(|order| status.is_none_or(|s| order.status == s))
        .collect();
    matching.sort_by(|a, b| b.date.cmp(&a.date));
    matching
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Export orders as CSV, in stored order.
#[must_use]
pub fn orders_to_csv(orders: &[Order]) -> String {
    let mut csv = String::from("OrderID,CustomerName,CustomerEmail,OrderDate,Status,Total,Items\n");
    for order in orders {
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{},\"{}\"",
            csv_field(order.order_id.as_str()),
            csv_field(&order.name),
            csv_field(order.email.as_str()),
            csv_field(&order.display_date()),
            order.status,
            order.total.plain(),
            order.items_summary().replace('"', "\"\""),
        );
    }
    csv
}

/// An order in a customer's history, numbered from `#001`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerOrder<'a> {
    pub number: String,
    pub order: &'a Order,
}

/// A customer's orders in the order they were placed.
#[must_use]
pub fn orders_for_customer<'a>(orders: &'a [Order], email: &str) -> Vec<CustomerOrder<'a>> {
    orders
        .iter()
        .filter(|order| order.email.matches(email))
        .enumerate()
        .map(|(index, order)| CustomerOrder {
            number: format!("#{:03}", index + 1),
            order,
        })
        .collect()
}

/// Why a wholesale account request was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WholesaleRequestError {
    #[error("Please fill in all required fields")]
    MissingFields,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please enter a valid phone number")]
    InvalidPhone,

    #[error("Please enter a valid Tax ID or Business Number (minimum 3 characters)")]
    InvalidTaxId,
}

/// The wholesale account request form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WholesaleRequestForm {
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub business_address: String,
    #[serde(default)]
    pub business_type: String,
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub expected_volume: String,
    #[serde(default)]
    pub additional_info: String,
}

/// A submitted wholesale account request awaiting review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WholesaleRequest {
    pub id: WholesaleRequestId,
    pub business_name: String,
    pub contact_name: String,
    pub email: Email,
    pub phone: Phone,
    pub business_address: String,
    pub business_type: String,
    pub tax_id: String,
    pub expected_volume: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
    pub request_date: NaiveDateTime,
    #[serde(default)]
    pub status: WholesaleRequestStatus,
}

impl WholesaleRequestForm {
    /// Validate the form into a pending request.
    ///
    /// # Errors
    ///
    /// Every field except the additional information is required. The email
    /// and phone must be valid and the tax id at least three characters.
    pub fn validate(&self, now: NaiveDateTime) -> Result<WholesaleRequest, WholesaleRequestError> {
        let required = [
            &self.business_name,
            &self.contact_name,
            &self.email,
            &self.phone,
            &self.business_type,
            &self.tax_id,
            &self.expected_volume,
            &self.business_address,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(WholesaleRequestError::MissingFields);
        }

        let email = Email::parse(&self.email).map_err(|_| WholesaleRequestError::InvalidEmail)?;
        let phone = Phone::parse(&self.phone).map_err(|_| WholesaleRequestError::InvalidPhone)?;

        let tax_id = self.tax_id.trim();
        if tax_id.chars().count() < 3 {
            return Err(WholesaleRequestError::InvalidTaxId);
        }

        let additional_info = Some(self.additional_info.trim())
            .filter(|info| !info.is_empty())
            .map(str::to_string);

        Ok(WholesaleRequest {
            id: WholesaleRequestId::generate(now.and_utc()),
            business_name: self.business_name.trim().to_string(),
            contact_name: self.contact_name.trim().to_string(),
            email,
            phone,
            business_address: self.business_address.trim().to_string(),
            business_type: self.business_type.trim().to_string(),
            tax_id: tax_id.to_string(),
            expected_volume: self.expected_volume.trim().to_string(),
            additional_info,
            request_date: now,
            status: WholesaleRequestStatus::Pending,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, SelectedOptions};
    use crate::checkout::CheckoutForm;
    use crate::pricing::Inflation;
    use crate::ProductId;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2026-01-05 09:00", "%Y-%m-%d %H:%M").unwrap()
    }

    fn cart() -> (Cart, Catalog) {
        let catalog = Catalog::from_json(
            r#"[{"products": [
                {"id": 1, "name": "Gold Star", "price": 4},
                {"id": 2, "name": "Banner, \"Happy\"", "price": 6}
            ]}]"#,
        )
        .unwrap()
        .catalog;
        let mut cart = Cart::new();
        for (id, qty) in [(1, 2), (2, 1)] {
            let product = catalog.find(ProductId::new(id)).unwrap();
            cart.add(CartItem::from_product(
                product,
                AccountType::Retail,
                catalog.settings(),
                qty,
                &SelectedOptions::new(),
                Inflation::Uninflated,
            ));
        }
        (cart, catalog)
    }

    fn order_at(date: &str, email: &str, status: OrderStatus) -> Order {
        let (cart, catalog) = cart();
        let now = NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M").unwrap();
        let form = CheckoutForm {
            name: "Ada, L.".to_string(),
            email: email.to_string(),
            address: "1 Main St".to_string(),
            phone: "5551234567".to_string(),
            ..CheckoutForm::default()
        };
        let checkout = form.validate(AccountType::Wholesale, now).unwrap();
        let totals = CartTotals::compute(&cart, AccountType::Wholesale, catalog.settings());
        let mut order = Order::place(checkout, &cart, &totals, AccountType::Wholesale, now).unwrap();
        order.status = status;
        order
    }

    #[test]
    fn test_place_retail_pickup_order() {
        let (cart, catalog) = cart();
        let form = CheckoutForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            address: "1 Main St".to_string(),
            phone: "5551234567".to_string(),
            pickup_date: Some("2026-01-05".to_string()),
            pickup_time: Some("12:00".to_string()),
        };
        let checkout = form.validate(AccountType::Retail, now()).unwrap();
        let totals = CartTotals::compute(&cart, AccountType::Retail, catalog.settings());
        let order = Order::place(checkout, &cart, &totals, AccountType::Retail, now()).unwrap();

        assert!(order.order_id.as_str().starts_with("ORD-"));
        assert_eq!(order.total, Money::from_cents(1400));
        assert_eq!(order.shipping, Money::ZERO);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.store_status.as_deref(), Some("closed"));
        assert_eq!(order.pickup_time_label().as_deref(), Some("12:00 PM"));
        assert_eq!(order.item_count(), 3);
    }

    #[test]
    fn test_place_rejects_empty_cart() {
        let form = CheckoutForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            address: "1 Main St".to_string(),
            phone: "5551234567".to_string(),
            ..CheckoutForm::default()
        };
        let checkout = form.validate(AccountType::Wholesale, now()).unwrap();
        let cart = Cart::new();
        let totals = CartTotals::compute(&cart, AccountType::Wholesale, &crate::ShopSettings::default());
        assert_eq!(
            Order::place(checkout, &cart, &totals, AccountType::Wholesale, now()),
            Err(CheckoutError::EmptyCart)
        );
    }

    #[test]
    fn test_wholesale_order_has_no_pickup() {
        let order = order_at("2026-01-05 09:00", "ada@example.com", OrderStatus::Pending);
        assert_eq!(order.pickup_date, None);
        assert_eq!(order.store_status, None);
        assert_eq!(order.shipping, Money::from_cents(499));
    }

    #[test]
    fn test_filter_by_status_newest_first() {
        let orders = vec![
            order_at("2026-01-05 09:00", "a@example.com", OrderStatus::Pending),
            order_at("2026-01-07 09:00", "b@example.com", OrderStatus::Completed),
            order_at("2026-01-06 09:00", "c@example.com", OrderStatus::Pending),
        ];

        let all: Vec<&str> = filter_by_status(&orders, None).iter().map(|o| o.email.as_str()).collect();
        assert_eq!(all, ["b@example.com", "c@example.com", "a@example.com"]);

        let pending = filter_by_status(&orders, Some(OrderStatus::Pending));
        assert_eq!(pending.len(), 2);
        assert!(filter_by_status(&orders, Some(OrderStatus::Cancelled)).is_empty());
    }

    #[test]
    fn test_orders_to_csv_quotes_fields() {
        let order = order_at("2026-01-05 14:30", "ada@example.com", OrderStatus::Pending);
        let csv = orders_to_csv(std::slice::from_ref(&order));
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("OrderID,CustomerName,CustomerEmail,OrderDate,Status,Total,Items")
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with(&format!("{},\"Ada, L.\",ada@example.com,\"1/5/2026, 2:30:00 PM\",pending,18.99,", order.order_id)));
        assert!(row.ends_with(r#""Gold Star (x2); Banner, ""Happy"" (x1)""#));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_orders_for_customer_numbering() {
        let orders = vec![
            order_at("2026-01-05 09:00", "ada@example.com", OrderStatus::Pending),
            order_at("2026-01-06 09:00", "bob@example.com", OrderStatus::Pending),
            order_at("2026-01-07 09:00", "ADA@example.com", OrderStatus::Pending),
        ];
        let history = orders_for_customer(&orders, "ada@example.com");
        let numbers: Vec<&str> = history.iter().map(|o| o.number.as_str()).collect();
        assert_eq!(numbers, ["#001", "#002"]);
        assert!(orders_for_customer(&orders, "nobody@example.com").is_empty());
    }

    fn request_form() -> WholesaleRequestForm {
        WholesaleRequestForm {
            business_name: "Party Co".to_string(),
            contact_name: "Sam".to_string(),
            email: "sam@party.example".to_string(),
            phone: "555-123-4567".to_string(),
            business_address: "2 Side St".to_string(),
            business_type: "event-planner".to_string(),
            tax_id: "12-345".to_string(),
            expected_volume: "500-1000".to_string(),
            additional_info: "  ".to_string(),
        }
    }

    #[test]
    fn test_wholesale_request_validation() {
        let request = request_form().validate(now()).unwrap();
        assert!(request.id.as_str().starts_with("REQ-"));
        assert_eq!(request.status, WholesaleRequestStatus::Pending);
        assert_eq!(request.additional_info, None);

        let missing = WholesaleRequestForm {
            business_address: String::new(),
            ..request_form()
        };
        assert_eq!(missing.validate(now()), Err(WholesaleRequestError::MissingFields));

        let bad_email = WholesaleRequestForm {
            email: "sam@".to_string(),
            ..request_form()
        };
        assert_eq!(bad_email.validate(now()), Err(WholesaleRequestError::InvalidEmail));

        let short_tax = WholesaleRequestForm {
            tax_id: "12".to_string(),
            ..request_form()
        };
        let err = short_tax.validate(now()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please enter a valid Tax ID or Business Number (minimum 3 characters)"
        );
    }
}
