//! Order and wholesale request storage.

use balloon_fiesta_core::OrderId;
use balloon_fiesta_core::order::{Order, WholesaleRequest};

use super::{LocalStore, StorageError, keys};

/// Repository for placed orders.
pub struct OrderRepository<'a> {
    store: &'a LocalStore,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(store: &'a LocalStore) -> Self {
        Self { store }
    }

    /// All orders, oldest first.
    pub async fn list(&self) -> Vec<Order> {
        self.store.read_list(keys::ORDERS).await
    }

    /// Look up an order by its reference.
    pub async fn find(&self, order_id: &OrderId) -> Option<Order> {
        self.list().await.into_iter().find(|o| &o.order_id == order_id)
    }

    /// Append an order and return it as stored.
    ///
    /// An order whose reference is already taken is moved to the next free
    /// millisecond.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialize` if the order list can't be encoded.
    pub async fn append(&self, mut order: Order) -> Result<Order, StorageError> {
        self.store
            .update_list(keys::ORDERS, |orders: &mut Vec<Order>| {
                while orders.iter().any(|o| o.order_id == order.order_id) {
                    order.order_id = order.order_id.successor();
                }
                orders.push(order.clone());
                Ok(order)
            })
            .await
    }
}

/// Repository for wholesale account requests.
pub struct WholesaleRequestRepository<'a> {
    store: &'a LocalStore,
}

impl<'a> WholesaleRequestRepository<'a> {
    /// Create a new wholesale request repository.
    #[must_use]
    pub const fn new(store: &'a LocalStore) -> Self {
        Self { store }
    }

    /// All requests, oldest first.
    pub async fn list(&self) -> Vec<WholesaleRequest> {
        self.store.read_list(keys::WHOLESALE_REQUESTS).await
    }

    /// Append a request and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialize` if the request list can't be encoded.
    pub async fn append(&self, mut request: WholesaleRequest) -> Result<WholesaleRequest, StorageError> {
        self.store
            .update_list(keys::WHOLESALE_REQUESTS, |requests: &mut Vec<WholesaleRequest>| {
                while requests.iter().any(|r| r.id == request.id) {
                    request.id = request.id.successor();
                }
                requests.push(request.clone());
                Ok(request)
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use balloon_fiesta_core::order::WholesaleRequestForm;
    use chrono::NaiveDateTime;

    fn order(id: &str) -> Order {
        serde_json::from_value(serde_json::json!({
            "orderId": id,
            "date": "2026-01-05T10:30:00",
            "accountType": "retail",
            "name": "Maria",
            "email": "maria@example.com",
            "address": "12 Main St",
            "phone": "5551234567",
            "cart": [],
            "subtotal": "10.00",
            "shipping": "0.00",
            "total": "10.00"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_append_and_find() {
        let store = LocalStore::new();
        let repo = OrderRepository::new(&store);

        repo.append(order("ORD-1000")).await.unwrap();
        repo.append(order("ORD-2000")).await.unwrap();

        let ids: Vec<String> = repo
            .list()
            .await
            .iter()
            .map(|o| o.order_id.to_string())
            .collect();
        assert_eq!(ids, vec!["ORD-1000", "ORD-2000"]);
        assert!(repo.find(&OrderId::from_string("ORD-2000")).await.is_some());
        assert!(repo.find(&OrderId::from_string("ORD-3000")).await.is_none());
    }

    #[tokio::test]
    async fn test_colliding_reference_moves_forward() {
        let store = LocalStore::new();
        let repo = OrderRepository::new(&store);

        repo.append(order("ORD-1000")).await.unwrap();
        let second = repo.append(order("ORD-1000")).await.unwrap();
        assert_eq!(second.order_id.as_str(), "ORD-1001");
    }

    #[tokio::test]
    async fn test_wholesale_requests_append() {
        let store = LocalStore::new();
        let repo = WholesaleRequestRepository::new(&store);
        let form = WholesaleRequestForm {
            business_name: "Party Co".to_string(),
            contact_name: "Lee".to_string(),
            email: "lee@party.example".to_string(),
            phone: "5551234567".to_string(),
            business_address: "1 Market St".to_string(),
            business_type: "event-planner".to_string(),
            tax_id: "TX-123".to_string(),
            expected_volume: "100-500".to_string(),
            additional_info: String::new(),
        };
        let now = NaiveDateTime::parse_from_str("2026-01-05 10:00", "%Y-%m-%d %H:%M").unwrap();

        let first = repo.append(form.validate(now).unwrap()).await.unwrap();
        let second = repo.append(form.validate(now).unwrap()).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(repo.list().await.len(), 2);
    }
}
