//! Notification contract
//!
//! After a committed submit/match or cancellation the core hands the
//! caller a resource-scoped book-update event. Delivery and transport
//! belong to the notification sink; a failed delivery never rolls back
//! the committed trade.

use serde::{Deserialize, Serialize};
use types::ids::ResourceId;
use types::order::BookView;

/// Emitted after a transaction that changed a resource's book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookUpdated {
    pub resource_id: ResourceId,
    /// Current open orders, each annotated with remaining quantity.
    pub book: BookView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = BookUpdated {
            resource_id: ResourceId::new(3),
            book: BookView::default(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"resource_id\":3"));
        let back: BookUpdated = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
