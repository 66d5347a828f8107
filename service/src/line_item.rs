use std::sync::Arc;

use mockall::automock;

use crate::booking::{BookingKind, LineItem};

#[automock]
pub trait LineItemNormalizer {
    /// Merges line items which share a service. The first item of a service
    /// keeps its position and receives the quantities of all later ones.
    /// Applying it twice yields the same list.
    fn normalize(&self, kind: BookingKind, items: &[LineItem]) -> Arc<[LineItem]>;
}
