use std::collections::HashMap;
use std::sync::Arc;

use service::{
    booking::{BookingKind, LineItem},
    line_item::LineItemNormalizer,
};
use uuid::Uuid;

pub struct LineItemNormalizerImpl;

impl LineItemNormalizer for LineItemNormalizerImpl {
    fn normalize(&self, kind: BookingKind, items: &[LineItem]) -> Arc<[LineItem]> {
        let mut merged: Vec<LineItem> = Vec::with_capacity(items.len());
        let mut first_seen: HashMap<Uuid, usize> = HashMap::with_capacity(items.len());

        for item in items {
            match first_seen.get(&item.service_id) {
                Some(&index) => {
                    let first = &mut merged[index];
                    first.quantity = Some(first.effective_quantity() + item.effective_quantity());
                    if kind == BookingKind::Package {
                        first.discount_amount += item.discount_amount;
                    }
                }
                None => {
                    first_seen.insert(item.service_id, merged.len());
                    merged.push(LineItem {
                        quantity: Some(item.effective_quantity()),
                        ..item.clone()
                    });
                }
            }
        }

        merged.into()
    }
}
