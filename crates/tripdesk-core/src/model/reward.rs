use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

/// Category names with extra validation rules. Anything else is free-form.
pub const DISCOUNT_CATEGORY: &str = "Discount";
pub const GIFT_CATEGORY: &str = "Gift";

/// Something users can redeem loyalty points for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub category: String,
    pub points_required: u64,
    pub discount_percentage: Option<f64>,
    pub event_id: Option<EntityId>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Reward {
    pub fn is_discount(&self) -> bool {
        self.category.eq_ignore_ascii_case(DISCOUNT_CATEGORY)
    }

    pub fn is_gift(&self) -> bool {
        self.category.eq_ignore_ascii_case(GIFT_CATEGORY)
    }
}
