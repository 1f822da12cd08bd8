// Reward documents.

use serde_json::Value;
use tripdesk_api::FormPayload;

use super::NormalizeError;
use super::fields::Fields;
use crate::model::Reward;
use crate::model::reward::{DISCOUNT_CATEGORY, GIFT_CATEGORY};
use crate::requests::RewardInput;

pub fn reward(value: &Value) -> Result<Reward, NormalizeError> {
    let f = Fields::of(value, "reward")?;
    Ok(Reward {
        id: f.id(),
        title: f.text("title"),
        description: f.text("description"),
        image: f.string("image"),
        category: f.text("category"),
        points_required: f.count("pointsRequired"),
        discount_percentage: f.number("discountPercentage"),
        event_id: f.reference("eventId"),
        created_at: f.datetime("createdAt"),
        updated_at: f.datetime("updatedAt"),
    })
}

/// Category-specific fields are only sent for the category that uses them.
pub fn reward_form(input: &RewardInput) -> FormPayload {
    let discount = input
        .category
        .eq_ignore_ascii_case(DISCOUNT_CATEGORY)
        .then_some(input.discount_percentage)
        .flatten();
    let event = input
        .category
        .eq_ignore_ascii_case(GIFT_CATEGORY)
        .then(|| input.event_id.clone())
        .flatten();

    FormPayload::new()
        .text("title", input.title.trim())
        .text("description", input.description.trim())
        .text("pointsRequired", input.points_required.to_string())
        .text("category", input.category.trim())
        .text_opt("discountPercentage", discount.map(|d| d.to_string()))
        .text_opt("eventId", event.map(|id| id.to_string()))
        .file_opt("image", input.image.clone())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::EntityId;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn reward_fields() {
        let r = reward(&json!({
            "_id": "rw1",
            "title": "Free dinner",
            "category": "Gift",
            "pointsRequired": "300",
            "eventId": { "_id": "e4", "title": "Gala" },
        }))
        .unwrap();
        assert!(r.is_gift());
        assert_eq!(r.points_required, 300);
        assert_eq!(r.event_id, Some(EntityId::from("e4")));
        assert_eq!(r.discount_percentage, None);
    }

    #[test]
    fn form_drops_fields_of_other_categories() {
        let input = RewardInput {
            title: "10% off".into(),
            description: "Any trip".into(),
            category: "Discount".into(),
            points_required: 200,
            discount_percentage: Some(10.0),
            event_id: Some(EntityId::from("e1")),
            ..RewardInput::default()
        };
        let form = reward_form(&input);
        assert_eq!(form.get("discountPercentage"), Some("10"));
        assert_eq!(form.get("eventId"), None);
        assert_eq!(form.get("pointsRequired"), Some("200"));
    }
}
