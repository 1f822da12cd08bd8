//! Reward command handlers.

use tabled::Tabled;

use tripdesk_core::Backend;
use tripdesk_core::model::{DISCOUNT_CATEGORY, EntityId, GIFT_CATEGORY, Reward};
use tripdesk_core::requests::RewardInput;

use crate::cli::{GlobalOpts, RewardsArgs, RewardsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct RewardRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Points")]
    points: u64,
    #[tabled(rename = "Discount")]
    discount: String,
}

impl From<&Reward> for RewardRow {
    fn from(r: &Reward) -> Self {
        Self {
            id: r.id.to_string(),
            title: r.title.clone(),
            category: r.category.clone(),
            points: r.points_required,
            discount: r
                .discount_percentage
                .map(|d| format!("{d}%"))
                .unwrap_or_default(),
        }
    }
}

fn reward_detail(r: &Reward) -> Vec<(&'static str, String)> {
    vec![
        ("ID", r.id.to_string()),
        ("Title", r.title.clone()),
        ("Description", r.description.clone()),
        ("Category", r.category.clone()),
        ("Points", r.points_required.to_string()),
        ("Discount", output::opt(r.discount_percentage.as_ref())),
        ("Event", output::opt(r.event_id.as_ref())),
        ("Image", output::opt(r.image.as_ref())),
    ]
}

/// Accept "discount"/"gift" in any case and send the backend's spelling.
fn canonical_category(raw: &str) -> Result<&'static str, CliError> {
    [DISCOUNT_CATEGORY, GIFT_CATEGORY]
        .into_iter()
        .find(|c| c.eq_ignore_ascii_case(raw))
        .ok_or_else(|| CliError::Validation {
            field: "category".into(),
            reason: format!("expected 'discount' or 'gift', got '{raw}'"),
        })
}

pub async fn handle(
    backend: &Backend,
    args: RewardsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let rewards = backend.rewards();
    match args.command {
        RewardsCommand::List => {
            let list = rewards.list().await?;
            let out = output::render_list(
                &global.output,
                list.as_slice(),
                |r| RewardRow::from(r),
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
        }

        RewardsCommand::Get { id } => {
            let id = EntityId::from(id);
            let reward = util::found(&rewards.get(&id).await?, "reward", &id, "rewards list")?;
            let out = output::render_single(&global.output, &reward, reward_detail, |r| {
                r.id.to_string()
            });
            output::print_output(&out, global.quiet);
        }

        RewardsCommand::Create {
            title,
            description,
            category,
            points,
            discount,
            event,
            image,
        } => {
            let input = RewardInput {
                title,
                description,
                category: canonical_category(&category)?.to_owned(),
                points_required: points,
                discount_percentage: discount,
                event_id: event.map(EntityId::from),
                image: util::read_optional_image(image.as_deref())?,
                keep_existing_image: false,
            };
            let created = rewards.create(&input).await?;
            output::saved("Reward", created.as_ref().map(|r| &r.id), "created", global.quiet);
        }

        RewardsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete reward {id}?"), global.yes)? {
                return Ok(());
            }
            rewards.delete(&EntityId::from(id)).await?;
            output::done("Reward deleted", global.quiet);
        }
    }
    Ok(())
}
