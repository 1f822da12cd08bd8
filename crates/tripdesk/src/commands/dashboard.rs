//! Dashboard statistics handlers.

use serde::Serialize;
use tabled::Tabled;

use tripdesk_core::Backend;
use tripdesk_core::model::{Bucket, Counters, RevenuePoint, TripStats, UserStats};

use crate::cli::{DashboardArgs, DashboardCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Clone, Serialize, Tabled)]
struct CounterRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: f64,
}

#[derive(Tabled)]
struct RevenueRow {
    #[tabled(rename = "Period")]
    label: String,
    #[tabled(rename = "Trips")]
    trip: String,
    #[tabled(rename = "Events")]
    event: String,
    #[tabled(rename = "Total")]
    total: String,
}

impl From<&RevenuePoint> for RevenueRow {
    fn from(p: &RevenuePoint) -> Self {
        Self {
            label: p.label.clone(),
            trip: format!("{:.2}", p.trip),
            event: format!("{:.2}", p.event),
            total: format!("{:.2}", p.total()),
        }
    }
}

fn buckets(list: &[Bucket]) -> String {
    list.iter()
        .map(|b| format!("{}={}", b.key, b.value))
        .collect::<Vec<_>>()
        .join(", ")
}

fn user_stats_detail(s: &UserStats) -> Vec<(&'static str, String)> {
    let top = s
        .top_users
        .iter()
        .map(|u| format!("{} {} ({})", u.name, u.lastname, u.points))
        .collect::<Vec<_>>()
        .join(", ");
    vec![
        ("Total users", s.total_users.to_string()),
        ("New today", s.new_users_today.to_string()),
        ("Active", s.active_users.to_string()),
        ("Surveys completed", s.engagement.surveys_completed.to_string()),
        ("Reservations made", s.engagement.reservations_made.to_string()),
        ("Community posts", s.engagement.community_posts.to_string()),
        ("Rewards redeemed", s.engagement.rewards_redeemed.to_string()),
        ("Top users", top),
        ("Preferences", buckets(&s.preferences)),
    ]
}

fn trip_stats_detail(s: &TripStats) -> Vec<(&'static str, String)> {
    let monthly = s
        .reservations_per_month
        .iter()
        .map(|m| format!("{:02}:{}", m.month, m.count))
        .collect::<Vec<_>>()
        .join(" ");
    vec![
        ("Total trips", s.total_trips.to_string()),
        ("Trip types", buckets(&s.trip_types)),
        ("Revenue by trip", buckets(&s.revenue_by_trip)),
        ("Reservations/month", monthly),
    ]
}

fn print_counters(counters: &Counters, global: &GlobalOpts) {
    let rows: Vec<CounterRow> = counters
        .iter()
        .map(|(metric, value)| CounterRow {
            metric: metric.to_owned(),
            value,
        })
        .collect();
    let out = output::render_list(&global.output, &rows, Clone::clone, |r| r.metric.clone());
    output::print_output(&out, global.quiet);
}

pub async fn handle(
    backend: &Backend,
    args: DashboardArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let dashboard = backend.dashboard();
    match args.command {
        DashboardCommand::Users => {
            let stats = dashboard.user_stats().await?;
            let out = output::render_single(&global.output, &*stats, user_stats_detail, |s| {
                s.total_users.to_string()
            });
            output::print_output(&out, global.quiet);
        }

        DashboardCommand::Trips => {
            let stats = dashboard.trip_stats().await?;
            let out = output::render_single(&global.output, &*stats, trip_stats_detail, |s| {
                s.total_trips.to_string()
            });
            output::print_output(&out, global.quiet);
        }

        DashboardCommand::Surveys => print_counters(&*dashboard.survey_stats().await?, global),
        DashboardCommand::Rewards => print_counters(&*dashboard.reward_stats().await?, global),
        DashboardCommand::Community => {
            print_counters(&*dashboard.community_stats().await?, global);
        }

        DashboardCommand::Revenue => {
            let points = dashboard.monthly_revenue().await?;
            let out = output::render_list(
                &global.output,
                points.as_slice(),
                |p| RevenueRow::from(p),
                |p| p.label.clone(),
            );
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}
