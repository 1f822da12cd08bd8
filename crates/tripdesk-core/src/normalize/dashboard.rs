// Dashboard aggregates.

use std::collections::BTreeMap;

use serde_json::Value;

use super::NormalizeError;
use super::fields::{Fields, coerce_number, to_count};
use crate::model::{
    Bucket, Counters, Engagement, MonthlyCount, RevenuePoint, Series, TopUser, TripStats,
    UserStats,
};

fn series(f: Option<Fields<'_>>) -> Series {
    f.map(|s| Series {
        labels: s.strings("labels"),
        values: s.numbers("data"),
    })
    .unwrap_or_default()
}

/// Mongo `$group` output: `[{ _id: <key>, <value_key>: n }]`.
fn buckets(items: &[Value], value_key: &str) -> Vec<Bucket> {
    items
        .iter()
        .filter_map(|item| Fields::of(item, "bucket").ok())
        .map(|b| Bucket {
            key: b.string_or("_id", "Other"),
            value: b.number_or(value_key, 0.0),
        })
        .collect()
}

pub fn user_stats(value: &Value) -> Result<UserStats, NormalizeError> {
    let f = Fields::of(value, "user stats")?;

    let users_by_location = f
        .object("usersByLocation")
        .map(|loc| {
            loc.entries()
                .map(|(k, v)| (k.clone(), coerce_number(v).map_or(0, to_count)))
                .collect::<BTreeMap<_, _>>()
        })
        .unwrap_or_default();

    let engagement = f
        .object("userEngagement")
        .map(|e| Engagement {
            surveys_completed: e.count("surveysCompleted"),
            reservations_made: e.count("reservationsMade"),
            community_posts: e.count("communityPosts"),
            rewards_redeemed: e.count("rewardsRedeemed"),
        })
        .unwrap_or_default();

    let top_users = f
        .array("topUsers")
        .iter()
        .filter_map(|u| Fields::of(u, "top user").ok())
        .map(|u| TopUser {
            name: u.string_or("name", "Unknown"),
            lastname: u.string_or("lastname", "User"),
            points: u.count("points"),
        })
        .collect();

    Ok(UserStats {
        total_users: f.count("totalUsers"),
        new_users_today: f.count("newUsersToday"),
        active_users: f.count("activeUsers"),
        users_by_location,
        engagement,
        registrations: series(f.object("registerOverTime")),
        activity: series(f.object("userActivity")),
        top_users,
        preferences: buckets(f.array("preferenceBreakdown"), "count"),
    })
}

pub fn trip_stats(value: &Value) -> Result<TripStats, NormalizeError> {
    let f = Fields::of(value, "trip stats")?;
    let reservations_per_month = f
        .array("reservationsPerMonth")
        .iter()
        .filter_map(|m| Fields::of(m, "month").ok())
        .filter_map(|m| {
            let month = u32::try_from(m.count("_id")).ok()?;
            (1..=12).contains(&month).then(|| MonthlyCount {
                month,
                count: m.count("count"),
            })
        })
        .collect();

    Ok(TripStats {
        total_trips: f.count("totalTrips"),
        trip_types: buckets(f.array("tripTypeBreakdown"), "count"),
        revenue_by_trip: buckets(f.array("reservationRevenue"), "total"),
        reservations_per_month,
    })
}

pub fn revenue_point(value: &Value) -> Result<RevenuePoint, NormalizeError> {
    let f = Fields::of(value, "revenue point")?;
    Ok(RevenuePoint {
        label: f.text("label"),
        trip: f.number_or("trip", 0.0),
        event: f.number_or("event", 0.0),
    })
}

/// Top-level numeric fields of a statistics object.
pub fn counters(value: &Value) -> Result<Counters, NormalizeError> {
    let f = Fields::of(value, "statistics")?;
    Ok(Counters(
        f.entries()
            .filter_map(|(k, v)| coerce_number(v).map(|n| (k.clone(), n)))
            .collect(),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn user_stats_shape() {
        let s = user_stats(&json!({
            "totalUsers": 120,
            "usersByLocation": { "Tunis": 80, "Sfax": "25" },
            "userEngagement": { "surveysCompleted": 14 },
            "registerOverTime": { "labels": ["Jan", "Feb"], "data": [3, 9] },
            "topUsers": [{ "name": "Lina", "points": 900 }],
            "preferenceBreakdown": [{ "_id": "beach", "count": 40 }, { "count": 2 }],
        }))
        .unwrap();
        assert_eq!(s.total_users, 120);
        assert_eq!(s.users_by_location.get("Sfax"), Some(&25));
        assert_eq!(s.engagement.surveys_completed, 14);
        assert_eq!(s.engagement.rewards_redeemed, 0);
        assert_eq!(s.registrations.points().collect::<Vec<_>>(), vec![("Jan", 3.0), ("Feb", 9.0)]);
        assert_eq!(s.top_users[0].lastname, "User");
        assert_eq!(s.preferences[1].key, "Other");
        assert!(s.activity.labels.is_empty());
    }

    #[test]
    fn trip_stats_skip_invalid_months() {
        let s = trip_stats(&json!({
            "totalTrips": 9,
            "tripTypeBreakdown": [{ "_id": "beach", "count": 5 }],
            "reservationRevenue": [{ "_id": "Djerba", "total": 1520.5 }],
            "reservationsPerMonth": [{ "_id": 3, "count": 4 }, { "_id": 13, "count": 1 }],
        }))
        .unwrap();
        assert_eq!(s.total_trips, 9);
        assert!((s.revenue_by_trip[0].value - 1520.5).abs() < f64::EPSILON);
        assert_eq!(s.reservations_per_month, vec![MonthlyCount { month: 3, count: 4 }]);
    }

    #[test]
    fn counters_keep_numbers_only() {
        let c = counters(&json!({ "totalSurveys": 4, "avg": "2.5", "label": "x", "nested": {} })).unwrap();
        assert_eq!(c.get("totalSurveys"), Some(4.0));
        assert_eq!(c.get("avg"), Some(2.5));
        assert_eq!(c.iter().count(), 2);
    }

    #[test]
    fn revenue_point_total() {
        let p = revenue_point(&json!({ "label": "May 2025", "trip": 1000, "event": "250" })).unwrap();
        assert!((p.total() - 1250.0).abs() < f64::EPSILON);
    }
}
