// ── Dashboard aggregate types ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A labelled time series for line charts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl Series {
    /// `(label, value)` pairs; extra labels or values are dropped.
    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// A named count, e.g. one slice of a pie chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub key: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub surveys_completed: u64,
    pub reservations_made: u64,
    pub community_posts: u64,
    pub rewards_redeemed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopUser {
    pub name: String,
    pub lastname: String,
    pub points: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_users: u64,
    pub new_users_today: u64,
    pub active_users: u64,
    pub users_by_location: BTreeMap<String, u64>,
    pub engagement: Engagement,
    pub registrations: Series,
    pub activity: Series,
    pub top_users: Vec<TopUser>,
    pub preferences: Vec<Bucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCount {
    /// 1-based month number.
    pub month: u32,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripStats {
    pub total_trips: u64,
    pub trip_types: Vec<Bucket>,
    pub revenue_by_trip: Vec<Bucket>,
    pub reservations_per_month: Vec<MonthlyCount>,
}

/// Revenue split between trips and events for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub label: String,
    pub trip: f64,
    pub event: f64,
}

impl RevenuePoint {
    pub fn total(&self) -> f64 {
        self.trip + self.event
    }
}

/// Flat numeric counters for endpoints without a fixed schema
/// (survey, reward and community statistics).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Counters(pub BTreeMap<String, f64>);

impl Counters {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
