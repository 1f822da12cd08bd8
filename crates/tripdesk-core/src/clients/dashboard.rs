use std::sync::Arc;

use tripdesk_api::Envelope;

use super::tags::DASHBOARD;
use crate::cache::QuerySubscription;
use crate::error::CoreError;
use crate::model::{Counters, RevenuePoint, TripStats, UserStats};
use crate::normalize;
use crate::resource::{OperationDef, Params, ResourceClient, ResourceDescriptor, TagRule};

fn stats(name: &'static str, path: &'static str) -> OperationDef {
    OperationDef::query(name, path).provides(TagRule::Kind(DASHBOARD))
}

pub(crate) fn descriptor() -> Result<ResourceDescriptor, CoreError> {
    ResourceDescriptor::new("dashboard", "/dashboard")
        .operation(stats("user_stats", "/user-stats"))
        .operation(stats("trip_stats", "/trip-stats").envelope(Envelope::Bare))
        .operation(stats("survey_stats", "/survey-stats"))
        .operation(stats("reward_stats", "/reward-stats"))
        .operation(stats("community_stats", "/community-stats"))
        .operation(stats("monthly_revenue", "/monthly-revenue").envelope(Envelope::Bare))
        .build()
}

/// Read-only aggregates. Every query carries the `Dashboard` tag, which
/// reservation status changes invalidate.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    resource: ResourceClient,
}

impl DashboardClient {
    pub(crate) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &ResourceClient {
        &self.resource
    }

    pub fn watch_user_stats(&self) -> Result<QuerySubscription<UserStats>, CoreError> {
        self.resource
            .watch("user_stats", Params::new(), normalize::user_stats)
    }

    pub async fn user_stats(&self) -> Result<Arc<UserStats>, CoreError> {
        self.resource
            .query("user_stats", Params::new(), normalize::user_stats)
            .await
    }

    pub async fn trip_stats(&self) -> Result<Arc<TripStats>, CoreError> {
        self.resource
            .query("trip_stats", Params::new(), normalize::trip_stats)
            .await
    }

    pub async fn survey_stats(&self) -> Result<Arc<Counters>, CoreError> {
        self.resource
            .query("survey_stats", Params::new(), normalize::counters)
            .await
    }

    pub async fn reward_stats(&self) -> Result<Arc<Counters>, CoreError> {
        self.resource
            .query("reward_stats", Params::new(), normalize::counters)
            .await
    }

    pub async fn community_stats(&self) -> Result<Arc<Counters>, CoreError> {
        self.resource
            .query("community_stats", Params::new(), normalize::counters)
            .await
    }

    pub async fn monthly_revenue(&self) -> Result<Arc<Vec<RevenuePoint>>, CoreError> {
        self.resource
            .list("monthly_revenue", Params::new(), normalize::revenue_point)
            .await
    }
}
