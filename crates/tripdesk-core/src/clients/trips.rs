use std::sync::Arc;

use tripdesk_api::Method;

use super::some;
use super::tags::TRIP;
use crate::cache::QuerySubscription;
use crate::error::CoreError;
use crate::model::{EntityId, Trip};
use crate::normalize;
use crate::requests::TripInput;
use crate::resource::{OperationDef, Params, ResourceClient, ResourceDescriptor, TagRule};
use crate::validate::Validate;

pub(crate) fn descriptor() -> Result<ResourceDescriptor, CoreError> {
    ResourceDescriptor::new("trip", "/trip")
        .operation(OperationDef::query("list", "/get").provides(TagRule::Kind(TRIP)))
        .operation(OperationDef::query("get", "/get/{id}").provides(TagRule::Kind(TRIP)))
        .operation(OperationDef::mutation("create", Method::Post, "/add").invalidates(TagRule::Kind(TRIP)))
        .operation(OperationDef::mutation("update", Method::Put, "/update/{id}").invalidates(TagRule::Kind(TRIP)))
        .operation(OperationDef::mutation("delete", Method::Delete, "/delete/{id}").invalidates(TagRule::Kind(TRIP)))
        .operation(
            OperationDef::mutation("toggle_status", Method::Patch, "/{id}/activate")
                .invalidates(TagRule::Kind(TRIP)),
        )
        .build()
}

/// Trip catalogue.
#[derive(Debug, Clone)]
pub struct TripsClient {
    resource: ResourceClient,
}

impl TripsClient {
    pub(crate) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &ResourceClient {
        &self.resource
    }

    pub fn watch_list(&self) -> Result<QuerySubscription<Vec<Trip>>, CoreError> {
        self.resource.watch_list("list", Params::new(), normalize::trip)
    }

    pub async fn list(&self) -> Result<Arc<Vec<Trip>>, CoreError> {
        self.resource.list("list", Params::new(), normalize::trip).await
    }

    pub fn watch(&self, id: &EntityId) -> Result<QuerySubscription<Option<Trip>>, CoreError> {
        self.resource.watch_one("get", Params::id(id), normalize::trip)
    }

    pub async fn get(&self, id: &EntityId) -> Result<Arc<Option<Trip>>, CoreError> {
        self.resource.one("get", Params::id(id), normalize::trip).await
    }

    pub async fn create(&self, input: &TripInput) -> Result<Option<Trip>, CoreError> {
        input.validate()?;
        let params = Params::new().form(normalize::trip_form(input));
        self.resource.mutate("create", params, some(normalize::trip)).await
    }

    pub async fn update(&self, id: &EntityId, input: &TripInput) -> Result<Option<Trip>, CoreError> {
        input.validate()?;
        let params = Params::id(id).form(normalize::trip_form(input));
        self.resource.mutate("update", params, some(normalize::trip)).await
    }

    pub async fn delete(&self, id: &EntityId) -> Result<(), CoreError> {
        self.resource.mutate_unit("delete", Params::id(id)).await
    }

    /// Flip availability on the backend.
    pub async fn toggle_status(&self, id: &EntityId) -> Result<Option<Trip>, CoreError> {
        self.resource
            .mutate("toggle_status", Params::id(id), some(normalize::trip))
            .await
    }
}
