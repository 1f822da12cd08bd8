use std::sync::Arc;

use tripdesk_api::Method;

use super::some;
use super::tags::EVENT;
use crate::cache::QuerySubscription;
use crate::error::CoreError;
use crate::model::{EntityId, Event};
use crate::normalize;
use crate::requests::EventInput;
use crate::resource::{OperationDef, Params, ResourceClient, ResourceDescriptor, TagRule};
use crate::validate::Validate;

pub(crate) fn descriptor() -> Result<ResourceDescriptor, CoreError> {
    ResourceDescriptor::new("event", "/events")
        .operation(OperationDef::query("list", "/get").provides(TagRule::Kind(EVENT)))
        .operation(OperationDef::query("get", "/get/{id}").provides(TagRule::Kind(EVENT)))
        .operation(OperationDef::mutation("create", Method::Post, "/add").invalidates(TagRule::Kind(EVENT)))
        .operation(OperationDef::mutation("update", Method::Put, "/update/{id}").invalidates(TagRule::Kind(EVENT)))
        .operation(OperationDef::mutation("delete", Method::Delete, "/delete/{id}").invalidates(TagRule::Kind(EVENT)))
        .operation(OperationDef::mutation("activate", Method::Patch, "/{id}/activate").invalidates(TagRule::Kind(EVENT)))
        .build()
}

#[derive(Debug, Clone)]
pub struct EventsClient {
    resource: ResourceClient,
}

impl EventsClient {
    pub(crate) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &ResourceClient {
        &self.resource
    }

    pub fn watch_list(&self) -> Result<QuerySubscription<Vec<Event>>, CoreError> {
        self.resource.watch_list("list", Params::new(), normalize::event)
    }

    pub async fn list(&self) -> Result<Arc<Vec<Event>>, CoreError> {
        self.resource.list("list", Params::new(), normalize::event).await
    }

    pub async fn get(&self, id: &EntityId) -> Result<Arc<Option<Event>>, CoreError> {
        self.resource.one("get", Params::id(id), normalize::event).await
    }

    /// Dates are checked against today's date.
    pub async fn create(&self, input: &EventInput) -> Result<Option<Event>, CoreError> {
        input.validate()?;
        let params = Params::new().form(normalize::event_form(input));
        self.resource.mutate("create", params, some(normalize::event)).await
    }

    pub async fn update(&self, id: &EntityId, input: &EventInput) -> Result<Option<Event>, CoreError> {
        input.validate()?;
        let params = Params::id(id).form(normalize::event_form(input));
        self.resource.mutate("update", params, some(normalize::event)).await
    }

    pub async fn delete(&self, id: &EntityId) -> Result<(), CoreError> {
        self.resource.mutate_unit("delete", Params::id(id)).await
    }

    pub async fn activate(&self, id: &EntityId) -> Result<Option<Event>, CoreError> {
        self.resource
            .mutate("activate", Params::id(id), some(normalize::event))
            .await
    }
}
