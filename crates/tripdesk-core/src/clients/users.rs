use std::sync::Arc;

use tripdesk_api::{Envelope, Method};

use super::some;
use super::tags::USER;
use crate::cache::QuerySubscription;
use crate::error::CoreError;
use crate::model::{EntityId, User};
use crate::normalize;
use crate::requests::UserInput;
use crate::resource::{OperationDef, Params, ResourceClient, ResourceDescriptor, TagRule};
use crate::validate::Validate;

// The user service answers with bare documents rather than an envelope.
pub(crate) fn descriptor() -> Result<ResourceDescriptor, CoreError> {
    ResourceDescriptor::new("user", "/user")
        .operation(
            OperationDef::query("list", "/get")
                .envelope(Envelope::Bare)
                .provides(TagRule::Kind(USER)),
        )
        .operation(
            OperationDef::query("get", "/get/{id}")
                .envelope(Envelope::Bare)
                .provides(TagRule::Kind(USER)),
        )
        .operation(
            OperationDef::mutation("create", Method::Post, "/add")
                .envelope(Envelope::Bare)
                .invalidates(TagRule::Kind(USER)),
        )
        .operation(
            OperationDef::mutation("update", Method::Put, "/update/{id}")
                .envelope(Envelope::Bare)
                .invalidates(TagRule::Kind(USER)),
        )
        .operation(
            OperationDef::mutation("delete", Method::Delete, "/delete/{id}").invalidates(TagRule::Kind(USER)),
        )
        .build()
}

/// End users of the booking platform.
#[derive(Debug, Clone)]
pub struct UsersClient {
    resource: ResourceClient,
}

impl UsersClient {
    pub(crate) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &ResourceClient {
        &self.resource
    }

    pub fn watch_list(&self) -> Result<QuerySubscription<Vec<User>>, CoreError> {
        self.resource.watch_list("list", Params::new(), normalize::user)
    }

    pub async fn list(&self) -> Result<Arc<Vec<User>>, CoreError> {
        self.resource.list("list", Params::new(), normalize::user).await
    }

    pub async fn get(&self, id: &EntityId) -> Result<Arc<Option<User>>, CoreError> {
        self.resource.one("get", Params::id(id), normalize::user).await
    }

    pub async fn create(&self, input: &UserInput) -> Result<Option<User>, CoreError> {
        input.validate()?;
        let params = Params::new().form(normalize::user_form(input));
        self.resource.mutate("create", params, some(normalize::user)).await
    }

    pub async fn update(&self, id: &EntityId, input: &UserInput) -> Result<Option<User>, CoreError> {
        input.validate()?;
        let params = Params::id(id).form(normalize::user_form(input));
        self.resource.mutate("update", params, some(normalize::user)).await
    }

    pub async fn delete(&self, id: &EntityId) -> Result<(), CoreError> {
        self.resource.mutate_unit("delete", Params::id(id)).await
    }
}
