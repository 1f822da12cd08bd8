use std::sync::Arc;

use tripdesk_api::{AuthScope, Envelope, Method};

use super::some;
use super::tags::REWARD;
use crate::cache::QuerySubscription;
use crate::error::CoreError;
use crate::model::{EntityId, Reward};
use crate::normalize;
use crate::requests::RewardInput;
use crate::resource::{OperationDef, Params, ResourceClient, ResourceDescriptor, TagRule};
use crate::validate::Validate;

const ONE: Envelope = Envelope::Named("reward");

pub(crate) fn descriptor() -> Result<ResourceDescriptor, CoreError> {
    ResourceDescriptor::new("reward", "/reward")
        .auth(AuthScope::Admin)
        .operation(
            OperationDef::query("list", "/get")
                .envelope(Envelope::Named("rewards"))
                .provides(TagRule::Kind(REWARD)),
        )
        .operation(
            OperationDef::query("get", "/get/{id}")
                .envelope(ONE)
                .provides(TagRule::Kind(REWARD)),
        )
        .operation(
            OperationDef::mutation("create", Method::Post, "/add")
                .envelope(ONE)
                .invalidates(TagRule::Kind(REWARD)),
        )
        .operation(
            OperationDef::mutation("update", Method::Put, "/update/{id}")
                .envelope(ONE)
                .invalidates(TagRule::Kind(REWARD)),
        )
        .operation(
            OperationDef::mutation("delete", Method::Delete, "/delete/{id}").invalidates(TagRule::Kind(REWARD)),
        )
        .build()
}

/// Loyalty rewards. Admin credential only.
#[derive(Debug, Clone)]
pub struct RewardsClient {
    resource: ResourceClient,
}

impl RewardsClient {
    pub(crate) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &ResourceClient {
        &self.resource
    }

    pub fn watch_list(&self) -> Result<QuerySubscription<Vec<Reward>>, CoreError> {
        self.resource.watch_list("list", Params::new(), normalize::reward)
    }

    pub async fn list(&self) -> Result<Arc<Vec<Reward>>, CoreError> {
        self.resource.list("list", Params::new(), normalize::reward).await
    }

    pub async fn get(&self, id: &EntityId) -> Result<Arc<Option<Reward>>, CoreError> {
        self.resource.one("get", Params::id(id), normalize::reward).await
    }

    pub async fn create(&self, input: &RewardInput) -> Result<Option<Reward>, CoreError> {
        input.validate()?;
        let params = Params::new().form(normalize::reward_form(input));
        self.resource.mutate("create", params, some(normalize::reward)).await
    }

    /// Set `keep_existing_image` on the input to update without re-uploading.
    pub async fn update(&self, id: &EntityId, input: &RewardInput) -> Result<Option<Reward>, CoreError> {
        input.validate()?;
        let params = Params::id(id).form(normalize::reward_form(input));
        self.resource.mutate("update", params, some(normalize::reward)).await
    }

    pub async fn delete(&self, id: &EntityId) -> Result<(), CoreError> {
        self.resource.mutate_unit("delete", Params::id(id)).await
    }
}
