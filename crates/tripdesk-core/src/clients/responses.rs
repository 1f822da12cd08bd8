use std::sync::Arc;

use tripdesk_api::{Envelope, Method};

use super::some;
use super::tags::RESPONSE;
use crate::cache::QuerySubscription;
use crate::error::CoreError;
use crate::model::{EntityId, Response};
use crate::normalize;
use crate::requests::ResponseInput;
use crate::resource::{OperationDef, Params, ResourceClient, ResourceDescriptor, TagRule};
use crate::validate::Validate;

const LIST: Envelope = Envelope::Named("responses");
const ONE: Envelope = Envelope::Named("response");

pub(crate) fn descriptor() -> Result<ResourceDescriptor, CoreError> {
    ResourceDescriptor::new("response", "/response")
        .operation(
            OperationDef::query("list", "/get")
                .envelope(LIST)
                .provides(TagRule::Kind(RESPONSE)),
        )
        .operation(
            OperationDef::query("get", "/get/{id}")
                .envelope(ONE)
                .provides(TagRule::ById(RESPONSE, "id")),
        )
        .operation(
            OperationDef::query("list_for_question", "/get")
                .envelope(LIST)
                .provides(TagRule::Prefixed(RESPONSE, "question-", "questionId")),
        )
        .operation(
            OperationDef::query("list_for_user", "/get")
                .envelope(LIST)
                .provides(TagRule::Prefixed(RESPONSE, "user-", "userId")),
        )
        .operation(
            OperationDef::query("list_for_survey", "/get-by-survey/{surveyId}")
                .envelope(Envelope::NestedData("responses"))
                .provides(TagRule::Prefixed(RESPONSE, "survey-", "surveyId")),
        )
        .operation(
            OperationDef::mutation("create", Method::Post, "/add")
                .envelope(ONE)
                .invalidates(TagRule::Kind(RESPONSE)),
        )
        .operation(
            OperationDef::mutation("update", Method::Put, "/update/{id}")
                .envelope(ONE)
                .invalidates(TagRule::ById(RESPONSE, "id"))
                .invalidates(TagRule::Kind(RESPONSE)),
        )
        .operation(
            OperationDef::mutation("delete", Method::Delete, "/delete/{id}")
                .invalidates(TagRule::ById(RESPONSE, "id"))
                .invalidates(TagRule::Kind(RESPONSE)),
        )
        .build()
}

/// Individual answers, filterable by question, user or survey.
#[derive(Debug, Clone)]
pub struct ResponsesClient {
    resource: ResourceClient,
}

impl ResponsesClient {
    pub(crate) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &ResourceClient {
        &self.resource
    }

    pub async fn list(&self) -> Result<Arc<Vec<Response>>, CoreError> {
        self.resource.list("list", Params::new(), normalize::response).await
    }

    pub async fn get(&self, id: &EntityId) -> Result<Arc<Option<Response>>, CoreError> {
        self.resource.one("get", Params::id(id), normalize::response).await
    }

    pub async fn list_for_question(&self, question_id: &EntityId) -> Result<Arc<Vec<Response>>, CoreError> {
        let params = Params::new().query("questionId", question_id.as_str());
        self.resource
            .list("list_for_question", params, normalize::response)
            .await
    }

    pub async fn list_for_user(&self, user_id: &EntityId) -> Result<Arc<Vec<Response>>, CoreError> {
        let params = Params::new().query("userId", user_id.as_str());
        self.resource
            .list("list_for_user", params, normalize::response)
            .await
    }

    pub fn watch_for_survey(&self, survey_id: &EntityId) -> Result<QuerySubscription<Vec<Response>>, CoreError> {
        let params = Params::new().path("surveyId", survey_id.as_str());
        self.resource
            .watch_list("list_for_survey", params, normalize::response)
    }

    pub async fn list_for_survey(&self, survey_id: &EntityId) -> Result<Arc<Vec<Response>>, CoreError> {
        self.watch_for_survey(survey_id)?.settled().await
    }

    pub async fn create(&self, input: &ResponseInput) -> Result<Option<Response>, CoreError> {
        input.validate()?;
        let params = Params::new().json(normalize::response_body(input));
        self.resource.mutate("create", params, some(normalize::response)).await
    }

    pub async fn update(&self, id: &EntityId, input: &ResponseInput) -> Result<Option<Response>, CoreError> {
        input.validate()?;
        let params = Params::id(id).json(normalize::response_body(input));
        self.resource.mutate("update", params, some(normalize::response)).await
    }

    pub async fn delete(&self, id: &EntityId) -> Result<(), CoreError> {
        self.resource.mutate_unit("delete", Params::id(id)).await
    }
}
