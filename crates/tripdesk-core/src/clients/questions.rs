use std::sync::Arc;

use tripdesk_api::{Envelope, Method};

use super::some;
use super::tags::QUESTION;
use crate::cache::QuerySubscription;
use crate::error::CoreError;
use crate::model::{EntityId, Question};
use crate::normalize;
use crate::requests::QuestionInput;
use crate::resource::{OperationDef, Params, ResourceClient, ResourceDescriptor, TagRule};
use crate::validate::Validate;

const LIST: Envelope = Envelope::Named("questions");
const ONE: Envelope = Envelope::Named("question");

pub(crate) fn descriptor() -> Result<ResourceDescriptor, CoreError> {
    ResourceDescriptor::new("question", "/question")
        .operation(
            OperationDef::query("list", "/")
                .envelope(LIST)
                .provides(TagRule::Kind(QUESTION)),
        )
        .operation(
            OperationDef::query("list_for_survey", "/survey/{surveyId}")
                .envelope(LIST)
                .provides(TagRule::ById(QUESTION, "surveyId"))
                .provides(TagRule::Kind(QUESTION)),
        )
        .operation(
            OperationDef::query("get", "/{id}")
                .envelope(ONE)
                .provides(TagRule::ById(QUESTION, "id")),
        )
        .operation(
            OperationDef::mutation("create", Method::Post, "/")
                .envelope(ONE)
                .invalidates(TagRule::Kind(QUESTION)),
        )
        .operation(
            OperationDef::mutation("update", Method::Put, "/{id}")
                .envelope(ONE)
                .invalidates(TagRule::ById(QUESTION, "id"))
                .invalidates(TagRule::Kind(QUESTION)),
        )
        .operation(
            OperationDef::mutation("delete", Method::Delete, "/{id}").invalidates(TagRule::Kind(QUESTION)),
        )
        .build()
}

/// Survey questions.
#[derive(Debug, Clone)]
pub struct QuestionsClient {
    resource: ResourceClient,
}

impl QuestionsClient {
    pub(crate) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &ResourceClient {
        &self.resource
    }

    pub async fn list(&self) -> Result<Arc<Vec<Question>>, CoreError> {
        self.resource.list("list", Params::new(), normalize::question).await
    }

    pub fn watch_for_survey(&self, survey_id: &EntityId) -> Result<QuerySubscription<Vec<Question>>, CoreError> {
        let params = Params::new().path("surveyId", survey_id.as_str());
        self.resource
            .watch_list("list_for_survey", params, normalize::question)
    }

    /// Questions of one survey, in backend order.
    pub async fn list_for_survey(&self, survey_id: &EntityId) -> Result<Arc<Vec<Question>>, CoreError> {
        self.watch_for_survey(survey_id)?.settled().await
    }

    pub async fn get(&self, id: &EntityId) -> Result<Arc<Option<Question>>, CoreError> {
        self.resource.one("get", Params::id(id), normalize::question).await
    }

    pub async fn create(&self, input: &QuestionInput) -> Result<Option<Question>, CoreError> {
        input.validate()?;
        let params = Params::new().json(normalize::question_body(input));
        self.resource.mutate("create", params, some(normalize::question)).await
    }

    pub async fn update(&self, id: &EntityId, input: &QuestionInput) -> Result<Option<Question>, CoreError> {
        input.validate()?;
        let params = Params::id(id).json(normalize::question_body(input));
        self.resource.mutate("update", params, some(normalize::question)).await
    }

    pub async fn delete(&self, id: &EntityId) -> Result<(), CoreError> {
        self.resource.mutate_unit("delete", Params::id(id)).await
    }
}
