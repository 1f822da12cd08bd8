use std::sync::Arc;

use tripdesk_api::{Envelope, Method};

use super::some;
use super::tags::SURVEY;
use crate::cache::QuerySubscription;
use crate::error::CoreError;
use crate::model::{EntityId, Survey, SurveyResponse};
use crate::normalize;
use crate::requests::{SurveyInput, SurveySubmission};
use crate::resource::{OperationDef, Params, ResourceClient, ResourceDescriptor, TagRule};
use crate::validate::Validate;

const ONE: Envelope = Envelope::Named("survey");

fn write(name: &'static str, method: Method, path: &'static str) -> OperationDef {
    OperationDef::mutation(name, method, path)
        .envelope(ONE)
        .invalidates(TagRule::Kind(SURVEY))
}

pub(crate) fn descriptor() -> Result<ResourceDescriptor, CoreError> {
    ResourceDescriptor::new("survey", "/survey")
        .operation(
            OperationDef::query("list", "/get")
                .envelope(Envelope::Named("surveys"))
                .provides(TagRule::Kind(SURVEY)),
        )
        .operation(
            OperationDef::query("get", "/get/{id}")
                .envelope(ONE)
                .provides(TagRule::Kind(SURVEY)),
        )
        .operation(write("create", Method::Post, "/add"))
        .operation(write("update", Method::Patch, "/update/{id}"))
        .operation(write("delete", Method::Delete, "/delete/{id}"))
        .operation(write("publish", Method::Patch, "/publish/{id}"))
        .operation(write("complete", Method::Patch, "/complete/{id}"))
        .operation(
            OperationDef::query("responses", "/{id}/responses")
                .envelope(Envelope::Named("responses"))
                .provides(TagRule::Kind(SURVEY)),
        )
        .operation(write("submit", Method::Post, "/{id}/submit"))
        .build()
}

/// Surveys and their submitted answer sets.
#[derive(Debug, Clone)]
pub struct SurveysClient {
    resource: ResourceClient,
}

impl SurveysClient {
    pub(crate) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &ResourceClient {
        &self.resource
    }

    pub fn watch_list(&self) -> Result<QuerySubscription<Vec<Survey>>, CoreError> {
        self.resource.watch_list("list", Params::new(), normalize::survey)
    }

    pub async fn list(&self) -> Result<Arc<Vec<Survey>>, CoreError> {
        self.resource.list("list", Params::new(), normalize::survey).await
    }

    pub async fn get(&self, id: &EntityId) -> Result<Arc<Option<Survey>>, CoreError> {
        self.resource.one("get", Params::id(id), normalize::survey).await
    }

    pub async fn create(&self, input: &SurveyInput) -> Result<Option<Survey>, CoreError> {
        input.validate()?;
        let params = Params::new().json(normalize::survey_body(input));
        self.resource.mutate("create", params, some(normalize::survey)).await
    }

    pub async fn update(&self, id: &EntityId, input: &SurveyInput) -> Result<Option<Survey>, CoreError> {
        input.validate()?;
        let params = Params::id(id).json(normalize::survey_body(input));
        self.resource.mutate("update", params, some(normalize::survey)).await
    }

    pub async fn delete(&self, id: &EntityId) -> Result<(), CoreError> {
        self.resource.mutate_unit("delete", Params::id(id)).await
    }

    pub async fn publish(&self, id: &EntityId) -> Result<Option<Survey>, CoreError> {
        self.resource
            .mutate("publish", Params::id(id), some(normalize::survey))
            .await
    }

    pub async fn complete(&self, id: &EntityId) -> Result<Option<Survey>, CoreError> {
        self.resource
            .mutate("complete", Params::id(id), some(normalize::survey))
            .await
    }

    /// Submitted answer sets for one survey.
    pub async fn responses(&self, id: &EntityId) -> Result<Arc<Vec<SurveyResponse>>, CoreError> {
        self.resource
            .list("responses", Params::id(id), normalize::survey_response)
            .await
    }

    pub fn watch_responses(&self, id: &EntityId) -> Result<QuerySubscription<Vec<SurveyResponse>>, CoreError> {
        self.resource
            .watch_list("responses", Params::id(id), normalize::survey_response)
    }

    /// Submit one respondent's answers. Refreshes survey lists so the
    /// respondent count moves.
    pub async fn submit(&self, id: &EntityId, submission: &SurveySubmission) -> Result<(), CoreError> {
        submission.validate()?;
        let params = Params::id(id).json(normalize::submission_body(submission));
        self.resource.mutate_unit("submit", params).await
    }
}
