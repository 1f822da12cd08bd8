use std::sync::Arc;

use tripdesk_api::Method;

use super::some;
use super::tags::{COMMENTS, COMMUNITY_POSTS};
use crate::cache::QuerySubscription;
use crate::error::CoreError;
use crate::model::{Comment, CommunityPost, EntityId, LikeResult};
use crate::normalize;
use crate::requests::{CommentInput, PostInput};
use crate::resource::{OperationDef, Params, ResourceClient, ResourceDescriptor, TagRule};
use crate::validate::Validate;

pub(crate) fn descriptor() -> Result<ResourceDescriptor, CoreError> {
    ResourceDescriptor::new("community", "/community")
        .operation(OperationDef::query("list_posts", "/get").provides(TagRule::Kind(COMMUNITY_POSTS)))
        .operation(
            OperationDef::mutation("create_post", Method::Post, "/add")
                .invalidates(TagRule::Kind(COMMUNITY_POSTS)),
        )
        .operation(
            OperationDef::mutation("like", Method::Post, "/{id}/like")
                .invalidates(TagRule::Kind(COMMUNITY_POSTS)),
        )
        .operation(OperationDef::query("comments", "/{id}/comments").provides(TagRule::Kind(COMMENTS)))
        // Post lists show comment counts, so both kinds go stale.
        .operation(
            OperationDef::mutation("add_comment", Method::Post, "/{id}/comment")
                .invalidates(TagRule::Kind(COMMENTS))
                .invalidates(TagRule::Kind(COMMUNITY_POSTS)),
        )
        .operation(
            OperationDef::mutation("delete_post", Method::Delete, "/delete/{id}")
                .invalidates(TagRule::Kind(COMMUNITY_POSTS)),
        )
        .build()
}

/// Community feed. Uses the admin credential when present, else the user one.
#[derive(Debug, Clone)]
pub struct CommunityClient {
    resource: ResourceClient,
}

impl CommunityClient {
    pub(crate) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &ResourceClient {
        &self.resource
    }

    pub fn watch_posts(&self) -> Result<QuerySubscription<Vec<CommunityPost>>, CoreError> {
        self.resource.watch_list("list_posts", Params::new(), normalize::post)
    }

    pub async fn list_posts(&self) -> Result<Arc<Vec<CommunityPost>>, CoreError> {
        self.resource
            .list("list_posts", Params::new(), normalize::post)
            .await
    }

    pub async fn create_post(&self, input: &PostInput) -> Result<Option<CommunityPost>, CoreError> {
        input.validate()?;
        let params = Params::new().form(normalize::post_form(input));
        self.resource
            .mutate("create_post", params, some(normalize::post))
            .await
    }

    /// Toggle the caller's like.
    pub async fn like(&self, post_id: &EntityId) -> Result<Option<LikeResult>, CoreError> {
        self.resource
            .mutate("like", Params::id(post_id), some(normalize::like_result))
            .await
    }

    pub fn watch_comments(&self, post_id: &EntityId) -> Result<QuerySubscription<Vec<Comment>>, CoreError> {
        self.resource
            .watch_list("comments", Params::id(post_id), normalize::comment)
    }

    pub async fn comments(&self, post_id: &EntityId) -> Result<Arc<Vec<Comment>>, CoreError> {
        self.resource
            .list("comments", Params::id(post_id), normalize::comment)
            .await
    }

    /// Returns the post's comment thread after the addition.
    pub async fn add_comment(&self, post_id: &EntityId, input: &CommentInput) -> Result<Vec<Comment>, CoreError> {
        input.validate()?;
        let params = Params::id(post_id).json(normalize::comment_body(input));
        self.resource
            .mutate("add_comment", params, |payload| {
                normalize::list_or_single(payload, normalize::comment)
            })
            .await
    }

    pub async fn delete_post(&self, post_id: &EntityId) -> Result<(), CoreError> {
        self.resource
            .mutate_unit("delete_post", Params::id(post_id))
            .await
    }
}
