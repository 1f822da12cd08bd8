// Community posts, comments and likes.

use serde_json::{Value, json};
use tripdesk_api::FormPayload;

use super::NormalizeError;
use super::fields::Fields;
use crate::model::{Author, Comment, CommunityPost, EntityId, LikeResult};
use crate::requests::{CommentInput, PostInput};

/// Posts and comments are authored by either a user or an admin.
fn author(f: &Fields<'_>) -> Author {
    let Some(a) = f.object("user").or_else(|| f.object("admin")) else {
        return Author {
            id: f.reference("user").or_else(|| f.reference("admin")).unwrap_or_default(),
            name: "Unknown User".to_owned(),
            profile_image: None,
        };
    };
    Author {
        id: a.id(),
        name: a.string_or("name", "Unknown User"),
        profile_image: a.first_string(&["profileImage", "image"]),
    }
}

pub fn comment(value: &Value) -> Result<Comment, NormalizeError> {
    let f = Fields::of(value, "comment")?;
    Ok(Comment {
        id: f.id(),
        author: author(&f),
        text: f.text("text"),
        created_at: f.datetime("createdAt"),
    })
}

pub fn post(value: &Value) -> Result<CommunityPost, NormalizeError> {
    let f = Fields::of(value, "community post")?;
    Ok(CommunityPost {
        id: f.id(),
        author: author(&f),
        text: f.text("text"),
        image: f.string("image"),
        likes: f.strings("likes").into_iter().map(EntityId::from).collect(),
        comments: f
            .array("comments")
            .iter()
            .filter_map(|c| comment(c).ok())
            .collect(),
        created_at: f.datetime("createdAt"),
        updated_at: f.datetime("updatedAt"),
    })
}

/// Like toggle response: `{ success, liked, likesCount }`.
pub fn like_result(value: &Value) -> Result<LikeResult, NormalizeError> {
    let f = Fields::of(value, "like result")?;
    Ok(LikeResult {
        liked: f.bool_or("liked", false),
        likes_count: f.count("likesCount"),
    })
}

pub fn post_form(input: &PostInput) -> FormPayload {
    FormPayload::new()
        .text_opt("text", input.text.as_deref().map(str::trim))
        .file_opt("image", input.image.clone())
}

pub fn comment_body(input: &CommentInput) -> Value {
    json!({ "text": input.text.trim() })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn post_with_embedded_comments() {
        let p = post(&json!({
            "_id": "p1",
            "user": { "_id": "u1", "name": "Yasmine", "profileImage": "y.png" },
            "text": "Loved Ain Draham!",
            "likes": ["u2", "u3"],
            "comments": [
                { "_id": "c1", "user": { "_id": "u2", "name": "Omar" }, "text": "Same!" },
                42,
            ],
        }))
        .unwrap();
        assert_eq!(p.author.name, "Yasmine");
        assert_eq!(p.like_count(), 2);
        assert_eq!(p.comment_count(), 1);
        assert_eq!(p.comments[0].author.name, "Omar");
    }

    #[test]
    fn missing_author_is_unknown() {
        let c = comment(&json!({ "text": "hi", "user": "u7" })).unwrap();
        assert_eq!(c.author.id.as_str(), "u7");
        assert_eq!(c.author.name, "Unknown User");

        let p = post(&json!({ "admin": { "_id": "a1", "name": "Staff" } })).unwrap();
        assert_eq!(p.author.name, "Staff");
        assert_eq!(p.text, "");
    }

    #[test]
    fn like_result_fields() {
        let l = like_result(&json!({ "success": true, "liked": true, "likesCount": 5 })).unwrap();
        assert_eq!(l, LikeResult { liked: true, likes_count: 5 });
    }
}
