//! Community post command handlers.

use tabled::Tabled;

use tripdesk_core::Backend;
use tripdesk_core::model::{Comment, CommunityPost, EntityId};
use tripdesk_core::requests::{CommentInput, PostInput};

use crate::cli::{GlobalOpts, PostsArgs, PostsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

const EXCERPT_CHARS: usize = 48;

#[derive(Tabled)]
struct PostRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Text")]
    text: String,
    #[tabled(rename = "Likes")]
    likes: usize,
    #[tabled(rename = "Comments")]
    comments: usize,
}

impl From<&CommunityPost> for PostRow {
    fn from(p: &CommunityPost) -> Self {
        Self {
            id: p.id.to_string(),
            author: p.author.name.clone(),
            text: excerpt(&p.text),
            likes: p.like_count(),
            comments: p.comment_count(),
        }
    }
}

#[derive(Tabled)]
struct CommentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Text")]
    text: String,
    #[tabled(rename = "Posted")]
    posted: String,
}

impl From<&Comment> for CommentRow {
    fn from(c: &Comment) -> Self {
        Self {
            id: c.id.to_string(),
            author: c.author.name.clone(),
            text: c.text.clone(),
            posted: output::opt(c.created_at.as_ref()),
        }
    }
}

fn excerpt(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

fn print_comments(comments: &[Comment], global: &GlobalOpts) {
    let out = output::render_list(
        &global.output,
        comments,
        |c| CommentRow::from(c),
        |c| c.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

pub async fn handle(
    backend: &Backend,
    args: PostsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let community = backend.community();
    match args.command {
        PostsCommand::List => {
            let list = community.list_posts().await?;
            let out = output::render_list(
                &global.output,
                list.as_slice(),
                |p| PostRow::from(p),
                |p| p.id.to_string(),
            );
            output::print_output(&out, global.quiet);
        }

        PostsCommand::Create { text, image } => {
            let input = PostInput {
                text,
                image: util::read_optional_image(image.as_deref())?,
            };
            let created = community.create_post(&input).await?;
            output::saved("Post", created.as_ref().map(|p| &p.id), "published", global.quiet);
        }

        PostsCommand::Like { id } => {
            let id = EntityId::from(id);
            match community.like(&id).await? {
                Some(result) => output::done(
                    &format!(
                        "Post {id} {} ({} likes)",
                        if result.liked { "liked" } else { "unliked" },
                        result.likes_count
                    ),
                    global.quiet,
                ),
                None => output::done(&format!("Post {id} like toggled"), global.quiet),
            }
        }

        PostsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete post {id}?"), global.yes)? {
                return Ok(());
            }
            community.delete_post(&EntityId::from(id)).await?;
            output::done("Post deleted", global.quiet);
        }

        PostsCommand::Comments { id } => {
            let comments = community.comments(&EntityId::from(id)).await?;
            print_comments(&comments, global);
        }

        PostsCommand::Comment { id, text } => {
            let comments = community
                .add_comment(&EntityId::from(id), &CommentInput { text })
                .await?;
            print_comments(&comments, global);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_text_is_truncated_on_char_boundary() {
        let text = "é".repeat(EXCERPT_CHARS + 5);
        let out = excerpt(&text);
        assert_eq!(out.chars().count(), EXCERPT_CHARS + 1);
        assert!(out.ends_with('…'));
        assert_eq!(excerpt("short"), "short");
    }
}
