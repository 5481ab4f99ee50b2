use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use crate::store::RecordStore;
use shared::models::{Comment, CommentRequest, CreatePostRequest, Post, PostView, UpdatePostRequest};
use shared::validation::{validate_comment, validate_create_post, validate_update_post};

pub struct PostService;

impl PostService {
    pub async fn create_post(
        store: &dyn RecordStore,
        request: &CreatePostRequest,
    ) -> Result<Post, ApiError> {
        validate_create_post(request)?;
        let post = Post::new(
            request.title.clone(),
            request.content.clone(),
            request.author.clone(),
            request.tags.clone(),
        );
        store.insert_post(&post).await?;
        Ok(post)
    }

    pub async fn list_posts(store: &dyn RecordStore) -> Result<Vec<Post>, ApiError> {
        Ok(store.list_posts().await?)
    }

    /// Fetches a post with its comments expanded in insertion order.
    pub async fn get_post(store: &dyn RecordStore, id: Uuid) -> Result<PostView, ApiError> {
        let post = store.fetch_post(id).await?.ok_or(ApiError::NotFound)?;

        let mut comment_records = Vec::with_capacity(post.comments.len());
        for comment_id in &post.comments {
            if let Some(comment) = store.fetch_comment(*comment_id).await? {
                comment_records.push(comment);
            }
        }

        Ok(PostView { post, comment_records })
    }

    pub async fn update_post(
        store: &dyn RecordStore,
        id: Uuid,
        request: &UpdatePostRequest,
    ) -> Result<Post, ApiError> {
        validate_update_post(request)?;

        let mut post = store.fetch_post(id).await?.ok_or(ApiError::NotFound)?;
        if let Some(title) = &request.title {
            post.title = title.clone();
        }
        if let Some(content) = &request.content {
            post.content = content.clone();
        }
        if let Some(tags) = &request.tags {
            post.tags = tags.clone();
        }
        post.updated_at = OffsetDateTime::now_utc();

        if !store.update_post(&post).await? {
            return Err(ApiError::NotFound);
        }
        Ok(post)
    }

    pub async fn delete_post(store: &dyn RecordStore, id: Uuid) -> Result<(), ApiError> {
        if !store.delete_post(id).await? {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    /// Appends a new comment to the post's list and persists both the
    /// comment record and the updated post.
    pub async fn add_comment(
        store: &dyn RecordStore,
        post_id: Uuid,
        request: &CommentRequest,
    ) -> Result<Comment, ApiError> {
        validate_comment(request)?;

        let mut post = store.fetch_post(post_id).await?.ok_or(ApiError::NotFound)?;
        let comment = Comment::new(post_id, request.comment.clone());
        post.comments.push(comment.id);
        post.updated_at = OffsetDateTime::now_utc();

        store.insert_comment(&comment).await?;
        if !store.update_post(&post).await? {
            return Err(ApiError::NotFound);
        }
        Ok(comment)
    }

    pub async fn edit_comment(
        store: &dyn RecordStore,
        post_id: Uuid,
        comment_id: Uuid,
        request: &CommentRequest,
    ) -> Result<(), ApiError> {
        validate_comment(request)?;

        if !store.update_comment_body(post_id, comment_id, &request.comment).await? {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}
