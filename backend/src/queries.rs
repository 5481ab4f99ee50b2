use std::collections::BTreeSet;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::{RecordStore, StoreError, VoteTarget};
use shared::models::{Comment, Post, User};
use shared::vote_logic::VoteSets;

/// Postgres-backed record store. Vote sets are stored as uuid arrays
/// that are always written in sorted order, so the swap guard can
/// compare them with plain array equality.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

fn sets_to_arrays(sets: &VoteSets<Uuid>) -> (Vec<Uuid>, Vec<Uuid>) {
    (
        sets.liked_by().iter().copied().collect(),
        sets.disliked_by().iter().copied().collect(),
    )
}

fn arrays_to_sets(liked: Vec<Uuid>, disliked: Vec<Uuid>) -> VoteSets<Uuid> {
    VoteSets::from_parts(
        liked.into_iter().collect::<BTreeSet<_>>(),
        disliked.into_iter().collect::<BTreeSet<_>>(),
    )
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        bio: row.try_get("bio")?,
        registered_at: row.try_get::<OffsetDateTime, _>("registered_at")?,
    })
}

fn post_from_row(row: &PgRow) -> Result<Post, sqlx::Error> {
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        author: row.try_get("author")?,
        tags: row.try_get("tags")?,
        comments: row.try_get("comment_ids")?,
        votes: arrays_to_sets(row.try_get("liked_by")?, row.try_get("disliked_by")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn comment_from_row(row: &PgRow) -> Result<Comment, sqlx::Error> {
    Ok(Comment {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        body: row.try_get("body")?,
        votes: arrays_to_sets(row.try_get("liked_by")?, row.try_get("disliked_by")?),
        created_at: row.try_get("created_at")?,
    })
}

#[rocket::async_trait]
impl RecordStore for PgStore {
    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, bio, registered_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.bio)
        .bind(user.registered_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // a signup that loses the race to the UNIQUE constraints is
            // a conflict, not a database failure
            let msg = e.to_string();
            if msg.contains("users_username_key") {
                StoreError::Duplicate("Name already in use".into())
            } else if msg.contains("users_email_key") {
                StoreError::Duplicate("Email already in use".into())
            } else {
                db_err(e)
            }
        })?;
        Ok(())
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, bio, registered_at
             FROM users WHERE username = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(user_from_row).transpose().map_err(db_err)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, bio, registered_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(user_from_row).transpose().map_err(db_err)
    }

    async fn insert_post(&self, post: &Post) -> Result<(), StoreError> {
        let (liked, disliked) = sets_to_arrays(&post.votes);
        sqlx::query(
            "INSERT INTO posts
             (id, title, content, author, tags, comment_ids, liked_by, disliked_by,
              created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.author)
        .bind(&post.tags)
        .bind(&post.comments)
        .bind(&liked)
        .bind(&disliked)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn fetch_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query(
            "SELECT id, title, content, author, tags, comment_ids, liked_by, disliked_by,
                    created_at, updated_at
             FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(post_from_row).transpose().map_err(db_err)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, title, content, author, tags, comment_ids, liked_by, disliked_by,
                    created_at, updated_at
             FROM posts ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(post_from_row).collect::<Result<_, _>>().map_err(db_err)
    }

    async fn update_post(&self, post: &Post) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE posts
             SET title = $2, content = $3, tags = $4, comment_ids = $5, updated_at = $6
             WHERE id = $1",
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.tags)
        .bind(&post.comments)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError> {
        // comments carry ON DELETE CASCADE, so the vote state of every
        // attached comment goes with the post.
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), StoreError> {
        let (liked, disliked) = sets_to_arrays(&comment.votes);
        sqlx::query(
            "INSERT INTO comments (id, post_id, body, liked_by, disliked_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(comment.id)
        .bind(comment.post_id)
        .bind(&comment.body)
        .bind(&liked)
        .bind(&disliked)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn fetch_comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        let row = sqlx::query(
            "SELECT id, post_id, body, liked_by, disliked_by, created_at
             FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(comment_from_row).transpose().map_err(db_err)
    }

    async fn update_comment_body(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        body: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE comments SET body = $3 WHERE id = $1 AND post_id = $2",
        )
        .bind(comment_id)
        .bind(post_id)
        .bind(body)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn fetch_vote_sets(
        &self,
        target: VoteTarget,
    ) -> Result<Option<VoteSets<Uuid>>, StoreError> {
        let (query, id) = match target {
            VoteTarget::Post(id) => {
                ("SELECT liked_by, disliked_by FROM posts WHERE id = $1", id)
            }
            VoteTarget::Comment(id) => {
                ("SELECT liked_by, disliked_by FROM comments WHERE id = $1", id)
            }
        };

        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        match row {
            Some(row) => {
                let liked: Vec<Uuid> = row.try_get("liked_by").map_err(db_err)?;
                let disliked: Vec<Uuid> = row.try_get("disliked_by").map_err(db_err)?;
                Ok(Some(arrays_to_sets(liked, disliked)))
            }
            None => Ok(None),
        }
    }

    async fn swap_vote_sets(
        &self,
        target: VoteTarget,
        expected: &VoteSets<Uuid>,
        next: &VoteSets<Uuid>,
    ) -> Result<bool, StoreError> {
        let (query, id) = match target {
            VoteTarget::Post(id) => (
                "UPDATE posts SET liked_by = $2, disliked_by = $3
                 WHERE id = $1 AND liked_by = $4 AND disliked_by = $5",
                id,
            ),
            VoteTarget::Comment(id) => (
                "UPDATE comments SET liked_by = $2, disliked_by = $3
                 WHERE id = $1 AND liked_by = $4 AND disliked_by = $5",
                id,
            ),
        };

        let (next_liked, next_disliked) = sets_to_arrays(next);
        let (exp_liked, exp_disliked) = sets_to_arrays(expected);

        let result = sqlx::query(query)
            .bind(id)
            .bind(&next_liked)
            .bind(&next_disliked)
            .bind(&exp_liked)
            .bind(&exp_disliked)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }
}
