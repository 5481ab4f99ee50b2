use std::collections::HashMap;
use std::sync::Mutex;

use shared::models::{Comment, Post, User};
use shared::vote_logic::VoteSets;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("Store lock poisoned")]
    LockFailed,
}

/// Which record a vote operation targets. Posts and comments are both
/// votable but live in separate collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTarget {
    Post(Uuid),
    Comment(Uuid),
}

/// Keyed record store holding User, Post and Comment records.
///
/// Vote sets are read and written through a compare-and-swap pair so a
/// concurrent vote on the same entity cannot be silently lost; callers
/// retry on a failed swap.
#[rocket::async_trait]
pub trait RecordStore: Send + Sync {
    /// Fails with `Duplicate` when the username or email is taken.
    async fn create_user(&self, user: &User) -> Result<(), StoreError>;
    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn insert_post(&self, post: &Post) -> Result<(), StoreError>;
    async fn fetch_post(&self, id: Uuid) -> Result<Option<Post>, StoreError>;
    async fn list_posts(&self) -> Result<Vec<Post>, StoreError>;
    /// Writes the post's content fields and comment list. Vote sets are
    /// written only through `swap_vote_sets`; a vote committed between a
    /// caller's read and this write must survive it.
    async fn update_post(&self, post: &Post) -> Result<bool, StoreError>;
    /// Deletes the post and, cascading, every comment attached to it.
    async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn insert_comment(&self, comment: &Comment) -> Result<(), StoreError>;
    async fn fetch_comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError>;
    async fn update_comment_body(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        body: &str,
    ) -> Result<bool, StoreError>;

    async fn fetch_vote_sets(
        &self,
        target: VoteTarget,
    ) -> Result<Option<VoteSets<Uuid>>, StoreError>;
    /// Swaps the target's vote sets only if they still equal `expected`.
    /// Returns false when another writer got there first.
    async fn swap_vote_sets(
        &self,
        target: VoteTarget,
        expected: &VoteSets<Uuid>,
        next: &VoteSets<Uuid>,
    ) -> Result<bool, StoreError>;
}

/// In-process store used by the route tests.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
    posts: Mutex<HashMap<Uuid, Post>>,
    comments: Mutex<HashMap<Uuid, Comment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[rocket::async_trait]
impl RecordStore for MemoryStore {
    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.lock().map_err(|_| StoreError::LockFailed)?;
        if users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate("Name already in use".into()));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("Email already in use".into()));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().map_err(|_| StoreError::LockFailed)?;
        Ok(users.values().find(|u| u.username == name).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().map_err(|_| StoreError::LockFailed)?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_post(&self, post: &Post) -> Result<(), StoreError> {
        let mut posts = self.posts.lock().map_err(|_| StoreError::LockFailed)?;
        posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn fetch_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let posts = self.posts.lock().map_err(|_| StoreError::LockFailed)?;
        Ok(posts.get(&id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let posts = self.posts.lock().map_err(|_| StoreError::LockFailed)?;
        let mut all: Vec<Post> = posts.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn update_post(&self, post: &Post) -> Result<bool, StoreError> {
        let mut posts = self.posts.lock().map_err(|_| StoreError::LockFailed)?;
        match posts.get_mut(&post.id) {
            Some(existing) => {
                // keep the live vote sets: the caller's copy may predate
                // a vote that already won its compare-and-swap
                let votes = existing.votes.clone();
                *existing = post.clone();
                existing.votes = votes;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut posts = self.posts.lock().map_err(|_| StoreError::LockFailed)?;
        if posts.remove(&id).is_none() {
            return Ok(false);
        }
        let mut comments = self.comments.lock().map_err(|_| StoreError::LockFailed)?;
        comments.retain(|_, c| c.post_id != id);
        Ok(true)
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), StoreError> {
        let mut comments = self.comments.lock().map_err(|_| StoreError::LockFailed)?;
        comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn fetch_comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        let comments = self.comments.lock().map_err(|_| StoreError::LockFailed)?;
        Ok(comments.get(&id).cloned())
    }

    async fn update_comment_body(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        body: &str,
    ) -> Result<bool, StoreError> {
        let mut comments = self.comments.lock().map_err(|_| StoreError::LockFailed)?;
        match comments.get_mut(&comment_id) {
            Some(comment) if comment.post_id == post_id => {
                comment.body = body.to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn fetch_vote_sets(
        &self,
        target: VoteTarget,
    ) -> Result<Option<VoteSets<Uuid>>, StoreError> {
        match target {
            VoteTarget::Post(id) => {
                let posts = self.posts.lock().map_err(|_| StoreError::LockFailed)?;
                Ok(posts.get(&id).map(|p| p.votes.clone()))
            }
            VoteTarget::Comment(id) => {
                let comments = self.comments.lock().map_err(|_| StoreError::LockFailed)?;
                Ok(comments.get(&id).map(|c| c.votes.clone()))
            }
        }
    }

    async fn swap_vote_sets(
        &self,
        target: VoteTarget,
        expected: &VoteSets<Uuid>,
        next: &VoteSets<Uuid>,
    ) -> Result<bool, StoreError> {
        match target {
            VoteTarget::Post(id) => {
                let mut posts = self.posts.lock().map_err(|_| StoreError::LockFailed)?;
                match posts.get_mut(&id) {
                    Some(post) if &post.votes == expected => {
                        post.votes = next.clone();
                        Ok(true)
                    }
                    _ => Ok(false),
                }
            }
            VoteTarget::Comment(id) => {
                let mut comments = self.comments.lock().map_err(|_| StoreError::LockFailed)?;
                match comments.get_mut(&id) {
                    Some(comment) if &comment.votes == expected => {
                        comment.votes = next.clone();
                        Ok(true)
                    }
                    _ => Ok(false),
                }
            }
        }
    }
}
