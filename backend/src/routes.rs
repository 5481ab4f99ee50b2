use std::sync::Arc;

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{delete, get, post, put, State};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::auth::{self, AuthUser, SessionStore};
use crate::engine::VoteEngine;
use crate::error::ApiError;
use crate::rate_limiter::RateLimiter;
use crate::service::PostService;
use crate::store::{RecordStore, VoteTarget};
use crate::utils::parse_id;
use shared::models::{
    Comment, CommentRequest, CreatePostRequest, LoginRequest, MessageResponse, Post, PostView,
    SignupRequest, TokenResponse, UpdatePostRequest,
};
use shared::vote_logic::{Tally, VoteOp};

const SIGNUP_WINDOW_MINUTES: i64 = 60;
const LOGIN_WINDOW_MINUTES: i64 = 15;
const CREATE_POST_WINDOW_MINUTES: i64 = 15;

pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub sessions: SessionStore,
    pub signup_limiter: RateLimiter,
    pub login_limiter: RateLimiter,
    pub post_limiter: RateLimiter,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            sessions: SessionStore::new(),
            signup_limiter: RateLimiter::new(5, SIGNUP_WINDOW_MINUTES),
            login_limiter: RateLimiter::new(10, LOGIN_WINDOW_MINUTES),
            post_limiter: RateLimiter::new(10, CREATE_POST_WINDOW_MINUTES),
        }
    }
}

#[post("/signup", format = "json", data = "<request>")]
pub async fn signup(
    state: &State<AppState>,
    request: Json<SignupRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let request = request.into_inner();
    state.signup_limiter.check(&format!("signup:{}", request.email))?;

    let (user, token) = auth::signup(state.store.as_ref(), &state.sessions, &request).await?;
    debug!(user = %user.username, "new user registered");

    Ok(Json(TokenResponse {
        message: "Signup successful".into(),
        token,
    }))
}

#[post("/login", format = "json", data = "<request>")]
pub async fn login(
    state: &State<AppState>,
    request: Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let request = request.into_inner();
    state.login_limiter.check(&format!("login:{}", request.email))?;

    let token = auth::login(state.store.as_ref(), &state.sessions, &request).await?;

    Ok(Json(TokenResponse {
        message: "Login successful".into(),
        token,
    }))
}

#[post("/posts", format = "json", data = "<request>")]
pub async fn create_post(
    state: &State<AppState>,
    request: Json<CreatePostRequest>,
    user: AuthUser,
) -> Result<Json<Post>, ApiError> {
    state.post_limiter.check(&format!("create_post:{}", user.id))?;
    let post = PostService::create_post(state.store.as_ref(), &request).await?;
    Ok(Json(post))
}

#[get("/posts")]
pub async fn list_posts(state: &State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    PostService::list_posts(state.store.as_ref()).await.map(Json)
}

#[get("/posts/<id>")]
pub async fn get_post(state: &State<AppState>, id: &str) -> Result<Json<PostView>, ApiError> {
    let id = parse_id(id)?;
    PostService::get_post(state.store.as_ref(), id).await.map(Json)
}

#[put("/posts/<id>", format = "json", data = "<request>")]
pub async fn update_post(
    state: &State<AppState>,
    id: &str,
    request: Json<UpdatePostRequest>,
    _user: AuthUser,
) -> Result<Json<Post>, ApiError> {
    let id = parse_id(id)?;
    PostService::update_post(state.store.as_ref(), id, &request).await.map(Json)
}

#[delete("/posts/<id>")]
pub async fn delete_post(
    state: &State<AppState>,
    id: &str,
    _user: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(id)?;
    PostService::delete_post(state.store.as_ref(), id).await?;
    Ok(Json(MessageResponse { message: "Post deleted".into() }))
}

#[post("/posts/<id>/comments", format = "json", data = "<request>")]
pub async fn add_comment(
    state: &State<AppState>,
    id: &str,
    request: Json<CommentRequest>,
    _user: AuthUser,
) -> Result<Json<Comment>, ApiError> {
    let id = parse_id(id)?;
    PostService::add_comment(state.store.as_ref(), id, &request).await.map(Json)
}

#[put("/posts/<id>/comments/<comment_id>", format = "json", data = "<request>")]
pub async fn edit_comment(
    state: &State<AppState>,
    id: &str,
    comment_id: &str,
    request: Json<CommentRequest>,
    _user: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(id)?;
    let comment_id = parse_id(comment_id)?;
    PostService::edit_comment(state.store.as_ref(), id, comment_id, &request).await?;
    Ok(Json(MessageResponse { message: "Comment updated".into() }))
}

async fn cast(
    state: &AppState,
    target: VoteTarget,
    voter: Uuid,
    op: VoteOp,
) -> Result<Json<Tally>, ApiError> {
    VoteEngine::apply(state.store.as_ref(), target, voter, op).await.map(Json)
}

#[instrument(skip(state, user), fields(post_id = %id))]
#[post("/posts/<id>/like")]
pub async fn like_post(
    state: &State<AppState>,
    id: &str,
    user: AuthUser,
) -> Result<Json<Tally>, ApiError> {
    cast(state, VoteTarget::Post(parse_id(id)?), user.id, VoteOp::Like).await
}

#[instrument(skip(state, user), fields(post_id = %id))]
#[post("/posts/<id>/unlike")]
pub async fn unlike_post(
    state: &State<AppState>,
    id: &str,
    user: AuthUser,
) -> Result<Json<Tally>, ApiError> {
    cast(state, VoteTarget::Post(parse_id(id)?), user.id, VoteOp::Unlike).await
}

#[instrument(skip(state, user), fields(post_id = %id))]
#[post("/posts/<id>/dislike")]
pub async fn dislike_post(
    state: &State<AppState>,
    id: &str,
    user: AuthUser,
) -> Result<Json<Tally>, ApiError> {
    cast(state, VoteTarget::Post(parse_id(id)?), user.id, VoteOp::Dislike).await
}

#[instrument(skip(state, user), fields(post_id = %id))]
#[post("/posts/<id>/revert-dislike")]
pub async fn revert_dislike_post(
    state: &State<AppState>,
    id: &str,
    user: AuthUser,
) -> Result<Json<Tally>, ApiError> {
    cast(state, VoteTarget::Post(parse_id(id)?), user.id, VoteOp::RevertDislike).await
}

#[instrument(skip(state, user), fields(comment_id = %id))]
#[post("/comments/<id>/like")]
pub async fn like_comment(
    state: &State<AppState>,
    id: &str,
    user: AuthUser,
) -> Result<Json<Tally>, ApiError> {
    cast(state, VoteTarget::Comment(parse_id(id)?), user.id, VoteOp::Like).await
}

#[instrument(skip(state, user), fields(comment_id = %id))]
#[post("/comments/<id>/unlike")]
pub async fn unlike_comment(
    state: &State<AppState>,
    id: &str,
    user: AuthUser,
) -> Result<Json<Tally>, ApiError> {
    cast(state, VoteTarget::Comment(parse_id(id)?), user.id, VoteOp::Unlike).await
}

#[instrument(skip(state, user), fields(comment_id = %id))]
#[post("/comments/<id>/dislike")]
pub async fn dislike_comment(
    state: &State<AppState>,
    id: &str,
    user: AuthUser,
) -> Result<Json<Tally>, ApiError> {
    cast(state, VoteTarget::Comment(parse_id(id)?), user.id, VoteOp::Dislike).await
}

#[instrument(skip(state, user), fields(comment_id = %id))]
#[post("/comments/<id>/revert-dislike")]
pub async fn revert_dislike_comment(
    state: &State<AppState>,
    id: &str,
    user: AuthUser,
) -> Result<Json<Tally>, ApiError> {
    cast(state, VoteTarget::Comment(parse_id(id)?), user.id, VoteOp::RevertDislike).await
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}
