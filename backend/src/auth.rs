use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Mutex;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ring::digest;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::AppState;
use crate::store::RecordStore;
use shared::models::{LoginRequest, SignupRequest, User};
use shared::validation::validate_signup;

const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const CREDENTIAL_LEN: usize = digest::SHA256_OUTPUT_LEN;
const MAX_TOKENS: usize = 10000;

static PBKDF2_ALG: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

/// Hashes a password with a fresh random salt, encoded as `salt$hash`.
pub fn hash_password(rng: &SystemRandom, password: &str) -> Result<String, ApiError> {
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| ApiError::Internal("Failed to generate salt".into()))?;

    let mut hash = [0u8; CREDENTIAL_LEN];
    let iterations = NonZeroU32::new(PBKDF2_ITERATIONS).ok_or_else(|| {
        ApiError::Internal("Invalid PBKDF2 iteration count".into())
    })?;
    pbkdf2::derive(PBKDF2_ALG, iterations, &salt, password.as_bytes(), &mut hash);

    Ok(format!(
        "{}${}",
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(hash)
    ))
}

pub fn verify_password(stored: &str, password: &str) -> bool {
    let Some((salt_b64, hash_b64)) = stored.split_once('$') else {
        return false;
    };
    let (Ok(salt), Ok(hash)) = (URL_SAFE_NO_PAD.decode(salt_b64), URL_SAFE_NO_PAD.decode(hash_b64))
    else {
        return false;
    };
    let Some(iterations) = NonZeroU32::new(PBKDF2_ITERATIONS) else {
        return false;
    };
    pbkdf2::verify(PBKDF2_ALG, iterations, &salt, password.as_bytes(), &hash).is_ok()
}

/// The identity a valid bearer token resolves to.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

/// Issues and resolves opaque bearer tokens. Tokens live for the
/// lifetime of the process; the table is cleared wholesale once it
/// grows past MAX_TOKENS.
pub struct SessionStore {
    tokens: Mutex<HashMap<String, AuthUser>>,
    rng: SystemRandom,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
            rng: SystemRandom::new(),
        }
    }

    pub fn rng(&self) -> &SystemRandom {
        &self.rng
    }

    fn cleanup_old_tokens(&self) {
        if let Ok(mut tokens) = self.tokens.lock() {
            if tokens.len() > MAX_TOKENS {
                tokens.clear();
            }
        }
    }

    pub fn issue(&self, user: AuthUser) -> Result<String, ApiError> {
        self.cleanup_old_tokens();
        let mut bytes = [0u8; 32];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| ApiError::Internal("Failed to generate token".into()))?;
        let token = URL_SAFE_NO_PAD.encode(bytes);

        match self.tokens.lock() {
            Ok(mut tokens) => {
                tokens.insert(token.clone(), user);
                debug!("Issued new session token");
                Ok(token)
            }
            Err(_) => {
                error!("Failed to acquire lock for token storage");
                Err(ApiError::Internal("Failed to store token".into()))
            }
        }
    }

    pub fn resolve(&self, token: &str) -> Option<AuthUser> {
        self.tokens.lock().ok()?.get(token).cloned()
    }
}

pub async fn signup(
    store: &dyn RecordStore,
    sessions: &SessionStore,
    request: &SignupRequest,
) -> Result<(User, String), ApiError> {
    validate_signup(request)?;

    if store.find_user_by_name(&request.name).await?.is_some() {
        return Err(ApiError::Conflict("Name already in use".into()));
    }
    if store.find_user_by_email(&request.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already in use".into()));
    }

    let user = User {
        id: Uuid::new_v4(),
        username: request.name.clone(),
        email: request.email.clone(),
        password_hash: hash_password(sessions.rng(), &request.password)?,
        bio: request.bio.clone(),
        registered_at: time::OffsetDateTime::now_utc(),
    };
    store.create_user(&user).await?;

    let token = sessions.issue(AuthUser {
        id: user.id,
        username: user.username.clone(),
    })?;
    Ok((user, token))
}

pub async fn login(
    store: &dyn RecordStore,
    sessions: &SessionStore,
    request: &LoginRequest,
) -> Result<String, ApiError> {
    let user = store.find_user_by_email(&request.email).await?;

    // One generic message for unknown email and bad password alike.
    let user = match user {
        Some(user) if verify_password(&user.password_hash, &request.password) => user,
        _ => return Err(ApiError::Unauthorized("Incorrect email or password".into())),
    };

    sessions.issue(AuthUser {
        id: user.id,
        username: user.username,
    })
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthUser {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(state) = req.rocket().state::<AppState>() else {
            return Outcome::Error((Status::InternalServerError, ()));
        };

        let header = req.headers().get_one("Authorization");
        let Some(token) = header.and_then(|h| h.strip_prefix("Bearer ")) else {
            debug!("Request rejected: missing bearer token");
            return Outcome::Error((Status::Unauthorized, ()));
        };

        match state.sessions.resolve(token) {
            Some(user) => Outcome::Success(user),
            None => {
                debug!("Request rejected: unknown or expired token");
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}
