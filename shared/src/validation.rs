use crate::models::{CommentRequest, CreatePostRequest, SignupRequest, UpdatePostRequest};

pub const MIN_TITLE_LENGTH: usize = 15;
pub const MAX_TITLE_LENGTH: usize = 50;
pub const MAX_TAGS: usize = 3;
pub const MAX_TAG_LENGTH: usize = 10;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_BIO_LENGTH: usize = 100;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name, email, and password are required")]
    MissingCredentials,
    #[error("Enter valid email address")]
    InvalidEmail,
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,
    #[error("Bio exceeds maximum length of {MAX_BIO_LENGTH}")]
    BioTooLong,
    #[error("Title, author, and content are required")]
    MissingPostFields,
    #[error("Title must be between {MIN_TITLE_LENGTH} and {MAX_TITLE_LENGTH} characters")]
    TitleLength,
    #[error("You can only add {MAX_TAGS} tags")]
    TooManyTags,
    #[error("Tag exceeds maximum length of {MAX_TAG_LENGTH}")]
    TagTooLong,
    #[error("Comment body must not be empty")]
    EmptyComment,
}

fn valid_title(title: &str) -> bool {
    let len = title.chars().count();
    (MIN_TITLE_LENGTH..=MAX_TITLE_LENGTH).contains(&len)
}

fn valid_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(ValidationError::TooManyTags);
    }
    if tags.iter().any(|t| t.chars().count() > MAX_TAG_LENGTH) {
        return Err(ValidationError::TagTooLong);
    }
    Ok(())
}

/// Minimal shape check: one `@` with a non-empty local part and a
/// dotted, non-empty domain.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

pub fn validate_signup(request: &SignupRequest) -> Result<(), ValidationError> {
    if request.name.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(ValidationError::MissingCredentials);
    }
    if !is_valid_email(&request.email) {
        return Err(ValidationError::InvalidEmail);
    }
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    if let Some(bio) = &request.bio {
        if bio.chars().count() > MAX_BIO_LENGTH {
            return Err(ValidationError::BioTooLong);
        }
    }
    Ok(())
}

pub fn validate_create_post(request: &CreatePostRequest) -> Result<(), ValidationError> {
    if request.title.trim().is_empty()
        || request.author.trim().is_empty()
        || request.content.trim().is_empty()
    {
        return Err(ValidationError::MissingPostFields);
    }
    if !valid_title(&request.title) {
        return Err(ValidationError::TitleLength);
    }
    valid_tags(&request.tags)
}

pub fn validate_update_post(request: &UpdatePostRequest) -> Result<(), ValidationError> {
    if let Some(title) = &request.title {
        if !valid_title(title) {
            return Err(ValidationError::TitleLength);
        }
    }
    if let Some(tags) = &request.tags {
        valid_tags(tags)?;
    }
    Ok(())
}

pub fn validate_comment(request: &CommentRequest) -> Result<(), ValidationError> {
    if request.comment.trim().is_empty() {
        return Err(ValidationError::EmptyComment);
    }
    Ok(())
}
