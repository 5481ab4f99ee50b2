use rocket::{catch, serde::json::Json, Request};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorMessage {
    error: String,
    status: u16,
}

#[catch(400)]
pub fn bad_request(_req: &Request) -> Json<ErrorMessage> {
    Json(ErrorMessage {
        error: "Invalid request parameters.".into(),
        status: 400,
    })
}

#[catch(401)]
pub fn unauthorized(req: &Request) -> Json<ErrorMessage> {
    let error_msg = match req.headers().get_one("Authorization") {
        Some(_) => "Invalid token. Please, login again.",
        None => "Access token is missing.",
    };

    Json(ErrorMessage {
        error: error_msg.into(),
        status: 401,
    })
}

#[catch(404)]
pub fn not_found(_req: &Request) -> Json<ErrorMessage> {
    Json(ErrorMessage {
        error: "The requested resource was not found.".into(),
        status: 404,
    })
}

#[catch(409)]
pub fn conflict(_req: &Request) -> Json<ErrorMessage> {
    Json(ErrorMessage {
        error: "The request conflicts with the current state of the resource.".into(),
        status: 409,
    })
}

#[catch(429)]
pub fn too_many_requests(_req: &Request) -> Json<ErrorMessage> {
    Json(ErrorMessage {
        error: "Rate limit exceeded. Please wait before trying again.".into(),
        status: 429,
    })
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> Json<ErrorMessage> {
    Json(ErrorMessage {
        error: "An internal server error occurred.".into(),
        status: 500,
    })
}
