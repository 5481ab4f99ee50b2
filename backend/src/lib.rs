pub mod auth;
pub mod catchers;
pub mod cors;
pub mod engine;
pub mod error;
pub mod queries;
pub mod rate_limiter;
pub mod routes;
pub mod service;
pub mod store;
pub mod utils;

pub use shared::{models::*, validation::*, vote_logic::*};

use rocket::{Build, Rocket};

pub fn rocket(state: routes::AppState) -> Rocket<Build> {
    rocket::build()
        .attach(cors::CORS)
        .manage(state)
        .mount(
            "/",
            rocket::routes![
                routes::signup,
                routes::login,
                routes::create_post,
                routes::list_posts,
                routes::get_post,
                routes::update_post,
                routes::delete_post,
                routes::add_comment,
                routes::edit_comment,
                routes::like_post,
                routes::unlike_post,
                routes::dislike_post,
                routes::revert_dislike_post,
                routes::like_comment,
                routes::unlike_comment,
                routes::dislike_comment,
                routes::revert_dislike_comment,
                routes::all_options,
            ],
        )
        .register(
            "/",
            rocket::catchers![
                catchers::bad_request,
                catchers::unauthorized,
                catchers::not_found,
                catchers::conflict,
                catchers::too_many_requests,
                catchers::internal_error,
            ],
        )
}
