pub mod auth;
pub mod comment;
pub mod engagement;
pub mod post;
pub mod shared;
pub mod tag;
pub mod user;
