mod comment;
mod engagement;
mod post;
