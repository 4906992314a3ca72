pub mod comment;
pub mod hash;
pub mod jwt;
pub mod post;
pub mod slug;
pub mod visibility;
