pub mod annotations;
pub mod auth;
pub mod documents;
pub mod health;
pub mod saves;
pub mod scoring;
pub mod search;
