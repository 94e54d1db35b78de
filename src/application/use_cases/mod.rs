pub mod annotations;
pub mod auth;
pub mod documents;
pub mod export;
pub mod saves;
pub mod scoring;
pub mod search;
