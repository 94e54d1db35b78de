pub mod autolink;
pub mod scoring;
pub mod search;
pub mod segmenter;
