pub mod score_save;
