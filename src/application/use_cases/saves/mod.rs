pub mod finalize_save;
pub mod list_saves;
pub mod rename_save;
