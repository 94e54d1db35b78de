pub mod export_save;
