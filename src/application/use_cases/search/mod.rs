pub mod search_definitions;
