pub mod repository;
pub mod search;
