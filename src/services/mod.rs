pub mod mapper;
pub mod search;
