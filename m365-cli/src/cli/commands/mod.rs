pub mod query;
pub mod token;
