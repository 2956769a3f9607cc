pub mod auth;
pub mod progress;
pub mod sets;
pub mod study;
pub mod test_results;
pub mod users;
