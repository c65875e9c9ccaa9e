pub mod database;
pub mod handlers;
pub mod search;
pub mod store;
pub mod sync;
