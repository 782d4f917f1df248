pub mod chat_store;
pub mod database;
pub mod error;

pub use chat_store::ChatStore;
