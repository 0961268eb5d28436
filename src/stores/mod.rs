pub mod kv_store;
pub mod message_store;
pub mod session_store;
pub mod user_store;
