pub mod api;
pub mod chat;
pub mod core;
pub mod feedback;
pub mod handlers;
pub mod models;
pub mod session;
pub mod stores;
pub mod utils;
pub mod validation;

#[cfg(test)]
mod testing;
