pub mod feed;
pub mod poller;
pub mod room;
