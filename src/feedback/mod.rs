pub mod loading;
pub mod notice;
