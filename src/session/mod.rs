pub mod controller;
pub mod dialog;
