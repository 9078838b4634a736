pub mod api;
pub mod app;
pub mod dashboard;
pub mod gui;
pub mod logging;
pub mod notify;
pub mod settings;
