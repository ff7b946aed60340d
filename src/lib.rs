pub mod config;
pub mod domain;
pub mod forms;
pub mod logging;
pub mod models;
pub mod repository;
pub mod services;
