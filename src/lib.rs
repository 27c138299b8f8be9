pub mod config;
pub mod controllers;
pub mod database;
pub mod duration;
pub mod models;
pub mod services;
pub mod views;

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub config: config::Config,
    pub notifier: services::notify::Notifier,
}
