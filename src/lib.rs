//! Terminal administration console for a fail2ban management endpoint.

pub mod app;
pub mod controller;
pub mod i18n;
pub mod model;
pub mod services;
pub mod state;
pub mod ui;
pub mod utils;
