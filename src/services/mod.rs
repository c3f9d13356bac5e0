pub mod api_client;
pub mod exports;
pub mod gateway;
pub mod preferences;
