// src/styleswap/mod.rs

pub mod backdrop;
pub mod clients;
pub mod config;
pub mod controller;
pub mod credentials;
pub mod download;
pub mod event;
pub mod http_client_pool;
pub mod image_generation;
pub mod intake;
pub mod presets;
pub mod view;

// Re-export the session entry points so callers can write styleswap::StyleSwapController
// instead of styleswap::controller::StyleSwapController
pub use backdrop::BackdropGenerator;
pub use controller::StyleSwapController;
