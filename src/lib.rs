pub use client::RaceCardService;
pub use config::Settings;
pub use error::{Result, ServiceError};
pub use link::validate_url;
pub use model::*;

pub mod browser;
mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod link;
pub mod model;
pub mod parse;
pub mod render;
