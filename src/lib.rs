#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod animation;
pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod markup;
pub mod telemetry;
pub mod theme;
pub mod types;
pub mod util;

pub use controller::Toastify;

pub type Result<T> = std::result::Result<T, error::Error>;
