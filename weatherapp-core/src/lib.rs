//! Core library for the `weatherapp` CLI.
//!
//! This crate defines:
//! - The WeatherAPI.com client and its error taxonomy
//! - The observable result state of a lookup
//! - The query controller that drives lookups and owns that state
//! - Configuration of the static API key
//!
//! It is used by `weatherapp-cli`, but any front-end can drive a
//! [`QueryController`] and render its [`ResultState`].

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod state;

pub use client::{WeatherApiClient, WeatherClient};
pub use config::Config;
pub use controller::{FAILED_TO_LOAD, FetchHandle, QueryController};
pub use error::{ClientError, FailureKind};
pub use model::{Condition, Current, Location, WeatherRecord};
pub use state::{RequestToken, ResultState, StateStore, Subscription};
