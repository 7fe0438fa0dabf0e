pub mod andersen;
pub mod backend;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod routes;
pub mod schedule;
pub mod shadow;
pub mod state;

pub use backend::ChargeModeBackend;
pub use controller::ChargeModeController;
pub use gateway::DeviceGateway;
pub use models::{ChargeMode, Transition};
