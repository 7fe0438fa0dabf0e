pub mod client;
pub mod data_models;

pub use client::AndersenClient;
