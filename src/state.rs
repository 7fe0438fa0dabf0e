use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::andersen::AndersenClient;
use crate::backend::ChargeModeBackend;
use crate::config::{AndersenConfig, Backend, Config, ShadowConfig};
use crate::controller::ChargeModeController;
use crate::error::AppError;
use crate::models::ChargeMode;
use crate::schedule::ScheduledPolicy;
use crate::shadow::{FileThingShadow, ShadowModeStore};

/// Response of a scheduled trigger, shaped like a function-invocation result.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(crate = "rocket::serde")]
pub struct EventResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

pub struct AppState {
    pub backend: Arc<dyn ChargeModeBackend>,
    pub policy: ScheduledPolicy,
    now: fn() -> DateTime<Utc>,
}

impl AppState {
    pub fn new(backend: Arc<dyn ChargeModeBackend>, policy: ScheduledPolicy) -> Self {
        AppState {
            backend,
            policy,
            now: Utc::now,
        }
    }

    pub fn with_clock(mut self, now: fn() -> DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.now)()
    }

    /// Builds the backend selected by `config.backend`.
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        let policy = ScheduledPolicy::from_config(&config.schedule)?;
        let backend: Arc<dyn ChargeModeBackend> = match config.backend {
            Backend::Andersen => Arc::new(connect_controller(&config.andersen).await?),
            Backend::Shadow => Arc::new(shadow_store(&config.shadow)),
        };
        info!(target: "app", backend = ?config.backend, timezone = %policy.timezone(), "Backend ready");
        Ok(AppState::new(backend, policy))
    }

    /// Applies the nightly policy for `now`.
    pub async fn run_schedule(&self, now: DateTime<Utc>) -> EventResponse {
        let mode = self.policy.mode_at(now);
        let transition = self.backend.set_mode(mode).await;
        info!(target: "app", ?transition, "Scheduled event triggered. Setting charging mode to {mode}.");
        EventResponse {
            status_code: 200,
            body: format!("Charging mode set to {mode}"),
        }
    }

    pub async fn set_mode(&self, mode: ChargeMode) -> String {
        self.backend.set_mode(mode).await;
        format!("Charging mode is now {mode}.")
    }

    pub async fn describe_mode(&self) -> (Option<ChargeMode>, String) {
        let mode = self.backend.get_mode().await;
        let message = match mode {
            Some(mode) => format!("The current charging mode is {mode}."),
            None => "The current charging mode is not set.".to_string(),
        };
        (mode, message)
    }
}

/// Signs in and resolves the configured device.
pub async fn connect_controller(
    config: &AndersenConfig,
) -> Result<ChargeModeController<AndersenClient>, AppError> {
    let client = AndersenClient::new(config)?;
    client.authenticate().await?;
    let device = client.device_by_name(&config.device_name).await?;
    info!(target: "app", device_id = %device.id, "Resolved device {}", config.device_name);
    Ok(ChargeModeController::new(client, device.id))
}

pub fn shadow_store(config: &ShadowConfig) -> ShadowModeStore<FileThingShadow> {
    ShadowModeStore::new(
        FileThingShadow::new(config.directory.clone()),
        config.thing_name.clone(),
    )
}
