use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use tracing::{error, info};

use crate::gateway::{DeviceGateway, SolarSettings};
use crate::models::{ChargeMode, Transition};

/// How long a vendor-reported solar override stays active.
pub const OVERRIDE_WINDOW: TimeDelta = TimeDelta::hours(2);

/// `true` while less than [`OVERRIDE_WINDOW`] has elapsed since `start`.
pub fn override_active(start: Option<NaiveDateTime>, now: NaiveDateTime) -> bool {
    match start {
        Some(start) => now - start < OVERRIDE_WINDOW,
        None => false,
    }
}

/// Decides and applies grid/solar transitions for a single charger.
///
/// Every decision is taken from a fresh device read: the charger can be
/// switched from the vendor app at any time, so nothing is cached here.
pub struct ChargeModeController<G> {
    gateway: G,
    device_id: String,
    now: fn() -> DateTime<Utc>,
}

impl<G: DeviceGateway> ChargeModeController<G> {
    pub fn new(gateway: G, device_id: String) -> Self {
        ChargeModeController {
            gateway,
            device_id,
            now: Utc::now,
        }
    }

    pub fn with_clock(mut self, now: fn() -> DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Current mode, or [`ChargeMode::Solar`] when the device cannot be read.
    pub async fn get_current_mode(&self) -> ChargeMode {
        match self.gateway.get_device_status(&self.device_id).await {
            Ok(status) => ChargeMode::from_charge_from_grid(status.charge_from_grid()),
            Err(e) => {
                error!("failed to fetch max grid charge: {e}");
                ChargeMode::Solar
            }
        }
    }

    pub async fn get_charge_from_grid(&self) -> bool {
        self.get_current_mode().await.is_grid()
    }

    /// Fail-closed: any failure reads as no override.
    pub async fn get_solar_override(&self) -> bool {
        match self.gateway.get_device_solar(&self.device_id).await {
            Ok(solar) => override_active(solar.override_start, (self.now)().naive_utc()),
            Err(e) => {
                error!("failed to fetch solar override: {e}");
                false
            }
        }
    }

    pub async fn set_charge_from_grid(&self, charge_from_grid: bool) -> Transition {
        if charge_from_grid == self.get_charge_from_grid().await {
            info!(target: "app", "set_charge_from_grid {charge_from_grid} already set");
            return Transition::Unchanged;
        }

        let override_active = self.get_solar_override().await;
        info!(target: "app", "set_charge_from_grid {charge_from_grid} override={override_active}");

        let settings = SolarSettings::for_target(charge_from_grid, override_active);
        match self.gateway.set_solar(&self.device_id, settings).await {
            Ok(()) => Transition::Applied { override_active },
            Err(e) => {
                error!("failed to set charge mode: {e}");
                Transition::WriteFailed
            }
        }
    }

    pub async fn set_mode(&self, mode: ChargeMode) -> Transition {
        self.set_charge_from_grid(mode.is_grid()).await
    }
}
