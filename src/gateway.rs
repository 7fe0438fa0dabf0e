//! The charger capability consumed by the controller.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::UpstreamError;

/// Fresh snapshot of the vendor-reported device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStatus {
    /// `0..=100`
    pub max_grid_charge_percent: u8,
}

impl DeviceStatus {
    /// The device only counts as grid charging when the grid cap is fully open.
    pub fn charge_from_grid(&self) -> bool {
        self.max_grid_charge_percent == 100
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolarInfo {
    /// Start of the solar override window, naive UTC.
    pub override_start: Option<NaiveDateTime>,
}

/// Payload of a single `set_solar` write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolarSettings {
    pub override_active: bool,
    pub charge_always: bool,
    pub max_grid_charge_percent: u8,
}

impl SolarSettings {
    pub fn for_target(charge_from_grid: bool, override_active: bool) -> Self {
        SolarSettings {
            override_active,
            charge_always: charge_from_grid,
            max_grid_charge_percent: if charge_from_grid { 100 } else { 0 },
        }
    }
}

#[async_trait]
pub trait DeviceGateway: Send + Sync {
    async fn get_device_status(&self, device_id: &str) -> Result<DeviceStatus, UpstreamError>;

    async fn get_device_solar(&self, device_id: &str) -> Result<SolarInfo, UpstreamError>;

    async fn set_solar(&self, device_id: &str, settings: SolarSettings)
        -> Result<(), UpstreamError>;
}
