#![allow(dead_code)]

use andersen_controller::backend::ChargeModeBackend;
use andersen_controller::error::UpstreamError;
use andersen_controller::gateway::{DeviceGateway, DeviceStatus, SolarInfo, SolarSettings};
use andersen_controller::models::{ChargeMode, Transition};
use andersen_controller::shadow::{ShadowDocument, ThingShadow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Charger double: reports `percent`, records every write.
#[derive(Clone, Default)]
pub struct FakeCharger {
    pub percent: Arc<Mutex<u8>>,
    pub writes: Arc<Mutex<Vec<SolarSettings>>>,
}

impl FakeCharger {
    pub fn with_percent(percent: u8) -> Self {
        FakeCharger {
            percent: Arc::new(Mutex::new(percent)),
            ..Default::default()
        }
    }

    pub fn writes(&self) -> Vec<SolarSettings> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeviceGateway for FakeCharger {
    async fn get_device_status(&self, _device_id: &str) -> Result<DeviceStatus, UpstreamError> {
        Ok(DeviceStatus {
            max_grid_charge_percent: *self.percent.lock().unwrap(),
        })
    }

    async fn get_device_solar(&self, _device_id: &str) -> Result<SolarInfo, UpstreamError> {
        Ok(SolarInfo::default())
    }

    async fn set_solar(&self, _device_id: &str, settings: SolarSettings) -> Result<(), UpstreamError> {
        self.writes.lock().unwrap().push(settings);
        *self.percent.lock().unwrap() = settings.max_grid_charge_percent;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryShadow {
    pub documents: Mutex<HashMap<String, ShadowDocument>>,
}

#[async_trait]
impl ThingShadow for MemoryShadow {
    async fn update_thing_shadow(
        &self,
        thing_name: &str,
        payload: &ShadowDocument,
    ) -> Result<(), UpstreamError> {
        self.documents
            .lock()
            .unwrap()
            .insert(thing_name.to_string(), payload.clone());
        Ok(())
    }

    async fn get_thing_shadow(&self, thing_name: &str) -> Result<ShadowDocument, UpstreamError> {
        self.documents
            .lock()
            .unwrap()
            .get(thing_name)
            .cloned()
            .ok_or_else(|| UpstreamError::ShadowNotFound {
                thing_name: thing_name.to_string(),
            })
    }
}

/// Backend double with a fixed reading that records requested modes.
#[derive(Default)]
pub struct RecordingBackend {
    pub mode: Option<ChargeMode>,
    pub requested: Mutex<Vec<ChargeMode>>,
}

#[async_trait]
impl ChargeModeBackend for RecordingBackend {
    async fn set_mode(&self, target: ChargeMode) -> Transition {
        self.requested.lock().unwrap().push(target);
        Transition::Applied {
            override_active: false,
        }
    }

    async fn get_mode(&self) -> Option<ChargeMode> {
        self.mode
    }
}
