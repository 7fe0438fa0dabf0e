// andersen/data_models.rs
#![allow(non_snake_case)]

use base64::engine::general_purpose;
use base64::Engine;
use chrono::{DateTime, NaiveDateTime};
use rocket::serde::json::{serde_json, Value};
use rocket::serde::{Deserialize, Serialize};

use crate::error::UpstreamError;
use crate::gateway::{DeviceStatus, SolarInfo, SolarSettings};

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct Claims {
    pub exp: u64,
}

impl Claims {
    pub fn from_token(token: &str) -> Result<Self, UpstreamError> {
        let parts = token.split('.').collect::<Vec<&str>>();
        if parts.len() != 3 {
            return Err(UpstreamError::auth("invalid token format"));
        }
        let decoded_bytes = general_purpose::URL_SAFE_NO_PAD
            .decode(parts[1].trim_end_matches('='))
            .map_err(|e| UpstreamError::auth(format!("invalid token payload: {e}")))?;
        Ok(serde_json::from_slice(&decoded_bytes)?)
    }

    pub fn is_expired_at(&self, now_epoch_secs: u64) -> bool {
        self.exp < now_epoch_secs
    }

    pub fn is_expired(&self) -> bool {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        self.is_expired_at(now)
    }
}

#[derive(Serialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct InitiateAuthRequest {
    pub AuthFlow: String,
    pub ClientId: String,
    pub AuthParameters: AuthParameters,
}

#[derive(Serialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct AuthParameters {
    pub USERNAME: String,
    pub PASSWORD: String,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct InitiateAuthResponse {
    pub AuthenticationResult: Option<AuthenticationResult>,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct AuthenticationResult {
    pub IdToken: String,
}

#[derive(Serialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct GraphQlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct GraphQlError {
    pub message: String,
}

impl<T> GraphQlResponse<T> {
    pub fn into_data(self) -> Result<T, UpstreamError> {
        if !self.errors.is_empty() {
            let messages = self
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(UpstreamError::api(messages));
        }
        self.data
            .ok_or_else(|| UpstreamError::malformed("response has no `data`"))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(crate = "rocket::serde")]
pub struct Device {
    pub id: String,
    pub friendlyName: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct DevicesData {
    #[serde(default)]
    pub getCurrentUserDevices: Vec<Device>,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct DeviceStatusData {
    pub deviceStatus: Option<RawDeviceStatus>,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct RawDeviceStatus {
    #[serde(default)]
    pub solarMaxGridChargePercent: Value,
}

impl DeviceStatusData {
    pub fn normalize(self) -> Result<DeviceStatus, UpstreamError> {
        let status = self
            .deviceStatus
            .ok_or_else(|| UpstreamError::malformed("missing `deviceStatus`"))?;
        Ok(DeviceStatus {
            max_grid_charge_percent: normalize_percent(&status.solarMaxGridChargePercent)?,
        })
    }
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct DeviceSolarData {
    pub getDevice: Option<SolarDevice>,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct SolarDevice {
    pub deviceInfo: Option<SolarDeviceInfo>,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct SolarDeviceInfo {
    pub solarOverrideStart: Option<String>,
}

impl DeviceSolarData {
    /// A missing device or info block reads as "no override reported".
    pub fn normalize(self) -> Result<SolarInfo, UpstreamError> {
        let start = self
            .getDevice
            .and_then(|device| device.deviceInfo)
            .and_then(|info| info.solarOverrideStart);
        Ok(SolarInfo {
            override_start: parse_override_start(start.as_deref())?,
        })
    }
}

#[derive(Serialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct SetSolarVariables<'a> {
    pub deviceId: &'a str,
    #[serde(rename = "override")]
    pub override_: bool,
    pub chargeAlways: bool,
    pub maxGridChargePercent: u8,
}

impl<'a> SetSolarVariables<'a> {
    pub fn new(device_id: &'a str, settings: SolarSettings) -> Self {
        SetSolarVariables {
            deviceId: device_id,
            override_: settings.override_active,
            chargeAlways: settings.charge_always,
            maxGridChargePercent: settings.max_grid_charge_percent,
        }
    }
}

/// Accepts an integer, an integral float or an integer string in `0..=100`.
pub fn normalize_percent(value: &Value) -> Result<u8, UpstreamError> {
    let percent = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        UpstreamError::malformed(format!("invalid solarMaxGridChargePercent: {value}"))
    })?;

    u8::try_from(percent)
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| {
            UpstreamError::malformed(format!("solarMaxGridChargePercent out of range: {percent}"))
        })
}

/// Parses an ISO-8601 timestamp into naive UTC. A trailing offset is dropped
/// without shifting the wall-clock time.
pub fn parse_override_start(raw: Option<&str>) -> Result<Option<NaiveDateTime>, UpstreamError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(with_offset.naive_local()));
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(naive));
        }
    }
    Err(UpstreamError::malformed(format!(
        "invalid solarOverrideStart `{raw}`"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rocket::serde::json::json;

    fn fake_token(payload: &str) -> String {
        format!(
            "eyJhbGciOiJSUzI1NiJ9.{}.c2lnbmF0dXJl",
            general_purpose::URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_claims_from_token() {
        // NOTE: this is a fake token
        let token = fake_token(r#"{"sub":"user@example.com","exp":1735777779}"#);
        let claims = Claims::from_token(&token).unwrap();
        assert_eq!(claims.exp, 1735777779);
        assert!(!claims.is_expired_at(1735677779));
        assert!(claims.is_expired_at(1735777780));
    }

    #[test]
    fn test_claims_rejects_garbage() {
        assert!(Claims::from_token("not-a-jwt").is_err());
        assert!(Claims::from_token("a.!!!.c").is_err());
    }

    #[test]
    fn test_normalize_percent() {
        assert_eq!(normalize_percent(&json!(100)).unwrap(), 100);
        assert_eq!(normalize_percent(&json!(0)).unwrap(), 0);
        assert_eq!(normalize_percent(&json!(50.0)).unwrap(), 50);
        assert_eq!(normalize_percent(&json!(" 100 ")).unwrap(), 100);
        assert!(normalize_percent(&json!(null)).is_err());
        assert!(normalize_percent(&json!("full")).is_err());
        assert!(normalize_percent(&json!(101)).is_err());
        assert!(normalize_percent(&json!(-1)).is_err());
        assert!(normalize_percent(&json!(12.5)).is_err());
    }

    #[test]
    fn test_status_payload() {
        let data: DeviceStatusData = serde_json::from_value(json!({
            "deviceStatus": {"id": "dev-1", "solarMaxGridChargePercent": 100}
        }))
        .unwrap();
        assert!(data.normalize().unwrap().charge_from_grid());

        let data: DeviceStatusData =
            serde_json::from_value(json!({"deviceStatus": {}})).unwrap();
        assert!(data.normalize().is_err());
    }

    #[test]
    fn test_override_start_parsing() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(
            parse_override_start(Some("2024-06-01T10:30:00")).unwrap(),
            Some(expected)
        );
        assert_eq!(
            parse_override_start(Some("2024-06-01T10:30:00Z")).unwrap(),
            Some(expected)
        );
        // offset is dropped, not applied
        assert_eq!(
            parse_override_start(Some("2024-06-01T10:30:00+01:00")).unwrap(),
            Some(expected)
        );
        assert_eq!(
            parse_override_start(Some("2024-06-01 10:30:00.000")).unwrap(),
            Some(expected)
        );
        assert_eq!(
            parse_override_start(Some("2024-06-01T10:30")).unwrap(),
            Some(expected)
        );
        assert_eq!(parse_override_start(None).unwrap(), None);
        assert_eq!(parse_override_start(Some("")).unwrap(), None);
        assert!(parse_override_start(Some("yesterday")).is_err());
    }

    #[test]
    fn test_solar_payload_without_start() {
        let data: DeviceSolarData = serde_json::from_value(json!({
            "getDevice": {"deviceInfo": {"solarOverrideStart": null}}
        }))
        .unwrap();
        assert_eq!(data.normalize().unwrap(), SolarInfo::default());

        let data: DeviceSolarData = serde_json::from_value(json!({"getDevice": null})).unwrap();
        assert_eq!(data.normalize().unwrap().override_start, None);
    }

    #[test]
    fn test_set_solar_variables_wire_names() {
        let variables =
            SetSolarVariables::new("dev-1", SolarSettings::for_target(true, false));
        assert_eq!(
            serde_json::to_value(&variables).unwrap(),
            json!({
                "deviceId": "dev-1",
                "override": false,
                "chargeAlways": true,
                "maxGridChargePercent": 100
            })
        );
    }

    #[test]
    fn test_graphql_errors_surface() {
        let response: GraphQlResponse<DevicesData> = serde_json::from_value(json!({
            "data": null,
            "errors": [{"message": "Unauthorized"}, {"message": "try again"}]
        }))
        .unwrap();
        match response.into_data() {
            Err(UpstreamError::Api { message }) => assert_eq!(message, "Unauthorized; try again"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
