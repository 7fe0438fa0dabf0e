// andersen/client.rs
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use rocket::serde::json::{serde_json, Value};
use rocket::serde::{de::DeserializeOwned, Serialize};
use rocket::tokio::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::andersen::data_models::{
    AuthParameters, Claims, Device, DeviceSolarData, DeviceStatusData, DevicesData,
    GraphQlRequest, GraphQlResponse, InitiateAuthRequest, InitiateAuthResponse,
    SetSolarVariables,
};
use crate::config::AndersenConfig;
use crate::error::UpstreamError;
use crate::gateway::{DeviceGateway, DeviceStatus, SolarInfo, SolarSettings};

const DEVICES_QUERY: &str =
    "query getDevices { getCurrentUserDevices { id friendlyName } }";

const DEVICE_STATUS_QUERY: &str = "query getDeviceStatus($id: ID!) { \
     deviceStatus(id: $id) { id solarMaxGridChargePercent } }";

const DEVICE_SOLAR_QUERY: &str = "query getDeviceSolar($id: ID!) { \
     getDevice(id: $id) { deviceInfo { solarOverrideStart } } }";

const SET_SOLAR_MUTATION: &str = "mutation setSolar($deviceId: ID!, $override: Boolean!, \
     $chargeAlways: Boolean!, $maxGridChargePercent: Int!) { \
     setSolar(deviceId: $deviceId, override: $override, chargeAlways: $chargeAlways, \
     maxGridChargePercent: $maxGridChargePercent) { id } }";

/// Andersen A2 cloud client: Cognito sign-in plus GraphQL calls.
pub struct AndersenClient {
    username: String,
    password: String,
    client_id: String,
    auth_url: String,
    api_url: String,
    token: Mutex<Option<String>>,
    client: Client,
    retries: u8,
}

impl AndersenClient {
    pub fn new(config: &AndersenConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .user_agent("andersen_controller")
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(AndersenClient {
            username: config.username.clone(),
            password: config.password.clone(),
            client_id: config.client_id.clone(),
            auth_url: config.auth_url.clone(),
            api_url: config.api_url.clone(),
            token: Mutex::new(None),
            client,
            retries: 3,
        })
    }

    #[instrument(skip_all, fields(username = %self.username))]
    pub async fn authenticate(&self) -> Result<(), UpstreamError> {
        let request = InitiateAuthRequest {
            AuthFlow: "USER_PASSWORD_AUTH".to_string(),
            ClientId: self.client_id.clone(),
            AuthParameters: AuthParameters {
                USERNAME: self.username.clone(),
                PASSWORD: self.password.clone(),
            },
        };

        let res = self
            .client
            .post(&self.auth_url)
            .header("Content-Type", "application/x-amz-json-1.1")
            .header(
                "X-Amz-Target",
                "AWSCognitoIdentityProviderService.InitiateAuth",
            )
            .body(serde_json::to_vec(&request)?)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(UpstreamError::auth(format!(
                "failed to login (status: {})",
                res.status()
            )));
        }

        let auth_response: InitiateAuthResponse = res.json().await?;
        let result = auth_response
            .AuthenticationResult
            .ok_or_else(|| UpstreamError::auth("no authentication result (challenge required?)"))?;

        *self.token.lock().await = Some(result.IdToken);
        info!(target: "app", "Authenticated");
        Ok(())
    }

    async fn valid_token(&self) -> Result<String, UpstreamError> {
        let cached = self.token.lock().await.clone();
        if let Some(token) = cached {
            if Claims::from_token(&token).is_ok_and(|claims| !claims.is_expired()) {
                return Ok(token);
            }
        }
        self.authenticate().await?;
        self.token
            .lock()
            .await
            .clone()
            .ok_or_else(|| UpstreamError::auth("no token after login"))
    }

    async fn retry_request<F>(&self, req_builder_func: F) -> Result<Response, UpstreamError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut retries = self.retries;
        let mut token = self.valid_token().await?;

        loop {
            let res = req_builder_func()
                .header("Authorization", &token)
                .send()
                .await?;

            if res.status() == StatusCode::UNAUTHORIZED && retries > 0 {
                retries -= 1;
                debug!(retries, "Token rejected, logging in again");
                self.authenticate().await?;
                token = self.valid_token().await?;
                continue;
            }

            if !res.status().is_success() {
                return Err(UpstreamError::api(format!(
                    "request failed (status: {})",
                    res.status()
                )));
            }
            return Ok(res);
        }
    }

    async fn graphql<V: Serialize, T: DeserializeOwned>(
        &self,
        query: &str,
        variables: V,
    ) -> Result<T, UpstreamError> {
        let request = GraphQlRequest { query, variables };
        let res = self
            .retry_request(|| self.client.post(&self.api_url).json(&request))
            .await?;
        let response: GraphQlResponse<T> = res.json().await?;
        response.into_data()
    }

    #[instrument(skip(self))]
    pub async fn device_by_name(&self, name: &str) -> Result<Device, UpstreamError> {
        let devices: DevicesData = self
            .graphql(DEVICES_QUERY, serde_json::json!({}))
            .await?;
        devices
            .getCurrentUserDevices
            .into_iter()
            .find(|device| device.friendlyName.as_deref() == Some(name))
            .ok_or_else(|| UpstreamError::DeviceNotFound {
                name: name.to_string(),
            })
    }
}

#[async_trait]
impl DeviceGateway for AndersenClient {
    #[instrument(skip(self))]
    async fn get_device_status(&self, device_id: &str) -> Result<DeviceStatus, UpstreamError> {
        let data: DeviceStatusData = self
            .graphql(DEVICE_STATUS_QUERY, serde_json::json!({ "id": device_id }))
            .await?;
        let status = data.normalize()?;
        debug!(?status, "Fetched device status");
        Ok(status)
    }

    #[instrument(skip(self))]
    async fn get_device_solar(&self, device_id: &str) -> Result<SolarInfo, UpstreamError> {
        let data: DeviceSolarData = self
            .graphql(DEVICE_SOLAR_QUERY, serde_json::json!({ "id": device_id }))
            .await?;
        data.normalize()
    }

    #[instrument(skip(self))]
    async fn set_solar(
        &self,
        device_id: &str,
        settings: SolarSettings,
    ) -> Result<(), UpstreamError> {
        let _: Value = self
            .graphql(
                SET_SOLAR_MUTATION,
                SetSolarVariables::new(device_id, settings),
            )
            .await?;
        Ok(())
    }
}
