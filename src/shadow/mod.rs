//! Desired charge mode persisted in a thing shadow document.

pub mod file;

use async_trait::async_trait;
use rocket::serde::json::Value;
use rocket::serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::UpstreamError;
use crate::models::ChargeMode;

pub use file::FileThingShadow;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(crate = "rocket::serde")]
pub struct ShadowDocument {
    #[serde(default)]
    pub state: ShadowState,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(crate = "rocket::serde")]
pub struct ShadowState {
    #[serde(default)]
    pub desired: DesiredState,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(crate = "rocket::serde")]
pub struct DesiredState {
    /// Kept as raw JSON so that foreign values, strings or not, still load.
    #[serde(
        rename = "chargeMode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub charge_mode: Option<Value>,
}

impl ShadowDocument {
    pub fn desired(mode: ChargeMode) -> Self {
        ShadowDocument {
            state: ShadowState {
                desired: DesiredState {
                    charge_mode: Some(Value::String(mode.to_string())),
                },
            },
        }
    }
}

#[async_trait]
pub trait ThingShadow: Send + Sync {
    async fn update_thing_shadow(
        &self,
        thing_name: &str,
        payload: &ShadowDocument,
    ) -> Result<(), UpstreamError>;

    async fn get_thing_shadow(&self, thing_name: &str) -> Result<ShadowDocument, UpstreamError>;
}

/// Last-writer-wins store of the desired mode; no versioning.
pub struct ShadowModeStore<S> {
    shadow: S,
    thing_name: String,
}

impl<S: ThingShadow> ShadowModeStore<S> {
    pub fn new(shadow: S, thing_name: String) -> Self {
        ShadowModeStore { shadow, thing_name }
    }

    pub fn thing_name(&self) -> &str {
        &self.thing_name
    }

    /// Returns whether the document was written.
    pub async fn set_charge_mode(&self, mode: ChargeMode) -> bool {
        match self
            .shadow
            .update_thing_shadow(&self.thing_name, &ShadowDocument::desired(mode))
            .await
        {
            Ok(()) => {
                info!(target: "app", "Charge mode set to {mode} in shadow");
                true
            }
            Err(e) => {
                error!("failed to set charge mode: {e}");
                false
            }
        }
    }

    /// `None` when the shadow is unreadable or holds no valid mode.
    pub async fn get_charge_mode(&self) -> Option<ChargeMode> {
        let document = match self.shadow.get_thing_shadow(&self.thing_name).await {
            Ok(document) => document,
            Err(e) => {
                error!("failed to get charge mode: {e}");
                return None;
            }
        };
        match document.state.desired.charge_mode {
            Some(Value::String(value)) => value.parse::<ChargeMode>().map_or_else(
                |_| {
                    warn!(%value, "Charge mode in shadow is invalid");
                    None
                },
                Some,
            ),
            Some(value) => {
                warn!(%value, "Charge mode in shadow is invalid");
                None
            }
            None => {
                warn!("Charge mode in shadow is not set");
                None
            }
        }
    }
}
