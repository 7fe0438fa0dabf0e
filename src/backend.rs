//! One controller interface over the two deployments: direct device control
//! and the shadow-mediated desired mode.

use async_trait::async_trait;
use tracing::info;

use crate::controller::ChargeModeController;
use crate::gateway::DeviceGateway;
use crate::models::{ChargeMode, Transition};
use crate::shadow::{ShadowModeStore, ThingShadow};

#[async_trait]
pub trait ChargeModeBackend: Send + Sync {
    async fn set_mode(&self, target: ChargeMode) -> Transition;

    /// `None` means no mode could be established.
    async fn get_mode(&self) -> Option<ChargeMode>;
}

#[async_trait]
impl<G: DeviceGateway> ChargeModeBackend for ChargeModeController<G> {
    async fn set_mode(&self, target: ChargeMode) -> Transition {
        ChargeModeController::set_mode(self, target).await
    }

    /// Always a definite mode: an unreadable device reads as solar.
    async fn get_mode(&self) -> Option<ChargeMode> {
        Some(self.get_current_mode().await)
    }
}

#[async_trait]
impl<S: ThingShadow> ChargeModeBackend for ShadowModeStore<S> {
    async fn set_mode(&self, target: ChargeMode) -> Transition {
        if self.set_charge_mode(target).await {
            Transition::Applied {
                override_active: false,
            }
        } else {
            Transition::WriteFailed
        }
    }

    async fn get_mode(&self) -> Option<ChargeMode> {
        self.get_charge_mode().await
    }
}

/// Applies the shadow's desired mode to the device. Nothing happens while the
/// shadow holds no valid mode.
pub async fn sync_desired_mode<S, G>(
    store: &ShadowModeStore<S>,
    controller: &ChargeModeController<G>,
) -> Option<Transition>
where
    S: ThingShadow,
    G: DeviceGateway,
{
    let Some(desired) = store.get_charge_mode().await else {
        info!(target: "app", thing_name = store.thing_name(), "No desired mode to sync");
        return None;
    };
    let transition = controller.set_mode(desired).await;
    info!(target: "app", %desired, ?transition, "Synced desired mode");
    Some(transition)
}
