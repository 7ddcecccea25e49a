use super::cec_controller::CecController;
use crate::domain::tv::{AdapterId, HdmiPort, PowerStatus, TvControlError};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cloneable handle that serializes every operation on one controller.
///
/// The adapter bus cannot take overlapping commands, so each call holds the
/// lock until the operation, including its sleeps, has finished.
#[derive(Clone)]
pub struct SharedCecController {
    inner: Arc<Mutex<CecController>>,
}

impl SharedCecController {
    pub fn new(controller: CecController) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    pub async fn adapter(&self) -> Option<AdapterId> {
        self.inner.lock().await.adapter()
    }

    pub async fn power_status(&self) -> Option<bool> {
        self.inner.lock().await.power_status().await
    }

    pub async fn query_power_status(&self) -> Option<PowerStatus> {
        self.inner.lock().await.query_power_status().await
    }

    pub async fn turn_on(&self) -> bool {
        self.inner.lock().await.turn_on().await
    }

    pub async fn turn_off(&self) -> bool {
        self.inner.lock().await.turn_off().await
    }

    pub async fn wait_for_ready(&self, max_attempts: u32) -> bool {
        self.inner.lock().await.wait_for_ready(max_attempts).await
    }

    pub async fn switch_input<D>(&self, device: D, retry_count: u32) -> bool
    where
        D: TryInto<HdmiPort, Error = TvControlError>,
    {
        let controller = self.inner.lock().await;
        controller.switch_input(device, retry_count).await
    }

    pub async fn switch_input_simple<D>(&self, device: D) -> bool
    where
        D: TryInto<HdmiPort, Error = TvControlError>,
    {
        let controller = self.inner.lock().await;
        controller.switch_input_simple(device).await
    }
}
