use crate::domain::tv::Delay;
use async_trait::async_trait;
use std::time::Duration;

/// Sleeps on the tokio timer
pub struct TokioDelay;

impl Default for TokioDelay {
    fn default() -> Self {
        Self
    }
}

impl TokioDelay {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
