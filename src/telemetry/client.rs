use async_trait::async_trait;
use thiserror::Error;

use crate::telemetry::ConnectionStringError;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to create device client")]
    Connect(#[from] ConnectionStringError),

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("failed to serialize record")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to send message")]
    Send(#[source] reqwest::Error),

    #[error("message rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Transport for device-to-cloud messages.
#[async_trait]
pub trait DeviceClient: Send + Sync {
    async fn send_message(&self, message: String) -> Result<(), SinkError>;
}
