use std::error::Error;

use tracing::{error, info, warn};

use crate::{
    record::MergedRecord,
    telemetry::{DeviceClient, IotHubClient},
};

/// Best-effort forwarder of merged records.
///
/// A sink is either connected to a device client or disabled. Nothing that
/// happens inside [`TelemetrySink::send`] is reported back to the caller.
pub struct TelemetrySink {
    client: Option<Box<dyn DeviceClient>>,
}

impl TelemetrySink {
    /// Creates an IoT Hub client from the connection string, falling back to a
    /// disabled sink when that fails.
    pub fn connect(connection_string: &str) -> Self {
        match IotHubClient::from_connection_string(connection_string) {
            Ok(client) => {
                info!(device_id = client.device_id(), "IoT Hub device client ready");
                Self::new(client)
            }
            Err(err) => {
                error!(
                    error = &err as &dyn Error,
                    "failed to connect to IoT Hub, telemetry disabled"
                );
                Self::disabled()
            }
        }
    }

    pub fn new(client: impl DeviceClient + 'static) -> Self {
        Self {
            client: Some(Box::new(client)),
        }
    }

    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    pub async fn send(&self, record: &MergedRecord) {
        let Some(client) = &self.client else {
            warn!("device client is not initialized, skipping send");
            return;
        };

        let message = match record.to_json() {
            Ok(m) => m,
            Err(err) => {
                error!(error = %err, ?record, "failed to serialize record");
                return;
            }
        };

        match client.send_message(message.clone()).await {
            Ok(()) => info!(%message, "sent to IoT Hub"),
            Err(err) => {
                error!(
                    error = &err as &dyn Error,
                    ?record,
                    "failed to send to IoT Hub"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::telemetry::SinkError;

    #[derive(Default, Clone)]
    struct RecordingClient {
        sent: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl DeviceClient for RecordingClient {
        async fn send_message(&self, message: String) -> Result<(), SinkError> {
            self.sent.lock().unwrap().push(message);
            Ok(())
        }
    }

    struct RejectingClient;

    #[async_trait]
    impl DeviceClient for RejectingClient {
        async fn send_message(&self, _message: String) -> Result<(), SinkError> {
            Err(SinkError::Rejected {
                status: 401,
                body: "unauthorized".to_string(),
            })
        }
    }

    fn record() -> MergedRecord {
        MergedRecord {
            device_time: "2024-01-01 12:00:00".to_string(),
            humidity: 45.2,
            temperature: 22.1,
        }
    }

    #[tokio::test]
    async fn sends_serialized_record() {
        let client = RecordingClient::default();
        let sink = TelemetrySink::new(client.clone());

        sink.send(&record()).await;

        assert_eq!(
            *client.sent.lock().unwrap(),
            vec![r#"{"device_time":"2024-01-01 12:00:00","humidity":45.2,"temperature":22.1}"#]
        );
    }

    #[tokio::test]
    async fn swallows_client_failures() {
        let sink = TelemetrySink::new(RejectingClient);

        sink.send(&record()).await;
        sink.send(&record()).await;
    }

    #[tokio::test]
    async fn malformed_credential_disables_the_sink() {
        let sink = TelemetrySink::connect("garbage");

        assert!(!sink.is_connected());
        sink.send(&record()).await;
    }

    #[test]
    fn valid_credential_connects() {
        let sink = TelemetrySink::connect(
            "HostName=hub.azure-devices.net;DeviceId=d;SharedAccessKey=c2VjcmV0",
        );

        assert!(sink.is_connected());
    }
}
