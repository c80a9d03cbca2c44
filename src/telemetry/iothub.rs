use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use reqwest::{Client, header};
use sha2::Sha256;
use tracing::debug;

use crate::telemetry::{
    ConnectionString, ConnectionStringError, Credential, DeviceClient, SinkError,
};

const API_VERSION: &str = "2020-03-13";

const SEND_TIMEOUT: Duration = Duration::from_secs(5);

const TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Device client for the IoT Hub HTTPS device-to-cloud endpoint.
#[derive(Debug)]
pub struct IotHubClient {
    client: Client,
    connection: ConnectionString,
    events_url: String,
}

impl IotHubClient {
    pub fn from_connection_string(connection_string: &str) -> Result<Self, SinkError> {
        let connection: ConnectionString = connection_string.parse()?;

        if let Credential::SharedAccessKey { key, .. } = &connection.credential {
            STANDARD
                .decode(key)
                .map_err(|_| ConnectionStringError::InvalidKey)?;
        }

        let client = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(SinkError::Client)?;

        let events_url = format!(
            "https://{}/devices/{}/messages/events?api-version={API_VERSION}",
            connection.host_name,
            urlencoding::encode(&connection.device_id),
        );

        Ok(Self {
            client,
            connection,
            events_url,
        })
    }

    pub fn device_id(&self) -> &str {
        &self.connection.device_id
    }

    fn authorization(&self) -> Result<String, SinkError> {
        match &self.connection.credential {
            Credential::SharedAccessSignature(signature) => Ok(signature.clone()),
            Credential::SharedAccessKey { key, key_name } => {
                let expiry = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    + TOKEN_TTL;
                let resource = format!(
                    "{}/devices/{}",
                    self.connection.host_name, self.connection.device_id
                );

                sas_token(&resource, key, key_name.as_deref(), expiry.as_secs())
            }
        }
    }
}

#[async_trait]
impl DeviceClient for IotHubClient {
    async fn send_message(&self, message: String) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.events_url)
            .header(header::AUTHORIZATION, self.authorization()?)
            .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
            .body(message)
            .send()
            .await
            .map_err(SinkError::Send)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(
            device_id = %self.connection.device_id,
            status = status.as_u16(),
            "message accepted"
        );
        Ok(())
    }
}

/// Builds a shared access signature for `resource` valid until `expiry`
/// (seconds since the Unix epoch).
pub fn sas_token(
    resource: &str,
    key: &str,
    key_name: Option<&str>,
    expiry: u64,
) -> Result<String, SinkError> {
    let key = STANDARD
        .decode(key)
        .map_err(|_| ConnectionStringError::InvalidKey)?;
    let encoded_resource = urlencoding::encode(resource);

    let mut mac = Hmac::<Sha256>::new_from_slice(&key)
        .map_err(|_| ConnectionStringError::InvalidKey)?;
    mac.update(format!("{encoded_resource}\n{expiry}").as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    let mut token = format!(
        "SharedAccessSignature sr={encoded_resource}&sig={}&se={expiry}",
        urlencoding::encode(&signature)
    );
    if let Some(key_name) = key_name {
        token.push_str("&skn=");
        token.push_str(key_name);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_events_url_for_the_device() {
        let client = IotHubClient::from_connection_string(
            "HostName=hub.azure-devices.net;DeviceId=gateway 01;SharedAccessKey=c2VjcmV0",
        )
        .unwrap();

        assert_eq!(client.device_id(), "gateway 01");
        assert_eq!(
            client.events_url,
            "https://hub.azure-devices.net/devices/gateway%2001/messages/events?api-version=2020-03-13"
        );
    }

    #[test]
    fn rejects_key_that_is_not_base64() {
        let err = IotHubClient::from_connection_string(
            "HostName=h;DeviceId=d;SharedAccessKey=not base64!",
        )
        .unwrap_err();

        assert!(matches!(err, SinkError::Connect(_)));
    }

    #[test]
    fn sas_token_has_expected_shape() {
        let token = sas_token("hub.azure-devices.net/devices/d", "c2VjcmV0", None, 1_700_000_000)
            .unwrap();

        assert!(token.starts_with(
            "SharedAccessSignature sr=hub.azure-devices.net%2Fdevices%2Fd&sig="
        ));
        assert!(token.ends_with("&se=1700000000"));
        assert!(!token.contains("skn="));

        let again = sas_token("hub.azure-devices.net/devices/d", "c2VjcmV0", None, 1_700_000_000)
            .unwrap();
        assert_eq!(token, again);
    }

    #[test]
    fn sas_token_names_the_policy() {
        let token = sas_token("h/devices/d", "c2VjcmV0", Some("device"), 1).unwrap();

        assert!(token.ends_with("&se=1&skn=device"));
    }
}
