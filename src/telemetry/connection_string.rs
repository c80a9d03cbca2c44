use std::{fmt, str::FromStr};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectionStringError {
    #[error("malformed connection string segment: {0}")]
    MalformedSegment(String),

    #[error("connection string is missing {0}")]
    MissingField(&'static str),

    #[error("connection string needs SharedAccessKey or SharedAccessSignature")]
    MissingCredential,

    #[error("SharedAccessKey is not valid base64")]
    InvalidKey,
}

#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    SharedAccessKey {
        key: String,
        key_name: Option<String>,
    },
    SharedAccessSignature(String),
}

/// IoT Hub device connection string, e.g.
/// `HostName=hub.azure-devices.net;DeviceId=gateway;SharedAccessKey=...`.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub host_name: String,

    pub device_id: String,

    pub credential: Credential,
}

impl FromStr for ConnectionString {
    type Err = ConnectionStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut host_name = None;
        let mut device_id = None;
        let mut key = None;
        let mut key_name = None;
        let mut signature = None;

        for segment in s.trim().split(';').filter(|p| !p.is_empty()) {
            // Keys are base64 and may contain '=' themselves.
            let Some((name, value)) = segment.split_once('=') else {
                return Err(ConnectionStringError::MalformedSegment(segment.to_string()));
            };

            let slot = match name {
                "HostName" => &mut host_name,
                "DeviceId" => &mut device_id,
                "SharedAccessKey" => &mut key,
                "SharedAccessKeyName" => &mut key_name,
                "SharedAccessSignature" => &mut signature,
                _ => continue,
            };
            *slot = Some(value.to_string());
        }

        let host_name = host_name
            .filter(|v| !v.is_empty())
            .ok_or(ConnectionStringError::MissingField("HostName"))?;
        let device_id = device_id
            .filter(|v| !v.is_empty())
            .ok_or(ConnectionStringError::MissingField("DeviceId"))?;

        let credential = match (key, signature) {
            (Some(key), _) if !key.is_empty() => Credential::SharedAccessKey { key, key_name },
            (_, Some(signature)) if !signature.is_empty() => {
                Credential::SharedAccessSignature(signature)
            }
            _ => return Err(ConnectionStringError::MissingCredential),
        };

        Ok(Self {
            host_name,
            device_id,
            credential,
        })
    }
}

// Keeps secrets out of log output.
impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("host_name", &self.host_name)
            .field("device_id", &self.device_id)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::SharedAccessKey { key_name, .. } => f
                .debug_struct("SharedAccessKey")
                .field("key_name", key_name)
                .finish_non_exhaustive(),
            Credential::SharedAccessSignature(_) => f.write_str("SharedAccessSignature(..)"),
        }
    }
}
