use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactStore;
use crate::cluster::AUTHORITY_PORT;
use crate::inference::{ImageClient, InvocationParams};

/// Default gateway port
pub const GATEWAY_PORT: u16 = 8302;

/// Default request body limit for uploads (32 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// The complete configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub gateway: GatewayConfig,
    pub artifacts: ArtifactConfig,
    pub inference: InferenceConfig,
    pub authority: AuthorityConfig,
    pub relay: RelayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind_addr: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: GATEWAY_PORT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl GatewayConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// Where uploaded payloads are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub dir: String,
    /// Leave artifact files on disk after the request completes
    pub retain: bool,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: "/tmp/".to_string(),
            retain: false,
        }
    }
}

impl ArtifactConfig {
    pub fn dir_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.dir).into_owned())
    }

    pub fn store(&self) -> ArtifactStore {
        ArtifactStore::new(self.dir_path()).with_retain(self.retain)
    }
}

/// The external image client and the arguments it is run with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Interpreter to run `program` with, e.g. `python3`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,
    pub program: String,
    #[serde(flatten)]
    pub params: InvocationParams,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            interpreter: None,
            program: "/home/TritonClient/image_client.py".to_string(),
            params: InvocationParams::default(),
        }
    }
}

impl InferenceConfig {
    pub fn program_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.program).into_owned())
    }

    pub fn client(&self) -> ImageClient {
        let client = ImageClient::new(self.program_path(), self.params.clone());
        match &self.interpreter {
            Some(interpreter) => client.with_interpreter(interpreter.clone()),
            None => client,
        }
    }
}

/// Authority service: where the aggregator reads from, and how `authority` serves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityConfig {
    /// Base URL the status aggregator fetches `/nodes` and `/pods` from
    pub url: String,
    pub bind_addr: String,
    pub port: u16,
    pub kubectl: String,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            url: format!("http://192.168.0.116:{}", AUTHORITY_PORT),
            bind_addr: "0.0.0.0".to_string(),
            port: AUTHORITY_PORT,
            kubectl: "kubectl".to_string(),
        }
    }
}

impl AuthorityConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// Upstream relay targets; routes are only registered for configured targets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
