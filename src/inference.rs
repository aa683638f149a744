//! Image classification through an external inference client
//!
//! The Triton image client is an opaque program: it takes the model settings
//! and an image path on its command line and prints the top classes on
//! stdout. [`ImageClient`] runs it as a subprocess and hands back whatever
//! it printed.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Classifier exited with code {code}: {stderr}")]
    Failed { code: i32, stderr: String },
}

/// Image preprocessing applied by the client before inference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Scaling {
    None,
    #[default]
    Inception,
    Vgg,
}

impl Scaling {
    pub fn as_arg(&self) -> &'static str {
        match self {
            Scaling::None => "NONE",
            Scaling::Inception => "INCEPTION",
            Scaling::Vgg => "VGG",
        }
    }
}

/// Fixed arguments passed on every invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvocationParams {
    pub model: String,
    /// Number of top classes to report
    pub classes: u32,
    pub scaling: Scaling,
    /// Inference server address, host:port
    pub server_url: String,
}

impl Default for InvocationParams {
    fn default() -> Self {
        Self {
            model: "densenet_onnx".to_string(),
            classes: 1,
            scaling: Scaling::Inception,
            server_url: "host.docker.internal:8000".to_string(),
        }
    }
}

impl InvocationParams {
    /// Command-line arguments for classifying `target`; the target is always last.
    pub fn to_args(&self, target: &Path) -> Vec<OsString> {
        vec![
            "-m".into(),
            self.model.clone().into(),
            "-c".into(),
            self.classes.to_string().into(),
            "-s".into(),
            self.scaling.as_arg().into(),
            "-u".into(),
            self.server_url.clone().into(),
            target.as_os_str().to_os_string(),
        ]
    }
}

// ============================================================================
// SBIO: Trait for abstraction (allows mocking in tests)
// ============================================================================

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify the image stored at `path`, returning the captured output text
    async fn classify(&self, path: &Path) -> Result<String, InferenceError>;
}

// ============================================================================
// SBIO: I/O implementation (subprocess)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ImageClient {
    interpreter: Option<String>,
    program: PathBuf,
    params: InvocationParams,
}

impl ImageClient {
    pub fn new(program: impl Into<PathBuf>, params: InvocationParams) -> Self {
        Self {
            interpreter: None,
            program: program.into(),
            params,
        }
    }

    /// Run `program` through an interpreter such as `python3`
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = Some(interpreter.into());
        self
    }

    pub fn params(&self) -> &InvocationParams {
        &self.params
    }

    fn command(&self, target: &Path) -> Command {
        let mut cmd = match &self.interpreter {
            Some(interpreter) => {
                let mut cmd = Command::new(interpreter);
                cmd.arg(&self.program);
                cmd
            }
            None => Command::new(&self.program),
        };
        cmd.args(self.params.to_args(target))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

#[async_trait]
impl Classifier for ImageClient {
    async fn classify(&self, path: &Path) -> Result<String, InferenceError> {
        debug!(
            "Invoking {} on {}",
            self.program.display(),
            path.display()
        );

        let output = self
            .command(path)
            .output()
            .await
            .map_err(|source| InferenceError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(InferenceError::Failed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        info!(
            "Classified {} ({} bytes of output)",
            path.display(),
            output.stdout.len()
        );
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

// ============================================================================
// SBIO: Mock implementation for testing (no I/O)
// ============================================================================
