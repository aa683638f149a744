//! Command-line interface
//!
//! - `edgefaas serve`     - run the edge gateway
//! - `edgefaas authority` - serve the k3s inventory for the gateway's `/sysinfo`
//! - `edgefaas sysinfo`   - print one cluster status report and exit

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::EdgeConfig;
use crate::server::RouteTable;

#[derive(Parser, Debug)]
#[command(name = "edgefaas")]
#[command(about = "Edge gateway for image classification and k3s cluster status")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: ~/.edgefaas/config.yaml)
    #[arg(long, global = true, env = "EDGEFAAS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to a .env file to load before reading the config
    #[arg(long, value_name = "FILE", global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the edge gateway
    Serve(ServeArgs),

    /// Run the authority service (requires kubectl access)
    Authority(AuthorityArgs),

    /// Fetch and print the cluster status report
    Sysinfo(SysinfoArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Bind address for the gateway
    #[arg(long, value_name = "ADDR")]
    pub bind_addr: Option<String>,

    /// Port to listen on (default: 8302)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory for uploaded artifacts
    #[arg(long, value_name = "DIR")]
    pub tmp_dir: Option<String>,

    /// Keep artifact files after each request
    #[arg(long)]
    pub keep_artifacts: bool,

    /// Authority service base URL used by /sysinfo
    #[arg(long, value_name = "URL")]
    pub authority_url: Option<String>,

    /// Print the resolved configuration and routes, then exit
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the authority command
#[derive(Parser, Debug)]
pub struct AuthorityArgs {
    /// Bind address for the authority service
    #[arg(long, value_name = "ADDR")]
    pub bind_addr: Option<String>,

    /// Port to listen on (default: 8301)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// kubectl binary to use
    #[arg(long)]
    pub kubectl: Option<String>,
}

/// Arguments for the sysinfo command
#[derive(Parser, Debug)]
pub struct SysinfoArgs {
    /// Authority service base URL
    #[arg(long, value_name = "URL")]
    pub authority_url: Option<String>,
}

impl ServeArgs {
    /// Overlay command-line flags onto the loaded config
    pub fn apply(&self, config: &mut EdgeConfig) {
        if let Some(ref addr) = self.bind_addr {
            config.gateway.bind_addr = addr.clone();
        }
        if let Some(port) = self.port {
            config.gateway.port = port;
        }
        if let Some(ref dir) = self.tmp_dir {
            config.artifacts.dir = dir.clone();
        }
        if self.keep_artifacts {
            config.artifacts.retain = true;
        }
        if let Some(ref url) = self.authority_url {
            config.authority.url = url.clone();
        }
    }
}

impl AuthorityArgs {
    pub fn apply(&self, config: &mut EdgeConfig) {
        if let Some(ref addr) = self.bind_addr {
            config.authority.bind_addr = addr.clone();
        }
        if let Some(port) = self.port {
            config.authority.port = port;
        }
        if let Some(ref kubectl) = self.kubectl {
            config.authority.kubectl = kubectl.clone();
        }
    }
}

impl SysinfoArgs {
    pub fn apply(&self, config: &mut EdgeConfig) {
        if let Some(ref url) = self.authority_url {
            config.authority.url = url.clone();
        }
    }
}

/// Map the -v count to a default log filter
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

// ============================================================================
// SBIO: Pure display logic (no I/O - returns formatted strings)
// ============================================================================

/// Describe the gateway a `serve` would start, for `--dry-run`.
pub fn format_dry_run(config: &EdgeConfig, routes: &RouteTable) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "edgefaas v{} - Dry Run Mode\n\n",
        env!("CARGO_PKG_VERSION")
    ));
    output.push_str(&format!("Listen: {}\n", config.gateway.listen_addr()));
    output.push_str(&format!(
        "Artifacts: {} ({})\n",
        config.artifacts.dir_path().display(),
        if config.artifacts.retain {
            "retained"
        } else {
            "removed after each request"
        }
    ));

    let inference = &config.inference;
    output.push_str(&format!(
        "Classifier: {}{}\n",
        inference
            .interpreter
            .as_ref()
            .map(|i| format!("{} ", i))
            .unwrap_or_default(),
        inference.program_path().display()
    ));
    output.push_str(&format!(
        "  model={} classes={} scaling={} server={}\n",
        inference.params.model,
        inference.params.classes,
        inference.params.scaling.as_arg(),
        inference.params.server_url
    ));
    output.push_str(&format!("Authority: {}\n", config.authority.url));
    if let Some(ref url) = config.relay.image_url {
        output.push_str(&format!("Relay: {}\n", url));
    }

    output.push_str("\nRoutes:\n");
    for (method, path, capability) in routes.entries() {
        output.push_str(&format!(
            "  {:<5} {:<13} {}\n",
            method.as_str(),
            path,
            capability
        ));
    }

    output
}
