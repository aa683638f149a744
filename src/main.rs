use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use edgefaas::cli::{
    format_dry_run, log_filter, AuthorityArgs, Cli, Commands, ServeArgs, SysinfoArgs,
};
use edgefaas::cluster::{create_authority_router, AuthorityState, Kubectl, StatusAggregator};
use edgefaas::config::{load_config, EdgeConfig};
use edgefaas::server::{create_router, AppState};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_filter(cli.verbose))),
        )
        .init();

    // Load .env file if specified
    if let Some(ref env_file) = cli.env_file {
        if let Err(e) = dotenvy::from_path(env_file) {
            error!("Failed to load env file {}: {}", env_file.display(), e);
            process::exit(1);
        }
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config: {}", e);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Serve(args) => serve(config, args).await,
        Commands::Authority(args) => authority(config, args).await,
        Commands::Sysinfo(args) => sysinfo(config, args).await,
    }
}

async fn serve(mut config: EdgeConfig, args: ServeArgs) {
    args.apply(&mut config);
    let state = AppState::from_config(&config);

    // Dry-run mode: print gateway info and exit
    if args.dry_run {
        println!("{}", format_dry_run(&config, &state.routes));
        return;
    }

    let addr = config.gateway.listen_addr();
    info!("Starting edgefaas gateway on {}", addr);
    info!("Routes:");
    for (method, path, capability) in state.routes.entries() {
        info!("  {:<5} {:<13} - {}", method.as_str(), path, capability);
    }

    let app = create_router(state);
    run_server(&addr, app).await;
}

async fn authority(mut config: EdgeConfig, args: AuthorityArgs) {
    args.apply(&mut config);

    let inventory = Arc::new(Kubectl::new(config.authority.kubectl.clone()));
    let app = create_authority_router(AuthorityState::new(inventory));

    let addr = config.authority.listen_addr();
    info!("Starting authority service on {}", addr);
    info!("Endpoints:");
    info!("  GET  /version - Liveness");
    info!("  GET  /nodes   - kubectl get nodes -o json");
    info!("  GET  /pods    - kubectl get pods -o json");

    run_server(&addr, app).await;
}

async fn sysinfo(mut config: EdgeConfig, args: SysinfoArgs) {
    args.apply(&mut config);

    let aggregator = StatusAggregator::from_url(config.authority.url.clone());
    match aggregator.aggregate().await {
        Ok(report) => print!("{}", report),
        Err(e) => {
            error!(
                "Failed to aggregate cluster status from {}: {}",
                config.authority.url, e
            );
            process::exit(1);
        }
    }
}

async fn run_server(addr: &str, app: axum::Router) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            process::exit(1);
        }
    };

    info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        process::exit(1);
    }
}
