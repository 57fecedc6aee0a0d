use anyhow::{Context, Result};
use clap::Parser;
use gh_client::ReqwestOAuthClient;
use gh_pr_config::{AppConfig, FileCredentialStore};
use gh_pr_tray::console::{self, ConsoleMenu};
use gh_pr_tray::demo::{self, DemoClientFactory, DemoOAuthClient};
use gh_pr_tray::desktop::SystemDesktop;
use gh_pr_tray::{OctocrabClientFactory, RefreshOrchestrator, RefreshSettings, Services};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Your open GitHub pull requests, one click away
#[derive(Debug, Parser)]
#[command(name = "gh-pr-tray", version, about)]
struct Cli {
    /// Run against canned data, without network access or stored credentials
    #[arg(long)]
    demo: bool,

    /// Config file to use instead of the default locations
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = gh_pr_tray::logger::init()?;
    log::info!("Starting gh-pr-tray, logging to {:?}", log_file);

    let config = AppConfig::load_from(cli.config.as_deref());
    let menu = Arc::new(ConsoleMenu::new());
    let services = build_services(&cli, &config, menu.clone())?;

    let shutdown = CancellationToken::new();
    let orchestrator =
        RefreshOrchestrator::new(services, RefreshSettings::from_config(&config), shutdown.clone());

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("Ctrl-C received");
                shutdown.cancel();
            }
        }
    });

    // The reader thread blocks on stdin and is left behind on exit
    console::spawn_input_reader(menu, orchestrator.refresh_handle(), shutdown)
        .context("Failed to start console input")?;

    orchestrator.run().await;

    log::info!("Exiting gh-pr-tray");
    Ok(())
}

fn build_services(cli: &Cli, config: &AppConfig, menu: Arc<ConsoleMenu>) -> Result<Services> {
    if cli.demo {
        log::info!("Demo mode");
        return Ok(Services {
            store: Arc::new(demo::demo_credentials()),
            desktop: Arc::new(SystemDesktop::new()),
            menu,
            oauth: Arc::new(DemoOAuthClient),
            clients: Arc::new(DemoClientFactory),
        });
    }

    let store = FileCredentialStore::at_default_location()?;
    log::info!("Using credentials at {:?}", store.path());
    let oauth = ReqwestOAuthClient::new(&config.oauth_base_url, config.request_timeout())
        .context("Failed to create OAuth client")?;

    Ok(Services {
        store: Arc::new(store),
        desktop: Arc::new(SystemDesktop::new()),
        menu,
        oauth: Arc::new(oauth),
        clients: Arc::new(OctocrabClientFactory::new(
            config.api_base_url.clone(),
            config.request_timeout(),
        )),
    })
}
