mod cli;

use crate::cli::{Cli, Commands};
use clap::Parser;
use std::sync::Arc;
use tracing::{Level, error, info};

use cec_tv_control::application::{CecController, SharedCecController};
use cec_tv_control::config::ControllerConfig;
use cec_tv_control::debug::{DebugConfig, init_logging};
use cec_tv_control::infrastructure::cec::{DryRunRunner, TokioDelay};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let debug_config = if cli.log_file {
        let mut debug_config = DebugConfig::production();
        if let Some(dir) = cli.log_dir.clone() {
            debug_config.log_directory = dir;
        }
        if cli.verbose {
            debug_config = debug_config.with_log_level(Level::DEBUG);
        }
        debug_config
    } else if cli.verbose {
        DebugConfig::development()
    } else {
        DebugConfig::default()
    };
    if let Err(e) = init_logging(&debug_config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let mut config = match &cli.config {
        Some(path) => ControllerConfig::from_json_file(path)?,
        None => ControllerConfig::default(),
    };
    if let Some(client) = cli.client.clone() {
        config = config.with_client_program(client);
    }
    config.validate()?;

    // Adapter detection takes up to the detection timeout
    let controller = if cli.dry_run {
        info!("Dry run: no commands will reach the CEC bus");
        CecController::with_ports(
            config,
            Arc::new(DryRunRunner::new()),
            Arc::new(TokioDelay::new()),
        )
        .await
    } else {
        CecController::new(config).await
    };
    let controller = SharedCecController::new(controller);

    let succeeded = match cli.command {
        Commands::Status => match controller.query_power_status().await {
            Some(status) => {
                println!("{}", status);
                true
            }
            None => {
                println!("unknown");
                false
            }
        },
        Commands::On => controller.turn_on().await,
        Commands::Off => controller.turn_off().await,
        Commands::Input {
            device,
            retries,
            simple,
        } => {
            if simple {
                controller.switch_input_simple(device).await
            } else {
                controller.switch_input(device, retries).await
            }
        }
        Commands::WaitReady { attempts } => controller.wait_for_ready(attempts).await,
        Commands::Detect => match controller.adapter().await {
            Some(adapter) => {
                println!("CEC {} detected", adapter);
                true
            }
            None => {
                println!("No CEC adapter detected");
                false
            }
        },
    };

    if !succeeded {
        error!("CEC operation failed");
        std::process::exit(1);
    }

    Ok(())
}
