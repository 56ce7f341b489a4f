//! `signups` - CLI for the activity signup service
//!
//! This binary runs the HTTP server and offers a few read-only helpers for
//! inspecting the store and configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use signups::cli::{ActivitiesCommand, Cli, Command, ConfigCommand, ServeCommand};
use signups::{init_logging, Config, Store};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(config, &serve_cmd),
        Command::Activities(activities_cmd) => handle_activities(&config, &activities_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

#[tokio::main]
async fn handle_serve(mut config: Config, cmd: &ServeCommand) -> anyhow::Result<()> {
    if let Some(host) = &cmd.host {
        config.server.host.clone_from(host);
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    config.validate()?;

    signups::serve(&config).await.context("server failed")
}

fn handle_activities(config: &Config, cmd: &ActivitiesCommand) -> anyhow::Result<()> {
    let store = Store::from_config(config);
    let activities = store.load_activities()?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&activities)?);
        return Ok(());
    }

    if activities.is_empty() {
        println!("No activities in {}", store.activities_path().display());
        return Ok(());
    }

    for (name, activity) in &activities {
        println!("{name}");
        println!("  {}", activity.description);
        println!("  Schedule:     {}", activity.schedule);
        println!(
            "  Availability: {} of {} spots left",
            activity.spots_left(),
            activity.max_participants
        );
        if activity.participants.is_empty() {
            println!("  No participants yet");
        } else {
            for email in &activity.participants {
                println!("    - {email}");
            }
        }
        println!();
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Host:               {}", config.server.host);
                println!("  Port:               {}", config.server.port);
                println!();
                println!("[Storage]");
                println!("  Activities:         {}", config.activities_path().display());
                println!("  Teachers:           {}", config.teachers_path().display());
                println!();
                println!("[Assets]");
                println!("  Static directory:   {}", config.static_dir().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
