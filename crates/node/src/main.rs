// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `flux-node`: a runnable single-node host for `flux-runtime` apps
//! (spec.md §6 "Node lifecycle").

mod apps;
mod cli;
mod comm;
mod config;
mod errors;
mod manifest;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use apps::{AppRegistry, NodeContext};
use cli::{Cli, Command};
use config::NodeConfig;
use flux_runtime::{App, Receiver, Sender, StreamRegistry};
use flux_wire::{Fnv1aHasher, JsonSerializer};

/// The node ships no example applications of its own (spec.md §1 places
/// "example applications (word count, session analytics)" out of core
/// scope); operators register their own [`apps::AppFactory`]s here
/// before building the binary.
fn builtin_registry() -> AppRegistry {
    AppRegistry::new()
}

fn init_logging(log_level: &str) -> tracing_appender::non_blocking::WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).init();
    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::CheckConfig => check_config(cli.config.as_deref()),
        Command::Run => run(cli.config.as_deref()).await,
    }
}

fn check_config(config_path: Option<&std::path::Path>) -> anyhow::Result<()> {
    let config = NodeConfig::load(config_path)?;
    println!("comm_module = {:?}", config.comm_module);
    println!("log_level = {:?}", config.log_level);
    println!("apps_dir = {:?}", config.apps_dir.display());
    println!("partition_count = {}", config.partitions.partition_count);
    println!("local_partitions = {:?}", config.partitions.local_partitions);
    Ok(())
}

async fn run(config_path: Option<&std::path::Path>) -> anyhow::Result<()> {
    let config = NodeConfig::load(config_path)?;
    let _log_guard = init_logging(&config.log_level);

    let registry = builtin_registry();
    let discovered = match manifest::scan(&config.apps_dir) {
        Ok(apps) => apps,
        Err(err) => {
            tracing::warn!(apps_dir = %config.apps_dir.display(), error = %err, "apps directory unreadable, starting with no apps");
            Vec::new()
        }
    };

    let mut serializer = JsonSerializer::new();
    let mut factories = Vec::new();
    for discovered_app in &discovered {
        let manifest = match &discovered_app.manifest {
            Ok(manifest) => manifest,
            Err(err) => {
                tracing::warn!(dir = %discovered_app.dir.display(), error = %err, "skipping app");
                continue;
            }
        };
        match registry.get(&manifest.app_class) {
            Some(factory) => {
                serializer = factory.register_events(serializer);
                factories.push((discovered_app.dir.clone(), factory));
            }
            None => tracing::warn!(
                dir = %discovered_app.dir.display(),
                class = manifest.app_class,
                "skipping app: unknown app class"
            ),
        }
    }

    let hasher: Arc<dyn flux_wire::Hasher> = Arc::new(Fnv1aHasher);
    let topology = Arc::new(config.partitions.to_topology());
    let serializer: Arc<dyn flux_wire::Serializer> = Arc::new(serializer);

    let bind_addr: std::net::SocketAddr = "0.0.0.0:0".parse().expect("hardcoded address parses");
    let pair = comm::build(&config.comm_module, bind_addr).await?;
    let (emitter, listener) = pair.split();

    let sender = Arc::new(Sender::new(emitter, Arc::clone(&serializer)));
    let streams = StreamRegistry::new();
    let receiver = Arc::new(Receiver::new(listener, Arc::clone(&serializer), Arc::clone(&streams)));

    let ctx = NodeContext {
        hasher,
        topology: topology as Arc<dyn flux_wire::Topology>,
        sender: Some(sender),
        serializer,
    };

    // One receiver task serves every app on this node — streams live in
    // the shared registry, so inbound events reach whichever app
    // registered the matching stream name regardless of which app
    // started the task.
    let receiver_handle = tokio::spawn({
        let receiver = Arc::clone(&receiver);
        async move { receiver.run().await }
    });

    let mut apps = Vec::new();
    for (dir, factory) in factories {
        let app_module = factory.build();
        let app = App::with_streams(factory.app_class(), Arc::clone(&streams));
        if let Err(err) = app_module.init(&app, &ctx) {
            tracing::error!(dir = %dir.display(), error = %err, "app failed to initialize, skipping");
            continue;
        }
        app.start();
        app_module.start(&app);
        apps.push(app);
    }

    tracing::info!(app_count = apps.len(), "flux-node running");
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    receiver_handle.abort();
    for app in &apps {
        app.close().await;
    }
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
