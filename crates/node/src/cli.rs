// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! `flux-node` command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "flux-node", version, about = "Runs a flux stream-processing node")]
pub struct Cli {
    /// Path to a `flux-node.toml` config file. Defaults to `./flux-node.toml`
    /// if it exists, then hardcoded defaults, then `FLUX_*` env vars take
    /// precedence over both.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the node: load config, discover apps, bind the comm layer,
    /// run until interrupted.
    Run,
    /// Resolve configuration and print it without starting anything.
    CheckConfig,
}
