pub mod build;
pub mod completions;
pub mod info;
pub mod init;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::CONFIG_FILENAME;

/// respack - Resourcepack builder for many game-version formats
#[derive(Parser, Debug)]
#[command(name = "respack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase log detail (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Debug output, including help text for every diagnostic
    #[arg(long, global = true)]
    pub debug: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = CONFIG_FILENAME)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level implied by the verbosity flags.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        if self.debug {
            level.max(log::LevelFilter::Debug)
        } else {
            level
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build pack archives for every configured format
    Build(build::BuildArgs),

    /// Show the validated configuration
    Info(info::InfoArgs),

    /// Initialize a respack project (generates respack.yaml)
    Init(init::InitArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
