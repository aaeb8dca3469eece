/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! reporttemplate CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "reporttemplate")]
#[command(version)]
#[command(about = "Render reports and manifests from directive templates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a named template to stdout
    Render {
        /// Template name
        name: String,

        /// JSON or YAML file with the template data
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Directory of additional *.template files
        #[arg(short, long)]
        templates: Option<PathBuf>,

        /// TOML file with render options
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Fail on missing variables and non-iterable loop targets
        #[arg(long)]
        strict: bool,

        /// Text substituted for missing variables
        #[arg(long)]
        default_value: Option<String>,

        /// Maximum block nesting depth
        #[arg(long)]
        max_depth: Option<usize>,

        /// Log every missing variable or skipped loop as a warning
        #[arg(long)]
        report_degradations: bool,
    },

    /// List available templates
    List {
        /// Directory of additional *.template files
        #[arg(short, long)]
        templates: Option<PathBuf>,
    },

    /// Check a template's directive structure
    Validate {
        /// Template name or path to a template file
        target: String,

        /// Directory of additional *.template files
        #[arg(short, long)]
        templates: Option<PathBuf>,
    },

    /// Print a template's size, variables and directive counts as JSON
    Stats {
        /// Template name
        name: String,

        /// Directory of additional *.template files
        #[arg(short, long)]
        templates: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reporttemplate=info,quarto_reporttemplate=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Render {
            name,
            data,
            templates,
            config,
            strict,
            default_value,
            max_depth,
            report_degradations,
        } => commands::render::execute(commands::render::RenderArgs {
            name,
            data,
            templates,
            config,
            overrides: commands::OptionOverrides {
                strict,
                default_value,
                max_depth,
                report_degradations,
            },
        })?,
        Commands::List { templates } => commands::list::execute(templates.as_deref())?,
        Commands::Validate { target, templates } => {
            commands::validate::execute(&target, templates.as_deref())?
        }
        Commands::Stats { name, templates } => {
            commands::stats::execute(&name, templates.as_deref())?
        }
    };

    print!("{}", output);
    Ok(())
}
