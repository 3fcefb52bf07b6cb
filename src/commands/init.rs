//! @acp:module "Init Command"
//! @acp:summary "Write a client configuration"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `testbank init`: write a client configuration.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use reqwest::Url;

use crate::config::Config;

/// Options for the init command
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Force overwrite existing config
    pub force: bool,
    /// Question bank server URL
    pub server: Option<String>,
    /// Where generated tests are written
    pub artifact_dir: Option<PathBuf>,
    /// Do not launch the system viewer for generated tests
    pub no_open: bool,
    /// Skip interactive prompts
    pub yes: bool,
}

/// Execute the init command
pub fn execute_init(options: InitOptions, config_path: &Path) -> Result<()> {
    if config_path.exists() && !options.force {
        bail!(
            "Config file {} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    let mut config = Config::default();
    if let Some(server) = options.server {
        config.server_url = server;
    }
    config.artifact_dir = options.artifact_dir;
    config.open_artifacts = !options.no_open;

    if !options.yes {
        run_interactive_init(&mut config)?;
    }

    if let Err(e) = Url::parse(&config.server_url) {
        bail!("Invalid server URL '{}': {}", config.server_url, e);
    }

    config.save(config_path)?;
    println!("{} Created {}", style("✓").green(), config_path.display());

    println!("\n{}", style("Next steps:").bold());
    println!(
        "  1. Run {} to build a test from random questions",
        style("testbank random").cyan()
    );
    println!(
        "  2. Run {} to pick questions yourself",
        style("testbank manual").cyan()
    );

    Ok(())
}

fn run_interactive_init(config: &mut Config) -> Result<()> {
    println!("{} Question bank setup\n", style("→").cyan());
    let theme = ColorfulTheme::default();

    config.server_url = Input::with_theme(&theme)
        .with_prompt("Server URL")
        .default(config.server_url.clone())
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            Url::parse(input).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;

    let artifact_dir: String = Input::with_theme(&theme)
        .with_prompt("Directory for generated tests")
        .default(config.artifact_dir().display().to_string())
        .interact_text()?;
    config.artifact_dir = Some(PathBuf::from(artifact_dir));

    config.open_artifacts = Confirm::with_theme(&theme)
        .with_prompt("Open generated tests automatically?")
        .default(config.open_artifacts)
        .interact()?;

    Ok(())
}
