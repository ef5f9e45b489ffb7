// iocx - inspect XML bean definition documents

mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::{execute_check, execute_list, execute_show};
use iocx::{TypeOptions, XmlApplicationContext, XmlApplicationContextConfig};

/// Build the context config from the config file and command line flags
fn load_config(cli: &Cli) -> Result<XmlApplicationContextConfig> {
    let mut config = match cli.config {
        Some(ref path) => {
            let path = shellexpand::tilde(path).to_string();
            XmlApplicationContextConfig::from_file(&path)
                .with_context(|| format!("Failed to load config file: {}", path))?
        }
        None => XmlApplicationContextConfig::default(),
    };

    if !cli.locations.is_empty() {
        config.config_locations = cli.locations.clone();
    }
    if !cli.class_path_roots.is_empty() {
        config.resource_loader = TypeOptions::new(
            "ClassPathResourceLoader",
            json!({ "roots": cli.class_path_roots }),
        );
    }
    if cli.no_override {
        config.allow_bean_definition_overriding = Some(false);
    }
    if cli.lenient {
        config.validating = false;
    }
    // 只检查定义，不创建对象
    config.eager_init = false;
    config.refresh = true;

    if config.config_locations.is_empty() {
        return Err(anyhow::anyhow!("No definition locations given, use --location or --config"));
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    tracing::debug!(locations = ?config.config_locations, "loading bean definitions");

    let context = XmlApplicationContext::new(config).context("Failed to load bean definitions")?;
    let factory = context.get_bean_factory()?;
    tracing::info!(count = factory.bean_definition_count(), "bean definitions loaded");

    let result = match &cli.command {
        Commands::List(args) => execute_list(args, &factory),
        Commands::Show(args) => execute_show(args, &factory),
        Commands::Check(args) => execute_check(args, &factory),
    };
    context.close();
    result
}
