use std::path::Path;

use clap::Parser;
use serp_analyzer::server;
use serp_analyzer::{Analyzer, AnalyzerConfig, SearchCredentials};

mod args;
use args::{Args, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging, RUST_LOG overrides the default level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.command {
        Command::Serve { config, port } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(port) = port {
                config.server.port = port;
            }
            let (host, port) = (config.server.host.clone(), config.server.port);

            let analyzer = Analyzer::from_config(config, SearchCredentials::from_env()?)?;
            server::serve(analyzer, &host, port).await?;
        }
        Command::Analyze {
            keyword,
            url,
            config,
            pretty,
        } => {
            let config = load_config(config.as_deref())?;
            let analyzer = Analyzer::from_config(config, SearchCredentials::from_env()?)?;

            let report = analyzer.analyze_with_timeout(&keyword, url.as_deref()).await?;
            let json = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{}", json);
        }
    }

    Ok(())
}

/// Defaults, then the config file if given, then environment overrides
fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => {
            ::log::info!("Loading config from {}", path.display());
            AnalyzerConfig::from_file(path)?
        }
        None => AnalyzerConfig::default(),
    };
    Ok(config.apply_env()?)
}
