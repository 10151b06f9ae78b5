use clap::Parser;
use jobscout::adapters::{Exporter, HttpApiSource};
use jobscout::config::{profile, CliArgs, RunConfig};
use jobscout::core::{SearchEngine, SourceRegistry};
use jobscout::utils::{logger, validation::Validate};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    logger::init_cli_logger(args.verbose);

    tracing::info!("Starting jobscout");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let mut config = RunConfig::from_file(&args.config)?;
    config.restrict_sources(&args.source);
    if let Some(output) = &args.output {
        config.output.path = output.clone();
    }
    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    let user_profile = profile::load_profile(&args.profile)?;
    if let Err(e) = user_profile.validate() {
        tracing::error!("Profile validation failed: {}", e);
        eprintln!("Profile validation failed: {}", e);
        std::process::exit(1);
    }

    // Static registry: one HTTP-API source per configured endpoint. Sources
    // that need more than a JSON endpoint get registered here as their own
    // adapter types.
    let mut registry = SourceRegistry::new();
    for (id, source_conf) in &config.sources {
        if let Some(endpoint) = &source_conf.endpoint {
            let name = source_conf.display_name.clone().unwrap_or_else(|| id.clone());
            registry.register(Arc::new(HttpApiSource::new(
                id,
                &name,
                endpoint,
                source_conf.supports_location_filter,
            )));
        }
    }

    let exporter = Exporter::new(config.output.clone(), config.filtering.clone());
    let engine = SearchEngine::new(registry, user_profile, config);

    match engine.run().await {
        Ok(result) => {
            let dir = exporter.export(&result)?;
            tracing::info!("Results saved to: {}", dir.display());
            println!("Done. Results saved to: {}", dir.display());
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            eprintln!("Run failed: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
