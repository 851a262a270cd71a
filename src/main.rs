//! market-oracle CLI - train per-symbol forecasters and query them

mod config;
mod service;

use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use config::OracleConfig;
use predictor::suggest;
use service::ForecastService;
use storage::{JsonMarketSource, ModelStore, SqliteModelStore, normalize_symbol};
use tracing::info;
use types::{Horizon, Label, Outcome};

#[derive(Parser)]
#[command(name = "market-oracle")]
#[command(about = "Multi-horizon outcome forecasts from technical indicator series")]
#[command(version)]
struct Cli {
    /// SQLite database holding trained models
    #[arg(long, global = true, env = "ORACLE_DB_PATH")]
    db_path: Option<String>,

    /// Directory of <SYMBOL>.json market-data files
    #[arg(long, global = true, env = "ORACLE_DATA_DIR")]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train (or retrain) the model for a symbol from its full history
    Train {
        #[arg(value_name = "SYMBOL")]
        symbol: String,

        /// Buckets per feature
        #[arg(long, env = "ORACLE_GRANULARITY")]
        granularity: Option<usize>,

        /// Share of samples held out for testing
        #[arg(long, env = "ORACLE_HOLDOUT")]
        holdout: Option<f64>,

        /// Seed for the train/test split
        #[arg(long, env = "ORACLE_SEED")]
        seed: Option<u64>,
    },
    /// Forecast a symbol from a day in its market data (newest by default)
    Predict {
        #[arg(value_name = "SYMBOL")]
        symbol: String,

        /// Day to forecast from, YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Map an outcome triple to a trade suggestion
    Suggest {
        #[arg(allow_hyphen_values = true, value_parser = clap::value_parser!(i8).range(-3..=3))]
        daily: i8,

        #[arg(allow_hyphen_values = true, value_parser = clap::value_parser!(i8).range(-3..=3))]
        weekly: i8,

        #[arg(allow_hyphen_values = true, value_parser = clap::value_parser!(i8).range(-3..=3))]
        monthly: i8,
    },
    /// Re-score a stored model on its validation samples
    Validate {
        #[arg(value_name = "SYMBOL")]
        symbol: String,
    },
    /// Re-score a stored model on its held-out test samples
    Test {
        #[arg(value_name = "SYMBOL")]
        symbol: String,
    },
    /// Summarize a stored model, or list stored symbols
    Show {
        #[arg(value_name = "SYMBOL")]
        symbol: Option<String>,
    },
}

impl Cli {
    fn config(&self) -> OracleConfig {
        let mut config = OracleConfig::default();

        if let Some(db_path) = &self.db_path {
            config.db_path = db_path.clone();
        }
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Commands::Train {
            granularity,
            holdout,
            seed,
            ..
        } = &self.command
        {
            if let Some(granularity) = granularity {
                config.train.granularity = *granularity;
            }
            if let Some(holdout) = holdout {
                config.train.holdout_fraction = *holdout;
            }
            config.train.seed = seed.or(config.train.seed);
        }

        config
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    // Suggestions need no model or market data.
    let service = || open_service(&config);

    match cli.command {
        Commands::Suggest {
            daily,
            weekly,
            monthly,
        } => {
            let label = Label::new(outcome(daily)?, outcome(weekly)?, outcome(monthly)?);
            println!("{}", suggest(&label, &config.weights));
        }
        Commands::Train { symbol, .. } => {
            info!(
                "Training {} (granularity {}, holdout {})",
                symbol, config.train.granularity, config.train.holdout_fraction
            );
            let model = service()?.train(&symbol)?;
            println!("validity:   {}", model.validity);
            println!("confidence: {}", model.confidence);
        }
        Commands::Predict { symbol, date } => {
            let (day, forecast) = service()?.forecast_from_source(&symbol, date)?;
            println!(
                "{} {}: daily {} weekly {} monthly {} -> {}",
                normalize_symbol(&symbol)?,
                day.timestamp,
                forecast.label.daily,
                forecast.label.weekly,
                forecast.label.monthly,
                forecast.suggestion
            );
        }
        Commands::Validate { symbol } => {
            println!("{}", service()?.validate(&symbol)?);
        }
        Commands::Test { symbol } => {
            println!("{}", service()?.test(&symbol)?);
        }
        Commands::Show { symbol: None } => {
            let symbols = service()?.store().symbols()?;
            info!("Models stored: {}", symbols.len());
            for symbol in symbols {
                println!("{symbol}");
            }
        }
        Commands::Show {
            symbol: Some(symbol),
        } => {
            let model = service()?.model(&symbol)?;
            println!("symbol:     {}", normalize_symbol(&symbol)?);
            println!("built at:   {}", model.built_at.to_rfc3339());
            println!("features:   {}", model.buckets.len());
            println!(
                "samples:    {} test, {} validation",
                model.tests.len(),
                model.validation.len()
            );
            for horizon in Horizon::ALL {
                let tree = model.trees.get(horizon);
                let root = tree
                    .key()
                    .map_or_else(|| "leaf".to_string(), |key| key.to_string());
                println!(
                    "{:<8}    root {}, {} nodes, {} leaves, depth {}",
                    horizon.as_str(),
                    root,
                    tree.node_count(),
                    tree.leaf_count(),
                    tree.depth()
                );
            }
            println!("validity:   {}", model.validity);
            println!("confidence: {}", model.confidence);
        }
    }

    Ok(())
}

fn open_service(
    config: &OracleConfig,
) -> anyhow::Result<ForecastService<SqliteModelStore, JsonMarketSource>> {
    if let Some(parent) = Path::new(&config.db_path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    info!("Database path: {}", config.db_path);
    let store = SqliteModelStore::new(config.store_config())
        .with_context(|| format!("opening model store at {}", config.db_path))?;
    let market = JsonMarketSource::new(&config.data_dir);

    Ok(ForecastService::new(
        store,
        market,
        config.train,
        config.weights,
    ))
}

fn outcome(value: i8) -> anyhow::Result<Outcome> {
    Outcome::try_from(value).map_err(anyhow::Error::msg)
}
