//! Epiwatch: clinical triplet surveillance over PubMed abstracts.
//! Entry point for the `epiwatch` binary.

mod config;
mod print;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use epiwatch_ingestion::models::DEFAULT_MAX_RESULTS;
use epiwatch_ingestion::sources::pubmed::{PubMedClient, DEFAULT_BASE_URL};
use epiwatch_ingestion::sources::LiteratureSource;
use epiwatch_ingestion::{read_records_csv, SearchParams};
use epiwatch_ner::{ClinicalWhitelist, EntityExtractor, EntityRecognizer, TrieNer};
use epiwatch_triplets::{write_summary_csv, PipelineResult, Report, TripletAggregator};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "epiwatch", version, about = "Symptom / disease / country triplets from PubMed abstracts")]
struct Cli {
    /// Config file path
    #[arg(long, global = true, env = "EPIWATCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the web dashboard
    Serve {
        /// Listen address, overrides [server].bind
        #[arg(long, env = "EPIWATCH_BIND")]
        bind: Option<String>,
    },
    /// Process a CSV of abstracts (needs an `Abstract` column)
    Analyze {
        csv: PathBuf,
        /// Write the triplet summary CSV here
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Rows in the printed table, overrides [report].table_rows
        #[arg(long)]
        top: Option<usize>,
    },
    /// Search PubMed and process the fetched abstracts
    Search {
        #[arg(long, short)]
        query: String,
        /// Earliest publication date, YYYY-MM-DD
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Latest publication date, YYYY-MM-DD
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
        max: usize,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("epiwatch=debug,info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("Epiwatch {} starting", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(cli.config.as_deref())?;
    let aggregator = build_aggregator(&config)?;

    match cli.command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            serve(&config, aggregator, &bind).await
        }
        Command::Analyze { csv, output, top } => {
            if let Some(top) = top {
                config.report.table_rows = top;
            }
            let records = read_records_csv(&csv)?;
            let result = aggregator.run_pipeline(&records);
            finish(&config, &result, output.as_deref())
        }
        Command::Search { query, from, to, max, output } => {
            let params = SearchParams::new(query)
                .with_dates(from, to)
                .with_max_results(max);
            let source = build_source(&config)?;
            let outcome = source.search(&params).await?;
            for warning in &outcome.warnings {
                eprintln!("skipped {}", warning);
            }
            println!(
                "PubMed returned {} id(s); {} abstract(s) fetched.",
                outcome.ids_found,
                outcome.records.len()
            );
            let result = aggregator.run_pipeline(&outcome.records);
            finish(&config, &result, output.as_deref())
        }
    }
}

/// The recognizer is built once here and shared by every pipeline run.
fn build_aggregator(config: &Config) -> anyhow::Result<TripletAggregator> {
    let recognizer: Arc<dyn EntityRecognizer> = match &config.ner.vocabulary_path {
        Some(path) => Arc::new(TrieNer::from_vocabulary_file(path)?),
        None => Arc::new(TrieNer::with_embedded_vocabulary()?),
    };
    let extractor = EntityExtractor::new(recognizer)
        .with_country_match(config.countries.match_mode)
        .with_min_entity_len(config.ner.min_entity_len);
    let whitelist = ClinicalWhitelist::with_extra(&config.ner.extra_clinical_terms);
    Ok(TripletAggregator::new(extractor, whitelist))
}

fn build_source(config: &Config) -> anyhow::Result<Arc<dyn LiteratureSource>> {
    let settings = config.pubmed.to_settings();
    let client = if settings.base_url == DEFAULT_BASE_URL {
        PubMedClient::new(settings)?
    } else {
        info!("Allowing configured PubMed host {}", settings.base_url);
        PubMedClient::with_trusted_base_url(settings)?
    };
    Ok(Arc::new(client))
}

async fn serve(config: &Config, aggregator: TripletAggregator, bind: &str) -> anyhow::Result<()> {
    let state = epiwatch_web::AppState::new(
        aggregator,
        build_source(config)?,
        config.report.clone(),
    );
    let app = epiwatch_web::build_router(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Dashboard listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

fn finish(config: &Config, result: &PipelineResult, output: Option<&Path>) -> anyhow::Result<()> {
    let report = Report::from_result(result, &config.report);
    print!("{}", print::render_report(result, &report)?);

    if let Some(path) = output {
        if result.is_ready() {
            let file = std::fs::File::create(path)?;
            write_summary_csv(result.summary(), std::io::BufWriter::new(file))?;
            info!("Wrote {} triplets to {}", result.summary().len(), path.display());
        } else {
            tracing::warn!("No triplets; {} not written", path.display());
        }
    }
    Ok(())
}
