//! SeoulMate CLI
//!
//! Command-line front end for the hybrid recommendation engine.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use directories::ProjectDirs;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use seoulmate_core::{
    EngineConfig, Genre, InMemoryCatalog, RecommendRequest, Recommendation, RecommendationEngine,
    SearchFilters, TracingObserver,
};

/// SeoulMate - hybrid K-drama recommendation CLI
#[derive(Parser)]
#[command(name = "seoulmate")]
#[command(author = "SeoulMate Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Intent-aware hybrid search over a K-drama catalog")]
struct Cli {
    /// Engine config file (TOML)
    #[arg(long, global = true, env = "SEOULMATE_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a query and show how it would be weighted
    Analyze {
        /// Query text
        query: String,
        /// Catalog export, so known titles are recognized
        #[arg(long, env = "SEOULMATE_CATALOG")]
        catalog: Option<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Recommend dramas for a query
    Recommend {
        /// Query text
        query: String,
        /// Catalog export (JSON array of items)
        #[arg(long, env = "SEOULMATE_CATALOG")]
        catalog: PathBuf,
        /// Number of results
        #[arg(long, short = 'n')]
        top_n: Option<usize>,
        /// Required genre (repeatable)
        #[arg(long = "genre", value_parser = parse_genre)]
        genres: Vec<Genre>,
        /// Required director
        #[arg(long)]
        director: Option<String>,
        /// Minimum rating
        #[arg(long)]
        min_rating: Option<f32>,
        /// First air year
        #[arg(long)]
        year: Option<i32>,
        /// Maximum episode count
        #[arg(long)]
        max_episodes: Option<u32>,
        /// Fixed semantic weight in [0, 1]
        #[arg(long)]
        alpha: Option<f32>,
        /// Skip the rerank pass
        #[arg(long)]
        no_rerank: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Validate the config and print the effective values
    CheckConfig {
        /// Print the full effective config as TOML
        #[arg(long)]
        print: bool,
    },
}

fn parse_genre(value: &str) -> Result<Genre, String> {
    value.parse()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let config_path = resolve_config_path(cli.config.as_deref(), default_config_path().as_deref());
    let config = load_config(config_path.as_deref())?;

    match cli.command {
        Commands::Analyze {
            query,
            catalog,
            json,
        } => run_analyze(config, &query, catalog.as_deref(), json),
        Commands::Recommend {
            query,
            catalog,
            top_n,
            genres,
            director,
            min_rating,
            year,
            max_episodes,
            alpha,
            no_rerank,
            json,
        } => {
            let filters = SearchFilters {
                genres: genres.into_iter().collect(),
                director,
                min_rating,
                year,
                max_episodes,
                min_episodes: None,
            };
            let mut request = RecommendRequest::new(query).with_filters(filters);
            if let Some(n) = top_n {
                request = request.with_top_n(n);
            }
            if let Some(alpha) = alpha {
                request = request.with_alpha(alpha);
            }
            if no_rerank {
                request = request.with_rerank(false);
            }
            run_recommend(config, &catalog, request, json).await
        }
        Commands::CheckConfig { print } => run_check_config(&config, config_path.as_deref(), print),
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::from_default_env().add_directive(Level::WARN.into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.with_ansi(false).init();
    }
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "seoulmate", "seoulmate").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Explicit path (flag or env) first, then the platform config file if present
fn resolve_config_path(explicit: Option<&Path>, platform: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    platform.filter(|p| p.is_file()).map(Path::to_path_buf)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn load_catalog(path: &Path) -> anyhow::Result<Arc<InMemoryCatalog>> {
    let catalog = InMemoryCatalog::load(path)
        .with_context(|| format!("Failed to load catalog from {}", path.display()))?;
    if catalog.is_empty() {
        anyhow::bail!("Catalog {} contains no usable items", path.display());
    }
    Ok(Arc::new(catalog))
}

/// Engine that only understands queries: catalog titles, no retrieval models
fn analysis_engine(config: EngineConfig, catalog: &Arc<InMemoryCatalog>) -> anyhow::Result<RecommendationEngine> {
    let titles: Vec<String> = catalog.items().map(|item| item.title.clone()).collect();
    let engine = RecommendationEngine::builder(config, catalog.clone())
        .known_titles(titles)
        .build()?;
    Ok(engine)
}

fn run_analyze(config: EngineConfig, query: &str, catalog: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let catalog = match catalog {
        Some(path) => load_catalog(path)?,
        None => Arc::new(InMemoryCatalog::default()),
    };
    let engine = analysis_engine(config, &catalog)?;
    let understood = engine.understand(query);
    let profile = engine.policy().profile(&understood.analysis);

    if json {
        let value = serde_json::json!({
            "query": understood,
            "profile": profile,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let analysis = &understood.analysis;
    println!("{}", "=== Query Analysis ===".cyan().bold());
    println!("{}: {}", "Intent".white().bold(), analysis.intent.to_string().green());
    println!("{}: {:.2}", "Confidence".white().bold(), analysis.confidence);
    println!("{}: {:.2}", "Alpha".white().bold(), profile.alpha);
    println!("{}: {}", "Normalized".white().bold(), understood.normalized);
    println!("{}: {}", "Expanded".white().bold(), understood.expanded);

    let entities = &analysis.entities;
    if !entities.actors.is_empty() {
        println!("{}: {}", "Actors".white().bold(), join(entities.actors.iter()));
    }
    if !entities.genres.is_empty() {
        println!("{}: {}", "Genres".white().bold(), join(entities.genres.iter()));
    }
    if !entities.years.is_empty() {
        println!("{}: {}", "Years".white().bold(), join(entities.years.iter()));
    }
    if !entities.emotions.is_empty() {
        println!("{}: {}", "Emotions".white().bold(), join(entities.emotions.iter()));
    }
    if let Some(reference) = &entities.reference {
        println!("{}: {}", "Similar to".white().bold(), reference);
    }
    if profile.popularity_boost > 1.0 {
        println!("{}: x{:.2}", "Popularity boost".white().bold(), profile.popularity_boost);
    }
    Ok(())
}

async fn run_recommend(
    config: EngineConfig,
    catalog: &Path,
    request: RecommendRequest,
    json: bool,
) -> anyhow::Result<()> {
    let catalog = load_catalog(catalog)?;
    let engine = RecommendationEngine::builder_from_catalog(config, catalog)
        .observer(Arc::new(TracingObserver))
        .build()?;

    let result = engine.recommend(request).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_recommendation(&result);
    }
    Ok(())
}

fn print_recommendation(result: &Recommendation) {
    println!("{}", "=== Recommendations ===".cyan().bold());
    println!(
        "{} {}  {} {:.2}  {} {:.2}",
        "Intent:".white().bold(),
        result.intent.to_string().green(),
        "Confidence:".white().bold(),
        result.confidence,
        "Alpha:".white().bold(),
        result.effective_alpha,
    );
    if result.expanded_query != result.query.trim().to_lowercase() {
        println!("{} {}", "Expanded:".white().bold(), result.expanded_query);
    }
    if !result.applied_filters.is_empty() {
        println!(
            "{} {}",
            "Filters:".white().bold(),
            serde_json::to_string(&result.applied_filters).unwrap_or_default()
        );
    }
    println!();

    if result.items.is_empty() {
        println!("{}", "No matching dramas.".yellow());
    }
    for item in &result.items {
        let meta: Vec<String> = [
            item.year.map(|y| y.to_string()),
            item.rating.map(|r| format!("{r:.1}/10")),
            (!item.genres.is_empty()).then(|| join(item.genres.iter())),
        ]
        .into_iter()
        .flatten()
        .collect();
        println!(
            "{:>3}. {}  {}  {}",
            item.rank,
            item.title.bold(),
            format!("[{:.3}]", item.score).dimmed(),
            meta.join(" | ").dimmed()
        );
    }

    if !result.degradations.is_empty() {
        println!();
        let reasons: Vec<&str> = result.degradations.iter().map(|r| r.code()).collect();
        println!("{} {}", "Degraded:".yellow().bold(), reasons.join(", "));
    }
}

fn run_check_config(config: &EngineConfig, path: Option<&Path>, print: bool) -> anyhow::Result<()> {
    config.validate()?;

    match path {
        Some(path) => println!("{} {}", "Config:".white().bold(), path.display()),
        None => println!("{} built-in defaults", "Config:".white().bold()),
    }
    let r = &config.retrieval;
    println!(
        "  semantic_k={} lexical_k={} rerank_depth={} rerank_timeout={}ms rerank={}",
        r.semantic_k, r.lexical_k, r.rerank_depth, r.rerank_timeout_ms, r.enable_rerank
    );
    println!(
        "  cache={}x{} fuzzy_threshold={:.2} synonyms={} actors={}",
        config.cache.capacity,
        config.cache.shards,
        config.fuzzy.threshold,
        config.expansion.synonyms.len(),
        config.lexicon.actors.len()
    );
    println!("{}", "Config is valid".green());

    if print {
        println!();
        println!("{}", config.to_toml_string()?);
    }
    Ok(())
}

fn join<T: ToString>(values: impl Iterator<Item = T>) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}
