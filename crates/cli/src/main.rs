use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::MovieTable;
use pipeline::{ArtifactStore, BuildConfig, IndexBuilder};
use recommender::{Recommendation, RecommendationService};
use server::{Config, EnrichedRecommendation, RecommendationOrchestrator};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// movie-recs - content-based movie recommendations
#[derive(Parser)]
#[command(name = "movie-recs")]
#[command(about = "Content-based movie recommender (TF-IDF + truncated SVD)", long_about = None)]
struct Cli {
    /// Directory holding the build artifacts
    #[arg(short, long, default_value = "models", global = true)]
    models_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the similarity index from the TMDB CSV files
    Build {
        #[arg(long, default_value = "data/movies.csv")]
        movies: PathBuf,

        #[arg(long, default_value = "data/credits.csv")]
        credits: PathBuf,

        /// Output directory (defaults to --models-dir)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Neighbours kept per movie
        #[arg(long, default_value = "30")]
        top_k: usize,

        /// Reduced dimensionality
        #[arg(long, default_value = "200")]
        components: usize,

        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Recommend movies similar to a title
    Recommend {
        /// Exact movie title
        title: String,

        /// Number of recommendations to return
        #[arg(long, default_value = "5")]
        top_n: usize,

        /// Fetch poster, rating and tagline from TMDB (reads TMDB_* from the environment)
        #[arg(long)]
        details: bool,
    },

    /// List every title in the catalog
    Titles {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Search titles (case-insensitive substring match)
    Search {
        query: String,

        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Measure lookup latency over random titles
    Benchmark {
        /// Number of lookups to make
        #[arg(long, default_value = "1000")]
        requests: usize,

        /// Number of concurrent workers
        #[arg(long, default_value = "4")]
        concurrent: usize,

        #[arg(long, default_value = "5")]
        top_n: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            movies,
            credits,
            out,
            top_k,
            components,
            seed,
        } => {
            let config = BuildConfig::default()
                .with_top_k(top_k)
                .with_components(components)
                .with_seed(seed);
            handle_build(movies, credits, out.unwrap_or(cli.models_dir), config).await?
        }
        Commands::Recommend {
            title,
            top_n,
            details,
        } => {
            if details {
                handle_recommend_details(&cli.models_dir, &title, top_n).await?
            } else {
                handle_recommend(&load_service(&cli.models_dir)?, &title, top_n)?
            }
        }
        Commands::Titles { limit } => handle_titles(&load_service(&cli.models_dir)?, limit),
        Commands::Search { query, limit } => {
            handle_search(&load_service(&cli.models_dir)?, &query, limit)
        }
        Commands::Benchmark {
            requests,
            concurrent,
            top_n,
        } => {
            let service = Arc::new(load_service(&cli.models_dir)?);
            handle_benchmark(service, requests, concurrent, top_n).await?
        }
    }

    Ok(())
}

fn load_service(models_dir: &Path) -> Result<RecommendationService> {
    let start = Instant::now();
    let service = RecommendationService::load(models_dir).with_context(|| {
        format!(
            "Failed to load artifacts from {} (run `movie-recs build` first)",
            models_dir.display()
        )
    })?;
    println!(
        "{} Loaded {} movies in {:?}",
        "✓".green(),
        service.len(),
        start.elapsed()
    );
    Ok(service)
}

/// Handle the 'build' command
async fn handle_build(
    movies: PathBuf,
    credits: PathBuf,
    out: PathBuf,
    config: BuildConfig,
) -> Result<()> {
    let start = Instant::now();
    println!(
        "Building index from {} and {}...",
        movies.display(),
        credits.display()
    );

    // The build is CPU-bound; keep it off the async workers
    let built = tokio::task::spawn_blocking(move || {
        let table = MovieTable::load_from_files(&movies, &credits)
            .context("Failed to load the movie tables")?;
        info!(
            "Joined {} rows ({} dropped for missing fields)",
            table.len(),
            table.dropped_rows()
        );
        IndexBuilder::new(config)
            .build(&table)
            .context("Failed to build the index")
    })
    .await
    .context("Build task panicked")??;

    ArtifactStore::new(&out)
        .save(&built)
        .with_context(|| format!("Failed to write artifacts to {}", out.display()))?;

    println!(
        "{} Indexed {} movies into {} in {:?}",
        "✓".green(),
        built.records.len(),
        out.display(),
        start.elapsed()
    );
    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(service: &RecommendationService, title: &str, top_n: usize) -> Result<()> {
    let recommendations = service.recommend(title, top_n).map_err(|e| {
        let suggestions = service.search(title, 5);
        if suggestions.is_empty() {
            anyhow!(e)
        } else {
            anyhow!("{}. Did you mean: {}?", e, suggestions.join(", "))
        }
    })?;
    print_recommendations(title, &recommendations);
    Ok(())
}

/// Handle 'recommend --details': same lookup, enriched through TMDB
async fn handle_recommend_details(models_dir: &Path, title: &str, top_n: usize) -> Result<()> {
    let config = Config::from_env()?;
    let orchestrator = RecommendationOrchestrator::load(models_dir, config.tmdb_config()).await?;
    let recommendations = orchestrator.get_recommendations(title, top_n).await?;
    print_enriched(title, &recommendations);
    Ok(())
}

/// Handle the 'titles' command
fn handle_titles(service: &RecommendationService, limit: Option<usize>) {
    let titles = service.list_titles();
    let shown = limit.unwrap_or(titles.len());
    for title in titles.iter().take(shown) {
        println!("{}", title);
    }
    if shown < titles.len() {
        println!("{}", format!("... and {} more", titles.len() - shown).dimmed());
    }
}

/// Handle the 'search' command
fn handle_search(service: &RecommendationService, query: &str, limit: usize) {
    let matches = service.search(query, limit);
    println!("{}", format!("Search results for '{}':", query).bold().blue());
    if matches.is_empty() {
        println!("  (no matches)");
    }
    for title in matches {
        println!("  {} {}", "•".green(), title);
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    service: Arc<RecommendationService>,
    requests: usize,
    concurrent: usize,
    top_n: usize,
) -> Result<()> {
    if service.is_empty() || requests == 0 {
        return Err(anyhow!("Nothing to benchmark"));
    }

    // Random titles, fixed before timing starts
    let catalog = service.list_titles();
    let titles: Vec<String> = (0..requests)
        .map(|_| catalog[rand::random_range(0..catalog.len())].to_string())
        .collect();

    let workers = concurrent.max(1);
    let chunk_size = requests.div_ceil(workers);
    let wall = Instant::now();

    let mut handles = vec![];
    for chunk in titles.chunks(chunk_size) {
        let service = service.clone();
        let chunk = chunk.to_vec();
        handles.push(tokio::task::spawn_blocking(move || {
            chunk
                .iter()
                .map(|title| {
                    let start = Instant::now();
                    service.recommend(title, top_n).map(|_| start.elapsed())
                })
                .collect::<Result<Vec<Duration>, _>>()
        }));
    }

    let mut timings = vec![];
    for handle in handles {
        timings.extend(handle.await??);
    }
    let total_time = wall.elapsed();

    timings.sort();
    let percentile = |p: f64| timings[((timings.len() - 1) as f64 * p).round() as usize];
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;
    let throughput = timings.len() as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} over {} workers", timings.len(), workers);
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

fn print_recommendations(title: &str, recommendations: &[Recommendation]) {
    println!("{}", format!("Movies like '{}':", title).bold().blue());
    for (i, rec) in recommendations.iter().enumerate() {
        let id = rec
            .movie_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}. {} [tmdb {}] - Score: {:.3}",
            (i + 1).to_string().green(),
            rec.title,
            id,
            rec.score
        );
    }
}

fn print_enriched(title: &str, recommendations: &[EnrichedRecommendation]) {
    println!("{}", format!("Movies like '{}':", title).bold().blue());
    for (i, rec) in recommendations.iter().enumerate() {
        let d = &rec.details;
        println!(
            "{}. {} ({}) - Rating: {} - Score: {:.3}",
            (i + 1).to_string().green(),
            d.title.bold(),
            d.release,
            d.rating,
            rec.score
        );
        println!("   {}", d.tagline.italic());
        if rec.placeholder {
            println!("   {}", "(details unavailable)".dimmed());
        }
    }
}
