use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use resident_feedback::config::LatencyConfig;
use resident_feedback::{
    render_listing, render_review, Category, CategorySelection, Config, CreateReviewDraft,
    ImagePayload, InMemoryReviewService, QuerySpec, ReviewService, SortOrder,
};

#[derive(Parser)]
#[command(name = "resident-feedback")]
#[command(about = "Browse and submit anonymous resident reviews")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(long, default_value = ".resident-feedback/config.yml")]
    config: PathBuf,

    /// Disable simulated backend latency
    #[arg(long)]
    no_latency: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List reviews, filtered and sorted
    List {
        /// Category to include (repeatable, "all" disables filtering)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Minimum rating (1-5)
        #[arg(long)]
        min_rating: Option<u8>,

        /// Maximum rating (1-5)
        #[arg(long)]
        max_rating: Option<u8>,

        /// Sort order: newest, oldest, best, worst
        #[arg(long, default_value = "newest")]
        sort: String,

        /// Print JSON instead of markdown
        #[arg(long)]
        json: bool,
    },

    /// Show aggregate statistics
    Stats {
        /// Print JSON instead of markdown
        #[arg(long)]
        json: bool,
    },

    /// Submit an anonymous review
    Submit {
        /// Category of the review (repeatable)
        #[arg(long = "category", required = true)]
        categories: Vec<String>,

        /// Rating from 1 (worst) to 5 (best)
        #[arg(long)]
        rating: u8,

        /// Short title
        #[arg(long)]
        title: String,

        /// Full description
        #[arg(long)]
        description: String,

        /// Photo to attach (repeatable)
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },

    /// List the available categories
    Categories,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("resident_feedback=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if cli.no_latency {
        config.service.latency = LatencyConfig::none();
    }

    let service = InMemoryReviewService::from_config(&config)?;

    match cli.command {
        Commands::List {
            categories,
            min_rating,
            max_rating,
            sort,
            json,
        } => {
            let query = QuerySpec {
                categories: CategorySelection::from_names(&categories)?,
                min_rating,
                max_rating,
                sort_order: sort.parse::<SortOrder>()?,
            };
            list_reviews(&service, &query, json).await?;
        }
        Commands::Stats { json } => {
            show_stats(&service, json).await?;
        }
        Commands::Submit {
            categories,
            rating,
            title,
            description,
            images,
        } => {
            let categories = categories
                .iter()
                .map(|name| name.parse::<Category>())
                .collect::<Result<Vec<_>, _>>()?;

            let images = images
                .iter()
                .map(|path| read_image(path))
                .collect::<Result<Vec<_>>>()?;

            let draft =
                CreateReviewDraft::new(categories, rating, title, description).with_images(images);

            submit_review(&service, draft).await?;
        }
        Commands::Categories => {
            for category in service.categories() {
                println!("{:<16} {}", category.as_str(), category.label());
            }
        }
    }

    Ok(())
}

async fn list_reviews(service: &dyn ReviewService, query: &QuerySpec, json: bool) -> Result<()> {
    let reviews = service
        .list_reviews(query)
        .await
        .context("Failed to list reviews")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reviews)?);
        return Ok(());
    }

    let stats = service.get_stats().await.context("Failed to load stats")?;
    println!("{}", render_listing(&reviews, &stats));

    Ok(())
}

async fn show_stats(service: &dyn ReviewService, json: bool) -> Result<()> {
    let stats = service.get_stats().await.context("Failed to load stats")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Reviews:         {}", stats.total);
        println!("Average rating:  {:.1}", stats.average_rating);
        println!("Last submission: {}", stats.last_submission_date);
    }

    Ok(())
}

async fn submit_review(service: &dyn ReviewService, draft: CreateReviewDraft) -> Result<()> {
    let review = service
        .create_review(draft)
        .await
        .context("Failed to submit review")?;

    info!(id = review.id, "Review submitted");

    println!("Thank you! Your anonymous review was recorded.\n");
    println!("{}", render_review(&review));

    Ok(())
}

/// Read an image from disk, inferring its media type from the extension
fn read_image(path: &Path) -> Result<ImagePayload> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read image: {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let media_type = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    };

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(ImagePayload::new(file_name, media_type, bytes))
}
