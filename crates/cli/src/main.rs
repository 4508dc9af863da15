use anyhow::{Context, Result, anyhow};
use catalog::{Mood, RatingRecord, Theme, VibeSelection, categories_for, search_terms_for};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rand::Rng;
use server::{Config, Recommender, ScoredEpisode};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// vibecast - podcast picks for your mood
#[derive(Parser)]
#[command(name = "vibecast")]
#[command(about = "Recommends a podcast episode for your mood, theme and time", long_about = None)]
struct Cli {
    /// JSON file for ratings and learned preferences (overrides VIBECAST_STORE_PATH)
    #[arg(short, long)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend an episode, then optionally shuffle through alternatives
    Recommend {
        /// Current mood(s), e.g. happy, curious, surprise-me
        #[arg(long = "mood", value_delimiter = ',')]
        moods: Vec<Mood>,

        /// Desired theme(s), e.g. laugh, learn, kill-time
        #[arg(long = "theme", value_delimiter = ',')]
        themes: Vec<Theme>,

        /// Target listening time in minutes
        #[arg(long, default_value = "30")]
        minutes: u32,

        /// Number of shuffled alternatives to show after the top pick
        #[arg(long, default_value = "0")]
        shuffles: usize,

        /// Show the score breakdown of each episode
        #[arg(long)]
        explain: bool,
    },

    /// Rate an episode you listened to
    Rate {
        /// Episode id as printed by `recommend`
        #[arg(long)]
        episode: String,

        /// Stars from 1 to 5
        #[arg(long)]
        stars: u8,

        #[arg(long = "mood", value_delimiter = ',')]
        moods: Vec<Mood>,

        #[arg(long = "theme", value_delimiter = ',')]
        themes: Vec<Theme>,

        #[arg(long)]
        comment: Option<String>,
    },

    /// Show the categories and search terms a selection maps to
    Categories {
        #[arg(long = "mood", value_delimiter = ',')]
        moods: Vec<Mood>,

        #[arg(long = "theme", value_delimiter = ',')]
        themes: Vec<Theme>,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if cli.store.is_some() {
        config.store_path = cli.store;
    }

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            moods,
            themes,
            minutes,
            shuffles,
            explain,
        } => {
            let selection = VibeSelection::new(moods, themes, minutes);
            handle_recommend(&config, selection, shuffles, explain).await?
        }
        Commands::Rate {
            episode,
            stars,
            moods,
            themes,
            comment,
        } => handle_rate(&config, episode, stars, moods, themes, comment).await?,
        Commands::Categories { moods, themes } => handle_categories(&moods, &themes),
        Commands::Benchmark { requests } => handle_benchmark(&config, requests).await?,
    }

    Ok(())
}

async fn build_recommender(config: &Config) -> Result<Recommender> {
    let start = Instant::now();
    let recommender = Recommender::from_config(config)
        .await
        .context("Failed to set up the recommender")?;
    let providers = recommender
        .provider_status()
        .into_iter()
        .map(|s| s.name)
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "{} Ready with providers [{}] in {:?}",
        "✓".green(),
        providers,
        start.elapsed()
    );
    Ok(recommender)
}

/// Handle the 'recommend' command
async fn handle_recommend(
    config: &Config,
    selection: VibeSelection,
    shuffles: usize,
    explain: bool,
) -> Result<()> {
    if selection.moods.is_empty() && selection.themes.is_empty() {
        return Err(anyhow!("Pick at least one --mood or --theme"));
    }

    let recommender = build_recommender(config).await?;
    let session = recommender.start_session().await;
    let recommendation = recommender.recommend(&session, &selection).await?;

    let Some(pick) = recommendation.pick else {
        println!(
            "{}",
            format!(
                "Nothing fits {} minutes from {} episodes. Try another duration.",
                selection.target_minutes, recommendation.pool_size
            )
            .yellow()
        );
        return Ok(());
    };

    println!("{}", "Your pick:".bold().blue());
    print_episode(1, &pick, explain);

    for i in 0..shuffles {
        match recommender.shuffle_next(&session).await? {
            Some(next) => print_episode(i + 2, &next, explain),
            None => {
                println!("{}", "No more fresh episodes. Try a new search.".yellow());
                break;
            }
        }
    }
    Ok(())
}

/// Handle the 'rate' command
async fn handle_rate(
    config: &Config,
    episode: String,
    stars: u8,
    moods: Vec<Mood>,
    themes: Vec<Theme>,
    comment: Option<String>,
) -> Result<()> {
    if config.store_path.is_none() {
        warn!("No store path configured, the rating will not outlive this process");
    }

    let mut record = RatingRecord::new(episode, stars, moods, themes)?;
    if let Some(comment) = comment {
        record = record.with_comment(comment);
    }

    let recommender = build_recommender(config).await?;
    let weights = recommender.submit_rating(record, None).await?;

    println!("{} Rating saved", "✓".green());
    for weight in weights {
        println!(
            "  {} × {}: weight {:+.2} over {} ratings (avg {:.1})",
            weight.mood.label().cyan(),
            weight.theme.label().cyan(),
            weight.weight,
            weight.episode_count,
            weight.avg_rating
        );
    }
    Ok(())
}

/// Handle the 'categories' command
fn handle_categories(moods: &[Mood], themes: &[Theme]) {
    let set = categories_for(moods, themes);
    println!("{}", "Categories for your vibe:".bold().blue());
    println!("{}Primary: {}", "• ".green(), set.primary.join(", "));
    println!("{}Secondary: {}", "• ".green(), set.secondary.join(", "));
    println!("{}Sub-genres: {}", "• ".cyan(), set.subcategories.join(", "));
    println!(
        "{}Search terms: {}",
        "• ".cyan(),
        search_terms_for(moods, themes).join(" | ")
    );
}

/// Handle the 'benchmark' command
async fn handle_benchmark(config: &Config, requests: usize) -> Result<()> {
    if requests == 0 {
        return Err(anyhow!("--requests must be at least 1"));
    }
    let recommender = Arc::new(build_recommender(config).await?);

    // Random selections over the whole vocabulary
    let mut rng = rand::rng();
    let selections: Vec<VibeSelection> = (0..requests)
        .map(|_| {
            let mood = Mood::all()[rng.random_range(0..Mood::all().len())];
            let theme = Theme::all()[rng.random_range(0..Theme::all().len())];
            VibeSelection::new(vec![mood], vec![theme], rng.random_range(10..=90))
        })
        .collect();

    // Use tokio::spawn to make concurrent requests, one session each
    let wall_clock = Instant::now();
    let mut handles = vec![];
    for selection in selections {
        let recommender = recommender.clone();
        let handle = tokio::spawn(async move {
            let start = Instant::now();
            let session = recommender.start_session().await;
            recommender.recommend(&session, &selection).await?;
            recommender.end_session(&session).await;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    let mut timings: Vec<Duration> = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let total_time = wall_clock.elapsed();

    let latency_sum: Duration = timings.iter().sum();
    let avg_latency = latency_sum / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Print one ranked episode
fn print_episode(rank: usize, scored: &ScoredEpisode, explain: bool) {
    let episode = &scored.episode;
    println!(
        "{}. {} - {} ({:.0} min) - Score: {:.1}",
        rank.to_string().green(),
        episode.title.bold(),
        episode.podcast_name,
        episode.duration_minutes(),
        scored.score
    );
    println!("   {}", episode.id.dimmed());
    if !scored.match_reasons.is_empty() {
        println!("   {}", scored.match_reason());
    }
    if let Some(url) = &episode.external_url {
        println!("   {}", url.underline());
    }
    if explain {
        let b = &scored.breakdown;
        println!(
            "   category {:.2} | duration {:.2} | personal {:.2} | popularity {:.2} | top {:.0} | quality {:.2} | diversity {:+.1}",
            b.category, b.duration, b.personal, b.popularity, b.top_quality, b.quality, b.diversity
        );
    }
}
