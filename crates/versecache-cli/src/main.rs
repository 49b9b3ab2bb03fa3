//! versecache - a headless client for the daily Gita reading service.
//!
//! Works offline: the chapter catalog, reading progress, and verse text
//! are cached locally and refreshed from the backend when stale.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use futures::{stream, StreamExt};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use versecache_core::{
    utils::format_duration, ApiClient, CacheStorage, ChapterFilter, ChapterStore, Config,
    ContentGateway, ProgressStore, Verse,
};

// ============================================================================
// Constants
// ============================================================================

/// Maximum concurrent verse prefetch requests during sync.
/// Keeps sync fast without flooding the backend's rate limiter.
const MAX_CONCURRENT_REQUESTS: usize = 4;

/// Default reading time recorded when --seconds is not given.
const DEFAULT_READ_SECONDS: i64 = 60;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Set up logging with environment-based filter
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn print_usage() {
    println!("versecache - daily Gita reading, works offline");
    println!();
    println!("Usage: versecache <command> [options]");
    println!();
    println!("Commands:");
    println!("  sync [--force]                    Refresh the catalog and prefetch verse text");
    println!("  chapters [--filter F] [--search Q] List chapters (F: all, in-progress,");
    println!("                                    completed, favorites)");
    println!("  read <chapter.verse> [--seconds N] Mark a verse as read");
    println!("  favorite <chapter>                Toggle a chapter favorite");
    println!("  verses <chapter>                  Show a chapter's verses");
    println!("  stats                             Show reading stats as JSON");
    println!("  clear-cache                       Drop the local catalog cache");
}

/// Look up the value following a `--flag` argument.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("help");

    if matches!(command, "help" | "--help" | "-h") {
        print_usage();
        return Ok(());
    }

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });
    let cache_dir = config
        .cache_dir()
        .context("Could not resolve cache directory")?;
    let storage = CacheStorage::new(cache_dir)?;

    let mut client = ApiClient::new()?;
    if let Some(ref url) = config.api_base_url {
        client = client.with_base_url(url);
    }
    if let Some(ref token) = config.auth_token {
        client.set_token(token.clone());
    }
    let gateway: Arc<dyn ContentGateway> = Arc::new(client);

    let mut chapters = ChapterStore::new(Arc::clone(&gateway), storage.clone());
    let mut progress = ProgressStore::new(Arc::clone(&gateway), storage.clone());

    match command {
        "sync" => {
            let force = args.iter().any(|a| a == "--force");
            sync(&mut chapters, &mut progress, &gateway, &storage, force).await
        }
        "chapters" => list_chapters(&mut chapters, &args).await,
        "read" => read_verse(&mut chapters, &mut progress, &args).await,
        "favorite" => toggle_favorite(&mut chapters, &mut progress, &args).await,
        "verses" => show_verses(&chapters, &progress, &gateway, &storage, &args).await,
        "stats" => show_stats(&chapters, &progress),
        "clear-cache" => {
            chapters.clear_cache();
            println!("Cache cleared");
            Ok(())
        }
        other => {
            print_usage();
            bail!("Unknown command: {}", other);
        }
    }
}

/// Refresh the catalog and progress, then prefetch verse text for offline
/// reading.
async fn sync(
    chapters: &mut ChapterStore,
    progress: &mut ProgressStore,
    gateway: &Arc<dyn ContentGateway>,
    storage: &CacheStorage,
    force: bool,
) -> Result<()> {
    if force {
        chapters.refresh_chapters().await;
    } else {
        chapters.fetch_chapters(false).await;
    }

    if let Some(err) = chapters.error() {
        if chapters.chapters().is_empty() {
            bail!("Catalog fetch failed with no cached fallback: {}", err);
        }
        warn!(error = err, "Refresh failed, serving cached catalog");
    }

    match progress.sync_remote().await {
        Ok(()) => chapters.sync_completed_verses(progress.completed_verses().clone()),
        Err(e) => warn!(error = %e, "Progress sync failed, keeping local summary"),
    }

    let numbers: Vec<i32> = chapters
        .chapters()
        .iter()
        .map(|c| c.chapter_number)
        .collect();

    let fetched: Vec<(i32, Result<Vec<Verse>>)> = stream::iter(numbers)
        .map(|number| {
            let gateway = Arc::clone(gateway);
            async move { (number, gateway.fetch_verses(number).await) }
        })
        .buffer_unordered(MAX_CONCURRENT_REQUESTS)
        .collect()
        .await;

    let mut prefetched = 0;
    for (number, result) in fetched {
        match result {
            Ok(verses) if !verses.is_empty() => {
                storage.save(&verses_record(number), &verses)?;
                prefetched += 1;
            }
            Ok(_) => {}
            Err(e) => warn!(chapter = number, error = %e, "Verse prefetch failed"),
        }
    }

    info!(chapters = chapters.chapters().len(), prefetched, "Sync complete");
    println!(
        "Synced {} chapters ({} with offline verse text), catalog fetched {}",
        chapters.chapters().len(),
        prefetched,
        chapters.cache_age_display()
    );
    Ok(())
}

async fn list_chapters(chapters: &mut ChapterStore, args: &[String]) -> Result<()> {
    chapters.fetch_chapters(false).await;
    if chapters.chapters().is_empty() {
        match chapters.error() {
            Some(err) => bail!("Catalog fetch failed: {}", err),
            None => bail!("Catalog is empty - run `versecache sync` first"),
        }
    }
    if let Some(err) = chapters.error() {
        eprintln!("warning: showing cached data ({}): {}", chapters.cache_age_display(), err);
    }

    if let Some(query) = flag_value(args, "--search") {
        chapters.set_search_query(query);
    }
    if let Some(id) = flag_value(args, "--filter") {
        let filter = ChapterFilter::from_str(id).with_context(|| {
            format!(
                "Unknown filter: {} (expected all, in-progress, completed, favorites)",
                id
            )
        })?;
        chapters.set_selected_filter(filter);
    }

    for chapter in chapters.filtered_chapters() {
        let marker = if chapter.is_favorite { "*" } else { " " };
        println!(
            "{} {:>2}. {} ({}) [{}]",
            marker,
            chapter.chapter_number,
            chapter.name,
            chapter.name_sanskrit,
            chapter.progress_display()
        );
        if let Some(ref theme) = chapter.theme {
            println!("       {}", theme);
        }
    }
    Ok(())
}

/// Record a completion: the gated progress store first, then the
/// optimistic mirror into the catalog cache.
async fn read_verse(
    chapters: &mut ChapterStore,
    progress: &mut ProgressStore,
    args: &[String],
) -> Result<()> {
    let verse_id = args
        .get(2)
        .context("Usage: versecache read <chapter.verse> [--seconds N]")?;
    let chapter_number = Verse::chapter_of(verse_id)
        .with_context(|| format!("Invalid verse id: {} (expected e.g. 2.47)", verse_id))?;
    let seconds: i64 = flag_value(args, "--seconds")
        .map(str::parse)
        .transpose()
        .context("--seconds expects a number")?
        .unwrap_or(DEFAULT_READ_SECONDS);

    let recorded = progress.mark_as_read(verse_id, seconds).await?;
    if !recorded {
        println!("{} was already marked as read", verse_id);
        return Ok(());
    }

    chapters.fetch_chapters(false).await;
    chapters.mark_chapter_read(chapter_number, verse_id);

    println!(
        "Marked {} as read ({} day streak)",
        verse_id,
        progress.summary().current_streak
    );
    Ok(())
}

async fn toggle_favorite(
    chapters: &mut ChapterStore,
    progress: &mut ProgressStore,
    args: &[String],
) -> Result<()> {
    let chapter_number: i32 = args
        .get(2)
        .context("Usage: versecache favorite <chapter>")?
        .parse()
        .context("chapter must be a number")?;

    chapters.fetch_chapters(false).await;
    match chapters.toggle_chapter_favorite(chapter_number) {
        Some(favorite) => {
            progress.set_favorite(chapter_number, favorite);
            if favorite {
                println!("Chapter {} added to favorites", chapter_number);
            } else {
                println!("Chapter {} removed from favorites", chapter_number);
            }
            Ok(())
        }
        None => bail!("Unknown chapter: {}", chapter_number),
    }
}

async fn show_verses(
    chapters: &ChapterStore,
    progress: &ProgressStore,
    gateway: &Arc<dyn ContentGateway>,
    storage: &CacheStorage,
    args: &[String],
) -> Result<()> {
    let chapter_number: i32 = args
        .get(2)
        .context("Usage: versecache verses <chapter>")?
        .parse()
        .context("chapter must be a number")?;

    // Prefer the prefetched copy; fall back to the gateway
    let verses: Vec<Verse> = match storage.load(&verses_record(chapter_number)) {
        Some(verses) => verses,
        None => gateway
            .fetch_verses(chapter_number)
            .await
            .with_context(|| format!("Failed to fetch verses for chapter {}", chapter_number))?,
    };
    if verses.is_empty() {
        bail!("No verses found for chapter {}", chapter_number);
    }

    if let Some(chapter) = chapters
        .chapters()
        .iter()
        .find(|c| c.chapter_number == chapter_number)
    {
        println!("{}. {} ({})", chapter.chapter_number, chapter.name, chapter.name_sanskrit);
        println!();
    }

    for verse in &verses {
        let read = if progress.summary().completed_verses.contains(&verse.id) {
            "+"
        } else {
            " "
        };
        println!("{} {} {}", read, verse.display_ref(), verse.text_sanskrit);
        if let Some(ref transliteration) = verse.transliteration {
            println!("      {}", transliteration);
        }
        println!("      {}", verse.translation);
    }
    Ok(())
}

fn show_stats(chapters: &ChapterStore, progress: &ProgressStore) -> Result<()> {
    let summary = progress.summary();
    let today = chrono::Utc::now().date_naive();
    let streak_alive = summary
        .last_read_date
        .map_or(false, |last| (today - last).num_days() <= 1);
    let stats = chapters.stats();

    let out = serde_json::json!({
        "currentStreak": summary.current_streak,
        "longestStreak": summary.longest_streak,
        "streakAlive": streak_alive,
        "totalVersesRead": summary.total_verses_read,
        "totalTime": format_duration(summary.total_seconds),
        "lastReadDate": summary.last_read_date,
        "favoriteChapters": summary.favorite_chapters.len(),
        "catalogChapters": chapters.chapters().len(),
        "catalogAge": chapters.cache_age_display(),
        "cacheHits": stats.hits,
        "cacheMisses": stats.misses,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn verses_record(chapter_number: i32) -> String {
    format!("verses_{}", chapter_number)
}
