use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use dataset_store::{DatasetCache, FileFetcher, HttpFetcher, SourceFetcher};
use gallery_core::{GalleryController, GalleryOptionsStore};
use serde_json::json;
use shared::{GalleryOptions, Side, SortDirection, SortField};
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

mod config;
mod tabs;

/// Prints one tab of the specimen gallery as JSON lines.
#[derive(Parser, Debug)]
#[command(name = "gallery")]
struct Args {
    /// Tab to show (collection, insectary, crispr).
    #[arg(long)]
    tab: Option<String>,
    /// Extra `FIELD=VALUE` (exact) or `FIELD~VALUE` (contains) clause.
    #[arg(long = "where", value_name = "CLAUSE")]
    filters: Vec<String>,
    #[arg(long)]
    sort_field: Option<String>,
    #[arg(long)]
    sort_direction: Option<SortDirection>,
    #[arg(long)]
    side: Option<Side>,
    /// Include records without any photo.
    #[arg(long)]
    all_records: bool,
    #[arg(long)]
    one_per_subspecies: bool,
    /// Number of pages to reveal.
    #[arg(long, default_value_t = 1)]
    pages: usize,
    #[arg(long)]
    page_size: Option<usize>,
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings();
    if let Some(dir) = args.data_dir.clone() {
        settings.data_dir = dir;
    }
    if let Some(url) = args.base_url.clone() {
        settings.data_base_url = Some(url);
    }
    if let Some(size) = args.page_size.filter(|size| *size > 0) {
        settings.page_size = size;
    }

    let tab_name = args.tab.as_deref().unwrap_or(&settings.default_tab);
    let tab = tabs::find(tab_name).ok_or_else(|| {
        anyhow!(
            "unknown tab '{tab_name}' (expected one of: {})",
            tabs::names().join(", ")
        )
    })?;
    let query = tab.query(&args.filters).context("invalid --where clause")?;

    let cache = DatasetCache::new(Arc::new(build_fetcher(&settings)?));
    let dataset = cache.dataset(&tab.key(), tab.location);
    dataset
        .ensure_loaded()
        .await
        .with_context(|| format!("failed to load '{}' from {}", tab.name, tab.location))?;

    let store = GalleryOptionsStore::new(initial_options(&args));
    let mut gallery =
        GalleryController::new(dataset.records(), &store).with_page_size(settings.page_size);
    info!(tab = tab.name, %query, "applying tab filter");
    gallery.apply_predicate(query.into_predicate());

    for _ in 1..args.pages.max(1) {
        if !gallery.has_more() {
            break;
        }
        gallery.load_more();
    }

    let side = store.snapshot().side;
    let mut out = io::stdout().lock();
    for record in gallery.visible_items() {
        let line = json!({ "record": record, "photos": record.photos(side) });
        serde_json::to_writer(&mut out, &line)?;
        writeln!(out)?;
    }
    out.flush()?;

    let shown = gallery.visible_items().len();
    let matches = gallery.matches().len();
    let has_more = gallery.has_more();
    info!(tab = tab.name, shown, matches, has_more, "gallery page rendered");
    Ok(())
}

fn initial_options(args: &Args) -> GalleryOptions {
    let mut options = GalleryOptions::default();
    if let Some(field) = args.sort_field.as_deref() {
        options.sort_field = SortField::from(field);
    }
    if let Some(direction) = args.sort_direction {
        options.sort_direction = direction;
    }
    if let Some(side) = args.side {
        options.side = side;
    }
    options.only_photos = !args.all_records;
    options.one_per_subspecies = args.one_per_subspecies;
    options
}

fn build_fetcher(settings: &config::Settings) -> Result<SourceFetcher> {
    match settings.data_base_url.as_deref() {
        Some(raw) => {
            let base =
                Url::parse(raw).with_context(|| format!("invalid data base url '{raw}'"))?;
            info!(base_url = %base, "serving datasets over http");
            Ok(SourceFetcher::new(HttpFetcher::with_base_url(base), None))
        }
        None => {
            info!(data_dir = %settings.data_dir.display(), "serving datasets from disk");
            Ok(SourceFetcher::new(
                HttpFetcher::new(),
                Some(FileFetcher::new(settings.data_dir.clone())),
            ))
        }
    }
}
