use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use client_core::{GatewaySource, IdeasPage, ListView, Location, MemoryLocation, PageLink};
use shared::domain::{PageSize, SortOrder};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Newest,
    Oldest,
}

impl From<SortArg> for SortOrder {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Newest => SortOrder::Newest,
            SortArg::Oldest => SortOrder::Oldest,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Browse the ideas list through the gateway")]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:3000/api/ideas")]
    gateway_url: String,
    /// Page address query, e.g. "page=2&size=20&sort=published_at".
    #[arg(long, default_value = "")]
    location: String,
    #[arg(long, conflicts_with_all = ["size", "sort"])]
    page: Option<u32>,
    #[arg(long, conflicts_with = "sort")]
    size: Option<u32>,
    #[arg(long, value_enum)]
    sort: Option<SortArg>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    let size = match args.size {
        Some(raw) => match PageSize::from_u32(raw) {
            Some(size) => Some(size),
            None => bail!("page size must be one of 10, 20 or 50 (got {raw})"),
        },
        None => None,
    };

    let source = Arc::new(GatewaySource::parse(&args.gateway_url)?);
    let location = Arc::new(MemoryLocation::new(args.location));
    let page = IdeasPage::open(location.clone(), source).await;
    println!("Loading {} ...", page.address());
    render(&page, page.settled().await).await;

    let change = if let Some(number) = args.page {
        Some(page.set_page(number))
    } else if let Some(size) = size {
        Some(page.set_page_size(size))
    } else {
        args.sort.map(|sort| page.set_sort(sort.into()))
    };

    if let Some(change) = change {
        tracing::info!(sequence = change.sequence, "applied list change");
        println!();
        println!("Address: ?{}", location.current_query());
        render(&page, page.settled().await).await;
    }

    Ok(())
}

async fn render(page: &IdeasPage, view: ListView) {
    let state = page.state();
    println!(
        "{}   (per page: {}, sort: {})",
        page.range_summary().await,
        state.size.get(),
        state.sort.label()
    );
    if let Some(message) = &view.last_error {
        println!("! could not refresh the list: {message}");
    }

    let cards = page.cards().await;
    if cards.is_empty() {
        println!("No posts found.");
    }
    for card in cards {
        println!("  {:<20} {}", card.published_label, card.title);
    }

    let links = page.page_links().await;
    let mut bar = String::from(if links.has_previous() { "« " } else { "  " });
    for link in &links.links {
        match link {
            PageLink::Page { number, current: true } => bar.push_str(&format!("[{number}] ")),
            PageLink::Page { number, .. } => bar.push_str(&format!("{number} ")),
            PageLink::Gap => bar.push_str("... "),
        }
    }
    if links.has_next() {
        bar.push('»');
    }
    println!("{}", bar.trim_end());
}
