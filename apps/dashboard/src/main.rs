use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use client_core::{
    config::{load_settings_from, DEFAULT_SETTINGS_FILE},
    ClientEvent, DashboardSession, HydrationOutcome, ListSync, SyncOutcome,
};
use futures::StreamExt;
use shared::{
    domain::{Entity, ProjectId, TeamId, UserId},
    protocol::ListFilters,
};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Resource {
    Teams,
    Projects,
    Forms,
}

#[derive(Parser, Debug)]
#[command(about = "Browse Escape Form teams, projects and forms page by page")]
struct Args {
    #[arg(long, value_enum, default_value_t = Resource::Teams)]
    resource: Resource,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_base_url: Option<String>,
    /// Bearer token; falls back to ESCAPE_FORM_TOKEN.
    #[arg(long)]
    token: Option<String>,
    #[arg(long, default_value = "cli-user")]
    user_id: String,
    #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
    page: i64,
    #[arg(long, allow_hyphen_values = true)]
    limit: Option<i64>,
    /// How many consecutive pages to print.
    #[arg(long, default_value_t = 1)]
    pages: u32,
    #[arg(long)]
    team_id: Option<String>,
    #[arg(long)]
    project_id: Option<String>,
    #[arg(long)]
    search: Option<String>,
}

impl Args {
    fn filters(&self) -> ListFilters {
        ListFilters {
            team_id: self.team_id.clone().map(TeamId::from),
            project_id: self.project_id.clone().map(ProjectId::from),
            search: self.search.clone(),
            ..ListFilters::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    let mut settings = load_settings_from(&config_path, |key| std::env::var(key).ok());
    if let Some(url) = &args.api_base_url {
        settings.api_base_url = url.clone();
    }

    let dashboard = DashboardSession::new(&settings).context("failed to set up dashboard")?;
    let token = args
        .token
        .clone()
        .or_else(|| std::env::var("ESCAPE_FORM_TOKEN").ok());
    dashboard
        .session
        .sign_in(UserId::from(args.user_id.as_str()), token);

    let mut events = BroadcastStream::new(dashboard.subscribe_events());
    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match event {
                Ok(ClientEvent::Navigate { route }) => info!(route = %route, "navigate"),
                Ok(ClientEvent::Error(message)) => warn!("{message}"),
                Err(err) => warn!("event stream lagged: {err}"),
            }
        }
    });

    let result = match args.resource {
        Resource::Teams => browse(&dashboard, &dashboard.teams, &args).await,
        Resource::Projects => browse(&dashboard, &dashboard.projects, &args).await,
        Resource::Forms => browse(&dashboard, &dashboard.forms, &args).await,
    };

    dashboard.session.sign_out();
    result
}

async fn browse<T: Entity>(
    dashboard: &DashboardSession,
    sync: &ListSync<T>,
    args: &Args,
) -> Result<()> {
    sync.set_filters(args.filters());
    let limit = args
        .limit
        .unwrap_or(sync.pagination().snapshot().limit as i64);
    sync.pagination().set_pagination(1, limit);

    let mut outcome = step(dashboard, sync.refresh().await)?;
    if args.page > 1 {
        outcome = step(dashboard, sync.go_to(args.page, limit).await)?;
    }

    let pages = args.pages.max(1);
    for printed in 1..=pages {
        match &outcome.hydration {
            HydrationOutcome::Redirected { route } => {
                println!("No {}s yet; continue at {route}", T::KIND);
                return Ok(());
            }
            HydrationOutcome::RedirectPending => {
                println!("No {}s yet", T::KIND);
                return Ok(());
            }
            HydrationOutcome::OutOfRange { requested, last_page } => {
                println!(
                    "Page {requested} is past the end; the list now has {last_page} page(s)"
                );
                return Ok(());
            }
            HydrationOutcome::Hydrated { .. } => {}
        }

        print_page(sync, &outcome);
        if printed == pages || !outcome.page.has_next() {
            break;
        }
        outcome = step(dashboard, sync.next_page().await)?;
    }
    Ok(())
}

fn step(
    dashboard: &DashboardSession,
    result: Result<SyncOutcome, client_core::SyncError>,
) -> Result<SyncOutcome> {
    result.map_err(|err| {
        dashboard.report(&err);
        anyhow::Error::new(err)
    })
}

fn print_page<T: Entity>(sync: &ListSync<T>, outcome: &SyncOutcome) {
    let page = outcome.page;
    println!(
        "{}s page {}/{} ({} total, {} per page)",
        T::KIND,
        page.page,
        page.total_pages(),
        page.total_items,
        page.limit
    );
    sync.store().read(|snapshot| {
        for item in &snapshot.items {
            let marker = if snapshot.active.as_ref() == Some(item.id()) {
                '*'
            } else {
                ' '
            };
            println!("{marker} {:<28} {}", item.id(), item.display_name());
        }
    });
}
