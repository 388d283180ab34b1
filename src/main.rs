use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use dioxus::prelude::*;

use listview::config::{default_db_path, ListViewConfig};
use listview::domain::entities::column::{
    details_link_column, id_column, ColumnDescriptor, LinkTarget,
};
use listview::infra::import::csv::import_csv_table;
use listview::infra::sqlite::repo::SqliteListRepository;
use listview::infra::sqlite::schema::{init_db, open_connection};
use listview::platform::navigation::MemoryNavigator;
use listview::ui::list_table::ListTable;
use listview::{CacheService, ListService};

const DEMO_TABLE: &str = "things";
const DEMO_CSV: &str = include_str!("../demos/things.csv");

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(dioxus::desktop::WindowBuilder::new().with_title("List View")),
        )
        .launch(App);
}

fn seed_demo_db() -> Result<PathBuf> {
    let db_path = default_db_path()?;
    init_db(&db_path)?;
    let mut conn = open_connection(&db_path)?;
    import_csv_table(&mut conn, DEMO_TABLE, DEMO_CSV.as_bytes())
        .context("failed to seed demo table")?;
    Ok(db_path)
}

fn build_service(db_path: PathBuf) -> Result<ListService> {
    let repo = SqliteListRepository::for_table(db_path, DEMO_TABLE)?;
    let columns = vec![
        id_column("/things"),
        ColumnDescriptor::new("name", "Name").sortable(),
        ColumnDescriptor::new("status", "Status").sortable().filterable(),
        ColumnDescriptor::new("team", "Team").sortable().filterable(),
        details_link_column(LinkTarget::Prefix("/things/".to_string()), None),
    ];
    Ok(ListService::new(
        DEMO_TABLE,
        columns,
        Arc::new(repo),
        Arc::new(MemoryNavigator::new("/things")),
        Arc::new(CacheService::new()),
    )
    .with_config(ListViewConfig {
        auto_refetch: Some(30),
        ..ListViewConfig::default()
    }))
}

#[component]
fn App() -> Element {
    let service = use_hook(|| {
        seed_demo_db()
            .and_then(build_service)
            .map(Arc::new)
            .map_err(|err| format!("{err:#}"))
    });

    match service {
        Ok(service) => {
            use_context_provider(|| service);
            rsx! {
                div {
                    style: "padding: 16px; font-family: sans-serif;",
                    ListTable {}
                }
            }
        }
        Err(err) => rsx! {
            div {
                p { "Failed to open the demo database: {err}" }
            }
        },
    }
}
