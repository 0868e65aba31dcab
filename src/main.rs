use std::process::ExitCode;
use std::sync::Arc;

use mongopanel::connection::{ConnectionManager, MongoOperations};
use mongopanel::models::{CollectionRef, ServerConfiguration};
use mongopanel::panel::{Panel, Projection};
use mongopanel::state::{ConfigManager, PanelSettings};

const USAGE: &str = "usage: mongopanel <uri> <database> <collection> [filter-json]";

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [uri, database, collection, rest @ ..] = args.as_slice() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };
    let filter = rest.first().map(String::as_str).unwrap_or_default();

    match run(uri, database, collection, filter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(uri: &str, database: &str, collection: &str, filter: &str) -> anyhow::Result<()> {
    // Load saved settings
    let settings = match ConfigManager::new().and_then(|config| config.load_settings()) {
        Ok(settings) => settings,
        Err(err) => {
            log::warn!("Failed to load settings, using defaults: {err:#}");
            PanelSettings::default()
        }
    };

    let manager = Arc::new(ConnectionManager::new()?);
    let config = ServerConfiguration::new(uri, uri).with_default_database(database);
    let mut panel = Panel::new(
        Arc::new(MongoOperations::new(manager.clone())),
        config,
        manager.runtime_handle(),
        CollectionRef::new(database, collection),
        settings,
    );

    panel.execute_query_with_inputs(filter, "", "", "")?;
    panel.wait_until_idle();
    for event in panel.drain_events() {
        if let Some(status) = event.status() {
            log::info!("{}", status.text);
        }
    }

    match panel.result_view().projection() {
        Projection::Tree(tree) => {
            for row in tree.rows(tree.root()) {
                println!("{}{}  {}", "  ".repeat(row.depth), row.label, row.value);
            }
        }
        Projection::Table(table) => {
            println!("{}", table.columns.join("\t"));
            for row in &table.rows {
                println!("{}", row.join("\t"));
            }
        }
        Projection::Error(message) => anyhow::bail!("{message}"),
        Projection::Empty => println!("No results"),
    }

    let total = panel.result_view().total();
    let pagination = panel.pagination();
    println!(
        "-- page {} of {} ({} documents)",
        pagination.current_page() + 1,
        pagination.page_count(total).max(1),
        total
    );
    Ok(())
}
