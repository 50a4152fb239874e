use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{self, Config, ConfigError, UsageBackend};
use crate::emitter::{EmitSink, StdoutSink};
use crate::index_store::SqliteUsagePersistence;
use crate::library::{self, LibraryError};
use crate::model::Item;
use crate::scheduler::{DeferredQueue, Scheduler};
use crate::selection::{ControllerOptions, SelectionController};
use crate::usage_file::JsonUsagePersistence;
use crate::usage_store::{StoreError, UsagePersistence, UsageStore};
use crate::usage_writer::BackgroundUsageWriter;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("library error: {0}")]
    Library(#[from] LibraryError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub config_path: Option<PathBuf>,
    pub query: String,
    pub limit: Option<usize>,
    pub commit: bool,
    pub forget: Option<String>,
}

pub fn parse_cli_args(args: &[String]) -> Result<RuntimeOptions, String> {
    let mut options = RuntimeOptions::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter.next().ok_or("--config requires a path")?;
                options.config_path = Some(PathBuf::from(value));
            }
            "--query" => {
                let value = iter.next().ok_or("--query requires a value")?;
                options.query = value.clone();
            }
            "--limit" => {
                let value = iter.next().ok_or("--limit requires a number")?;
                let limit = value
                    .parse::<usize>()
                    .map_err(|_| format!("invalid --limit value '{value}'"))?;
                options.limit = Some(limit);
            }
            "--commit" => options.commit = true,
            "--forget" => {
                let value = iter.next().ok_or("--forget requires an item id")?;
                options.forget = Some(value.clone());
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
    }

    if options.commit && options.forget.is_some() {
        return Err("--commit and --forget cannot be combined".to_string());
    }
    Ok(options)
}

/// Opens the configured backend behind a writer thread so saves never block
/// the caller.
pub fn open_usage_persistence(cfg: &Config) -> Result<Box<dyn UsagePersistence>, StoreError> {
    let backend: Box<dyn UsagePersistence + Send> = match cfg.usage_backend {
        UsageBackend::Sqlite => Box::new(SqliteUsagePersistence::open(&cfg.usage_path)?),
        UsageBackend::Json => Box::new(JsonUsagePersistence::new(cfg.usage_path.clone())),
    };
    Ok(Box::new(BackgroundUsageWriter::spawn(backend)?))
}

pub fn load_items(cfg: &Config) -> Result<Vec<Item>, LibraryError> {
    match &cfg.library_path {
        Some(path) => library::load_library(path),
        None => library::builtin_library(),
    }
}

pub fn build_controller(
    cfg: &Config,
    sink: Arc<dyn EmitSink>,
    scheduler: Box<dyn Scheduler>,
) -> Result<SelectionController, RuntimeError> {
    let items = load_items(cfg)?;
    let usages = UsageStore::load(open_usage_persistence(cfg)?);
    Ok(SelectionController::new(items, usages, sink, scheduler)
        .with_options(ControllerOptions::from(cfg)))
}

pub fn run_with_options(options: RuntimeOptions) -> Result<(), RuntimeError> {
    let cfg = config::load(options.config_path.as_deref())?;
    log::info!(
        "startup config_path={} usage_backend={:?} usage_path={}",
        cfg.config_path.display(),
        cfg.usage_backend,
        cfg.usage_path.display(),
    );

    let queue = DeferredQueue::new();
    let mut controller = build_controller(&cfg, Arc::new(StdoutSink), Box::new(queue.clone()))?;
    controller.set_query(&options.query);

    if let Some(id) = &options.forget {
        forget(&mut controller, id);
        return Ok(());
    }

    if options.commit {
        match controller.commit() {
            Some(item) => log::info!("cli commit id={}", item.id),
            None => println!("no match for '{}'", options.query),
        }
        queue.drain_blocking();
        return Ok(());
    }

    for row in format_rows(&controller.ranked_items(), options.limit) {
        println!("{row}");
    }
    Ok(())
}

fn forget(controller: &mut SelectionController, id: &str) {
    let position = controller
        .ranked_items()
        .iter()
        .position(|item| item.id == id);
    let Some(position) = position else {
        println!("no item with id '{id}' for query '{}'", controller.query());
        return;
    };

    controller.navigate(position as isize);
    match controller.delete() {
        Some(removed) => println!("forgot {removed}"),
        None => println!("{id} has no usage record"),
    }
}

fn format_rows(items: &[&Item], limit: Option<usize>) -> Vec<String> {
    items
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|item| format!("{}\t{}", item.glyph, item.id))
        .collect()
}
