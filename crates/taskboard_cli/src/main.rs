//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `taskboard_core` linkage.
//! - Print a deterministic board summary for quick local sanity checks.

use std::process::ExitCode;
use taskboard_core::{
    init_logging, Board, CategoryService, CoreConfig, SqliteBoardStore, TaskService,
    MAX_CATEGORIES,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("taskboard: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).map_err(|err| err.to_string())?;
    }

    let board = match &config.db_path {
        Some(path) => {
            let store = SqliteBoardStore::open(path).map_err(|err| err.to_string())?;
            Board::with_persistence(store).map_err(|err| err.to_string())?
        }
        None => Board::new(),
    };
    log::info!(
        "event=cli_start module=cli status=ok persistent={}",
        config.db_path.is_some()
    );

    let tasks = TaskService::new(board.clone());
    let categories = CategoryService::new(board);
    let counts = tasks.task_counts();

    println!("taskboard_core version={}", taskboard_core::core_version());
    println!(
        "tasks all={} open={} done={}",
        counts.all, counts.open, counts.done
    );
    println!(
        "categories {}/{MAX_CATEGORIES}",
        categories.list_categories().len()
    );
    Ok(())
}
