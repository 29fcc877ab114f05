mod config;
mod error;
mod logging;
mod models;
mod projection;
mod storage;
mod store;
mod ui;

use std::fs;
use std::io;
use std::path::PathBuf;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use crate::config::Config;
use crate::error::AppError;
use crate::logging::init_logging;
use crate::storage::{FileStore, KeyValueStore};
use crate::store::{ClockIds, IdSource, ListStore};
use crate::ui::{App, render};

/// 获取数据目录路径 (默认 ~/.local/share/shoplist/)
fn get_data_dir(config: &Config) -> Result<PathBuf, AppError> {
    let data_dir = config.resolve_data_dir().ok_or(AppError::NoDataDir)?;
    fs::create_dir_all(&data_dir)?;
    Ok(data_dir)
}

fn main() -> Result<(), AppError> {
    let config = match Config::default_path() {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let data_dir = get_data_dir(&config)?;
    init_logging(&data_dir.join("shoplist.log"), &config.log_level)?;
    tracing::info!(data_dir = %data_dir.display(), key = %config.storage_key, "starting");

    // 加载清单
    let store = ListStore::open(
        FileStore::new(&data_dir),
        ClockIds::default(),
        config.storage_key.clone(),
    );
    let mut app = App::new(store, config.default_category);

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 主循环
    let result = run_app(&mut terminal, &mut app);

    // 恢复终端
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "terminal loop failed");
    }
    tracing::info!(items = app.store.items().len(), "exiting");
    result.map_err(AppError::from)
}

fn run_app<S: KeyValueStore, G: IdSource>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<S, G>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && ui::handle_key_event(app, key.code) {
                break;
            }
        }
    }
    Ok(())
}
