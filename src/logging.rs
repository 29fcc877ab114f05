use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::AppError;

/// 初始化文件日志（终端由 TUI 占用，不能写 stderr）
///
/// `RUST_LOG` 存在时优先于配置中的级别。
pub fn init_logging(log_path: &Path, level: &str) -> Result<(), AppError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("shoplist={level}")))
        .map_err(|e| AppError::Logging {
            message: e.to_string(),
        })?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(filter)
        .try_init()
        .map_err(|e| AppError::Logging {
            message: e.to_string(),
        })
}
