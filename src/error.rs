use std::io;

use crate::config::ConfigError;

/// 启动与运行期间的顶层错误
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("无法获取用户数据目录")]
    NoDataDir,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("日志初始化失败: {message}")]
    Logging { message: String },

    #[error("终端 IO 错误: {0}")]
    Io(#[from] io::Error),
}
