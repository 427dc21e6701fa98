use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

use crate::config::Config;
use crate::error::AppError;

/// 初始化日志，`RUST_LOG` 优先于配置文件中的 level
pub fn init_logging(config: &Config) -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.logging.level)));

    let formatting_layer = match config.logging.format.as_str() {
        "json" => fmt::layer().json().boxed(),
        _ => fmt::layer().pretty().boxed(),
    };

    registry()
        .with(env_filter)
        .with(formatting_layer)
        .try_init()
        .map_err(|e| AppError::Internal(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}

/// 配置里只写了级别（如 `debug`）时，只对本项目和请求日志生效，
/// 其余依赖保持 `warn`；写了完整的过滤指令则原样使用
fn default_directives(level: &str) -> String {
    let level = level.trim();
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }

    format!("warn,teklif_api={level},pricing={level},tower_http={level}")
}
