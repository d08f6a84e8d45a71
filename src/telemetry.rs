//! 日志与追踪系统
//! 初始化结构化日志

use crate::config::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 初始化日志与追踪系统
///
/// `RUST_LOG` 优先于配置中的日志级别。
pub fn init_telemetry(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let log_layer = match config.format.to_lowercase().as_str() {
        // 生产环境
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
            .boxed(),
        // 开发环境：pretty（配置校验只允许 json 与 pretty）
        _ => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(false)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(log_layer)
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        level = %config.level,
        format = %config.format,
        "Telemetry initialized"
    );
}
