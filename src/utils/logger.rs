use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 設定為 1 時改用 JSON 格式輸出（排程器收集日誌用）
pub const JSON_LOG_ENV: &str = "GOLD_SYNC_LOG_JSON";

fn build_filter(verbose: bool) -> EnvFilter {
    let default = if verbose {
        "gold_sync=debug,info"
    } else {
        "gold_sync=info"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

pub fn init_cli_logger(verbose: bool) {
    if std::env::var(JSON_LOG_ENV).map(|v| v == "1").unwrap_or(false) {
        init_json_logger(verbose);
        return;
    }

    tracing_subscriber::registry()
        .with(build_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(build_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}
