use env_logger::Env;

/// `RUST_LOG` wins when set; otherwise everything at `info` and above is logged.
pub(super) fn init_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}
