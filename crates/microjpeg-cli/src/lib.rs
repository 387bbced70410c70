use microjpeg_client::InputSource;

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays pure JSON.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Whether a CLI input argument names a remote image rather than a local file.
pub fn is_remote_input(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Map a CLI input argument to an input source.
pub fn input_source(input: &str) -> InputSource<'static> {
    if is_remote_input(input) {
        InputSource::url(input)
    } else {
        InputSource::file(input)
    }
}
