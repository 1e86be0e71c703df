use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("snapferry_lib=debug,info")),
        )
        .init();

    let host = std::env::var("SNAPFERRY_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("SNAPFERRY_PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(17450);

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
    rt.block_on(async move {
        if let Err(e) = snapferry_lib::server::start_server(&host, port).await {
            eprintln!("server error: {}", e);
            std::process::exit(1);
        }
    });
}
