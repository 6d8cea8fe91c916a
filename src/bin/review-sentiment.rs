use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = review_sentiment::run(std::env::args_os()) {
        eprintln!("处理Excel文件时出错: {err:#}");
        std::process::exit(1);
    }
}
