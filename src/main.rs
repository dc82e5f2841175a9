use std::env;
use std::process::ExitCode;

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("serve") => {
            let port = args
                .next()
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT);
            if let Err(e) = runway::api::run_http_server(port).await {
                eprintln!("server error: {e}");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("usage: runway serve [port]");
            eprintln!("  serve   start the explorer API (default port {DEFAULT_PORT})");
            ExitCode::FAILURE
        }
    }
}
