//! LedgerFlow entry point.
//!
//! One binary, two roles:
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌───────────┐    ┌──────────┐
//! │  Client  │───▶│ Gateway  │───▶│  RabbitMQ │───▶│ Consumer │
//! │  (HTTP)  │    │ (intake) │    │ (durable) │    │ (ledger) │
//! └──────────┘    └──────────┘    └───────────┘    └──────────┘
//! ```
//!
//! `--gateway` (the default) runs the HTTP intake; `--consumer` runs the
//! settlement side. Run one of each against the same broker and database.

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

fn use_consumer_mode() -> bool {
    std::env::args().any(|a| a == "--consumer")
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = ledgerflow::config::AppConfig::load(&env);
    let _log_guard = ledgerflow::logging::init_logging(&app_config);

    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }

    let rt = tokio::runtime::Runtime::new()?;

    if use_consumer_mode() {
        tracing::info!("Starting LedgerFlow consumer in {} mode", env);
        rt.block_on(ledgerflow::processor::run_consumer(&app_config))
    } else {
        tracing::info!("Starting LedgerFlow gateway in {} mode", env);
        rt.block_on(ledgerflow::gateway::run_gateway(&app_config))
    }
}
