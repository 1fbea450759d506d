mod app;
mod command;
mod context;

use std::io::{BufRead, Write};

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{reload, Layer};

use app::Args;
use browse_core::BrowseConfig;
use context::CoreContext;

#[tokio::main]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    };

    let config = match &args.config {
        Some(path) => BrowseConfig::load_or_default(path),
        None => BrowseConfig::default(),
    };

    let reload_handle = init_tracing(&config.log_level);

    let ctx = CoreContext::new(config.worker_threads, Some(reload_handle), &config.log_level);

    if let Err(err) = ctx.open(&args.root, config.pages, config.shift, config.rtl) {
        // `anyhow` only at the CLI's outermost edge (SPEC_FULL §7 / DESIGN.md):
        // the `ErrorKind` stays a `thiserror` tagged enum all the way up to
        // here, and is only wrapped for its `{:?}` chain-printing at exit.
        let err = anyhow::Error::new(err).context(format!("failed to open {:?}", args.root));
        eprintln!("error: {err:?}");
        std::process::exit(2);
    }

    run_command_loop(&ctx);

    // Drain any in-flight extract/decode/SR tasks before the process exits,
    // rather than leaving them to be dropped mid-flight (§5 `wait_for_all`).
    ctx.worker_pool.wait_for_all(Some(5_000)).await;
}

/// Sets up a `tracing-subscriber` pipeline whose level can be changed at
/// runtime (the `D` command), mirroring the teacher's `FmtSubscriber`
/// construction in `cli/src/command/rpc.rs` but with a reloadable filter.
fn init_tracing(initial_level: &str) -> reload::Handle<LevelFilter, tracing_subscriber::Registry> {
    let initial_filter = initial_level.parse().unwrap_or(LevelFilter::INFO);
    let (filter, reload_handle) = reload::Layer::new(initial_filter);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    tracing_subscriber::registry().with(fmt_layer).init();

    reload_handle
}

fn run_command_loop(ctx: &CoreContext) {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        if let command::Flow::Quit = command::dispatch(&line, ctx) {
            break;
        }
        let _ = stdout.flush();
    }
}
