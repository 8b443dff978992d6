use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use sail_cli::args::CliArgs;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let filter = match args.tc_debug {
        0 => "warn",
        1 => "sail_checker=debug,warn",
        _ => "sail_checker=trace,sail_solver=trace,warn",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(tracing_tree::HierarchicalLayer::new(2))
        .init();

    let code = sail_cli::driver::run(&args)?;
    std::process::exit(code);
}
