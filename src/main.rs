use interp_plots::config::Args;
use interp_plots::report::correlation_table;
use interp_plots::{run, Config, RenderError};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber; `--verbose` forces debug output
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), RenderError> {
    let args: Args = argh::from_env();
    init_tracing(args.verbose);

    let config = Config::from(&args);
    debug!(?config, "starting render");

    let report = run(&config)?;

    if args.summary {
        println!(
            "{}\n",
            correlation_table(&report.correlations, Some("Projection/stylometry correlations"))
        );
    }

    print!("{}", report);
    Ok(())
}
