use portal_cli::{cli, run, verbosity};
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = cli().get_matches();

    let filter = match verbosity(&matches) {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(err) = run(&matches, &mut out) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
