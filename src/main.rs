mod errors;
mod job;
mod line;
mod shell;
mod sources;

use errors::ShellError;
use shell::config::LOG_ENV;
use shell::Shell;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let mut smsh = match Shell::new() {
        Ok(smsh) => smsh,
        Err(e) => {
            eprintln!("smallsh: {}", e);
            std::process::exit(1);
        }
    };

    while let Err(e) = smsh.run() {
        if let Some(fatal) = e.downcast_ref::<ShellError>() {
            eprintln!("{}", fatal);
            std::process::exit(fatal.exit_code());
        }

        eprintln!("smallsh: {}", e);

        smsh.backtrace();
    }

    std::process::exit(0);
}

// Silent unless SMALLSH_LOG is set, e.g. `SMALLSH_LOG=debug`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
