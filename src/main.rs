use std::io;
use std::process;

use snore::cli::{Invocation, parse_invocation, version_line};
use snore::{count_up, countdown};
use tracing::{Level, debug, error};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(Level::WARN)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let target = match parse_invocation(&args) {
        Ok(Invocation::Version) => {
            eprintln!("{}", version_line());
            process::exit(1);
        }
        Ok(Invocation::Run { target }) => target,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };
    debug!(target_secs = target, "parsed target duration");

    let mut stdout = io::stdout().lock();
    let result = if target == 0.0 {
        count_up(&mut stdout).map(|never| match never {})
    } else {
        countdown(&mut stdout, target).map(|_| ())
    };

    if let Err(err) = result {
        error!(%err, "failed to draw progress line");
        process::exit(1);
    }
}
