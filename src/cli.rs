use crate::{Error, parse_args};

pub const VERSION_FLAGS: [&str; 2] = ["-v", "--version"];

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Version,
    /// Wait for `target` seconds; zero counts up without end.
    Run { target: f64 },
}

pub fn parse_invocation(args: &[String]) -> Result<Invocation, Error> {
    if let [flag] = args
        && VERSION_FLAGS.contains(&flag.as_str())
    {
        return Ok(Invocation::Version);
    }
    parse_args(args).map(|target| Invocation::Run { target })
}

pub fn version_line() -> String {
    format!("{}-{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
