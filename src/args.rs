use anyhow::{Result, anyhow};
use clap::ArgMatches;
use log::LevelFilter;
use log::LevelFilter::*;
use crate::capture::Select;
use crate::packet::Family;

/// Address family flags of the `start` command: exactly one must be set.
pub fn select(ipv4: bool, ipv6: bool) -> Result<Select> {
    match (ipv4, ipv6) {
        (true,  false) => Ok(Select::Only(Family::V4)),
        (false, true ) => Ok(Select::Only(Family::V6)),
        (true,  true ) => Err(anyhow!("--ipv4 and --ipv6 are mutually exclusive")),
        (false, false) => Err(anyhow!("exactly one of --ipv4 or --ipv6 must be set")),
    }
}

/// Log filter for the crate's own module given the number of `-v` flags;
/// `None` as the module applies the level to every module.
pub fn verbosity(count: u64, default: LevelFilter) -> (Option<&'static str>, LevelFilter) {
    let module = Some(env!("CARGO_CRATE_NAME"));
    match count {
        0 => (module, default),
        1 => (module, Debug),
        2 => (module, Trace),
        _ => (None,   Trace),
    }
}

/// Occurrences of a flag given either before or after the subcommand.
pub fn occurrences(args: &ArgMatches, name: &str) -> u64 {
    let sub = args.subcommand().1.map(|sub| sub.occurrences_of(name)).unwrap_or(0);
    args.occurrences_of(name).max(sub)
}

pub fn value<'a>(args: &'a ArgMatches, name: &str) -> Option<&'a str> {
    args.subcommand().1.and_then(|sub| sub.value_of(name)).or_else(|| args.value_of(name))
}
