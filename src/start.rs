use std::io;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use anyhow::{Result, anyhow};
use clap::ArgMatches;
use crossbeam_channel::bounded;
use log::{debug, info, warn};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag::register;
use crate::args;
use crate::capture::{self, Config, Sniffer};
use crate::config::File;
use crate::display::Table;
use crate::link;
use crate::packet::Family;
use crate::resolve::{Dns, Geo, Resolver};

pub fn start(args: &ArgMatches, file: &File) -> Result<()> {
    let select = args::select(args.is_present("ipv4"), args.is_present("ipv6"))?;
    let source = args.value_of("srcip").map(str::to_owned);
    let geo    = args.value_of("geo-host");

    if !args.is_present("monitor") {
        info!("monitoring not enabled, use --monitor to start packet sniffing");
        return Ok(());
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    register(SIGTERM, shutdown.clone())?;
    register(SIGINT,  shutdown.clone())?;

    let (tx, rx) = bounded(1_000);

    let cfg = match args.value_of("read") {
        Some(path) => {
            let cfg = Config::new(path, select, source);
            let cap = capture::offline(path)?;
            capture::spawn(path, cap, tx)?;
            cfg
        },
        None => {
            let device = match args.value_of("interface") {
                Some(name) => name.to_owned(),
                None       => link::active()?.ok_or_else(|| {
                    anyhow!("no active network interfaces found")
                })?,
            };

            info!("using device {}", device);

            let cfg = Config::new(&device, select, source);
            let cap = capture::open(&cfg)?;

            match link::addrs(&device) {
                Ok(addrs) => debug!("{} addresses: {:?}", device, addrs),
                Err(e)    => warn!("could not get local addresses for {}: {}", device, e),
            }

            capture::spawn(&device, cap, tx)?;
            cfg
        },
    };

    let resolver = Resolver::new(Dns::new()?, Geo::new(geo)?);
    let table    = Table::new(io::stdout()).titles(
        file.prefix(Family::V4),
        file.prefix(Family::V6),
    );

    let mut sniffer = Sniffer::new(cfg, resolver, table);
    sniffer.run(rx, &shutdown)
}
