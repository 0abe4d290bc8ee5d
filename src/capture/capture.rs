use std::path::Path;
use anyhow::{Context, Result};
use log::debug;
use pcap::{Capture, Active, Offline};
use crate::capture::Config;

pub fn open(cfg: &Config) -> Result<Capture<Active>> {
    let cap = Capture::from_device(cfg.device.as_str())
        .and_then(|cap| {
            cap.snaplen(cfg.snaplen as i32)
                .promisc(cfg.promisc)
                .open()
        })
        .with_context(|| format!("error opening device {}", cfg.device))?;

    debug!("device {} datalink {:?}", cfg.device, cap.get_datalink());

    Ok(cap)
}

pub fn offline<P: AsRef<Path>>(path: P) -> Result<Capture<Offline>> {
    let path = path.as_ref();
    Capture::from_file(path).with_context(|| {
        format!("error opening capture file {}", path.display())
    })
}
