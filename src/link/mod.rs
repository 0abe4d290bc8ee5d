use std::collections::HashMap;
use std::net::IpAddr;
use anyhow::{Result, anyhow};
use log::debug;
use pcap::Device;
use pnet::datalink;

/// Local addresses bound to the named interface.
pub fn addrs(name: &str) -> Result<Vec<IpAddr>> {
    let link = datalink::interfaces().into_iter().find(|link| {
        link.name == name
    }).ok_or_else(|| anyhow!("no interface named {}", name))?;

    Ok(link.ips.iter().map(|net| net.ip()).collect())
}

/// First capture device, in pcap order, with an address bound to it.
pub fn active() -> Result<Option<String>> {
    let addrs = datalink::interfaces().into_iter().map(|link| {
        let ips = link.ips.iter().map(|net| net.ip()).collect::<Vec<_>>();
        (link.name, ips)
    }).collect::<HashMap<_, _>>();

    let devices = Device::list()?.into_iter().map(|d| d.name).collect::<Vec<_>>();
    debug!("capture devices: {:?}", devices);

    Ok(first(&devices, &addrs))
}

fn first(devices: &[String], addrs: &HashMap<String, Vec<IpAddr>>) -> Option<String> {
    devices.iter().find(|dev| {
        addrs.get(*dev).map_or(false, |ips| !ips.is_empty())
    }).cloned()
}
