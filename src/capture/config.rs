use std::net::IpAddr;
use crate::packet::Family;

pub const SNAPLEN: u64 = 1600;

#[derive(Debug)]
pub struct Config {
    pub device:  String,
    pub select:  Select,
    pub source:  Option<String>,
    pub snaplen: u64,
    pub promisc: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Select {
    Only(Family),
    All,
}

impl Config {
    pub fn new(device: &str, select: Select, source: Option<String>) -> Self {
        Self {
            device:  device.to_owned(),
            select:  select,
            source:  source,
            snaplen: SNAPLEN,
            promisc: true,
        }
    }

    pub fn source(&self, addr: &IpAddr) -> bool {
        match self.source.as_deref() {
            Some(ip) if !ip.is_empty() => addr.to_string() == ip,
            _                          => true,
        }
    }
}

impl Select {
    pub fn accepts(&self, family: Family) -> bool {
        match self {
            Select::Only(f) => *f == family,
            Select::All     => true,
        }
    }
}
