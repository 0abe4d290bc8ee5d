use std::net::IpAddr;
use anyhow::Result;
use crate::capture::Protocol;
use crate::packet::Family;

pub use table::Table;

mod table;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Endpoint {
    pub name:     String,
    pub addr:     IpAddr,
    pub location: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Row {
    pub family:   Family,
    pub src:      Endpoint,
    pub dst:      Endpoint,
    pub protocol: Protocol,
}

/// Sink for the traffic table.
pub trait Present {
    fn header(&mut self, family: Family) -> Result<()>;
    fn row(&mut self, row: &Row) -> Result<()>;
}
