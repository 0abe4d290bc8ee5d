use std::net::IpAddr;
use anyhow::Result;

pub use geo_api::GeoInfo;

pub use cache::Cache;
pub use dns::Dns;
pub use geo::Geo;
pub use resolver::{Resolver, UNKNOWN};

mod cache;
mod dns;
mod geo;
mod resolver;


/// Reverse DNS.
pub trait Names {
    fn lookup(&self, ip: IpAddr) -> Result<Option<String>>;
}

/// IP geolocation.
pub trait Locate {
    fn locate(&self, ip: IpAddr) -> Result<GeoInfo>;
}
