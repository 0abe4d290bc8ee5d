use std::net::IpAddr;
use anyhow::Result;
use tokio::runtime::Runtime;
use geo_api::{Client, GeoInfo};
use super::Locate;

/// Blocking adapter over the async geo service client.
pub struct Geo {
    client: Client,
    rt:     Runtime,
}

impl Geo {
    pub fn new(host: Option<&str>) -> Result<Self> {
        Ok(Self {
            client: Client::new(host)?,
            rt:     Runtime::new()?,
        })
    }
}

impl Locate for Geo {
    fn locate(&self, ip: IpAddr) -> Result<GeoInfo> {
        Ok(self.rt.block_on(self.client.locate(ip))?)
    }
}
