use std::net::IpAddr;
use log::trace;
use serde::{Serialize, Deserialize};
use url::Url;
use crate::{Client, Error};

#[derive(Clone, Default, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GeoInfo {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city:    String,
    #[serde(default)]
    pub query:   String,
}

impl GeoInfo {
    pub fn location(&self) -> String {
        format!("{}, {}", self.country, self.city)
    }
}

impl Client {
    pub async fn locate(&self, ip: IpAddr) -> Result<GeoInfo, Error> {
        let url = Url::parse(&format!("{}{}", self.urls.json, ip))?;
        trace!("locating {} via {}", ip, url);
        self.get::<GeoInfo>(url).await
    }
}
