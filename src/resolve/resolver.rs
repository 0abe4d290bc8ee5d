use std::net::IpAddr;
use log::debug;
use geo_api::GeoInfo;
use super::{Cache, Locate, Names};

pub const UNKNOWN: &str = "-";

/// Host names and locations for addresses seen by the capture loop.
///
/// Locations are cached per address; failed lookups are not, so the next
/// request for the same address tries again. Host names are looked up on
/// every call.
pub struct Resolver<N, G> {
    pub(super) names: N,
    pub(super) geo:   G,
    cache:            Cache,
}

impl<N: Names, G: Locate> Resolver<N, G> {
    pub fn new(names: N, geo: G) -> Self {
        Self::with_cache(names, geo, Cache::new())
    }

    pub fn with_cache(names: N, geo: G, cache: Cache) -> Self {
        Self { names, geo, cache }
    }

    pub fn resolve(&mut self, ip: IpAddr) -> (String, GeoInfo) {
        (self.host(ip), self.locate(ip))
    }

    pub fn host(&self, ip: IpAddr) -> String {
        let name = match self.names.lookup(ip) {
            Ok(name) => name,
            Err(e)   => {
                debug!("reverse lookup of {} failed: {}", ip, e);
                None
            },
        };

        match name.as_deref().map(|n| n.trim_end_matches('.')) {
            Some(name) if !name.is_empty() => name.to_owned(),
            _                              => UNKNOWN.to_owned(),
        }
    }

    pub fn locate(&mut self, ip: IpAddr) -> GeoInfo {
        if let Some(info) = self.cache.get(&ip) {
            return info.clone();
        }

        match self.geo.locate(ip) {
            Ok(info) => {
                self.cache.insert(ip, info.clone());
                info
            },
            Err(e) => {
                debug!("geo lookup of {} failed: {}", ip, e);
                GeoInfo::default()
            },
        }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }
}
