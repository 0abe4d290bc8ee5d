use std::collections::HashMap;
use std::net::IpAddr;
use log::trace;
use geo_api::GeoInfo;

pub const CAPACITY: usize = 65_536;

/// Geolocation results by address. Holds at most `capacity` entries and
/// evicts the least recently used one to make room.
pub struct Cache {
    map:      HashMap<IpAddr, Entry>,
    capacity: usize,
    tick:     u64,
}

struct Entry {
    info: GeoInfo,
    used: u64,
}

impl Cache {
    pub fn new() -> Self {
        Self::with_capacity(CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map:      HashMap::new(),
            capacity: capacity.max(1),
            tick:     0,
        }
    }

    pub fn get(&mut self, ip: &IpAddr) -> Option<&GeoInfo> {
        self.tick += 1;
        let tick = self.tick;
        self.map.get_mut(ip).map(|entry| {
            entry.used = tick;
            &entry.info
        })
    }

    pub fn insert(&mut self, ip: IpAddr, info: GeoInfo) {
        if !self.map.contains_key(&ip) && self.map.len() >= self.capacity {
            self.evict();
        }

        self.tick += 1;
        self.map.insert(ip, Entry {
            info: info,
            used: self.tick,
        });
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.map.contains_key(ip)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn evict(&mut self) {
        let oldest = self.map.iter().min_by_key(|(_, e)| e.used).map(|(ip, _)| *ip);
        if let Some(ip) = oldest {
            trace!("evicting {} from geo cache", ip);
            self.map.remove(&ip);
        }
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}
