use std::net::IpAddr;
use anyhow::Result;
use log::warn;
use trust_dns_resolver::Resolver;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use super::Names;

pub struct Dns {
    resolver: Resolver,
}

impl Dns {
    pub fn new() -> Result<Self> {
        let resolver = match Resolver::from_system_conf() {
            Ok(resolver) => resolver,
            Err(e)       => {
                warn!("system resolver unavailable, using public DNS: {}", e);
                Resolver::new(ResolverConfig::google(), ResolverOpts::default())?
            },
        };
        Ok(Self { resolver })
    }
}

impl Names for Dns {
    fn lookup(&self, ip: IpAddr) -> Result<Option<String>> {
        let names = self.resolver.reverse_lookup(ip)?;
        Ok(names.iter().next().map(|name| name.to_string()))
    }
}
