use std::fmt;
use std::net::IpAddr;
use crate::packet::Family;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Event {
    pub family:   Family,
    pub src:      IpAddr,
    pub dst:      IpAddr,
    pub protocol: Protocol,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Protocol {
    ICMP,
    TCP,
    UDP,
    Layer(&'static str),
}

impl Protocol {
    pub fn label(&self) -> &'static str {
        match self {
            Protocol::ICMP     => "ICMP",
            Protocol::TCP      => "TCP",
            Protocol::UDP      => "UDP",
            Protocol::Layer(n) => *n,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}
