use std::fmt;
use std::net::IpAddr;
use pnet::packet::icmp::IcmpPacket;
use pnet::packet::icmpv6::Icmpv6Packet;
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::ipv6::Ipv6Packet;
use pnet::packet::tcp::TcpPacket;
use pnet::packet::udp::UdpPacket;

pub use decode::decode;

mod decode;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Family {
    V4,
    V6,
}

/// Link-layer framing of captured data, from the pcap datalink type.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Link {
    Ethernet,
    Raw,
    Null,
    Loop,
    Sll,
    Other(i32),
}

/// A decoded network layer. The upper layer is absent for IPv4 fragments,
/// which carry no decodable ICMP or transport header.
pub enum Packet<'a> {
    IPv4(Ipv4Packet<'a>, Option<Upper<'a>>),
    IPv6(Ipv6Packet<'a>, Option<Upper<'a>>),
    Other(u16),
}

/// Protocol and bytes following the network header.
#[derive(Copy, Clone, Debug)]
pub struct Upper<'a> {
    pub protocol: IpNextHeaderProtocol,
    pub payload:  &'a [u8],
}

pub struct Icmp {
    pub family: Family,
    pub kind:   u8,
}

pub enum Transport<'a> {
    TCP(TcpPacket<'a>),
    UDP(UdpPacket<'a>),
    SCTP,
    UDPLite,
}

impl Family {
    pub fn name(&self) -> &'static str {
        match self {
            Family::V4 => "IPv4",
            Family::V6 => "IPv6",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<i32> for Link {
    fn from(dlt: i32) -> Self {
        match dlt {
            0               => Link::Null,
            1               => Link::Ethernet,
            12 | 14 | 101   => Link::Raw,
            228 | 229       => Link::Raw,
            108             => Link::Loop,
            113             => Link::Sll,
            n               => Link::Other(n),
        }
    }
}

impl From<pcap::Linktype> for Link {
    fn from(lt: pcap::Linktype) -> Self {
        Link::from(lt.0)
    }
}

impl<'a> Packet<'a> {
    pub fn family(&self) -> Option<Family> {
        match self {
            Packet::IPv4(..) => Some(Family::V4),
            Packet::IPv6(..) => Some(Family::V6),
            Packet::Other(_) => None,
        }
    }

    pub fn src(&self) -> Option<IpAddr> {
        match self {
            Packet::IPv4(p, _) => Some(p.get_source().into()),
            Packet::IPv6(p, _) => Some(p.get_source().into()),
            Packet::Other(_)   => None,
        }
    }

    pub fn dst(&self) -> Option<IpAddr> {
        match self {
            Packet::IPv4(p, _) => Some(p.get_destination().into()),
            Packet::IPv6(p, _) => Some(p.get_destination().into()),
            Packet::Other(_)   => None,
        }
    }

    pub fn upper(&self) -> Option<Upper<'a>> {
        match self {
            Packet::IPv4(_, u) => *u,
            Packet::IPv6(_, u) => *u,
            Packet::Other(_)   => None,
        }
    }

    /// ICMP layer matching this packet's family: ICMPv4 inside IPv4,
    /// ICMPv6 inside IPv6.
    pub fn icmp(&self) -> Option<Icmp> {
        let Upper { protocol, payload } = self.upper()?;
        match (self.family()?, protocol) {
            (Family::V4, IpNextHeaderProtocols::Icmp) => {
                let kind = IcmpPacket::new(payload)?.get_icmp_type().0;
                Some(Icmp { family: Family::V4, kind })
            },
            (Family::V6, IpNextHeaderProtocols::Icmpv6) => {
                let kind = Icmpv6Packet::new(payload)?.get_icmpv6_type().0;
                Some(Icmp { family: Family::V6, kind })
            },
            _ => None,
        }
    }

    pub fn transport(&self) -> Option<Transport<'a>> {
        self.upper().and_then(Transport::new)
    }
}

impl<'a> Transport<'a> {
    pub fn new(upper: Upper<'a>) -> Option<Self> {
        let Upper { protocol, payload } = upper;
        match protocol {
            IpNextHeaderProtocols::Tcp                            => tcp(payload).map(Transport::TCP),
            IpNextHeaderProtocols::Udp                            => UdpPacket::new(payload).map(Transport::UDP),
            IpNextHeaderProtocols::Sctp    if payload.len() >= 12 => Some(Transport::SCTP),
            IpNextHeaderProtocols::UdpLite if payload.len() >= 8  => Some(Transport::UDPLite),
            _                                                     => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Transport::TCP(_)  => "TCP",
            Transport::UDP(_)  => "UDP",
            Transport::SCTP    => "SCTP",
            Transport::UDPLite => "UDPLite",
        }
    }
}

fn tcp(payload: &[u8]) -> Option<TcpPacket> {
    let pkt = TcpPacket::new(payload)?;
    let len = pkt.get_data_offset() as usize * 4;
    match len {
        20 ..= 60 if len <= payload.len() => Some(pkt),
        _                                 => None,
    }
}
