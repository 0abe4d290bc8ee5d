use std::cmp::min;
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::{Ipv4Flags, Ipv4Packet};
use pnet::packet::ipv6::Ipv6Packet;
use pnet::packet::vlan::VlanPacket;
use pnet::packet::ethernet::{EthernetPacket, EtherType, EtherTypes};
use super::{Link, Packet, Upper};

const SLL_HEADER: usize = 16;
const NULL_HEADER: usize = 4;

pub fn decode(link: Link, data: &[u8]) -> Option<Packet> {
    match link {
        Link::Ethernet    => ethernet(data),
        Link::Raw         => ip(data),
        Link::Null        => ip(data.get(NULL_HEADER..)?),
        Link::Loop        => ip(data.get(NULL_HEADER..)?),
        Link::Sll         => sll(data),
        Link::Other(_)    => None,
    }
}

fn ethernet(data: &[u8]) -> Option<Packet> {
    let eth = EthernetPacket::new(data)?;

    let mut ethertype = eth.get_ethertype();
    let mut payload   = &data[EthernetPacket::minimum_packet_size()..];

    while ethertype == EtherTypes::Vlan {
        let pkt = VlanPacket::new(payload)?;
        ethertype = pkt.get_ethertype();
        payload   = &payload[VlanPacket::minimum_packet_size()..];
    }

    network(ethertype, payload)
}

fn sll(data: &[u8]) -> Option<Packet> {
    let header = data.get(..SLL_HEADER)?;
    let proto  = u16::from_be_bytes([header[14], header[15]]);
    network(EtherType(proto), &data[SLL_HEADER..])
}

fn network(ethertype: EtherType, payload: &[u8]) -> Option<Packet> {
    match ethertype {
        EtherTypes::Ipv4 => ipv4(payload),
        EtherTypes::Ipv6 => ipv6(payload),
        _                => Some(Packet::Other(ethertype.0)),
    }
}

fn ip(data: &[u8]) -> Option<Packet> {
    match data.first()? >> 4 {
        4 => ipv4(data),
        6 => ipv6(data),
        _ => None,
    }
}

fn ipv4(data: &[u8]) -> Option<Packet> {
    let pkt = Ipv4Packet::new(data)?;
    let hdr = pkt.get_header_length() as usize * 4;

    if pkt.get_version() != 4 || hdr < Ipv4Packet::minimum_packet_size() || hdr > data.len() {
        return None;
    }

    let end = match pkt.get_total_length() as usize {
        0                => data.len(),
        len if len < hdr => return None,
        len              => min(len, data.len()),
    };

    let payload = &data[hdr..end];
    let upper   = match pkt.get_next_level_protocol() {
        _ if fragment(&pkt)         => None,
        IpNextHeaderProtocols::Ipv4 => tunnel(payload),
        protocol                    => Some(Upper { protocol, payload }),
    };

    Some(Packet::IPv4(pkt, upper))
}

/// MF set or a non-zero offset.
fn fragment(pkt: &Ipv4Packet) -> bool {
    pkt.get_flags() & Ipv4Flags::MoreFragments != 0 || pkt.get_fragment_offset() != 0
}

/// Upper layer of an IPv4-in-IPv4 datagram. The outer header still names
/// the endpoints.
fn tunnel(payload: &[u8]) -> Option<Upper> {
    match ipv4(payload) {
        Some(Packet::IPv4(_, upper)) => upper,
        _                            => Some(Upper {
            protocol: IpNextHeaderProtocols::Ipv4,
            payload:  payload,
        }),
    }
}

fn ipv6(data: &[u8]) -> Option<Packet> {
    let pkt = Ipv6Packet::new(data)?;

    if pkt.get_version() != 6 {
        return None;
    }

    let start = Ipv6Packet::minimum_packet_size();
    let end   = match pkt.get_payload_length() as usize {
        0   => data.len(),
        len => min(start + len, data.len()),
    };

    let (protocol, payload) = extensions(pkt.get_next_header(), &data[start..end]);

    Some(Packet::IPv6(pkt, Some(Upper { protocol, payload })))
}

fn extensions(mut next: IpNextHeaderProtocol, mut rest: &[u8]) -> (IpNextHeaderProtocol, &[u8]) {
    let ext = [
        IpNextHeaderProtocols::Hopopt,
        IpNextHeaderProtocols::Ipv6Route,
        IpNextHeaderProtocols::Ipv6Opts,
    ];

    while ext.contains(&next) {
        let len = match rest.get(1) {
            Some(&n) => (n as usize + 1) * 8,
            None     => return (next, &[]),
        };

        if len > rest.len() {
            return (next, &[]);
        }

        next = IpNextHeaderProtocol(rest[0]);
        rest = &rest[len..];
    }

    (next, rest)
}
