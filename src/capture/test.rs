use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::{Duration, Instant};
use anyhow::{Result, anyhow};
use crossbeam_channel::bounded;
use pnet::packet::ethernet::{EtherType, EtherTypes, MutableEthernetPacket};
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::{Ipv4Flags, MutableIpv4Packet};
use pnet::packet::ipv6::MutableIpv6Packet;
use pnet::packet::tcp::MutableTcpPacket;
use pnet::packet::udp::MutableUdpPacket;
use crate::display::{Present, Row};
use crate::packet::{self, Family, Link};
use crate::resolve::{GeoInfo, Locate, Names, Resolver};
use super::{classify, Config, Event, Frame, Idle, Protocol, Select, Sniffer};
use super::idle::State as IdleState;
use super::sniff::State;

fn ipv4(src: &str, dst: &str, proto: IpNextHeaderProtocol, payload: &[u8]) -> Vec<u8> {
    let mut buf = vec![0u8; 20 + payload.len()];
    {
        let mut ip = MutableIpv4Packet::new(&mut buf).unwrap();
        ip.set_version(4);
        ip.set_header_length(5);
        ip.set_total_length(buf_len(20, payload));
        ip.set_ttl(64);
        ip.set_next_level_protocol(proto);
        ip.set_source(src.parse::<Ipv4Addr>().unwrap());
        ip.set_destination(dst.parse::<Ipv4Addr>().unwrap());
    }
    buf[20..].copy_from_slice(payload);
    buf
}

fn ipv6(src: &str, dst: &str, next: IpNextHeaderProtocol, payload: &[u8]) -> Vec<u8> {
    let mut buf = vec![0u8; 40 + payload.len()];
    {
        let mut ip = MutableIpv6Packet::new(&mut buf).unwrap();
        ip.set_version(6);
        ip.set_payload_length(payload.len() as u16);
        ip.set_next_header(next);
        ip.set_hop_limit(64);
        ip.set_source(src.parse::<Ipv6Addr>().unwrap());
        ip.set_destination(dst.parse::<Ipv6Addr>().unwrap());
    }
    buf[40..].copy_from_slice(payload);
    buf
}

fn buf_len(header: usize, payload: &[u8]) -> u16 {
    (header + payload.len()) as u16
}

fn tcp() -> Vec<u8> {
    let mut buf = vec![0u8; 20];
    {
        let mut tcp = MutableTcpPacket::new(&mut buf).unwrap();
        tcp.set_source(43210);
        tcp.set_destination(443);
        tcp.set_data_offset(5);
    }
    buf
}

fn udp() -> Vec<u8> {
    let mut buf = vec![0u8; 8];
    {
        let mut udp = MutableUdpPacket::new(&mut buf).unwrap();
        udp.set_source(5353);
        udp.set_destination(53);
        udp.set_length(8);
    }
    buf
}

fn ethernet(ethertype: EtherType, payload: &[u8]) -> Frame {
    let mut data = vec![0u8; 14 + payload.len()];
    MutableEthernetPacket::new(&mut data).unwrap().set_ethertype(ethertype);
    data[14..].copy_from_slice(payload);
    Frame { link: Link::Ethernet, data }
}

fn v4_tcp(src: &str, dst: &str) -> Frame {
    ethernet(EtherTypes::Ipv4, &ipv4(src, dst, IpNextHeaderProtocols::Tcp, &tcp()))
}

fn v6_udp(src: &str, dst: &str) -> Frame {
    ethernet(EtherTypes::Ipv6, &ipv6(src, dst, IpNextHeaderProtocols::Udp, &udp()))
}

fn config(select: Select, source: Option<&str>) -> Config {
    Config::new("eth0", select, source.map(str::to_owned))
}

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

const V4: Select = Select::Only(Family::V4);
const V6: Select = Select::Only(Family::V6);

#[test]
fn no_network_layer() {
    let arp = ethernet(EtherTypes::Arp, &[0u8; 28]);
    let short = Frame { link: Link::Ethernet, data: vec![0u8; 10] };
    let unknown = Frame { link: Link::Other(147), data: ipv4("10.0.0.1", "10.0.0.2", IpNextHeaderProtocols::Tcp, &tcp()) };

    for select in &[V4, V6, Select::All] {
        let cfg = config(*select, None);
        assert_eq!(None, classify(&arp, &cfg));
        assert_eq!(None, classify(&short, &cfg));
        assert_eq!(None, classify(&unknown, &cfg));
    }
}

#[test]
fn family_selection() {
    let v4 = v4_tcp("10.0.0.1", "10.0.0.2");
    let v6 = v6_udp("fe80::1", "ff02::fb");

    assert!(classify(&v4, &config(V4, None)).is_some());
    assert!(classify(&v6, &config(V4, None)).is_none());

    assert!(classify(&v6, &config(V6, None)).is_some());
    assert!(classify(&v4, &config(V6, None)).is_none());

    let all = config(Select::All, None);
    assert_eq!(Some(Family::V4), classify(&v4, &all).map(|e| e.family));
    assert_eq!(Some(Family::V6), classify(&v6, &all).map(|e| e.family));
}

#[test]
fn addresses_verbatim() {
    let event = classify(&v6_udp("2001:db8::1", "2001:db8:0:0:0:0:0:2"), &config(V6, None));
    assert_eq!(Some(Event {
        family:   Family::V6,
        src:      ip("2001:db8::1"),
        dst:      ip("2001:db8::2"),
        protocol: Protocol::UDP,
    }), event);

    let event = classify(&v4_tcp("192.168.1.20", "93.184.216.34"), &config(V4, None)).unwrap();
    assert_eq!("192.168.1.20", event.src.to_string());
    assert_eq!("93.184.216.34", event.dst.to_string());
}

#[test]
fn protocol_labels() {
    let cfg = config(Select::All, None);
    let label = |frame: Frame| classify(&frame, &cfg).map(|e| e.protocol);

    let echo   = [8u8, 0, 0, 0, 0, 1, 0, 1];
    let echo6  = [128u8, 0, 0, 0, 0, 1, 0, 1];
    let sctp   = [0u8; 12];

    assert_eq!(Some(Protocol::TCP), label(v4_tcp("10.0.0.1", "10.0.0.2")));
    assert_eq!(Some(Protocol::UDP), label(v6_udp("fe80::1", "fe80::2")));

    let icmp = ipv4("10.0.0.1", "10.0.0.2", IpNextHeaderProtocols::Icmp, &echo);
    assert_eq!(Some(Protocol::ICMP), label(ethernet(EtherTypes::Ipv4, &icmp)));

    let icmp6 = ipv6("fe80::1", "fe80::2", IpNextHeaderProtocols::Icmpv6, &echo6);
    assert_eq!(Some(Protocol::ICMP), label(ethernet(EtherTypes::Ipv6, &icmp6)));

    let sctp = ipv4("10.0.0.1", "10.0.0.2", IpNextHeaderProtocols::Sctp, &sctp);
    assert_eq!(Some(Protocol::Layer("SCTP")), label(ethernet(EtherTypes::Ipv4, &sctp)));

    let igmp = ipv4("10.0.0.1", "224.0.0.1", IpNextHeaderProtocols::Igmp, &[0x11, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(Some(Protocol::Layer("IPv4")), label(ethernet(EtherTypes::Ipv4, &igmp)));

    let none = ipv6("fe80::1", "fe80::2", IpNextHeaderProtocol(59), &[]);
    assert_eq!(Some(Protocol::Layer("IPv6")), label(ethernet(EtherTypes::Ipv6, &none)));

    let icmp4in6 = ipv6("fe80::1", "fe80::2", IpNextHeaderProtocols::Icmp, &echo);
    assert_eq!(Some(Protocol::Layer("IPv6")), label(ethernet(EtherTypes::Ipv6, &icmp4in6)));
}

#[test]
fn truncated_transport() {
    let cfg = config(V4, None);

    let short = ipv4("10.0.0.1", "10.0.0.2", IpNextHeaderProtocols::Tcp, &tcp()[..10]);
    let event = classify(&ethernet(EtherTypes::Ipv4, &short), &cfg).unwrap();
    assert_eq!(Protocol::Layer("IPv4"), event.protocol);

    let mut bad = tcp();
    bad[12] = 0x20;
    let bad = ipv4("10.0.0.1", "10.0.0.2", IpNextHeaderProtocols::Tcp, &bad);
    let event = classify(&ethernet(EtherTypes::Ipv4, &bad), &cfg).unwrap();
    assert_eq!(Protocol::Layer("IPv4"), event.protocol);
}

#[test]
fn icmp_precedes_transport() {
    let quoted = ipv4("10.0.0.2", "10.0.0.9", IpNextHeaderProtocols::Tcp, &tcp());
    let mut unreachable = vec![3u8, 3, 0, 0, 0, 0, 0, 0];
    unreachable.extend_from_slice(&quoted);

    let data  = ipv4("10.0.0.1", "10.0.0.2", IpNextHeaderProtocols::Icmp, &unreachable);
    let frame = ethernet(EtherTypes::Ipv4, &data);

    let pkt = packet::decode(frame.link, &frame.data).unwrap();
    assert_eq!(Some(3), pkt.icmp().map(|icmp| icmp.kind));

    let event = classify(&frame, &config(V4, None)).unwrap();
    assert_eq!(Protocol::ICMP, event.protocol);
    assert_eq!(ip("10.0.0.1"), event.src);
}

fn fragmented(mut data: Vec<u8>, flags: u8, offset: u16) -> Frame {
    {
        let mut ip = MutableIpv4Packet::new(&mut data).unwrap();
        ip.set_flags(flags);
        ip.set_fragment_offset(offset);
    }
    ethernet(EtherTypes::Ipv4, &data)
}

#[test]
fn fragments_unlabeled() {
    let cfg = config(V4, None);
    let label = |frame: Frame| classify(&frame, &cfg).map(|e| e.protocol);

    let echo = [8u8, 0, 0, 0, 0, 1, 0, 1];

    let first = ipv4("10.0.0.1", "10.0.0.2", IpNextHeaderProtocols::Udp, &udp());
    assert_eq!(Some(Protocol::Layer("IPv4")), label(fragmented(first, Ipv4Flags::MoreFragments, 0)));

    let later = ipv4("10.0.0.1", "10.0.0.2", IpNextHeaderProtocols::Tcp, &tcp());
    assert_eq!(Some(Protocol::Layer("IPv4")), label(fragmented(later.clone(), 0, 185)));
    assert_eq!(Some(Protocol::Layer("IPv4")), label(fragmented(later, Ipv4Flags::MoreFragments, 185)));

    let icmp = ipv4("10.0.0.1", "10.0.0.2", IpNextHeaderProtocols::Icmp, &echo);
    assert_eq!(Some(Protocol::Layer("IPv4")), label(fragmented(icmp, 0, 185)));

    let whole = ipv4("10.0.0.1", "10.0.0.2", IpNextHeaderProtocols::Tcp, &tcp());
    assert_eq!(Some(Protocol::TCP), label(fragmented(whole, Ipv4Flags::DontFragment, 0)));

    let event = classify(&fragmented(ipv4("10.0.0.1", "10.0.0.2", IpNextHeaderProtocols::Tcp, &tcp()), 0, 185), &cfg).unwrap();
    assert_eq!(ip("10.0.0.1"), event.src);
    assert_eq!(ip("10.0.0.2"), event.dst);
}

#[test]
fn source_filter() {
    let a = v4_tcp("10.0.0.1", "10.0.0.2");
    let b = v4_tcp("10.0.0.3", "10.0.0.2");

    let cfg = config(V4, Some("10.0.0.1"));
    assert!(classify(&a, &cfg).is_some());
    assert!(classify(&b, &cfg).is_none());

    let cfg = config(V4, Some("10.0.0.01"));
    assert!(classify(&a, &cfg).is_none());

    let cfg = config(V4, Some(""));
    assert!(classify(&a, &cfg).is_some());
    assert!(classify(&b, &cfg).is_some());

    let cfg = config(V4, None);
    assert!(classify(&b, &cfg).is_some());

    let cfg = config(V4, Some("10.0.0.2"));
    assert!(classify(&a, &cfg).is_none());
}

#[test]
fn link_types() {
    let cfg = config(Select::All, None);
    let data = ipv4("10.1.1.1", "10.1.1.2", IpNextHeaderProtocols::Udp, &udp());

    let raw = Frame { link: Link::from(101), data: data.clone() };
    assert_eq!(Some(Protocol::UDP), classify(&raw, &cfg).map(|e| e.protocol));

    let mut sll = vec![0u8; 16];
    sll[14] = 0x08;
    sll.extend_from_slice(&data);
    let sll = Frame { link: Link::from(113), data: sll };
    assert_eq!(Some(ip("10.1.1.1")), classify(&sll, &cfg).map(|e| e.src));

    let mut null = vec![2u8, 0, 0, 0];
    null.extend_from_slice(&data);
    let null = Frame { link: Link::from(0), data: null };
    assert_eq!(Some(ip("10.1.1.2")), classify(&null, &cfg).map(|e| e.dst));

    let mut vlan = vec![0x00, 0x64, 0x08, 0x00];
    vlan.extend_from_slice(&data);
    let vlan = ethernet(EtherTypes::Vlan, &vlan);
    assert_eq!(Some(Protocol::UDP), classify(&vlan, &cfg).map(|e| e.protocol));
}

#[test]
fn ip_in_ip() {
    let inner = ipv4("172.16.0.1", "172.16.0.2", IpNextHeaderProtocols::Tcp, &tcp());
    let outer = ipv4("10.0.0.1", "10.0.0.2", IpNextHeaderProtocols::Ipv4, &inner);
    let frame = ethernet(EtherTypes::Ipv4, &outer);

    let event = classify(&frame, &config(V4, None)).unwrap();
    assert_eq!(ip("10.0.0.1"), event.src);
    assert_eq!(ip("10.0.0.2"), event.dst);
    assert_eq!(Protocol::TCP, event.protocol);

    assert!(classify(&frame, &config(V4, Some("10.0.0.1"))).is_some());
    assert!(classify(&frame, &config(V4, Some("172.16.0.1"))).is_none());

    let broken = ipv4("10.0.0.1", "10.0.0.2", IpNextHeaderProtocols::Ipv4, &[0x45, 0, 0]);
    let event  = classify(&ethernet(EtherTypes::Ipv4, &broken), &config(V4, None)).unwrap();
    assert_eq!(Protocol::Layer("IPv4"), event.protocol);
}

#[test]
fn ethernet_padding_ignored() {
    let mut data = ipv4("10.0.0.1", "10.0.0.2", IpNextHeaderProtocols::Tcp, &tcp());
    data.extend_from_slice(&[0u8; 6]);
    let event = classify(&ethernet(EtherTypes::Ipv4, &data), &config(V4, None)).unwrap();
    assert_eq!(Protocol::TCP, event.protocol);
}

#[test]
fn idle_warns_once_per_window() {
    let start = Instant::now();
    let at    = |ms: u64| start + Duration::from_millis(ms);

    let mut idle = Idle::new(Duration::from_secs(10), start);

    let mut fired = Vec::new();
    for tick in 1..=40 {
        let now = at(tick * 500);
        if idle.expired(now) {
            fired.push(tick * 500);
        }
    }

    assert_eq!(vec![10_000, 20_000], fired);
    assert_eq!(IdleState::Idle, idle.state());
}

#[test]
fn idle_reset_by_frames() {
    let start = Instant::now();
    let at    = |ms: u64| start + Duration::from_millis(ms);

    let mut idle = Idle::new(Duration::from_secs(10), start);

    assert!(!idle.expired(at(9_500)));
    idle.seen(at(9_500));
    assert!(!idle.expired(at(19_000)));
    assert_eq!(IdleState::Active, idle.state());
    assert!(idle.expired(at(19_500)));
    assert_eq!(IdleState::Idle, idle.state());

    idle.seen(at(20_000));
    assert_eq!(IdleState::Active, idle.state());
    assert!(!idle.expired(at(29_999)));
}

struct NoNames;

impl Names for NoNames {
    fn lookup(&self, _ip: IpAddr) -> Result<Option<String>> {
        Ok(None)
    }
}

struct Unreachable;

impl Locate for Unreachable {
    fn locate(&self, _ip: IpAddr) -> Result<GeoInfo> {
        Err(anyhow!("connection refused"))
    }
}

struct Everywhere;

impl Locate for Everywhere {
    fn locate(&self, ip: IpAddr) -> Result<GeoInfo> {
        Ok(GeoInfo {
            country: "Norway".to_owned(),
            city:    "Oslo".to_owned(),
            query:   ip.to_string(),
        })
    }
}

#[derive(Default)]
struct Recorder {
    headers: Vec<Family>,
    rows:    Vec<Row>,
}

impl Present for Recorder {
    fn header(&mut self, family: Family) -> Result<()> {
        self.headers.push(family);
        Ok(())
    }

    fn row(&mut self, row: &Row) -> Result<()> {
        self.rows.push(row.clone());
        Ok(())
    }
}

fn session<G: Locate>(cfg: Config, geo: G, frames: Vec<Frame>) -> Result<Sniffer<NoNames, G, Recorder>> {
    let (tx, rx) = bounded(frames.len().max(1));
    for frame in frames {
        tx.send(frame)?;
    }
    drop(tx);

    let resolver = Resolver::new(NoNames, geo);
    let mut sniffer = Sniffer::new(cfg, resolver, Recorder::default());
    assert_eq!(State::Initializing, sniffer.state());

    sniffer.run(rx, &AtomicBool::new(false))?;

    Ok(sniffer)
}

#[test]
fn ipv4_session() -> Result<()> {
    let frames = vec![
        v4_tcp("10.0.0.1", "10.0.0.2"),
        v6_udp("2001:db8::1", "2001:db8::2"),
    ];

    let sniffer = session(config(V4, Some("")), Everywhere, frames)?;
    let present = sniffer.present();

    assert_eq!(State::Terminated, sniffer.state());
    assert_eq!(0, sniffer.warnings());
    assert_eq!(vec![Family::V4], present.headers);
    assert_eq!(1, present.rows.len());

    let row = &present.rows[0];
    assert_eq!(Protocol::TCP, row.protocol);
    assert_eq!("10.0.0.1", row.src.addr.to_string());
    assert_eq!("10.0.0.2", row.dst.addr.to_string());
    assert_eq!("-", row.src.name);
    assert_eq!("Norway, Oslo", row.dst.location);

    Ok(())
}

#[test]
fn geo_unreachable() -> Result<()> {
    let frames = vec![
        v4_tcp("10.0.0.1", "10.0.0.2"),
        v4_tcp("10.0.0.2", "10.0.0.1"),
        v4_tcp("10.0.0.1", "10.0.0.3"),
    ];

    let sniffer = session(config(V4, None), Unreachable, frames)?;
    let present = sniffer.present();

    assert_eq!(State::Terminated, sniffer.state());
    assert_eq!(3, present.rows.len());
    for row in &present.rows {
        assert_eq!(", ", row.src.location);
        assert_eq!(", ", row.dst.location);
    }
    assert!(sniffer.resolver().cache().is_empty());

    Ok(())
}

#[test]
fn header_once_per_family() -> Result<()> {
    let frames = vec![
        v4_tcp("10.0.0.1", "10.0.0.2"),
        v6_udp("fe80::1", "fe80::2"),
        v4_tcp("10.0.0.2", "10.0.0.1"),
        ethernet(EtherTypes::Arp, &[0u8; 28]),
        v6_udp("fe80::2", "fe80::1"),
    ];

    let sniffer = session(config(Select::All, None), Everywhere, frames)?;
    let present = sniffer.present();

    assert_eq!(vec![Family::V4, Family::V6], present.headers);
    assert_eq!(4, present.rows.len());
    assert_eq!(Family::V6, present.rows[1].family);
    assert_eq!(4, sniffer.resolver().cache().len());

    Ok(())
}

#[test]
fn idle_session_keeps_running() -> Result<()> {
    let (tx, rx) = bounded(1);

    let sender = thread::spawn(move || {
        thread::sleep(Duration::from_millis(250));
        let _ = tx.send(v4_tcp("10.0.0.1", "10.0.0.2"));
    });

    let resolver = Resolver::new(NoNames, Everywhere);
    let mut sniffer = Sniffer::new(config(V4, None), resolver, Recorder::default())
        .timeout(Duration::from_millis(100))
        .interval(Duration::from_millis(10));

    sniffer.run(rx, &AtomicBool::new(false))?;
    sender.join().map_err(|_| anyhow!("sender panicked"))?;

    let warnings = sniffer.warnings();
    assert!((1..=3).contains(&warnings), "{} idle warnings", warnings);
    assert_eq!(1, sniffer.present().rows.len());
    assert_eq!(State::Terminated, sniffer.state());

    Ok(())
}

#[test]
fn shutdown_stops_loop() -> Result<()> {
    let (tx, rx) = bounded(1);
    tx.send(v4_tcp("10.0.0.1", "10.0.0.2"))?;

    let resolver = Resolver::new(NoNames, Everywhere);
    let mut sniffer = Sniffer::new(config(V4, None), resolver, Recorder::default());
    sniffer.run(rx, &AtomicBool::new(true))?;

    assert_eq!(State::Terminated, sniffer.state());
    assert!(sniffer.present().rows.is_empty());

    Ok(())
}
