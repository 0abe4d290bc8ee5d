use log::trace;
use crate::packet::{self, Family, Packet, Transport};
use super::{Config, Event, Frame, Protocol};

pub fn classify(frame: &Frame, cfg: &Config) -> Option<Event> {
    let pkt = packet::decode(frame.link, &frame.data)?;

    let family = match pkt {
        Packet::Other(ethertype) => {
            trace!("ignoring ethertype {:#06x}", ethertype);
            return None;
        },
        _ => pkt.family()?,
    };

    if !cfg.select.accepts(family) {
        return None;
    }

    let src = pkt.src()?;
    let dst = pkt.dst()?;

    if !cfg.source(&src) {
        return None;
    }

    Some(Event {
        family:   family,
        src:      src,
        dst:      dst,
        protocol: protocol(&pkt, family),
    })
}

pub fn protocol(pkt: &Packet, family: Family) -> Protocol {
    if pkt.icmp().is_some() {
        return Protocol::ICMP;
    }

    match pkt.transport() {
        Some(Transport::TCP(_)) => Protocol::TCP,
        Some(Transport::UDP(_)) => Protocol::UDP,
        Some(other)             => Protocol::Layer(other.name()),
        None                    => Protocol::Layer(family.name()),
    }
}
