use std::io::Write;
use anyhow::Result;
use crate::packet::Family;
use super::{Present, Row};

pub struct Table<W> {
    out:  W,
    ipv4: Option<String>,
    ipv6: Option<String>,
}

#[derive(Copy, Clone, Debug)]
struct Widths {
    name: usize,
    addr: usize,
    loc:  usize,
}

const IPV4: Widths = Widths { name: 40, addr: 16, loc: 24 };
const IPV6: Widths = Widths { name: 40, addr: 40, loc: 24 };
const PROTO: usize = 8;

impl<W: Write> Table<W> {
    pub fn new(out: W) -> Self {
        Self {
            out:  out,
            ipv4: None,
            ipv6: None,
        }
    }

    /// Lines printed above the header of each family's table.
    pub fn titles(mut self, ipv4: Option<String>, ipv6: Option<String>) -> Self {
        self.ipv4 = ipv4.filter(|s| !s.is_empty());
        self.ipv6 = ipv6.filter(|s| !s.is_empty());
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, w: Widths, cols: [&str; 7]) -> Result<()> {
        let [sn, sa, sl, rn, ra, rl, proto] = cols;
        writeln!(
            self.out,
            "{:<n$} {:<a$} {:<l$} {:<n$} {:<a$} {:<l$} {:<p$}",
            sn, sa, sl, rn, ra, rl, proto,
            n = w.name,
            a = w.addr,
            l = w.loc,
            p = PROTO,
        )?;
        Ok(())
    }
}

impl<W: Write> Present for Table<W> {
    fn header(&mut self, family: Family) -> Result<()> {
        let w = widths(family);

        let title = match family {
            Family::V4 => self.ipv4.clone(),
            Family::V6 => self.ipv6.clone(),
        };

        if let Some(title) = title {
            writeln!(self.out, "{}", title)?;
        }

        self.line(w, [
            "SENDER_NAME",   "SENDER_IP",   "SENDER_LOCATION",
            "RECEIVER_NAME", "RECEIVER_IP", "RECEIVER_LOCATION",
            "PROTOCOL",
        ])?;

        let total = (w.name + w.addr + w.loc) * 2 + PROTO + 6;
        writeln!(self.out, "{}", "-".repeat(total))?;

        Ok(())
    }

    fn row(&mut self, row: &Row) -> Result<()> {
        let src = row.src.addr.to_string();
        let dst = row.dst.addr.to_string();

        self.line(widths(row.family), [
            row.src.name.as_str(), src.as_str(), row.src.location.as_str(),
            row.dst.name.as_str(), dst.as_str(), row.dst.location.as_str(),
            row.protocol.label(),
        ])?;

        self.out.flush()?;

        Ok(())
    }
}

fn widths(family: Family) -> Widths {
    match family {
        Family::V4 => IPV4,
        Family::V6 => IPV6,
    }
}
