use std::thread::{self, JoinHandle};
use anyhow::Result;
use crossbeam_channel::Sender;
use log::{debug, info, warn};
use pcap::{Activated, Capture};
use crate::packet::Link;
use pcap::Error::*;

/// One captured frame, owned by whoever pulled it off the channel.
#[derive(Clone, Debug)]
pub struct Frame {
    pub link: Link,
    pub data: Vec<u8>,
}

/// Moves frames from the capture handle onto `tx` in capture order, on a
/// dedicated thread. The channel closes when the capture ends.
pub fn spawn<T>(name: &str, mut cap: Capture<T>, tx: Sender<Frame>) -> Result<JoinHandle<()>>
where
    T: Activated + Send + 'static,
{
    let link = Link::from(cap.get_datalink());
    let name = name.to_owned();

    let handle = thread::Builder::new().name("capture".to_owned()).spawn(move || {
        info!("starting {} capture ({:?})", name, link);
        match poll(&mut cap, link, &tx) {
            Ok(()) => debug!("capture {} finished", name),
            Err(e) => warn!("capture {} stopped: {:?}", name, e),
        }
    })?;

    Ok(handle)
}

fn poll<T: Activated + ?Sized>(cap: &mut Capture<T>, link: Link, tx: &Sender<Frame>) -> Result<()> {
    loop {
        let frame = match cap.next() {
            Ok(packet)          => Frame { link, data: packet.data.to_vec() },
            Err(TimeoutExpired) => continue,
            Err(NoMorePackets)  => return Ok(()),
            Err(e)              => return Err(e.into()),
        };

        if tx.send(frame).is_err() {
            return Ok(());
        }
    }
}
