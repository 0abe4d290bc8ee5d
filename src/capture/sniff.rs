use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use anyhow::Result;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, info, warn};
use crate::display::{Endpoint, Present, Row};
use crate::packet::Family;
use crate::resolve::{Locate, Names, Resolver};
use super::{classify, Config, Event, Frame, Idle, Select, POLL, TIMEOUT};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum State {
    Initializing,
    Running,
    Terminated,
}

/// The capture loop: pulls frames, classifies them, resolves both
/// endpoints and hands one row per accepted frame to the presenter.
pub struct Sniffer<N, G, P> {
    cfg:      Config,
    resolver: Resolver<N, G>,
    present:  P,
    idle:     Idle,
    interval: Duration,
    headers:  HashSet<Family>,
    warnings: usize,
    state:    State,
}

impl<N: Names, G: Locate, P: Present> Sniffer<N, G, P> {
    pub fn new(cfg: Config, resolver: Resolver<N, G>, present: P) -> Self {
        Self {
            cfg:      cfg,
            resolver: resolver,
            present:  present,
            idle:     Idle::new(TIMEOUT, Instant::now()),
            interval: POLL,
            headers:  HashSet::new(),
            warnings: 0,
            state:    State::Initializing,
        }
    }

    /// Silence after which the idle warning fires.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.idle = Idle::new(timeout, Instant::now());
        self
    }

    /// Longest wait for a frame before the idle check runs.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn run(&mut self, rx: Receiver<Frame>, shutdown: &AtomicBool) -> Result<()> {
        info!("sniffing on interface: {}", self.cfg.device);

        if self.cfg.select == Select::All {
            warn!("neither IPv4 nor IPv6 selected, capturing all packets");
        }

        self.state = State::Running;
        self.idle.seen(Instant::now());

        let result = self.poll(&rx, shutdown);
        self.state = State::Terminated;
        result
    }

    fn poll(&mut self, rx: &Receiver<Frame>, shutdown: &AtomicBool) -> Result<()> {
        while !shutdown.load(Ordering::Acquire) {
            match rx.recv_timeout(self.interval) {
                Ok(frame)                           => self.frame(&frame)?,
                Err(RecvTimeoutError::Timeout)      => self.quiet(Instant::now()),
                Err(RecvTimeoutError::Disconnected) => {
                    info!("packet source closed");
                    return Ok(());
                },
            }
        }

        debug!("shutdown requested");

        Ok(())
    }

    pub fn frame(&mut self, frame: &Frame) -> Result<()> {
        self.idle.seen(Instant::now());
        match classify(frame, &self.cfg) {
            Some(event) => self.event(event),
            None        => Ok(()),
        }
    }

    fn quiet(&mut self, now: Instant) {
        if self.idle.expired(now) {
            self.warnings += 1;
            warn!(
                "no packets captured in the last {} seconds, are you using the correct interface? try running as administrator",
                self.idle.timeout().as_secs(),
            );
        }
    }

    fn event(&mut self, event: Event) -> Result<()> {
        let (src_name, src_geo) = self.resolver.resolve(event.src);
        let (dst_name, dst_geo) = self.resolver.resolve(event.dst);

        if self.headers.insert(event.family) {
            self.present.header(event.family)?;
        }

        self.present.row(&Row {
            family: event.family,
            src:    Endpoint {
                name:     src_name,
                addr:     event.src,
                location: src_geo.location(),
            },
            dst:    Endpoint {
                name:     dst_name,
                addr:     event.dst,
                location: dst_geo.location(),
            },
            protocol: event.protocol,
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Idle warnings emitted so far.
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    pub fn present(&self) -> &P {
        &self.present
    }

    pub fn resolver(&self) -> &Resolver<N, G> {
        &self.resolver
    }
}
