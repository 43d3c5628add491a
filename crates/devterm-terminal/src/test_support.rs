//! Fixtures shared by the unit tests: fake services, a ready-made
//! environment, and shell helpers.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Instant;

use devterm_platform::{
    IpDetails, NetworkClient, Persistence, Query, Reply, SystemTime, TimeService, WeatherReport,
    WhoisRecord,
};
use devterm_types::config::TerminalConfig;
use devterm_types::error::{DevtermError, Result};
use devterm_vfs::{AbsolutePath, FilesystemTree};

use crate::commands::register_builtins;
use crate::display::BufferDisplay;
use crate::interpreter::{CommandRegistry, Environment, OutputLine};
use crate::rng::SimpleRng;
use crate::scheduler::Scheduler;
use crate::session::{Mode, Profile, SessionState};
use crate::shell::{Services, Shell};

/// Clock frozen at 2025-03-14 09:26:53, up for 3725 seconds.
pub struct FixedClock;

impl TimeService for FixedClock {
    fn now(&self) -> Result<SystemTime> {
        Ok(SystemTime {
            year: 2025,
            month: 3,
            day: 14,
            hour: 9,
            minute: 26,
            second: 53,
        })
    }

    fn uptime_secs(&self) -> Result<u64> {
        Ok(3725)
    }
}

/// Canned network replies. Clones share prices and the online flag.
#[derive(Clone)]
pub struct FakeNetwork {
    prices: Rc<RefCell<BTreeMap<String, f64>>>,
    online: Rc<Cell<bool>>,
}

impl FakeNetwork {
    pub fn online() -> Self {
        let prices = BTreeMap::from([
            ("BTC".to_string(), 95_432.1),
            ("ETH".to_string(), 3_456.78),
            ("SOL".to_string(), 145.2),
        ]);
        Self {
            prices: Rc::new(RefCell::new(prices)),
            online: Rc::new(Cell::new(true)),
        }
    }

    pub fn offline() -> Self {
        let net = Self::online();
        net.set_online(false);
        net
    }

    pub fn set_online(&self, online: bool) {
        self.online.set(online);
    }

    pub fn set_price(&self, symbol: &str, price: f64) {
        self.prices.borrow_mut().insert(symbol.to_string(), price);
    }
}

impl NetworkClient for FakeNetwork {
    fn query(&self, query: &Query) -> Result<Reply> {
        if !self.online.get() {
            return Err(DevtermError::Network("offline".into()));
        }
        match query {
            Query::Price { symbol } => self
                .prices
                .borrow()
                .get(symbol)
                .copied()
                .map(Reply::Price)
                .ok_or_else(|| DevtermError::Network(format!("unknown symbol {symbol}"))),
            Query::ExchangeRate { from, to } => {
                match (from.to_uppercase().as_str(), to.to_uppercase().as_str()) {
                    ("USD", "EUR") => Ok(Reply::Rate(0.92)),
                    (a, b) if a == b => Ok(Reply::Rate(1.0)),
                    _ => Err(DevtermError::Network("unknown currency".into())),
                }
            },
            Query::Whois { domain } => Ok(Reply::Whois(WhoisRecord {
                domain: domain.clone(),
                status: vec!["client transfer prohibited".into(), "active".into()],
                port43: Some("whois.verisign-grs.com".into()),
            })),
            Query::IpInfo => Ok(Reply::IpInfo(IpDetails {
                ip: "203.0.113.7".into(),
                city: "Lyon".into(),
                region: "Auvergne-Rhone-Alpes".into(),
                country: "France".into(),
                org: "Example ISP".into(),
            })),
            Query::Weather { .. } => Ok(Reply::Weather(WeatherReport {
                temp_c: 18.5,
                description: "Partly cloudy".into(),
                humidity: 60,
                wind_kmh: 12.0,
            })),
            Query::Ping { .. } => Ok(Reply::Latency { millis: 42 }),
            Query::Fetch { url } => {
                let body = if url.contains("big") {
                    "x".repeat(600)
                } else {
                    "hello".to_string()
                };
                Ok(Reply::Body { status: 200, body })
            },
        }
    }
}

/// Owned pieces of an [`Environment`], for calling handlers directly.
pub struct TestHarness {
    pub session: SessionState,
    pub fs: FilesystemTree,
    pub store: Persistence,
    pub registry: CommandRegistry,
    pub scheduler: Scheduler,
    pub rng: SimpleRng,
    pub clock: FixedClock,
    pub net: FakeNetwork,
    pub profile: Profile,
    pub now: Instant,
}

impl TestHarness {
    pub fn new() -> Self {
        let store = Persistence::in_memory();
        let mut fs = FilesystemTree::with_default_layout();
        fs.attach_store(store.clone());
        let mut registry = CommandRegistry::new();
        register_builtins(&mut registry);
        Self {
            session: SessionState::new(Mode::Development, AbsolutePath::parse("/home/user")),
            fs,
            store,
            registry,
            scheduler: Scheduler::new(),
            rng: SimpleRng::new(7),
            clock: FixedClock,
            net: FakeNetwork::online(),
            profile: Profile::default(),
            now: Instant::now(),
        }
    }
}

/// Run `f` with an environment borrowed from `h`.
pub fn run_in<T>(h: &mut TestHarness, f: impl FnOnce(&mut Environment<'_>) -> T) -> T {
    let mut env = Environment {
        session: &mut h.session,
        fs: &mut h.fs,
        store: &h.store,
        commands: &h.registry,
        scheduler: &mut h.scheduler,
        rng: &mut h.rng,
        time: &h.clock,
        network: &h.net,
        profile: &h.profile,
        raw_args: "",
        now: h.now,
    };
    f(&mut env)
}

/// Shell over `store` with the fixed clock and `net`, seeded rng.
pub fn test_shell_with(store: Persistence, net: FakeNetwork) -> Shell {
    let services = Services {
        time: Box::new(FixedClock),
        network: Box::new(net),
    };
    Shell::new(&TerminalConfig::default(), store, services).with_seed(7)
}

/// Fresh in-memory shell plus a handle on its network fake.
pub fn test_shell() -> (Shell, FakeNetwork) {
    let net = FakeNetwork::online();
    (test_shell_with(Persistence::in_memory(), net.clone()), net)
}

/// Run one line; returns what it printed, without the echoed prompt line.
pub fn exec(shell: &mut Shell, line: &str) -> Vec<OutputLine> {
    let mut display = BufferDisplay::new();
    shell.run_line(line, &mut display);
    let mut lines = display.take();
    if !line.trim().is_empty() && !lines.is_empty() {
        lines.remove(0);
    }
    lines
}

pub fn texts(lines: &[OutputLine]) -> Vec<&str> {
    lines.iter().map(|l| l.text.as_str()).collect()
}
