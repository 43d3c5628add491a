//! Platform service traits and desktop implementation.

use devterm_types::error::{DevtermError, Result};

// ---------------------------------------------------------------------------
// Time service
// ---------------------------------------------------------------------------

/// A simple wall-clock timestamp (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl SystemTime {
    /// `YYYY-MM-DD`.
    pub fn date_string(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// `HH:MM:SS`.
    pub fn time_string(&self) -> String {
        format!("{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

impl std::fmt::Display for SystemTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.date_string(), self.time_string())
    }
}

/// Abstraction over platform time services.
pub trait TimeService {
    /// Current wall-clock time.
    fn now(&self) -> Result<SystemTime>;

    /// Seconds since the session started.
    fn uptime_secs(&self) -> Result<u64>;
}

// ---------------------------------------------------------------------------
// Network client
// ---------------------------------------------------------------------------

/// A lookup request handed to the external network collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Spot price of a ticker symbol in USD.
    Price { symbol: String },
    /// Currency exchange rate `from` -> `to`.
    ExchangeRate { from: String, to: String },
    /// Registration data for a domain.
    Whois { domain: String },
    /// Public IP information for this host.
    IpInfo,
    /// Current weather for a city.
    Weather { city: String },
    /// Round-trip latency of an HTTP request.
    Ping { url: String },
    /// Plain HTTP GET.
    Fetch { url: String },
}

/// WHOIS/RDAP summary.
#[derive(Debug, Clone, PartialEq)]
pub struct WhoisRecord {
    pub domain: String,
    pub status: Vec<String>,
    pub port43: Option<String>,
}

/// Public IP summary.
#[derive(Debug, Clone, PartialEq)]
pub struct IpDetails {
    pub ip: String,
    pub city: String,
    pub region: String,
    pub country: String,
    pub org: String,
}

/// Weather summary.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub temp_c: f64,
    pub description: String,
    pub humidity: u8,
    pub wind_kmh: f64,
}

/// Successful answer to a [`Query`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Price(f64),
    Rate(f64),
    Whois(WhoisRecord),
    IpInfo(IpDetails),
    Weather(WeatherReport),
    Latency { millis: u64 },
    Body { status: u16, body: String },
}

fn unexpected(query: &Query, reply: &Reply) -> DevtermError {
    DevtermError::Network(format!("unexpected reply to {query:?}: {reply:?}"))
}

/// Abstraction over the external lookup services (prices, rates, WHOIS, ...).
///
/// Implementors only provide [`query`](NetworkClient::query); the typed
/// helpers unwrap the expected reply variant.
pub trait NetworkClient {
    /// Perform a blocking lookup.
    fn query(&self, query: &Query) -> Result<Reply>;

    fn price(&self, symbol: &str) -> Result<f64> {
        let q = Query::Price {
            symbol: symbol.to_string(),
        };
        match self.query(&q)? {
            Reply::Price(p) => Ok(p),
            other => Err(unexpected(&q, &other)),
        }
    }

    fn exchange_rate(&self, from: &str, to: &str) -> Result<f64> {
        let q = Query::ExchangeRate {
            from: from.to_string(),
            to: to.to_string(),
        };
        match self.query(&q)? {
            Reply::Rate(r) => Ok(r),
            other => Err(unexpected(&q, &other)),
        }
    }

    fn whois(&self, domain: &str) -> Result<WhoisRecord> {
        let q = Query::Whois {
            domain: domain.to_string(),
        };
        match self.query(&q)? {
            Reply::Whois(w) => Ok(w),
            other => Err(unexpected(&q, &other)),
        }
    }

    fn ip_info(&self) -> Result<IpDetails> {
        match self.query(&Query::IpInfo)? {
            Reply::IpInfo(info) => Ok(info),
            other => Err(unexpected(&Query::IpInfo, &other)),
        }
    }

    fn weather(&self, city: &str) -> Result<WeatherReport> {
        let q = Query::Weather {
            city: city.to_string(),
        };
        match self.query(&q)? {
            Reply::Weather(w) => Ok(w),
            other => Err(unexpected(&q, &other)),
        }
    }

    fn ping(&self, url: &str) -> Result<u64> {
        let q = Query::Ping {
            url: url.to_string(),
        };
        match self.query(&q)? {
            Reply::Latency { millis } => Ok(millis),
            other => Err(unexpected(&q, &other)),
        }
    }

    fn fetch(&self, url: &str) -> Result<(u16, String)> {
        let q = Query::Fetch {
            url: url.to_string(),
        };
        match self.query(&q)? {
            Reply::Body { status, body } => Ok((status, body)),
            other => Err(unexpected(&q, &other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Desktop implementation
// ---------------------------------------------------------------------------

/// Default platform implementation using `std` facilities.
///
/// Network lookups are disabled: every query fails with a message, which the
/// handlers render like any other collaborator failure.
pub struct DesktopPlatform {
    start_time: std::time::Instant,
}

impl DesktopPlatform {
    pub fn new() -> Self {
        Self {
            start_time: std::time::Instant::now(),
        }
    }
}

impl Default for DesktopPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeService for DesktopPlatform {
    fn now(&self) -> Result<SystemTime> {
        use std::time::SystemTime as StdTime;
        let secs = StdTime::now()
            .duration_since(StdTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Ok(system_time_from_unix(secs))
    }

    fn uptime_secs(&self) -> Result<u64> {
        Ok(self.start_time.elapsed().as_secs())
    }
}

impl NetworkClient for DesktopPlatform {
    fn query(&self, query: &Query) -> Result<Reply> {
        log::debug!("network query refused (offline): {query:?}");
        Err(DevtermError::Network(
            "network access is not available in this build".to_string(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Date helper
// ---------------------------------------------------------------------------

/// Break a Unix timestamp into a UTC [`SystemTime`].
pub fn system_time_from_unix(secs: u64) -> SystemTime {
    let days = secs / 86400;
    let time_of_day = secs % 86400;
    let (year, month, day) = days_to_ymd(days);
    SystemTime {
        year,
        month,
        day,
        hour: (time_of_day / 3600) as u8,
        minute: ((time_of_day % 3600) / 60) as u8,
        second: (time_of_day % 60) as u8,
    }
}

/// Convert days since Unix epoch to (year, month, day).
pub(crate) fn days_to_ymd(mut days: u64) -> (u16, u8, u8) {
    let mut year = 1970u16;
    loop {
        let year_days = if is_leap(year) { 366 } else { 365 };
        if days < year_days {
            break;
        }
        days -= year_days;
        year += 1;
    }
    let leap = is_leap(year);
    let month_days: [u64; 12] = [
        31,
        if leap { 29 } else { 28 },
        31,
        30,
        31,
        30,
        31,
        31,
        30,
        31,
        30,
        31,
    ];
    let mut month = 0u8;
    for (i, &md) in month_days.iter().enumerate() {
        if days < md {
            month = (i + 1) as u8;
            break;
        }
        days -= md;
    }
    if month == 0 {
        month = 12;
    }
    (year, month, (days + 1) as u8)
}

pub(crate) fn is_leap(y: u16) -> bool {
    (y.is_multiple_of(4) && !y.is_multiple_of(100)) || y.is_multiple_of(400)
}
