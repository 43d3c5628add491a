//! Network mode: ping, trace, whois, scan, check, curl.
//!
//! Every lookup goes through [`NetworkClient`](devterm_platform::NetworkClient).
//! A failed lookup is an error-styled output line, not a command failure,
//! so the progress line printed before it stays visible.

use devterm_types::error::{DevtermError, Result};

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment, OutputLine};
use crate::session::Mode;

const PING_PROBES: usize = 4;
const CURL_PREVIEW_CHARS: usize = 500;

pub fn register_network_commands(reg: &mut CommandRegistry) {
    reg.register(Mode::Network, Box::new(PingCmd));
    reg.register(Mode::Network, Box::new(TraceCmd));
    reg.register(Mode::Network, Box::new(WhoisCmd));
    reg.register(Mode::Network, Box::new(ScanCmd));
    reg.register(Mode::Network, Box::new(CheckCmd));
    reg.register(Mode::Network, Box::new(CurlCmd));
}

struct PingCmd;
impl Command for PingCmd {
    fn name(&self) -> &str {
        "ping"
    }
    fn description(&self) -> &str {
        "HTTP ping (e.g., ping google.com)"
    }
    fn usage(&self) -> &str {
        "ping [host]"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let host = args.first().copied().unwrap_or("google.com");
        let url = if host.starts_with("http") {
            host.to_string()
        } else {
            format!("https://{host}")
        };
        let mut lines = vec![OutputLine::system(format!(
            "Pinging {url} (HTTP Latency)..."
        ))];
        for _ in 0..PING_PROBES {
            match env.network.ping(&url) {
                Ok(ms) => lines.push(OutputLine::plain(format!("Reply from {url}: time={ms}ms"))),
                Err(e) => {
                    log::debug!("ping {url}: {e}");
                    lines.push(OutputLine::plain("Request timed out."));
                },
            }
        }
        lines.push(OutputLine::plain("Ping complete."));
        Ok(CommandOutput::Lines(lines))
    }
}

struct TraceCmd;
impl Command for TraceCmd {
    fn name(&self) -> &str {
        "trace"
    }
    fn description(&self) -> &str {
        "Simulate traceroute"
    }
    fn usage(&self) -> &str {
        "trace"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Lines(vec![
            OutputLine::error("Error: 'traceroute' requires raw socket access."),
            OutputLine::system("Simulating for demonstration:"),
            OutputLine::plain("1  192.168.1.1  2ms"),
            OutputLine::plain("2  10.0.0.1     15ms"),
            OutputLine::plain("3  172.217.0.1  24ms"),
        ]))
    }
}

struct WhoisCmd;
impl Command for WhoisCmd {
    fn name(&self) -> &str {
        "whois"
    }
    fn description(&self) -> &str {
        "WHOIS lookup"
    }
    fn usage(&self) -> &str {
        "whois <domain>"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let domain = args
            .first()
            .ok_or_else(|| DevtermError::usage("Usage: whois <domain>"))?;
        let mut lines = vec![OutputLine::system(format!("Querying RDAP for {domain}..."))];
        match env.network.whois(domain) {
            Ok(record) => {
                let status = if record.status.is_empty() {
                    "Active".to_string()
                } else {
                    record.status.join(", ")
                };
                lines.push(OutputLine::plain(format!("Domain Name: {}", record.domain)));
                lines.push(OutputLine::plain(format!("Status: {status}")));
                lines.push(OutputLine::plain(format!(
                    "Port 43: {}",
                    record.port43.as_deref().unwrap_or("N/A")
                )));
            },
            Err(e) => {
                log::warn!("whois {domain}: {e}");
                lines.push(OutputLine::error("Could not fetch WHOIS data."));
            },
        }
        Ok(CommandOutput::Lines(lines))
    }
}

struct ScanCmd;
impl Command for ScanCmd {
    fn name(&self) -> &str {
        "scan"
    }
    fn description(&self) -> &str {
        "Show public IP info"
    }
    fn usage(&self) -> &str {
        "scan"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut lines = vec![
            OutputLine::error("Error: Network scanning requires local network access."),
            OutputLine::system("Fetching public IP info instead..."),
        ];
        match env.network.ip_info() {
            Ok(ip) => lines.extend([
                OutputLine::plain(format!("Public IP: {}", ip.ip)),
                OutputLine::plain(format!("City: {}", ip.city)),
                OutputLine::plain(format!("Region: {}", ip.region)),
                OutputLine::plain(format!("Country: {}", ip.country)),
                OutputLine::plain(format!("ISP: {}", ip.org)),
            ]),
            Err(e) => {
                log::warn!("ip info: {e}");
                lines.push(OutputLine::error("Could not fetch IP info."));
            },
        }
        Ok(CommandOutput::Lines(lines))
    }
}

struct CheckCmd;
impl Command for CheckCmd {
    fn name(&self) -> &str {
        "check"
    }
    fn description(&self) -> &str {
        "Check port status"
    }
    fn usage(&self) -> &str {
        "check"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::error_line(
            "Error: Port checking requires backend proxy.",
        ))
    }
}

struct CurlCmd;
impl Command for CurlCmd {
    fn name(&self) -> &str {
        "curl"
    }
    fn description(&self) -> &str {
        "Fetch URL content (e.g., curl https://api.github.com)"
    }
    fn usage(&self) -> &str {
        "curl <url>"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let url = args
            .first()
            .ok_or_else(|| DevtermError::usage("Usage: curl <url>"))?;
        let mut lines = vec![OutputLine::system(format!("Fetching {url}..."))];
        match env.network.fetch(url) {
            Ok((status, body)) => {
                let mut preview: String = body.chars().take(CURL_PREVIEW_CHARS).collect();
                if body.chars().count() > CURL_PREVIEW_CHARS {
                    preview.push_str("...");
                }
                lines.extend(preview.lines().map(OutputLine::plain));
                lines.push(OutputLine::system(format!(
                    "Status: {status} | Size: {} bytes",
                    body.len()
                )));
            },
            Err(e) => {
                log::warn!("curl {url}: {e}");
                lines.push(OutputLine::error(format!("Error: {e}")));
            },
        }
        Ok(CommandOutput::Lines(lines))
    }
}
