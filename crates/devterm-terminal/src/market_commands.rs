//! Market data mode: price, roi, simulate, funding, spread, portfolio, alert.

use devterm_types::error::{DevtermError, Result};

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment, OutputLine};
use crate::scheduler::{Direction, PriceAlert};
use crate::session::Mode;

pub fn register_market_commands(reg: &mut CommandRegistry) {
    reg.register(Mode::MarketData, Box::new(PriceCmd));
    reg.register(Mode::MarketData, Box::new(RoiCmd));
    reg.register(Mode::MarketData, Box::new(SimulateCmd));
    reg.register(Mode::MarketData, Box::new(FundingCmd));
    reg.register(Mode::MarketData, Box::new(SpreadCmd));
    reg.register(Mode::MarketData, Box::new(PortfolioCmd));
    reg.register(Mode::MarketData, Box::new(AlertCmd));
}

/// Thousands-grouped number with at most `max_fraction` decimals and no
/// trailing zeros, e.g. `95,432.1`.
pub(crate) fn locale_number(value: f64, max_fraction: usize) -> String {
    let formatted = format!("{:.*}", max_fraction, value.abs());
    let (int_part, frac) = match formatted.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (formatted.as_str(), ""),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

/// Dollar amount with cents only when non-zero: `$100,500`, `$3,456.78`.
pub(crate) fn format_usd(value: f64) -> String {
    format!("${}", locale_number(value, 2))
}

fn symbol_arg(args: &[&str]) -> String {
    args.first().map_or_else(|| "BTC".to_string(), |s| s.to_uppercase())
}

// ---------------------------------------------------------------------------
// price / roi
// ---------------------------------------------------------------------------

struct PriceCmd;
impl Command for PriceCmd {
    fn name(&self) -> &str {
        "price"
    }
    fn description(&self) -> &str {
        "Show real-time price (e.g., price BTC)"
    }
    fn usage(&self) -> &str {
        "price [symbol]"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let coin = symbol_arg(args);
        let mut lines = vec![OutputLine::system(format!("Fetching price for {coin}..."))];
        match env.network.price(&coin) {
            Ok(price) => lines.push(OutputLine::plain(format!(
                "{coin}: ${}",
                locale_number(price, 3)
            ))),
            Err(e) => {
                log::warn!("price {coin}: {e}");
                lines.push(OutputLine::error(format!(
                    "Error: Could not fetch price for {coin}"
                )));
            },
        }
        Ok(CommandOutput::Lines(lines))
    }
}

struct RoiCmd;
impl Command for RoiCmd {
    fn name(&self) -> &str {
        "roi"
    }
    fn description(&self) -> &str {
        "Calculate ROI (e.g., roi 100 150)"
    }
    fn usage(&self) -> &str {
        "roi <initial> <final>"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let usage = || DevtermError::usage("Usage: roi <initial> <final>");
        let [initial, last, ..] = args else {
            return Err(usage());
        };
        let initial: f64 = initial.parse().map_err(|_| usage())?;
        let last: f64 = last.parse().map_err(|_| usage())?;
        if initial == 0.0 {
            return Err(DevtermError::usage("Error: Initial value cannot be zero"));
        }
        let roi = (last - initial) / initial * 100.0;
        Ok(CommandOutput::Text(format!("ROI: {roi:.2}%")))
    }
}

// ---------------------------------------------------------------------------
// simulate / funding / spread
// ---------------------------------------------------------------------------

struct SimulateCmd;
impl Command for SimulateCmd {
    fn name(&self) -> &str {
        "simulate"
    }
    fn description(&self) -> &str {
        "Simulate delta-neutral strategy"
    }
    fn usage(&self) -> &str {
        "simulate"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut lines = vec![OutputLine::system(
            "Fetching live data for Delta-Neutral Strategy...",
        )];
        let price = match env.network.price("BTC") {
            Ok(p) => p,
            Err(e) => {
                log::warn!("simulate: {e}");
                lines.push(OutputLine::error("Error: Could not fetch market data."));
                return Ok(CommandOutput::Lines(lines));
            },
        };
        // 8h funding in percent, rounded to what is displayed
        let funding = (env.rng.next_f64() * 0.02 * 10_000.0).round() / 10_000.0;
        let apy = funding * 3.0 * 365.0;
        lines.extend([
            OutputLine::plain(format!("Current BTC Price: ${}", locale_number(price, 3))),
            OutputLine::plain("Strategy: Long BTC / Short BTC-Perp"),
            OutputLine::plain("Hedge Ratio: 1.0"),
            OutputLine::plain(format!("Current Funding Rate (8h): {funding:.4}%")),
            OutputLine::plain(format!("Estimated APY: {apy:.2}%")),
        ]);
        Ok(CommandOutput::Lines(lines))
    }
}

struct FundingCmd;
impl Command for FundingCmd {
    fn name(&self) -> &str {
        "funding"
    }
    fn description(&self) -> &str {
        "Show simulated funding rate"
    }
    fn usage(&self) -> &str {
        "funding"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Lines(vec![
            OutputLine::system("Fetching funding rates..."),
            OutputLine::plain("BTC-PERP: 0.0100% (8h)"),
            OutputLine::plain("ETH-PERP: 0.0125% (8h)"),
            OutputLine::plain("SOL-PERP: 0.0085% (8h)"),
        ]))
    }
}

struct SpreadCmd;
impl Command for SpreadCmd {
    fn name(&self) -> &str {
        "spread"
    }
    fn description(&self) -> &str {
        "Show simulated bid/ask spread"
    }
    fn usage(&self) -> &str {
        "spread [symbol]"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let coin = symbol_arg(args);
        let price = match env.network.price(&coin) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("spread {coin}: {e}");
                return Ok(CommandOutput::error_line("Error fetching price."));
            },
        };
        // simulated 0.01% spread
        let spread = (price * 0.0001 * 100.0).round() / 100.0;
        let bid = price - spread / 2.0;
        let ask = price + spread / 2.0;
        Ok(CommandOutput::Text(format!(
            "[{coin}] Bid: {bid:.2} | Ask: {ask:.2} | Spread: {spread:.2}"
        )))
    }
}

// ---------------------------------------------------------------------------
// portfolio
// ---------------------------------------------------------------------------

/// Demo holdings: (symbol, amount).
const HOLDINGS: [(&str, f64); 3] = [("BTC", 0.5), ("ETH", 4.2), ("SOL", 150.0)];
const STABLE_HOLDING: f64 = 5000.0;

struct PortfolioCmd;
impl Command for PortfolioCmd {
    fn name(&self) -> &str {
        "portfolio"
    }
    fn description(&self) -> &str {
        "Show live portfolio value"
    }
    fn usage(&self) -> &str {
        "portfolio"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut lines = vec![
            OutputLine::system("Fetching real-time portfolio value..."),
            OutputLine::plain("--- Live Portfolio ---"),
        ];
        let mut total = STABLE_HOLDING;
        for (symbol, amount) in HOLDINGS {
            // an unavailable price values the holding at zero
            let price = env.network.price(symbol).unwrap_or_else(|e| {
                log::warn!("portfolio {symbol}: {e}");
                0.0
            });
            let value = amount * price;
            total += value;
            let label = format!("{symbol}:");
            lines.push(OutputLine::plain(format!(
                "{label:<5} {amount} ({})",
                format_usd(value)
            )));
        }
        lines.push(OutputLine::plain(format!(
            "USDT: {}",
            locale_number(STABLE_HOLDING, 0)
        )));
        lines.push(OutputLine::plain("----------------------"));
        lines.push(OutputLine::success(format!(
            "Total Value: {}",
            format_usd(total)
        )));
        Ok(CommandOutput::Lines(lines))
    }
}

// ---------------------------------------------------------------------------
// alert
// ---------------------------------------------------------------------------

fn describe(alert: &PriceAlert) -> String {
    let side = match alert.direction {
        Direction::Above => "above",
        Direction::Below => "below",
    };
    format!("{} {side} {}", alert.symbol, format_usd(alert.target))
}

struct AlertCmd;
impl Command for AlertCmd {
    fn name(&self) -> &str {
        "alert"
    }
    fn description(&self) -> &str {
        "Set price alert (e.g., alert BTC 100000)"
    }
    fn usage(&self) -> &str {
        "alert <symbol> <target> | alert stop"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        const USAGE: &str = "Usage: alert <symbol> <target> | alert stop";
        match args {
            [] => match env.scheduler.alert() {
                Some(alert) => Ok(CommandOutput::Text(format!(
                    "Active alert: {}",
                    describe(alert)
                ))),
                None => Err(DevtermError::usage(USAGE)),
            },
            ["stop"] => Ok(match env.scheduler.stop_watch() {
                Some(alert) => CommandOutput::Lines(vec![OutputLine::system(format!(
                    "Alert for {} stopped.",
                    alert.symbol
                ))]),
                None => CommandOutput::text("No active alert."),
            }),
            [symbol, target, ..] => {
                let target: f64 = target
                    .parse()
                    .ok()
                    .filter(|t: &f64| t.is_finite() && *t > 0.0)
                    .ok_or_else(|| DevtermError::usage(USAGE))?;
                let symbol = symbol.to_uppercase();
                let current = match env.network.price(&symbol) {
                    Ok(p) => p,
                    Err(e) => {
                        log::warn!("alert {symbol}: {e}");
                        return Ok(CommandOutput::error_line(format!(
                            "Error: Could not fetch price for {symbol}"
                        )));
                    },
                };
                let alert = PriceAlert::new(symbol, target, current);
                let message = format!(
                    "Alert set: {} (current ${})",
                    describe(&alert),
                    locale_number(current, 3)
                );
                env.scheduler
                    .watch(alert, env.now, env.profile.alert_interval);
                Ok(CommandOutput::Lines(vec![OutputLine::system(message)]))
            },
            [_] => Err(DevtermError::usage(USAGE)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::Shell;
    use crate::test_support::{FakeNetwork, exec, test_shell, test_shell_with, texts};
    use devterm_platform::Persistence;

    fn crypto_shell() -> (Shell, FakeNetwork) {
        let (mut sh, net) = test_shell();
        exec(&mut sh, "mode crypto");
        (sh, net)
    }

    #[test]
    fn locale_number_groups_and_trims() {
        assert_eq!(locale_number(95_432.1, 3), "95,432.1");
        assert_eq!(locale_number(1_000_000.0, 2), "1,000,000");
        assert_eq!(locale_number(999.999, 2), "1,000");
        assert_eq!(locale_number(-1234.5, 2), "-1,234.5");
        assert_eq!(locale_number(-0.001, 2), "0");
        assert_eq!(locale_number(0.62, 3), "0.62");
        assert_eq!(format_usd(100_500.0), "$100,500");
    }

    #[test]
    fn price_default_and_symbol() {
        let (mut sh, _) = crypto_shell();
        assert_eq!(
            exec(&mut sh, "price"),
            vec![
                OutputLine::system("Fetching price for BTC..."),
                OutputLine::plain("BTC: $95,432.1"),
            ]
        );
        assert_eq!(texts(&exec(&mut sh, "price eth"))[1], "ETH: $3,456.78");
        assert_eq!(
            exec(&mut sh, "price DOGE")[1],
            OutputLine::error("Error: Could not fetch price for DOGE")
        );
    }

    #[test]
    fn roi_math_and_usage() {
        let (mut sh, _) = crypto_shell();
        assert_eq!(texts(&exec(&mut sh, "roi 100 150")), vec!["ROI: 50.00%"]);
        assert_eq!(texts(&exec(&mut sh, "roi 200 150")), vec!["ROI: -25.00%"]);
        assert_eq!(
            exec(&mut sh, "roi 100"),
            vec![OutputLine::error("Usage: roi <initial> <final>")]
        );
        assert_eq!(
            exec(&mut sh, "roi 0 5"),
            vec![OutputLine::error("Error: Initial value cannot be zero")]
        );
    }

    #[test]
    fn simulate_reports_strategy() {
        let (mut sh, _) = crypto_shell();
        let lines = exec(&mut sh, "simulate");
        let out = texts(&lines);
        assert_eq!(out.len(), 6);
        assert_eq!(out[1], "Current BTC Price: $95,432.1");
        assert!(out[4].starts_with("Current Funding Rate (8h): 0.0"));
        assert!(out[5].starts_with("Estimated APY: "));
    }

    #[test]
    fn simulate_offline() {
        let mut sh = test_shell_with(Persistence::in_memory(), FakeNetwork::offline());
        exec(&mut sh, "mode crypto");
        assert_eq!(
            exec(&mut sh, "simulate").last(),
            Some(&OutputLine::error("Error: Could not fetch market data."))
        );
    }

    #[test]
    fn funding_is_static() {
        let (mut sh, _) = crypto_shell();
        assert_eq!(exec(&mut sh, "funding").len(), 4);
    }

    #[test]
    fn spread_around_price() {
        let (mut sh, net) = crypto_shell();
        net.set_price("BTC", 100_000.0);
        assert_eq!(
            texts(&exec(&mut sh, "spread")),
            vec!["[BTC] Bid: 99995.00 | Ask: 100005.00 | Spread: 10.00"]
        );
        assert_eq!(
            exec(&mut sh, "spread XYZ"),
            vec![OutputLine::error("Error fetching price.")]
        );
    }

    #[test]
    fn portfolio_totals() {
        let (mut sh, _) = crypto_shell();
        let out = exec(&mut sh, "portfolio");
        assert_eq!(
            texts(&out)[1..6],
            [
                "--- Live Portfolio ---",
                "BTC:  0.5 ($47,716.05)",
                "ETH:  4.2 ($14,518.48)",
                "SOL:  150 ($21,780)",
                "USDT: 5,000",
            ]
        );
        assert_eq!(
            out.last(),
            Some(&OutputLine::success("Total Value: $89,014.53"))
        );
    }

    #[test]
    fn alert_set_show_stop() {
        let (mut sh, _) = crypto_shell();
        assert_eq!(
            exec(&mut sh, "alert btc 100000"),
            vec![OutputLine::system(
                "Alert set: BTC above $100,000 (current $95,432.1)"
            )]
        );
        assert_eq!(
            texts(&exec(&mut sh, "alert")),
            vec!["Active alert: BTC above $100,000"]
        );
        assert_eq!(
            exec(&mut sh, "alert stop"),
            vec![OutputLine::system("Alert for BTC stopped.")]
        );
        assert_eq!(texts(&exec(&mut sh, "alert stop")), vec!["No active alert."]);
    }

    #[test]
    fn alert_below_and_invalid() {
        let (mut sh, _) = crypto_shell();
        assert_eq!(
            texts(&exec(&mut sh, "alert SOL 100")),
            vec!["Alert set: SOL below $100 (current $145.2)"]
        );
        let usage = OutputLine::error("Usage: alert <symbol> <target> | alert stop");
        assert_eq!(exec(&mut sh, "alert BTC"), vec![usage.clone()]);
        assert_eq!(exec(&mut sh, "alert BTC -5"), vec![usage]);
    }

    #[test]
    fn alert_needs_current_price() {
        let (mut sh, net) = crypto_shell();
        net.set_online(false);
        assert_eq!(
            exec(&mut sh, "alert BTC 1"),
            vec![OutputLine::error("Error: Could not fetch price for BTC")]
        );
        assert!(sh.scheduler().alert().is_none());
    }
}
