//! Novelty mode: snake, matrix, cowsay, fortune, banner, weather, joke,
//! blackjack.

use devterm_platform::{Persistence, keys};
use devterm_types::error::{DevtermError, Result};

use crate::blackjack::{Outcome, Round, STARTING_BALANCE, show_hand};
use crate::interpreter::{
    Command, CommandOutput, CommandRegistry, Environment, OutputLine, Program,
};
use crate::session::Mode;

pub fn register_fun_commands(reg: &mut CommandRegistry) {
    reg.register(Mode::Novelty, Box::new(SnakeCmd));
    reg.register(Mode::Novelty, Box::new(MatrixCmd));
    reg.register(Mode::Novelty, Box::new(CowsayCmd));
    reg.register(Mode::Novelty, Box::new(FortuneCmd));
    reg.register(Mode::Novelty, Box::new(BannerCmd));
    reg.register(Mode::Novelty, Box::new(WeatherCmd));
    reg.register(Mode::Novelty, Box::new(JokeCmd));
    reg.register(Mode::Novelty, Box::new(BlackjackCmd));
}

// ---------------------------------------------------------------------------
// snake / matrix
// ---------------------------------------------------------------------------

struct SnakeCmd;
impl Command for SnakeCmd {
    fn name(&self) -> &str {
        "snake"
    }
    fn description(&self) -> &str {
        "Play Snake game"
    }
    fn usage(&self) -> &str {
        "snake"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Launch(Program::Snake))
    }
}

const MATRIX_WIDTH: usize = 48;
const MATRIX_HEIGHT: usize = 10;
const MATRIX_GLYPHS: &str = "01アイウエオカキクケコサシスセソタチツテト日月火水木金土";

struct MatrixCmd;
impl Command for MatrixCmd {
    fn name(&self) -> &str {
        "matrix"
    }
    fn description(&self) -> &str {
        "Matrix effect"
    }
    fn usage(&self) -> &str {
        "matrix"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let glyphs: Vec<char> = MATRIX_GLYPHS.chars().collect();
        let mut lines = vec![OutputLine::success("Entering the Matrix...")];
        for _ in 0..MATRIX_HEIGHT {
            let row: String = (0..MATRIX_WIDTH)
                .map(|_| {
                    // roughly one cell in four is blank
                    if env.rng.below(4) == 0 {
                        ' '
                    } else {
                        *env.rng.choose(&glyphs)
                    }
                })
                .collect();
            lines.push(OutputLine::success(row.trim_end().to_string()));
        }
        Ok(CommandOutput::Lines(lines))
    }
}

// ---------------------------------------------------------------------------
// cowsay / fortune / banner / joke
// ---------------------------------------------------------------------------

const COW: &str = r"        \   ^__^
         \  (oo)\_______
            (__)\       )\/\
                ||----w |
                ||     ||";

struct CowsayCmd;
impl Command for CowsayCmd {
    fn name(&self) -> &str {
        "cowsay"
    }
    fn description(&self) -> &str {
        "Cowsay (e.g., cowsay Hello)"
    }
    fn usage(&self) -> &str {
        "cowsay [text]"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let text = if args.is_empty() {
            "Hello from the terminal!".to_string()
        } else {
            args.join(" ")
        };
        Ok(CommandOutput::Text(cowsay(&text)))
    }
}

fn cowsay(text: &str) -> String {
    let width = text.chars().count() + 2;
    format!(
        " {}\n< {text} >\n {}\n{COW}",
        "_".repeat(width),
        "-".repeat(width)
    )
}

const FORTUNES: &[&str] = &[
    "The best code is no code at all.",
    "There are only two hard things: cache invalidation and naming things.",
    "It works on my machine!",
    "To err is human; to really foul things up requires a computer.",
    "Talk is cheap. Show me the code. -- Linus Torvalds",
    "Any sufficiently advanced technology is indistinguishable from magic.",
    "Debugging is twice as hard as writing the code in the first place.",
    "First, solve the problem. Then, write the code.",
    "In theory, there is no difference between theory and practice.",
    "It's not a bug, it's a feature.",
];

struct FortuneCmd;
impl Command for FortuneCmd {
    fn name(&self) -> &str {
        "fortune"
    }
    fn description(&self) -> &str {
        "Random quote"
    }
    fn usage(&self) -> &str {
        "fortune"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::text(*env.rng.choose(FORTUNES)))
    }
}

struct BannerCmd;
impl Command for BannerCmd {
    fn name(&self) -> &str {
        "banner"
    }
    fn description(&self) -> &str {
        "ASCII art banner (e.g., banner CODE)"
    }
    fn usage(&self) -> &str {
        "banner [text]"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let text = if args.is_empty() {
            "CODE".to_string()
        } else {
            args.join(" ")
        };
        Ok(CommandOutput::Text(banner(&text)))
    }
}

/// Five rows of block letters, one glyph per character.
fn banner(text: &str) -> String {
    let mut rows = vec![String::new(); 5];
    for ch in text.to_uppercase().chars() {
        for (row, piece) in rows.iter_mut().zip(glyph(ch)) {
            row.push_str(piece);
            row.push(' ');
        }
    }
    rows.iter()
        .map(|r| r.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

fn glyph(ch: char) -> [&'static str; 5] {
    match ch {
        'A' => [" ## ", "#  #", "####", "#  #", "#  #"],
        'B' => ["### ", "#  #", "### ", "#  #", "### "],
        'C' => [" ###", "#   ", "#   ", "#   ", " ###"],
        'D' => ["### ", "#  #", "#  #", "#  #", "### "],
        'E' => ["####", "#   ", "### ", "#   ", "####"],
        'F' => ["####", "#   ", "### ", "#   ", "#   "],
        'G' => [" ###", "#   ", "# ##", "#  #", " ###"],
        'H' => ["#  #", "#  #", "####", "#  #", "#  #"],
        'I' => ["###", " # ", " # ", " # ", "###"],
        'J' => ["  ##", "   #", "   #", "#  #", " ## "],
        'K' => ["#  #", "# # ", "##  ", "# # ", "#  #"],
        'L' => ["#   ", "#   ", "#   ", "#   ", "####"],
        'M' => ["#   #", "## ##", "# # #", "#   #", "#   #"],
        'N' => ["#  #", "## #", "# ##", "#  #", "#  #"],
        'O' | '0' => [" ## ", "#  #", "#  #", "#  #", " ## "],
        'P' => ["### ", "#  #", "### ", "#   ", "#   "],
        'Q' => [" ## ", "#  #", "#  #", "# ##", " ###"],
        'R' => ["### ", "#  #", "### ", "# # ", "#  #"],
        'S' => [" ###", "#   ", " ## ", "   #", "### "],
        'T' => ["#####", "  #  ", "  #  ", "  #  ", "  #  "],
        'U' => ["#  #", "#  #", "#  #", "#  #", " ## "],
        'V' => ["#   #", "#   #", " # # ", " # # ", "  #  "],
        'W' => ["#   #", "#   #", "# # #", "## ##", "#   #"],
        'X' => ["#   #", " # # ", "  #  ", " # # ", "#   #"],
        'Y' => ["#   #", " # # ", "  #  ", "  #  ", "  #  "],
        'Z' => ["####", "   #", "  # ", " #  ", "####"],
        '1' => [" # ", "## ", " # ", " # ", "###"],
        '2' => ["### ", "   #", " ## ", "#   ", "####"],
        '3' => ["### ", "   #", " ## ", "   #", "### "],
        '4' => ["#  #", "#  #", "####", "   #", "   #"],
        '5' => ["####", "#   ", "### ", "   #", "### "],
        '6' => [" ## ", "#   ", "### ", "#  #", " ## "],
        '7' => ["####", "   #", "  # ", " #  ", " #  "],
        '8' => [" ## ", "#  #", " ## ", "#  #", " ## "],
        '9' => [" ## ", "#  #", " ###", "   #", " ## "],
        '!' => ["#", "#", "#", " ", "#"],
        ' ' => ["  ", "  ", "  ", "  ", "  "],
        _ => ["   ", " ? ", "   ", "   ", "   "],
    }
}

const JOKES: &[&str] = &[
    "Why do programmers prefer dark mode? Because light attracts bugs!",
    "How many programmers does it take to change a light bulb? None, that's a hardware problem.",
    "Why do Java developers wear glasses? Because they don't C#.",
    "A SQL query walks into a bar, walks up to two tables and asks... 'Can I join you?'",
    "There are 10 types of people in the world: those who understand binary, and those who don't.",
];

struct JokeCmd;
impl Command for JokeCmd {
    fn name(&self) -> &str {
        "joke"
    }
    fn description(&self) -> &str {
        "Random programming joke"
    }
    fn usage(&self) -> &str {
        "joke"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::text(*env.rng.choose(JOKES)))
    }
}

// ---------------------------------------------------------------------------
// weather
// ---------------------------------------------------------------------------

struct WeatherCmd;
impl Command for WeatherCmd {
    fn name(&self) -> &str {
        "weather"
    }
    fn description(&self) -> &str {
        "Get weather (e.g., weather Paris)"
    }
    fn usage(&self) -> &str {
        "weather [city]"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let city = args.first().copied().unwrap_or("Paris");
        let mut lines = vec![OutputLine::system(format!("Fetching weather for {city}..."))];
        match env.network.weather(city) {
            Ok(w) => lines.extend([
                OutputLine::plain(format!("Temperature: {}°C", w.temp_c)),
                OutputLine::plain(format!("Condition: {}", w.description)),
                OutputLine::plain(format!("Humidity: {}%", w.humidity)),
                OutputLine::plain(format!("Wind: {} km/h", w.wind_kmh)),
            ]),
            Err(e) => {
                log::warn!("weather {city}: {e}");
                lines.push(OutputLine::error("Could not fetch weather data."));
            },
        }
        Ok(CommandOutput::Lines(lines))
    }
}

// ---------------------------------------------------------------------------
// blackjack
// ---------------------------------------------------------------------------

const BLACKJACK_USAGE: &str =
    "Usage: blackjack <bet> | blackjack hit | blackjack stand | blackjack balance";

fn load_balance(store: &Persistence) -> u64 {
    store
        .get(keys::BLACKJACK_BALANCE)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(STARTING_BALANCE)
}

fn save_balance(store: &Persistence, balance: u64) {
    store.set(keys::BLACKJACK_BALANCE, &balance.to_string());
}

struct BlackjackCmd;
impl Command for BlackjackCmd {
    fn name(&self) -> &str {
        "blackjack"
    }
    fn description(&self) -> &str {
        "Play blackjack (e.g., blackjack 50)"
    }
    fn usage(&self) -> &str {
        "blackjack <bet> | hit | stand | balance"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        match args.first().copied() {
            None | Some("balance") => Ok(CommandOutput::Text(format!(
                "Balance: ${}",
                load_balance(env.store)
            ))),
            Some("hit") => hit(env),
            Some("stand") => stand(env),
            Some(bet) => {
                let bet: u64 = bet
                    .parse()
                    .ok()
                    .filter(|&b| b > 0)
                    .ok_or_else(|| DevtermError::usage(BLACKJACK_USAGE))?;
                deal(bet, env)
            },
        }
    }
}

fn deal(bet: u64, env: &mut Environment<'_>) -> Result<CommandOutput> {
    if env.session.blackjack.is_some() {
        return Err(DevtermError::usage(
            "Game in progress! Use blackjack hit or blackjack stand.",
        ));
    }
    let balance = load_balance(env.store);
    if bet > balance {
        return Err(DevtermError::usage("Insufficient balance!"));
    }
    save_balance(env.store, balance - bet);

    let round = Round::deal(bet, env.rng);
    let dealer_up = round
        .dealer
        .first()
        .map(ToString::to_string)
        .unwrap_or_default();
    let lines = vec![
        OutputLine::system(format!("Bet placed: ${bet}")),
        OutputLine::plain(format!(
            "Your hand: {} ({})",
            show_hand(&round.player),
            round.player_value()
        )),
        OutputLine::plain(format!("Dealer shows: {dealer_up} ??")),
        OutputLine::system("Type 'blackjack hit' or 'blackjack stand'."),
    ];
    env.session.blackjack = Some(round);
    Ok(CommandOutput::Lines(lines))
}

fn hit(env: &mut Environment<'_>) -> Result<CommandOutput> {
    let round = env
        .session
        .blackjack
        .as_mut()
        .ok_or_else(|| DevtermError::usage("No active game!"))?;
    if round.hit().is_none() {
        return Err(DevtermError::usage("No cards left in the deck!"));
    }
    let mut lines = vec![OutputLine::plain(format!(
        "Your hand: {} ({})",
        show_hand(&round.player),
        round.player_value()
    ))];
    if round.is_bust() {
        let bet = round.bet;
        env.session.blackjack = None;
        lines.push(OutputLine::error(format!(
            "Bust! You lose ${bet}. Balance: ${}",
            load_balance(env.store)
        )));
    }
    Ok(CommandOutput::Lines(lines))
}

fn stand(env: &mut Environment<'_>) -> Result<CommandOutput> {
    let mut round = env
        .session
        .blackjack
        .take()
        .ok_or_else(|| DevtermError::usage("No active game!"))?;
    round.play_dealer();
    let outcome = round.settle();
    let balance = load_balance(env.store) + outcome.payout(round.bet);
    save_balance(env.store, balance);
    log::debug!("blackjack settled {outcome:?}, balance {balance}");

    let result = match outcome {
        Outcome::Win => OutputLine::success(format!("You win ${}! Balance: ${balance}", round.bet)),
        Outcome::Push => OutputLine::system(format!("Push. Bet returned. Balance: ${balance}")),
        Outcome::Lose => OutputLine::error(format!("Dealer wins. Balance: ${balance}")),
    };
    Ok(CommandOutput::Lines(vec![
        OutputLine::plain(format!(
            "Your hand: {} ({})",
            show_hand(&round.player),
            round.player_value()
        )),
        OutputLine::plain(format!(
            "Dealer's hand: {} ({})",
            show_hand(&round.dealer),
            round.dealer_value()
        )),
        result,
    ]))
}
