//! The dispatcher: input queue, line editing, command routing, and the
//! scheduler tick.
//!
//! Lines are handled strictly one after another. [`Shell::submit`] only
//! queues; [`Shell::process_queue`] runs each queued line to completion
//! (including any blocking network call its handler makes) before taking
//! the next one, so handlers never interleave their output or mutations.

use std::collections::VecDeque;
use std::time::Instant;

use devterm_platform::{DesktopPlatform, NetworkClient, Persistence, TimeService};
use devterm_types::config::TerminalConfig;
use devterm_types::error::DevtermError;
use devterm_types::input::InputEvent;
use devterm_vfs::FilesystemTree;

use crate::commands::register_builtins;
use crate::display::DisplaySink;
use crate::interpreter::{CommandOutput, CommandRegistry, Environment, Program, StyleTag};
use crate::market_commands::format_usd;
use crate::rng::SimpleRng;
use crate::scheduler::Scheduler;
use crate::session::{Profile, SessionState};

/// External collaborators of a shell.
pub struct Services {
    pub time: Box<dyn TimeService>,
    pub network: Box<dyn NetworkClient>,
}

impl Services {
    /// Std clock with the offline network client.
    pub fn desktop() -> Self {
        Self {
            time: Box::new(DesktopPlatform::new()),
            network: Box::new(DesktopPlatform::new()),
        }
    }
}

/// Result of completing a partial command name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    NoMatch,
    Unique(String),
    Ambiguous(Vec<String>),
}

/// An interactive session.
pub struct Shell {
    registry: CommandRegistry,
    session: SessionState,
    fs: FilesystemTree,
    store: Persistence,
    scheduler: Scheduler,
    rng: SimpleRng,
    services: Services,
    profile: Profile,
    queue: VecDeque<String>,
    input: String,
    exit_requested: bool,
    launch: Option<Program>,
}

impl Shell {
    /// Restore (or seed) the filesystem and session from `store` and
    /// register every built-in command.
    pub fn new(config: &TerminalConfig, store: Persistence, services: Services) -> Self {
        let profile = Profile::from_config(config);
        let fs = FilesystemTree::load(store.clone());
        let session = SessionState::restore(&store, &fs, &profile);
        let mut registry = CommandRegistry::new();
        register_builtins(&mut registry);
        log::info!(
            "Session ready: mode={} cwd={} user={}@{}",
            session.mode,
            session.cwd,
            profile.user,
            profile.hostname
        );
        Self {
            registry,
            session,
            fs,
            store,
            scheduler: Scheduler::new(),
            rng: SimpleRng::from_time(),
            services,
            profile,
            queue: VecDeque::new(),
            input: String::new(),
            exit_requested: false,
            launch: None,
        }
    }

    /// Replace the random source with a seeded one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SimpleRng::new(seed);
        self
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn fs(&self) -> &FilesystemTree {
        &self.fs
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The editable input line.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Program the last command asked the host to run, if any.
    pub fn take_launch(&mut self) -> Option<Program> {
        self.launch.take()
    }

    /// `user@host [mode]:cwd$`, with the home directory shown as `~`.
    pub fn prompt(&self) -> String {
        let cwd = &self.session.cwd;
        let home = &self.profile.home;
        let location = match cwd.segments().strip_prefix(home.segments()) {
            Some([]) => "~".to_string(),
            Some(rest) => format!("~/{}", rest.join("/")),
            None => cwd.to_string(),
        };
        format!(
            "{}@{} [{}]:{}$",
            self.profile.user, self.profile.hostname, self.session.mode, location
        )
    }

    /// Startup banner.
    pub fn boot(&self, display: &mut dyn DisplaySink) {
        let system = Some(StyleTag::System);
        let success = Some(StyleTag::Success);
        display.write("BIOS CHECK ...................................... [OK]", system);
        display.write("LOADING KERNEL .................................. [OK]", system);
        display.write("MOUNTING VOLUMES ................................ [OK]", system);
        display.write("NETWORK INTERFACE ............................... [ONLINE]", system);
        display.write("Dev Terminal System v1.0", success);
        display.write("Type 'help' to see commands.", None);
        display.write(
            "Type 'mode dev | crypto | network | tools | fs | fun' to switch.",
            None,
        );
        display.write("System ready.", success);
        display.write("----------------------------------------", system);
    }

    // -- queue --------------------------------------------------------------

    /// Queue a raw line for dispatch.
    pub fn submit(&mut self, line: impl Into<String>) {
        self.queue.push_back(line.into());
    }

    /// Number of queued lines.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Dispatch queued lines in order until the queue is empty or a command
    /// ends the session.
    pub fn process_queue(&mut self, display: &mut dyn DisplaySink) {
        while let Some(line) = self.queue.pop_front() {
            self.dispatch(&line, display);
            if self.exit_requested {
                if !self.queue.is_empty() {
                    log::debug!("Dropping {} queued line(s) after exit", self.queue.len());
                }
                self.queue.clear();
                break;
            }
        }
    }

    /// Submit one line and process it immediately.
    pub fn run_line(&mut self, line: &str, display: &mut dyn DisplaySink) {
        self.submit(line);
        self.process_queue(display);
    }

    fn dispatch(&mut self, raw: &str, display: &mut dyn DisplaySink) {
        let line = raw.trim();
        if line.is_empty() {
            return;
        }
        self.session.record(line);
        display.write(&format!("{} {line}", self.prompt()), None);

        let (first, rest) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));
        let name = first.to_ascii_lowercase();
        let raw_args = rest.trim_start();
        let args: Vec<&str> = raw_args.split_whitespace().collect();

        let Some(cmd) = self.registry.resolve(&name, self.session.mode) else {
            log::debug!("unknown command '{name}' in {} mode", self.session.mode);
            let err = DevtermError::CommandNotFound(name);
            display.write(&err.to_string(), Some(StyleTag::Error));
            return;
        };
        log::debug!("dispatch {name} ({} args)", args.len());

        let mut env = Environment {
            session: &mut self.session,
            fs: &mut self.fs,
            store: &self.store,
            commands: &self.registry,
            scheduler: &mut self.scheduler,
            rng: &mut self.rng,
            time: self.services.time.as_ref(),
            network: self.services.network.as_ref(),
            profile: &self.profile,
            raw_args,
            now: Instant::now(),
        };
        match cmd.execute(&args, &mut env) {
            Ok(output) => self.render(output, display),
            Err(e) => {
                log::debug!("{name} failed: {e}");
                display.write(&e.to_string(), Some(StyleTag::Error));
            },
        }
    }

    fn render(&mut self, output: CommandOutput, display: &mut dyn DisplaySink) {
        match output {
            CommandOutput::Text(text) => {
                for line in text.split('\n') {
                    display.write(line, None);
                }
            },
            CommandOutput::Lines(lines) => {
                for line in &lines {
                    display.write(&line.text, line.style);
                }
            },
            CommandOutput::None => {},
            CommandOutput::Clear => display.clear(),
            CommandOutput::Exit { message } => {
                display.write(&message, Some(StyleTag::Success));
                log::info!("Exit requested");
                self.exit_requested = true;
            },
            CommandOutput::Launch(program) => {
                for line in program.intro() {
                    display.write(line, Some(StyleTag::System));
                }
                log::info!("Launching {program:?}");
                self.launch = Some(program);
            },
        }
    }

    // -- line editing -------------------------------------------------------

    /// Complete `partial` against the commands of the active mode.
    pub fn autocomplete(&self, partial: &str) -> Completion {
        let mut matches = self.registry.completions(partial, self.session.mode);
        match matches.len() {
            0 => Completion::NoMatch,
            1 => Completion::Unique(matches.remove(0)),
            _ => Completion::Ambiguous(matches),
        }
    }

    /// Tab: complete the editable line in place, or list the candidates.
    pub fn complete(&mut self, display: &mut dyn DisplaySink) {
        match self.autocomplete(&self.input) {
            Completion::NoMatch => {},
            Completion::Unique(name) => self.input = format!("{name} "),
            Completion::Ambiguous(names) => {
                display.write(&names.join("  "), Some(StyleTag::System));
            },
        }
    }

    /// Apply one line-editing event.
    pub fn handle_input(&mut self, event: InputEvent, display: &mut dyn DisplaySink) {
        match event {
            InputEvent::TextInput(ch) => self.input.push(ch),
            InputEvent::Backspace => {
                self.input.pop();
            },
            InputEvent::Submit => {
                let line = std::mem::take(&mut self.input);
                self.run_line(&line, display);
            },
            InputEvent::HistoryBack => {
                if let Some(entry) = self.session.history_back() {
                    self.input = entry.to_string();
                }
            },
            InputEvent::HistoryForward => {
                self.input = self.session.history_forward().to_string();
            },
            InputEvent::Complete => self.complete(display),
            InputEvent::Interrupt => {
                display.write(&format!("{} {}^C", self.prompt(), self.input), None);
                self.input.clear();
            },
            InputEvent::Quit => self.exit_requested = true,
        }
    }

    // -- background ---------------------------------------------------------

    /// Run whatever the scheduler has due at `now`.
    pub fn tick(&mut self, now: Instant, display: &mut dyn DisplaySink) {
        for seconds in self.scheduler.expire_timers(now) {
            display.write(
                &format!("TIMER DONE: {seconds} seconds elapsed."),
                Some(StyleTag::Success),
            );
        }
        let Some(alert) = self.scheduler.poll_alert(now) else {
            return;
        };
        match self.services.network.price(&alert.symbol) {
            Ok(price) if alert.is_reached(price) => {
                self.scheduler.stop_watch();
                log::info!("price alert fired: {} at {price}", alert.symbol);
                display.write(
                    &format!(
                        "ALERT: {} reached {} (target {})",
                        alert.symbol,
                        format_usd(price),
                        format_usd(alert.target)
                    ),
                    Some(StyleTag::Success),
                );
            },
            Ok(price) => log::debug!("alert poll: {} at {price}", alert.symbol),
            Err(e) => log::warn!("alert poll for {} failed: {e}", alert.symbol),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::display::BufferDisplay;
    use crate::interpreter::OutputLine;
    use crate::session::{HistoryCursor, Mode};
    use crate::test_support::{FakeNetwork, exec, test_shell, test_shell_with, texts};
    use devterm_platform::keys;

    #[test]
    fn initial_state() {
        let (sh, _) = test_shell();
        assert_eq!(sh.session().mode, Mode::Development);
        assert_eq!(sh.session().cwd.to_string(), "/home/user");
        assert_eq!(sh.prompt(), "user@pro-sys [dev]:~$");
    }

    #[test]
    fn empty_line_is_ignored() {
        let (mut sh, _) = test_shell();
        let mut d = BufferDisplay::new();
        sh.run_line("   ", &mut d);
        assert!(d.lines().is_empty());
        assert!(sh.session().history().is_empty());
    }

    #[test]
    fn line_is_echoed_with_prompt_and_recorded() {
        let (mut sh, _) = test_shell();
        let mut d = BufferDisplay::new();
        sh.run_line("  about  ", &mut d);
        assert_eq!(d.texts()[0], "user@pro-sys [dev]:~$ about");
        assert_eq!(sh.session().history(), ["about"]);
        assert_eq!(sh.session().cursor(), HistoryCursor::PastEnd);
    }

    #[test]
    fn unknown_command_is_error_line() {
        let (mut sh, _) = test_shell();
        let out = exec(&mut sh, "Frobnicate now");
        assert_eq!(out, vec![OutputLine::error("Command not found: frobnicate")]);
    }

    #[test]
    fn mode_command_not_available_elsewhere() {
        let (mut sh, _) = test_shell();
        let out = exec(&mut sh, "ls");
        assert_eq!(texts(&out), vec!["Command not found: ls"]);
    }

    #[test]
    fn command_names_are_case_insensitive() {
        let (mut sh, _) = test_shell();
        let out = exec(&mut sh, "ABOUT");
        assert_eq!(texts(&out)[0], "Pro Terminal System v1.0");
    }

    #[test]
    fn handler_error_is_single_error_line() {
        let (mut sh, _) = test_shell();
        exec(&mut sh, "mode fs");
        let out = exec(&mut sh, "cat missing.txt");
        assert_eq!(out, vec![OutputLine::error("Not found: /home/user/missing.txt")]);
    }

    #[test]
    fn filesystem_scenario() {
        let (mut sh, _) = test_shell();
        exec(&mut sh, "mode fs");
        assert!(exec(&mut sh, "cd /home/user").is_empty());
        assert_eq!(texts(&exec(&mut sh, "touch notes.txt")), vec!["File created: notes.txt"]);
        assert_eq!(texts(&exec(&mut sh, "echo \"hi\" > notes.txt")), vec!["Written to notes.txt"]);
        assert_eq!(texts(&exec(&mut sh, "cat notes.txt")), vec!["hi"]);
    }

    #[test]
    fn queue_runs_in_order() {
        let (mut sh, _) = test_shell();
        let mut d = BufferDisplay::new();
        sh.submit("mode fs");
        sh.submit("mkdir docs");
        sh.submit("mkdir docs");
        assert_eq!(sh.pending(), 3);
        sh.process_queue(&mut d);
        assert_eq!(sh.pending(), 0);
        let t = d.texts();
        assert!(t.contains(&"Directory created: docs"));
        assert_eq!(t.last(), Some(&"Already exists: docs"));
    }

    #[test]
    fn exit_stops_queue() {
        let (mut sh, _) = test_shell();
        let mut d = BufferDisplay::new();
        sh.submit("exit");
        sh.submit("about");
        sh.process_queue(&mut d);
        assert!(sh.exit_requested());
        assert_eq!(d.last(), Some(&OutputLine::success("Goodbye!")));
        assert_eq!(sh.pending(), 0);
        assert_eq!(sh.session().history(), ["exit"]);
    }

    #[test]
    fn clear_empties_display() {
        let (mut sh, _) = test_shell();
        let mut d = BufferDisplay::new();
        sh.run_line("about", &mut d);
        sh.run_line("clear", &mut d);
        assert!(d.lines().is_empty());
    }

    #[test]
    fn autocomplete_unique_and_ambiguous() {
        let (mut sh, _) = test_shell();
        exec(&mut sh, "mode fs");
        assert_eq!(sh.autocomplete("l"), Completion::Unique("ls".into()));
        assert_eq!(
            sh.autocomplete("c"),
            Completion::Ambiguous(vec![
                "cat".into(),
                "cd".into(),
                "clear".into(),
                "color".into()
            ])
        );
        assert_eq!(sh.autocomplete("zz"), Completion::NoMatch);
        assert_eq!(sh.autocomplete("L"), Completion::NoMatch);
    }

    #[test]
    fn tab_completes_input_line() {
        let (mut sh, _) = test_shell();
        exec(&mut sh, "mode fs");
        let mut d = BufferDisplay::new();
        sh.set_input("tr");
        sh.handle_input(InputEvent::Complete, &mut d);
        assert_eq!(sh.input(), "tree ");
        assert!(d.lines().is_empty());

        sh.set_input("c");
        sh.handle_input(InputEvent::Complete, &mut d);
        assert_eq!(sh.input(), "c");
        assert_eq!(d.lines(), [OutputLine::system("cat  cd  clear  color")]);
    }

    #[test]
    fn history_navigation_through_input_events() {
        let (mut sh, _) = test_shell();
        let mut d = BufferDisplay::new();
        for ch in "date".chars() {
            sh.handle_input(InputEvent::TextInput(ch), &mut d);
        }
        sh.handle_input(InputEvent::Submit, &mut d);
        sh.run_line("time", &mut d);
        assert_eq!(sh.input(), "");

        sh.handle_input(InputEvent::HistoryBack, &mut d);
        assert_eq!(sh.input(), "time");
        sh.handle_input(InputEvent::HistoryBack, &mut d);
        sh.handle_input(InputEvent::HistoryBack, &mut d);
        assert_eq!(sh.input(), "date");
        sh.handle_input(InputEvent::HistoryForward, &mut d);
        assert_eq!(sh.input(), "time");
        sh.handle_input(InputEvent::HistoryForward, &mut d);
        assert_eq!(sh.input(), "");
    }

    #[test]
    fn backspace_interrupt_and_quit() {
        let (mut sh, _) = test_shell();
        let mut d = BufferDisplay::new();
        sh.set_input("abc");
        sh.handle_input(InputEvent::Backspace, &mut d);
        assert_eq!(sh.input(), "ab");
        sh.handle_input(InputEvent::Interrupt, &mut d);
        assert_eq!(sh.input(), "");
        assert_eq!(d.texts(), vec!["user@pro-sys [dev]:~$ ab^C"]);
        assert!(sh.session().history().is_empty());
        sh.handle_input(InputEvent::Quit, &mut d);
        assert!(sh.exit_requested());
    }

    #[test]
    fn prompt_tracks_mode_and_cwd() {
        let (mut sh, _) = test_shell();
        exec(&mut sh, "mode fs");
        exec(&mut sh, "cd documents");
        assert_eq!(sh.prompt(), "user@pro-sys [fs]:~/documents$");
        exec(&mut sh, "cd /etc");
        assert_eq!(sh.prompt(), "user@pro-sys [fs]:/etc$");
    }

    #[test]
    fn timer_fires_on_tick() {
        let (mut sh, _) = test_shell();
        exec(&mut sh, "mode tools");
        let out = exec(&mut sh, "timer 5");
        assert_eq!(out, vec![OutputLine::system("Timer set for 5 seconds...")]);

        let mut d = BufferDisplay::new();
        sh.tick(Instant::now(), &mut d);
        assert!(d.lines().is_empty());
        sh.tick(Instant::now() + Duration::from_secs(6), &mut d);
        assert_eq!(d.lines(), [OutputLine::success("TIMER DONE: 5 seconds elapsed.")]);
        assert_eq!(sh.scheduler().pending_timers(), 0);
    }

    #[test]
    fn price_alert_fires_when_target_reached() {
        let (mut sh, net) = test_shell();
        exec(&mut sh, "mode crypto");
        exec(&mut sh, "alert BTC 100000");
        assert!(sh.scheduler().alert().is_some());

        let mut d = BufferDisplay::new();
        let later = Instant::now() + Duration::from_secs(11);
        sh.tick(later, &mut d);
        assert!(d.lines().is_empty());

        net.set_price("BTC", 100_500.0);
        sh.tick(later + Duration::from_secs(11), &mut d);
        assert_eq!(
            d.lines(),
            [OutputLine::success("ALERT: BTC reached $100,500 (target $100,000)")]
        );
        assert!(sh.scheduler().alert().is_none());
    }

    #[test]
    fn alert_poll_failure_keeps_watching() {
        let (mut sh, net) = test_shell();
        exec(&mut sh, "mode crypto");
        exec(&mut sh, "alert ETH 5000");
        net.set_online(false);
        let mut d = BufferDisplay::new();
        sh.tick(Instant::now() + Duration::from_secs(11), &mut d);
        assert!(d.lines().is_empty());
        assert!(sh.scheduler().alert().is_some());
    }

    #[test]
    fn state_survives_restart() {
        let store = Persistence::in_memory();
        {
            let mut sh = test_shell_with(store.clone(), FakeNetwork::online());
            exec(&mut sh, "mode fs");
            exec(&mut sh, "mkdir src");
            exec(&mut sh, "theme dracula");
        }
        let sh = test_shell_with(store.clone(), FakeNetwork::online());
        assert_eq!(sh.session().mode, Mode::Filesystem);
        assert!(sh.fs().is_directory(&devterm_vfs::AbsolutePath::parse("/home/user/src")));
        assert_eq!(store.get(keys::THEME).as_deref(), Some("dracula"));
        assert_eq!(sh.session().presentation.theme.name(), "dracula");
    }

    #[test]
    fn snake_sets_launch_signal() {
        let (mut sh, _) = test_shell();
        exec(&mut sh, "mode fun");
        let out = exec(&mut sh, "snake");
        assert_eq!(out.len(), 2);
        assert_eq!(sh.take_launch(), Some(Program::Snake));
        assert_eq!(sh.take_launch(), None);
    }

    #[test]
    fn boot_banner_ends_ready() {
        let (sh, _) = test_shell();
        let mut d = BufferDisplay::new();
        sh.boot(&mut d);
        assert!(d.texts().contains(&"System ready."));
    }
}
