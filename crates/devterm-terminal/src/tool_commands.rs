//! Utilities mode: password, note, task, timer, random, export, stats.

use std::collections::HashMap;

use devterm_platform::keys;
use devterm_types::error::{DevtermError, Result};
use serde::{Deserialize, Serialize};

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment, OutputLine};
use crate::session::Mode;

const PASSWORD_CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()_+";
const DEFAULT_PASSWORD_LEN: usize = 12;
const MAX_PASSWORD_LEN: usize = 256;

pub fn register_tool_commands(reg: &mut CommandRegistry) {
    reg.register(Mode::Utilities, Box::new(PasswordCmd));
    reg.register(Mode::Utilities, Box::new(NoteCmd));
    reg.register(Mode::Utilities, Box::new(TaskCmd));
    reg.register(Mode::Utilities, Box::new(TimerCmd));
    reg.register(Mode::Utilities, Box::new(RandomCmd));
    reg.register(Mode::Utilities, Box::new(ExportCmd));
    reg.register(Mode::Utilities, Box::new(StatsCmd));
}

/// A to-do entry as stored under `tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub text: String,
    pub done: bool,
}

// ---------------------------------------------------------------------------
// password
// ---------------------------------------------------------------------------

struct PasswordCmd;
impl Command for PasswordCmd {
    fn name(&self) -> &str {
        "password"
    }
    fn description(&self) -> &str {
        "Generate password"
    }
    fn usage(&self) -> &str {
        "password [length]"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let len = args
            .first()
            .and_then(|a| a.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_PASSWORD_LEN);
        if len > MAX_PASSWORD_LEN {
            return Err(DevtermError::usage(format!(
                "Error: Password length must be at most {MAX_PASSWORD_LEN}"
            )));
        }
        let password: String = (0..len)
            .map(|_| *env.rng.choose(PASSWORD_CHARSET) as char)
            .collect();
        Ok(CommandOutput::Text(format!("Generated Password: {password}")))
    }
}

// ---------------------------------------------------------------------------
// note / task
// ---------------------------------------------------------------------------

struct NoteCmd;
impl Command for NoteCmd {
    fn name(&self) -> &str {
        "note"
    }
    fn description(&self) -> &str {
        "Manage notes (add | list | clear)"
    }
    fn usage(&self) -> &str {
        "note add <content> | note list | note clear"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut notes: Vec<String> = env.store.get_json(keys::NOTES).unwrap_or_default();
        match args {
            ["add", content @ ..] if !content.is_empty() => {
                notes.push(content.join(" "));
                env.store.set_json(keys::NOTES, &notes);
                Ok(CommandOutput::text("Note added."))
            },
            ["list", ..] => {
                let mut lines = vec!["--- Notes ---".to_string()];
                lines.extend(notes.iter().enumerate().map(|(i, n)| format!("{}. {n}", i + 1)));
                Ok(CommandOutput::Text(lines.join("\n")))
            },
            ["clear", ..] => {
                env.store.set_json(keys::NOTES, &Vec::<String>::new());
                Ok(CommandOutput::text("Notes cleared."))
            },
            _ => Err(DevtermError::usage(
                "Usage: note add <content> | note list | note clear",
            )),
        }
    }
}

struct TaskCmd;
impl Command for TaskCmd {
    fn name(&self) -> &str {
        "task"
    }
    fn description(&self) -> &str {
        "Manage tasks (add | done | list | clear)"
    }
    fn usage(&self) -> &str {
        "task add <content> | task done <n> | task list | task clear"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut tasks: Vec<Task> = env.store.get_json(keys::TASKS).unwrap_or_default();
        match args {
            ["add", content @ ..] if !content.is_empty() => {
                tasks.push(Task {
                    text: content.join(" "),
                    done: false,
                });
                env.store.set_json(keys::TASKS, &tasks);
                Ok(CommandOutput::text("Task added."))
            },
            ["done", n, ..] => {
                let task = n
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| tasks.get_mut(i))
                    .ok_or_else(|| DevtermError::usage(format!("Error: No task {n}")))?;
                task.done = true;
                env.store.set_json(keys::TASKS, &tasks);
                Ok(CommandOutput::Text(format!("Task {n} marked done.")))
            },
            ["list", ..] => {
                let mut lines = vec!["--- Tasks ---".to_string()];
                lines.extend(tasks.iter().enumerate().map(|(i, t)| {
                    format!("{}. [{}] {}", i + 1, if t.done { 'x' } else { ' ' }, t.text)
                }));
                Ok(CommandOutput::Text(lines.join("\n")))
            },
            ["clear", ..] => {
                env.store.set_json(keys::TASKS, &Vec::<Task>::new());
                Ok(CommandOutput::text("Tasks cleared."))
            },
            _ => Err(DevtermError::usage(
                "Usage: task add <content> | task done <n> | task list | task clear",
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// timer / random
// ---------------------------------------------------------------------------

struct TimerCmd;
impl Command for TimerCmd {
    fn name(&self) -> &str {
        "timer"
    }
    fn description(&self) -> &str {
        "Set timer (e.g., timer 5)"
    }
    fn usage(&self) -> &str {
        "timer <seconds> | timer cancel"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        match args.first() {
            Some(&"cancel") => {
                let n = env.scheduler.cancel_timers();
                Ok(CommandOutput::Lines(vec![OutputLine::system(format!(
                    "Cancelled {n} timer(s)."
                ))]))
            },
            Some(secs) => {
                let seconds: u64 = secs
                    .parse()
                    .map_err(|_| DevtermError::usage("Usage: timer <seconds> | timer cancel"))?;
                if !env.scheduler.add_timer(env.now, seconds) {
                    return Err(DevtermError::usage("Error: Timer duration is too long"));
                }
                Ok(CommandOutput::Lines(vec![OutputLine::system(format!(
                    "Timer set for {seconds} seconds..."
                ))]))
            },
            None => Err(DevtermError::usage("Usage: timer <seconds> | timer cancel")),
        }
    }
}

struct RandomCmd;
impl Command for RandomCmd {
    fn name(&self) -> &str {
        "random"
    }
    fn description(&self) -> &str {
        "Generate random number (e.g., random 1 100)"
    }
    fn usage(&self) -> &str {
        "random [min] [max]"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let bound = |i: usize, default: i64| {
            args.get(i)
                .and_then(|a| a.parse::<i64>().ok())
                .unwrap_or(default)
        };
        let (min, max) = (bound(0, 0), bound(1, 100));
        if min > max {
            return Err(DevtermError::usage("Error: min must not exceed max"));
        }
        let n = env.rng.range_inclusive(min, max);
        Ok(CommandOutput::Text(format!("Random ({min}-{max}): {n}")))
    }
}

// ---------------------------------------------------------------------------
// export / stats
// ---------------------------------------------------------------------------

struct ExportCmd;
impl Command for ExportCmd {
    fn name(&self) -> &str {
        "export"
    }
    fn description(&self) -> &str {
        "Export data (notes | tasks)"
    }
    fn usage(&self) -> &str {
        "export <notes | tasks>"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (key, file, label) = match args.first() {
            Some(&"notes") => (keys::NOTES, "notes.json", "Notes"),
            Some(&"tasks") => (keys::TASKS, "tasks.json", "Tasks"),
            _ => return Err(DevtermError::usage("Usage: export <notes | tasks>")),
        };
        let data = env.store.get(key).unwrap_or_else(|| "[]".to_string());
        env.fs.write_file(&env.session.cwd, file, &data)?;
        let path = env.session.cwd.join(file)?;
        log::info!("exported {key} to {path}");
        Ok(CommandOutput::Text(format!("{label} exported to {path}.")))
    }
}

struct StatsCmd;
impl Command for StatsCmd {
    fn name(&self) -> &str {
        "stats"
    }
    fn description(&self) -> &str {
        "Show usage statistics"
    }
    fn usage(&self) -> &str {
        "stats"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let history = env.session.history();
        // (name, count) in order of first use
        let mut counts: Vec<(&str, usize)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for line in history {
            let base = line.split_whitespace().next().unwrap_or_default();
            match index.get(base) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(base, counts.len());
                    counts.push((base, 1));
                },
            }
        }
        // stable: ties keep first-use order
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let mut lines = vec![
            "--- Usage Statistics ---".to_string(),
            format!("Total commands: {}", history.len()),
            format!("Current mode: {}", env.session.mode),
            String::new(),
            "Top 5 commands:".to_string(),
        ];
        lines.extend(counts.iter().take(5).map(|(name, n)| format!("  {name}: {n}")));
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}
