//! Filesystem mode: ls, cd, pwd, mkdir, touch, cat, echo, rm, tree.

use std::sync::LazyLock;

use devterm_types::error::{DevtermError, Result};
use devterm_vfs::{WalkEntry, resolve};
use regex::Regex;

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment};
use crate::session::Mode;

/// `"<text>" > <name>`
static REDIRECT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"^"([^"]+)"\s*>\s*(.+)$"#)
        .inspect_err(|e| log::error!("echo redirect pattern: {e}"))
        .ok()
});

pub fn register_file_commands(reg: &mut CommandRegistry) {
    reg.register(Mode::Filesystem, Box::new(LsCmd));
    reg.register(Mode::Filesystem, Box::new(CdCmd));
    reg.register(Mode::Filesystem, Box::new(PwdCmd));
    reg.register(Mode::Filesystem, Box::new(MkdirCmd));
    reg.register(Mode::Filesystem, Box::new(TouchCmd));
    reg.register(Mode::Filesystem, Box::new(CatCmd));
    reg.register(Mode::Filesystem, Box::new(EchoCmd));
    reg.register(Mode::Filesystem, Box::new(RmCmd));
    reg.register(Mode::Filesystem, Box::new(TreeCmd));
}

fn required<'a>(args: &[&'a str], usage: &str) -> Result<&'a str> {
    args.first()
        .copied()
        .ok_or_else(|| DevtermError::usage(usage))
}

// ---------------------------------------------------------------------------
// ls
// ---------------------------------------------------------------------------

struct LsCmd;
impl Command for LsCmd {
    fn name(&self) -> &str {
        "ls"
    }
    fn description(&self) -> &str {
        "List directory contents"
    }
    fn usage(&self) -> &str {
        "ls [path]"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let target = resolve(args.first().copied().unwrap_or("."), &env.session.cwd);
        let entries = env.fs.list(&target)?;
        if entries.is_empty() {
            return Ok(CommandOutput::text("(empty)"));
        }
        let lines: Vec<String> = entries
            .into_iter()
            .map(|e| {
                if e.is_directory {
                    format!("{}/", e.name)
                } else {
                    e.name
                }
            })
            .collect();
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// cd / pwd
// ---------------------------------------------------------------------------

struct CdCmd;
impl Command for CdCmd {
    fn name(&self) -> &str {
        "cd"
    }
    fn description(&self) -> &str {
        "Change directory"
    }
    fn usage(&self) -> &str {
        "cd [path]"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let home = env.profile.home.to_string();
        let target = args.first().copied().unwrap_or(home.as_str());
        env.fs.change_directory(&mut env.session.cwd, target)?;
        Ok(CommandOutput::None)
    }
}

struct PwdCmd;
impl Command for PwdCmd {
    fn name(&self) -> &str {
        "pwd"
    }
    fn description(&self) -> &str {
        "Print working directory"
    }
    fn usage(&self) -> &str {
        "pwd"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(env.session.cwd.to_string()))
    }
}

// ---------------------------------------------------------------------------
// mkdir / touch / rm
// ---------------------------------------------------------------------------

struct MkdirCmd;
impl Command for MkdirCmd {
    fn name(&self) -> &str {
        "mkdir"
    }
    fn description(&self) -> &str {
        "Create directory"
    }
    fn usage(&self) -> &str {
        "mkdir <name>"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let name = required(args, "Usage: mkdir <name>")?;
        env.fs.make_directory(&env.session.cwd, name)?;
        Ok(CommandOutput::Text(format!("Directory created: {name}")))
    }
}

struct TouchCmd;
impl Command for TouchCmd {
    fn name(&self) -> &str {
        "touch"
    }
    fn description(&self) -> &str {
        "Create file"
    }
    fn usage(&self) -> &str {
        "touch <filename>"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let name = required(args, "Usage: touch <filename>")?;
        env.fs.create_file(&env.session.cwd, name)?;
        Ok(CommandOutput::Text(format!("File created: {name}")))
    }
}

struct RmCmd;
impl Command for RmCmd {
    fn name(&self) -> &str {
        "rm"
    }
    fn description(&self) -> &str {
        "Remove file/directory"
    }
    fn usage(&self) -> &str {
        "rm <name>"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let name = required(args, "Usage: rm <name>")?;
        env.fs.remove(&env.session.cwd, name)?;
        Ok(CommandOutput::Text(format!("Removed: {name}")))
    }
}

// ---------------------------------------------------------------------------
// cat / echo
// ---------------------------------------------------------------------------

struct CatCmd;
impl Command for CatCmd {
    fn name(&self) -> &str {
        "cat"
    }
    fn description(&self) -> &str {
        "Display file content"
    }
    fn usage(&self) -> &str {
        "cat <filename>"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let path = resolve(required(args, "Usage: cat <filename>")?, &env.session.cwd);
        let content = env.fs.read_file(&path)?;
        Ok(CommandOutput::Text(content.to_string()))
    }
}

struct EchoCmd;
impl Command for EchoCmd {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "Write to file (e.g., echo \"text\" > file.txt)"
    }
    fn usage(&self) -> &str {
        "echo \"<text>\" > <name>"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let captures = REDIRECT.as_ref().and_then(|re| re.captures(env.raw_args));
        let Some(caps) = captures else {
            return Ok(CommandOutput::Text(args.join(" ")));
        };
        let content = &caps[1];
        let name = caps[2].trim();
        env.fs.write_file(&env.session.cwd, name, content)?;
        Ok(CommandOutput::Text(format!("Written to {name}")))
    }
}

// ---------------------------------------------------------------------------
// tree
// ---------------------------------------------------------------------------

/// Box-drawing lines for a depth-first walk.
fn draw_tree(entries: &[WalkEntry]) -> Vec<String> {
    // is_last flag of each open ancestor
    let mut open: Vec<bool> = Vec::new();
    let mut lines = Vec::with_capacity(entries.len());
    for e in entries {
        open.truncate(e.depth);
        let mut line: String = open
            .iter()
            .map(|&last| if last { "    " } else { "│   " })
            .collect();
        line.push_str(if e.is_last { "└── " } else { "├── " });
        line.push_str(&e.name);
        if e.is_directory {
            line.push('/');
        }
        lines.push(line);
        open.push(e.is_last);
    }
    lines
}

struct TreeCmd;
impl Command for TreeCmd {
    fn name(&self) -> &str {
        "tree"
    }
    fn description(&self) -> &str {
        "Show directory tree"
    }
    fn usage(&self) -> &str {
        "tree"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let entries = env.fs.walk(&env.session.cwd)?;
        let mut lines = vec![env.session.cwd.to_string()];
        lines.extend(draw_tree(&entries));
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}
