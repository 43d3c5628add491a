//! Global commands, available in every mode, and registration of every
//! command family.

use devterm_platform::keys;
use devterm_types::error::{DevtermError, Result};

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment, OutputLine};
use crate::presentation::{Font, TextColor, Theme};
use crate::session::Mode;

/// Register all built-in commands: the global table plus every mode's
/// command family.
pub fn register_builtins(reg: &mut CommandRegistry) {
    reg.register_global(Box::new(HelpCmd));
    reg.register_global(Box::new(ClearCmd));
    reg.register_global(Box::new(AboutCmd));
    reg.register_global(Box::new(DateCmd));
    reg.register_global(Box::new(TimeCmd));
    reg.register_global(Box::new(ModeCmd));
    reg.register_global(Box::new(FullscreenCmd));
    reg.register_global(Box::new(FontCmd));
    reg.register_global(Box::new(ColorCmd));
    reg.register_global(Box::new(ThemeCmd));
    reg.register_global(Box::new(NeofetchCmd));
    reg.register_global(Box::new(ExitCmd));

    crate::dev_commands::register_dev_commands(reg);
    crate::market_commands::register_market_commands(reg);
    crate::network_commands::register_network_commands(reg);
    crate::tool_commands::register_tool_commands(reg);
    crate::file_commands::register_file_commands(reg);
    crate::fun_commands::register_fun_commands(reg);
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

struct HelpCmd;
impl Command for HelpCmd {
    fn name(&self) -> &str {
        "help"
    }
    fn description(&self) -> &str {
        "List commands for current mode"
    }
    fn usage(&self) -> &str {
        "help"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mode = env.session.mode;
        let mut lines = vec![OutputLine::system("--- Global Commands ---")];
        for (name, desc) in env.commands.global_commands() {
            lines.push(OutputLine::plain(format!("{name:<15} {desc}")));
        }
        lines.push(OutputLine::system(format!(
            "--- {} Commands ---",
            mode.short_name().to_uppercase()
        )));
        for (name, desc) in env.commands.mode_commands(mode) {
            lines.push(OutputLine::plain(format!("{name:<15} {desc}")));
        }
        Ok(CommandOutput::Lines(lines))
    }
}

// ---------------------------------------------------------------------------
// clear / about / date / time
// ---------------------------------------------------------------------------

struct ClearCmd;
impl Command for ClearCmd {
    fn name(&self) -> &str {
        "clear"
    }
    fn description(&self) -> &str {
        "Clear terminal output"
    }
    fn usage(&self) -> &str {
        "clear"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Clear)
    }
}

struct AboutCmd;
impl Command for AboutCmd {
    fn name(&self) -> &str {
        "about"
    }
    fn description(&self) -> &str {
        "System information"
    }
    fn usage(&self) -> &str {
        "about"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::text(
            "Pro Terminal System v1.0\nBuilt for professional use cases.",
        ))
    }
}

struct DateCmd;
impl Command for DateCmd {
    fn name(&self) -> &str {
        "date"
    }
    fn description(&self) -> &str {
        "Show current date"
    }
    fn usage(&self) -> &str {
        "date"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(env.time.now()?.date_string()))
    }
}

struct TimeCmd;
impl Command for TimeCmd {
    fn name(&self) -> &str {
        "time"
    }
    fn description(&self) -> &str {
        "Show current time"
    }
    fn usage(&self) -> &str {
        "time"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(env.time.now()?.time_string()))
    }
}

// ---------------------------------------------------------------------------
// mode
// ---------------------------------------------------------------------------

struct ModeCmd;
impl Command for ModeCmd {
    fn name(&self) -> &str {
        "mode"
    }
    fn description(&self) -> &str {
        "Switch mode (dev | crypto | network | tools | fs | fun)"
    }
    fn usage(&self) -> &str {
        "mode [name]"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(name) = args.first() else {
            return Ok(CommandOutput::Text(format!(
                "Current mode: {}\nAvailable modes: {}",
                env.session.mode,
                Mode::names()
            )));
        };
        let mode = Mode::parse(name)?;
        env.session.set_mode(mode, env.store);
        Ok(CommandOutput::Lines(vec![OutputLine::system(format!(
            "Switched to {mode} mode."
        ))]))
    }
}

// ---------------------------------------------------------------------------
// fullscreen / font / color / theme
// ---------------------------------------------------------------------------

struct FullscreenCmd;
impl Command for FullscreenCmd {
    fn name(&self) -> &str {
        "fullscreen"
    }
    fn description(&self) -> &str {
        "Toggle fullscreen mode"
    }
    fn usage(&self) -> &str {
        "fullscreen"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let p = &mut env.session.presentation;
        p.fullscreen = !p.fullscreen;
        let state = if p.fullscreen { "enabled" } else { "disabled" };
        Ok(CommandOutput::Lines(vec![OutputLine::system(format!(
            "Fullscreen {state}."
        ))]))
    }
}

struct FontCmd;
impl Command for FontCmd {
    fn name(&self) -> &str {
        "font"
    }
    fn description(&self) -> &str {
        "Change font (classic | retro | modern)"
    }
    fn usage(&self) -> &str {
        "font <classic | retro | modern>"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let font = args
            .first()
            .and_then(|n| Font::parse(n))
            .ok_or_else(|| DevtermError::usage("Usage: font <classic | retro | modern>"))?;
        env.session.presentation.font = font;
        env.store.set(keys::FONT, font.name());
        Ok(CommandOutput::Text(format!("Font switched to {}.", font.name())))
    }
}

struct ColorCmd;
impl Command for ColorCmd {
    fn name(&self) -> &str {
        "color"
    }
    fn description(&self) -> &str {
        "Change text color (green | red | blue | pink | white)"
    }
    fn usage(&self) -> &str {
        "color <green | red | blue | pink | white>"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let color = args.first().and_then(|n| TextColor::parse(n)).ok_or_else(|| {
            DevtermError::usage("Usage: color <green | red | blue | pink | white>")
        })?;
        env.session.presentation.color = Some(color);
        env.store.set(keys::COLOR, color.name());
        Ok(CommandOutput::Text(format!(
            "Color switched to {}.",
            color.name()
        )))
    }
}

struct ThemeCmd;
impl Command for ThemeCmd {
    fn name(&self) -> &str {
        "theme"
    }
    fn description(&self) -> &str {
        "Change theme (matrix | cyberpunk | hacker | retro | ocean | dracula)"
    }
    fn usage(&self) -> &str {
        "theme [name]"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(name) = args.first() else {
            return Ok(CommandOutput::Text(format!(
                "Current theme: {}\nAvailable: {}",
                env.session.presentation.theme.name(),
                Theme::names()
            )));
        };
        let theme = Theme::parse(name).ok_or_else(|| {
            DevtermError::usage(format!("Invalid theme. Available: {}", Theme::names()))
        })?;
        // A theme brings its own text color.
        let p = &mut env.session.presentation;
        p.theme = theme;
        p.color = None;
        env.store.set(keys::THEME, theme.name());
        env.store.remove(keys::COLOR);
        log::info!("Theme -> {}", theme.name());
        Ok(CommandOutput::Text(format!(
            "Theme switched to {}.",
            theme.name()
        )))
    }
}

// ---------------------------------------------------------------------------
// neofetch
// ---------------------------------------------------------------------------

const LOGO: [&str; 8] = [
    "   ______   ",
    "  / ____ \\  ",
    " | |    | | ",
    " | | >_ | | ",
    " | |____| | ",
    "  \\______/  ",
    "   _|__|_   ",
    "            ",
];

fn format_uptime(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h {m}m {s}s")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}

struct NeofetchCmd;
impl Command for NeofetchCmd {
    fn name(&self) -> &str {
        "neofetch"
    }
    fn description(&self) -> &str {
        "Display system information"
    }
    fn usage(&self) -> &str {
        "neofetch"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let header = format!("{}@{}", env.profile.user, env.profile.hostname);
        let p = &env.session.presentation;
        let info = [
            header.clone(),
            "-".repeat(header.chars().count()),
            "OS: Pro Terminal System v1.0".to_string(),
            format!("Shell: devterm {}", env!("CARGO_PKG_VERSION")),
            format!("Mode: {}", env.session.mode),
            format!("Uptime: {}", format_uptime(env.time.uptime_secs()?)),
            format!("Theme: {}", p.theme.name()),
            format!("Font: {}", p.font.name()),
        ];
        let text = LOGO
            .iter()
            .zip(info.iter())
            .map(|(logo, line)| format!("{logo}  {line}"))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(CommandOutput::Text(text))
    }
}

struct ExitCmd;
impl Command for ExitCmd {
    fn name(&self) -> &str {
        "exit"
    }
    fn description(&self) -> &str {
        "Exit terminal"
    }
    fn usage(&self) -> &str {
        "exit"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Exit {
            message: "Goodbye!".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::Theme;
    use crate::test_support::{exec, test_shell, texts};

    #[test]
    fn help_lists_global_then_mode() {
        let (mut sh, _) = test_shell();
        let out = exec(&mut sh, "help");
        assert_eq!(out[0], OutputLine::system("--- Global Commands ---"));
        assert!(
            texts(&out).contains(&"about           System information"),
            "{out:?}"
        );
        assert!(out.contains(&OutputLine::system("--- DEV Commands ---")));
        assert!(texts(&out).iter().any(|l| l.starts_with("calc ")));
        assert!(!texts(&out).iter().any(|l| l.starts_with("ls ")));
    }

    #[test]
    fn about_prints_two_lines() {
        let (mut sh, _) = test_shell();
        assert_eq!(
            texts(&exec(&mut sh, "about")),
            vec!["Pro Terminal System v1.0", "Built for professional use cases."]
        );
    }

    #[test]
    fn date_and_time_use_clock() {
        let (mut sh, _) = test_shell();
        assert_eq!(texts(&exec(&mut sh, "date")), vec!["2025-03-14"]);
        assert_eq!(texts(&exec(&mut sh, "time")), vec!["09:26:53"]);
    }

    #[test]
    fn mode_without_args_reports() {
        let (mut sh, _) = test_shell();
        assert_eq!(
            texts(&exec(&mut sh, "mode")),
            vec![
                "Current mode: dev",
                "Available modes: dev, crypto, network, tools, fs, fun"
            ]
        );
    }

    #[test]
    fn mode_switch_and_alias() {
        let (mut sh, _) = test_shell();
        assert_eq!(
            exec(&mut sh, "mode net"),
            vec![OutputLine::system("Switched to network mode.")]
        );
        assert_eq!(sh.session().mode, Mode::Network);
    }

    #[test]
    fn invalid_mode_keeps_current() {
        let (mut sh, _) = test_shell();
        let out = exec(&mut sh, "mode warp");
        assert_eq!(
            out,
            vec![OutputLine::error(
                "Invalid mode: warp. Available: dev, crypto, network, tools, fs, fun"
            )]
        );
        assert_eq!(sh.session().mode, Mode::Development);
    }

    #[test]
    fn fullscreen_toggles() {
        let (mut sh, _) = test_shell();
        assert_eq!(texts(&exec(&mut sh, "fullscreen")), vec!["Fullscreen enabled."]);
        assert!(sh.session().presentation.fullscreen);
        assert_eq!(texts(&exec(&mut sh, "fullscreen")), vec!["Fullscreen disabled."]);
    }

    #[test]
    fn font_and_color() {
        let (mut sh, _) = test_shell();
        assert_eq!(texts(&exec(&mut sh, "font retro")), vec!["Font switched to retro."]);
        assert_eq!(
            exec(&mut sh, "font comic"),
            vec![OutputLine::error("Usage: font <classic | retro | modern>")]
        );
        assert_eq!(texts(&exec(&mut sh, "color pink")), vec!["Color switched to pink."]);
        assert_eq!(
            exec(&mut sh, "color"),
            vec![OutputLine::error(
                "Usage: color <green | red | blue | pink | white>"
            )]
        );
        assert_eq!(sh.session().presentation.palette().text, "#ff33cc");
    }

    #[test]
    fn theme_resets_color_override() {
        let (mut sh, _) = test_shell();
        exec(&mut sh, "color red");
        assert_eq!(texts(&exec(&mut sh, "theme ocean")), vec!["Theme switched to ocean."]);
        let p = sh.session().presentation;
        assert_eq!(p.theme, Theme::Ocean);
        assert_eq!(p.color, None);
    }

    #[test]
    fn theme_listing_and_invalid() {
        let (mut sh, _) = test_shell();
        assert_eq!(
            texts(&exec(&mut sh, "theme")),
            vec![
                "Current theme: matrix",
                "Available: matrix, cyberpunk, hacker, retro, ocean, dracula"
            ]
        );
        assert_eq!(
            exec(&mut sh, "theme neon"),
            vec![OutputLine::error(
                "Invalid theme. Available: matrix, cyberpunk, hacker, retro, ocean, dracula"
            )]
        );
    }

    #[test]
    fn neofetch_shows_uptime_and_mode() {
        let (mut sh, _) = test_shell();
        let out = texts(&exec(&mut sh, "neofetch")).join("\n");
        assert!(out.contains("user@pro-sys"));
        assert!(out.contains("Mode: dev"));
        assert!(out.contains("Uptime: 1h 2m 5s"));
    }

    #[test]
    fn uptime_formats() {
        assert_eq!(format_uptime(5), "5s");
        assert_eq!(format_uptime(65), "1m 5s");
        assert_eq!(format_uptime(3725), "1h 2m 5s");
    }
}
