//! Full-screen programs started by the shell's launch signal.

use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use devterm_terminal::Program;
use devterm_terminal::rng::SimpleRng;
use devterm_terminal::snake::{Heading, STEP_MILLIS, SnakeGame, Step};

/// Run `program` on the alternate screen; returns the line to print when
/// the shell takes the screen back.
pub fn run(program: Program, out: &mut impl Write) -> Result<String> {
    execute!(out, EnterAlternateScreen, Hide).context("Failed to enter alternate screen")?;
    let result = match program {
        Program::Snake => play_snake(out),
    };
    execute!(out, Show, LeaveAlternateScreen).context("Failed to leave alternate screen")?;
    result
}

fn play_snake(out: &mut impl Write) -> Result<String> {
    let mut game = SnakeGame::new(SimpleRng::from_time().next_u64());
    let step = Duration::from_millis(STEP_MILLIS);
    let mut next_step = Instant::now() + step;
    draw(out, &game)?;

    while !game.is_over() {
        let timeout = next_step.saturating_duration_since(Instant::now());
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind != KeyEventKind::Release
        {
            match key.code {
                KeyCode::Char('q' | 'Q') | KeyCode::Esc => game.quit(),
                KeyCode::Char(ch) => {
                    if let Some(heading) = Heading::from_key(ch) {
                        game.steer(heading);
                    }
                },
                _ => {},
            }
        }
        if Instant::now() >= next_step {
            next_step += step;
            if game.step() != Step::GameOver {
                draw(out, &game)?;
            }
        }
    }
    log::info!("snake finished with score {}", game.score());
    Ok(game.game_over_message())
}

fn draw(out: &mut impl Write, game: &SnakeGame) -> Result<()> {
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    for line in game.render().lines() {
        queue!(out, Print(line), Print("\r\n"))?;
    }
    out.flush()?;
    Ok(())
}
