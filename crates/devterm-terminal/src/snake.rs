//! Snake: game state and frame rendering. The host drives `step` on its
//! own clock and feeds key presses to `steer`.

use std::collections::VecDeque;

use crate::rng::SimpleRng;

pub const WIDTH: i32 = 20;
pub const HEIGHT: i32 = 15;

/// Milliseconds between steps.
pub const STEP_MILLIS: u64 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
}

impl Heading {
    fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// W/A/S/D, either case.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'w' => Some(Self::Up),
            's' => Some(Self::Down),
            'a' => Some(Self::Left),
            'd' => Some(Self::Right),
            _ => None,
        }
    }
}

/// Result of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved,
    Ate,
    GameOver,
}

type Cell = (i32, i32);

#[derive(Debug)]
pub struct SnakeGame {
    /// Head first.
    body: VecDeque<Cell>,
    heading: Heading,
    food: Option<Cell>,
    score: u32,
    over: bool,
    rng: SimpleRng,
}

impl SnakeGame {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            body: VecDeque::from([(10, 7)]),
            heading: Heading::Right,
            food: None,
            score: 0,
            over: false,
            rng: SimpleRng::new(seed),
        };
        game.spawn_food();
        game
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn head(&self) -> (i32, i32) {
        self.body[0]
    }

    pub fn length(&self) -> usize {
        self.body.len()
    }

    pub fn food(&self) -> Option<(i32, i32)> {
        self.food
    }

    /// Turn, unless it would reverse onto the body.
    pub fn steer(&mut self, heading: Heading) {
        if heading != self.heading.opposite() {
            self.heading = heading;
        }
    }

    /// End the game from outside (the quit key).
    pub fn quit(&mut self) {
        self.over = true;
    }

    fn spawn_food(&mut self) {
        let free: Vec<Cell> = (0..HEIGHT)
            .flat_map(|y| (0..WIDTH).map(move |x| (x, y)))
            .filter(|cell| !self.body.contains(cell))
            .collect();
        self.food = if free.is_empty() {
            None
        } else {
            Some(*self.rng.choose(&free))
        };
    }

    /// Advance one cell.
    pub fn step(&mut self) -> Step {
        if self.over {
            return Step::GameOver;
        }
        let (x, y) = self.head();
        let next = match self.heading {
            Heading::Up => (x, y - 1),
            Heading::Down => (x, y + 1),
            Heading::Left => (x - 1, y),
            Heading::Right => (x + 1, y),
        };
        let off_board = next.0 < 0 || next.0 >= WIDTH || next.1 < 0 || next.1 >= HEIGHT;
        if off_board || self.body.contains(&next) {
            self.over = true;
            return Step::GameOver;
        }
        self.body.push_front(next);
        if self.food == Some(next) {
            self.score += 1;
            self.spawn_food();
            if self.food.is_none() {
                self.over = true;
            }
            Step::Ate
        } else {
            self.body.pop_back();
            Step::Moved
        }
    }

    /// The frame: score line, boxed board (two columns per cell), controls.
    pub fn render(&self) -> String {
        let border = "─".repeat(WIDTH as usize * 2);
        let mut out = format!("Score: {}\n┌{border}┐\n", self.score);
        for y in 0..HEIGHT {
            out.push('│');
            for x in 0..WIDTH {
                let cell = (x, y);
                let glyph = if cell == self.head() {
                    "●●"
                } else if self.body.contains(&cell) {
                    "○○"
                } else if self.food == Some(cell) {
                    "◆◆"
                } else {
                    "  "
                };
                out.push_str(glyph);
            }
            out.push_str("│\n");
        }
        out.push_str(&format!("└{border}┘\nControls: W/A/S/D to move, Q to quit"));
        out
    }

    pub fn game_over_message(&self) -> String {
        format!("Game Over! Score: {}", self.score)
    }
}
