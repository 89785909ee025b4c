//! Key mapping and the bounded pending-direction queue.

use std::collections::VecDeque;

use crate::Direction;

/// A recognised key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    TogglePause,
}

impl Command {
    /// Map a raw key name (`"ArrowUp"`, `"k"`, `"p"`, ...) to a command.
    /// Unknown keys yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        let cmd = match key {
            "ArrowUp" | "Up" => Self::Turn(Direction::Up),
            "ArrowDown" | "Down" => Self::Turn(Direction::Down),
            "ArrowLeft" | "Left" => Self::Turn(Direction::Left),
            "ArrowRight" | "Right" => Self::Turn(Direction::Right),
            "Escape" => Self::TogglePause,
            _ => {
                let mut chars = key.chars();
                let (Some(c), None) = (chars.next(), chars.next()) else {
                    return None;
                };
                match c.to_ascii_lowercase() {
                    'w' | 'k' => Self::Turn(Direction::Up),
                    's' | 'j' => Self::Turn(Direction::Down),
                    'a' | 'h' => Self::Turn(Direction::Left),
                    'd' | 'l' => Self::Turn(Direction::Right),
                    'p' => Self::TogglePause,
                    _ => return None,
                }
            }
        };
        Some(cmd)
    }
}

/// What happened to a direction offered to [`InputBuffer::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueue {
    Queued,
    /// Exact opposite of the last queued (or committed) direction.
    Reversal,
    /// Buffer already at capacity.
    Full,
}

/// FIFO of validated turns, consumed one per step.
#[derive(Debug, Clone)]
pub struct InputBuffer {
    pending: VecDeque<Direction>,
    capacity: usize,
}

impl InputBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Queue `dir` unless it reverses the newest pending turn (or `committed`
    /// when nothing is pending) or the buffer is full.
    pub fn push(&mut self, dir: Direction, committed: Direction) -> Enqueue {
        let against = self.pending.back().copied().unwrap_or(committed);
        if dir.is_opposite(against) {
            return Enqueue::Reversal;
        }
        if self.pending.len() >= self.capacity {
            return Enqueue::Full;
        }
        self.pending.push_back(dir);
        Enqueue::Queued
    }

    pub fn pop(&mut self) -> Option<Direction> {
        self.pending.pop_front()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Direction> {
        self.pending.iter()
    }
}
