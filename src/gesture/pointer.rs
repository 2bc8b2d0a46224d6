//! Pointer event types.

use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::layout::Vec2;

/// Identifies one independently tracked pointer.
pub trait PointerKey: Copy + Eq + Hash + Debug {}

/// The single mouse pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MouseKey;

impl PointerKey for MouseKey {}

/// One touch contact, by its platform identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TouchId(pub i32);

impl PointerKey for TouchId {}

impl From<i32> for TouchId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Cancel,
}

/// A pointer event in canvas-relative pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent<K> {
    pub key: K,
    pub kind: PointerKind,
    pub x: f64,
    pub y: f64,
}

impl<K: PointerKey> PointerEvent<K> {
    pub fn new(key: K, kind: PointerKind, x: f64, y: f64) -> Self {
        Self { key, kind, x, y }
    }

    pub fn down(key: K, x: f64, y: f64) -> Self {
        Self::new(key, PointerKind::Down, x, y)
    }

    pub fn moved(key: K, x: f64, y: f64) -> Self {
        Self::new(key, PointerKind::Move, x, y)
    }

    pub fn up(key: K, x: f64, y: f64) -> Self {
        Self::new(key, PointerKind::Up, x, y)
    }

    pub fn cancel(key: K, x: f64, y: f64) -> Self {
        Self::new(key, PointerKind::Cancel, x, y)
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}
