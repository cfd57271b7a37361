//! Host-provided "tell me about pointer presses outside my region" capability.
//!
//! A front end publishes every pointer-down through an [`InteractionHub`];
//! overlay components hold an [`OutsideWatch`] for their own bounds and only
//! wake for presses that land elsewhere.

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounds; the right and bottom edges are exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }
}

#[derive(Clone)]
pub struct InteractionHub {
    pointer_downs: broadcast::Sender<Point>,
}

impl Default for InteractionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionHub {
    pub fn new() -> Self {
        let (pointer_downs, _) = broadcast::channel(64);
        Self { pointer_downs }
    }

    /// Publishes a pointer press; returns how many watches received it.
    pub fn pointer_down(&self, point: Point) -> usize {
        self.pointer_downs.send(point).unwrap_or(0)
    }

    pub fn watch_outside(&self, region: Region) -> OutsideWatch {
        OutsideWatch {
            region,
            pointer_downs: self.pointer_downs.subscribe(),
        }
    }
}

pub struct OutsideWatch {
    region: Region,
    pointer_downs: broadcast::Receiver<Point>,
}

impl OutsideWatch {
    /// Resolves with the next press outside the watched region, or `None` once
    /// the hub is gone.
    pub async fn next_outside(&mut self) -> Option<Point> {
        loop {
            match self.pointer_downs.recv().await {
                Ok(point) if !self.region.contains(point) => return Some(point),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "outside-interaction watch lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
