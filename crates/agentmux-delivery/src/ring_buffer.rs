// SPDX-License-Identifier: MIT

//! A fixed-capacity byte ring buffer used to watch an output stream for a
//! pattern without holding the whole stream in memory. Oldest bytes are
//! dropped on overflow; a monotonic offset counter lets callers reason
//! about "everything received since offset X" even after eviction.

use regex::Regex;
use std::collections::VecDeque;

pub struct RingBuffer {
    capacity: usize,
    data: VecDeque<u8>,
    total_pushed: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            data: VecDeque::with_capacity(capacity),
            total_pushed: 0,
        }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        for &b in bytes {
            if self.data.len() == self.capacity {
                self.data.pop_front();
            }
            self.data.push_back(b);
        }
        self.total_pushed += bytes.len();
    }

    /// Logical position of the end of the buffer; use as a commit marker.
    pub fn offset(&self) -> usize {
        self.total_pushed
    }

    /// Lossy text of everything still held in the buffer.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.data.iter().copied().collect::<Vec<u8>>()).into_owned()
    }

    /// Lossy text of bytes received at or after `offset`. If `offset`
    /// predates the oldest byte still held (evicted by overflow), returns
    /// whatever remains — the caller only ever uses this for "did a
    /// pattern appear in the recent tail" checks, not exact byte accounting.
    pub fn since(&self, offset: usize) -> String {
        let held_start = self.total_pushed.saturating_sub(self.data.len());
        let skip = offset.saturating_sub(held_start).min(self.data.len());
        let bytes: Vec<u8> = self.data.iter().skip(skip).copied().collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn is_match(&self, pattern: &Regex) -> bool {
        pattern.is_match(&self.contents())
    }
}

#[cfg(test)]
#[path = "ring_buffer_tests.rs"]
mod tests;
