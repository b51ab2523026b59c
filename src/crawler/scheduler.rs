//! Crawl frontier
//!
//! This module handles:
//! - FIFO queue management for URLs to crawl (breadth-first discovery)
//! - The visited set that guarantees a URL is enqueued at most once

use std::collections::{HashSet, VecDeque};
use url::Url;

/// FIFO queue of URLs pending a visit plus every URL ever enqueued
///
/// Membership is recorded when a URL is enqueued, not when it is fetched, so
/// a URL linked from many pages enters the queue exactly once.
#[derive(Debug, Default)]
pub struct Frontier {
    /// URLs waiting to be fetched, in discovery order
    queue: VecDeque<Url>,

    /// Normalized URLs ever enqueued during this session
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a URL to the back of the queue
    ///
    /// # Returns
    ///
    /// * `true` - The URL was new and is now queued
    /// * `false` - The URL was already visited; nothing changed
    pub fn enqueue(&mut self, url: Url) -> bool {
        if !self.visited.insert(url.as_str().to_string()) {
            return false;
        }
        self.queue.push_back(url);
        true
    }

    /// Removes and returns the oldest queued URL
    pub fn pop(&mut self) -> Option<Url> {
        self.queue.pop_front()
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// The visited set, for in-scope checks
    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    /// Returns the number of URLs waiting in the queue
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
