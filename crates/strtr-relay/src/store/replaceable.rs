// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Replaceable event tracker

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use strtr_proto::{Event, EventAddr};

use super::event::is_newer;

/// Outcome of offering an event to the tracker
#[derive(Debug, Clone)]
pub struct Replacement {
    /// The address the event belongs to
    pub addr: EventAddr,
    /// The previously retained event this one displaced, if any
    pub overwritten: Option<Event>,
    /// The event that must be stored (`None` when the incoming event lost)
    pub to_store: Option<Event>,
}

/// Tracks the currently retained winner per replaceable address
#[derive(Debug, Default)]
pub struct ReplaceableTracker {
    entries: HashMap<EventAddr, Event>,
}

impl ReplaceableTracker {
    /// New empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer an event for the given address.
    ///
    /// The incoming event wins an occupied slot only if it beats the
    /// retained one by the event ordering.
    pub fn replace(&mut self, addr: EventAddr, event: &Event) -> Replacement {
        match self.entries.entry(addr.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(event.clone());
                Replacement {
                    addr,
                    overwritten: None,
                    to_store: Some(event.clone()),
                }
            }
            Entry::Occupied(mut entry) => {
                if is_newer(event, entry.get()) {
                    let overwritten: Event = entry.insert(event.clone());
                    Replacement {
                        addr,
                        overwritten: Some(overwritten),
                        to_store: Some(event.clone()),
                    }
                } else {
                    Replacement {
                        addr,
                        overwritten: None,
                        to_store: None,
                    }
                }
            }
        }
    }

    /// The retained event for an address, if any
    #[inline]
    pub fn get(&self, addr: &EventAddr) -> Option<&Event> {
        self.entries.get(addr)
    }

    /// Remove and return the retained event for an address
    #[inline]
    pub fn delete(&mut self, addr: &EventAddr) -> Option<Event> {
        self.entries.remove(addr)
    }

    /// Number of occupied addresses
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no address is occupied
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
