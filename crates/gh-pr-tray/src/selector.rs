//! Entry selector
//!
//! Waits for the first of a runtime-sized set of entries to be clicked.
//!
//! Every entry gets an [`EntrySource`] that pushes its index into one shared
//! queue. [`EntrySelector::select_first`] is a single receive on that queue,
//! so any number of entries is handled without per-entry futures, and
//! concurrent clicks are queued rather than lost.
//!
//! Each [`EntrySelector::rebuild`] starts a new generation. Events still
//! queued from an older entry set are reported as [`Selection::Invalid`] so
//! the caller re-issues the wait instead of acting on a stale index.

use log::debug;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy)]
struct Fired {
    index: usize,
    generation: u64,
}

/// Outcome of one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The entry at this index fired
    Entry(usize),
    /// The event belonged to a superseded entry set; wait again
    Invalid,
}

/// Clickable handle for one entry
#[derive(Debug, Clone)]
pub struct EntrySource {
    index: usize,
    generation: u64,
    tx: mpsc::UnboundedSender<Fired>,
}

impl EntrySource {
    /// Index of the entry in the set it was created for
    pub fn index(&self) -> usize {
        self.index
    }

    /// Signal that the entry was clicked
    ///
    /// Returns false if the selector is gone.
    pub fn fire(&self) -> bool {
        self.tx
            .send(Fired {
                index: self.index,
                generation: self.generation,
            })
            .is_ok()
    }
}

#[derive(Debug)]
pub struct EntrySelector {
    tx: mpsc::UnboundedSender<Fired>,
    rx: mpsc::UnboundedReceiver<Fired>,
    generation: u64,
    len: usize,
}

impl Default for EntrySelector {
    fn default() -> Self {
        Self::new()
    }
}

impl EntrySelector {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            generation: 0,
            len: 0,
        }
    }

    /// Replace the entry set with `count` fresh sources
    ///
    /// Sources handed out earlier stay valid to fire but their events are
    /// reported as `Selection::Invalid` from now on.
    pub fn rebuild(&mut self, count: usize) -> Vec<EntrySource> {
        self.generation += 1;
        self.len = count;

        let mut dropped = 0;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            debug!("Dropped {} queued clicks from the previous entry set", dropped);
        }

        (0..count)
            .map(|index| EntrySource {
                index,
                generation: self.generation,
                tx: self.tx.clone(),
            })
            .collect()
    }

    /// Number of entries in the current set
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Wait until some source fires
    ///
    /// Cancel safe: dropping the future loses no event.
    pub async fn select_first(&mut self) -> Selection {
        // The selector owns a sender, so the channel never closes while
        // we are waiting on it
        let Some(fired) = self.rx.recv().await else {
            return Selection::Invalid;
        };

        if fired.generation != self.generation || fired.index >= self.len {
            debug!(
                "Ignoring click on entry {} of generation {} (current {})",
                fired.index, fired.generation, self.generation
            );
            return Selection::Invalid;
        }

        Selection::Entry(fired.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_returns_index_of_fired_source() {
        let mut selector = EntrySelector::new();
        let sources = selector.rebuild(5);

        assert!(sources[3].fire());

        assert_eq!(selector.select_first().await, Selection::Entry(3));
    }

    #[tokio::test]
    async fn test_concurrent_fires_are_not_lost() {
        let mut selector = EntrySelector::new();
        let sources = selector.rebuild(5);

        let handles: Vec<_> = [1, 4]
            .into_iter()
            .map(|i| {
                let source = sources[i].clone();
                tokio::spawn(async move { source.fire() })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        let first = selector.select_first().await;
        let second = selector.select_first().await;
        let mut picked = vec![first, second];
        picked.sort_by_key(|s| match s {
            Selection::Entry(i) => *i,
            Selection::Invalid => usize::MAX,
        });
        assert_eq!(picked, vec![Selection::Entry(1), Selection::Entry(4)]);
    }

    #[tokio::test]
    async fn test_waits_until_a_source_fires() {
        let mut selector = EntrySelector::new();
        let sources = selector.rebuild(2);
        let source = sources[1].clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            source.fire();
        });

        assert_eq!(selector.select_first().await, Selection::Entry(1));
    }

    #[tokio::test]
    async fn test_stale_source_is_invalid() {
        let mut selector = EntrySelector::new();
        let old = selector.rebuild(3);
        let _new = selector.rebuild(1);

        old[2].fire();

        assert_eq!(selector.select_first().await, Selection::Invalid);
    }

    #[tokio::test]
    async fn test_rebuild_drops_queued_events() {
        let mut selector = EntrySelector::new();
        let old = selector.rebuild(3);
        old[0].fire();

        let new = selector.rebuild(3);
        new[2].fire();

        assert_eq!(selector.select_first().await, Selection::Entry(2));
    }

    #[tokio::test]
    async fn test_set_size_follows_rebuild() {
        let mut selector = EntrySelector::new();
        assert!(selector.is_empty());

        let sources = selector.rebuild(7);
        assert_eq!(selector.len(), 7);
        assert_eq!(sources.len(), 7);
        assert_eq!(sources[6].index(), 6);

        selector.rebuild(0);
        assert!(selector.is_empty());
    }

    #[tokio::test]
    async fn test_fire_after_selector_dropped() {
        let mut selector = EntrySelector::new();
        let sources = selector.rebuild(1);
        drop(selector);

        assert!(!sources[0].fire());
    }
}
