// src/crawl/frontier.rs
// =============================================================================
// Shared bookkeeping between crawl workers.
//
// - Frontier: the set of every URL ever scheduled. try_enqueue() is the
//   gate in front of the crawl pool, so each URL is crawled at most once.
// - UniqueImageList: image URLs found on pages, deduplicated but kept in
//   the order they were discovered, for the image phase to walk through.
//
// Both are safe to share behind an Arc with no extra locking by callers.
// =============================================================================

use dashmap::DashSet;
use parking_lot::Mutex;
use std::collections::HashSet;

const EXPECTED_URLS: usize = 10_000;
const EXPECTED_IMAGES: usize = 2_500;

#[derive(Debug)]
pub struct Frontier {
    seen: DashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self {
            seen: DashSet::with_capacity(EXPECTED_URLS),
        }
    }

    // Marks a URL as scheduled
    //
    // Returns true only the first time a URL is offered. The test and the
    // insert are one atomic step, so two workers racing on the same link
    // can't both win.
    pub fn try_enqueue(&self, url: &str) -> bool {
        if self.seen.contains(url) {
            return false;
        }
        self.seen.insert(url.to_string())
    }

    pub(crate) fn len(&self) -> usize {
        self.seen.len()
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct ImageListInner {
    seen: HashSet<String>,
    order: Vec<String>,
}

#[derive(Debug, Default)]
pub struct UniqueImageList {
    inner: Mutex<ImageListInner>,
}

impl UniqueImageList {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ImageListInner {
                seen: HashSet::with_capacity(EXPECTED_IMAGES),
                order: Vec::with_capacity(EXPECTED_IMAGES),
            }),
        }
    }

    // Appends a URL unless it is already in the list
    pub fn push(&self, url: &str) -> bool {
        let mut inner = self.inner.lock();
        if !inner.seen.insert(url.to_string()) {
            return false;
        }
        inner.order.push(url.to_string());
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    // Copy of the list in discovery order
    pub fn snapshot(&self) -> Vec<String> {
        self.inner.lock().order.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_try_enqueue_once() {
        let frontier = Frontier::new();
        assert!(frontier.try_enqueue("https://www.example.com/a"));
        assert!(!frontier.try_enqueue("https://www.example.com/a"));
        assert!(frontier.try_enqueue("https://www.example.com/b"));
        assert_eq!(frontier.len(), 2);
    }

    #[test]
    fn test_concurrent_enqueue_admits_each_url_once() {
        let frontier = Arc::new(Frontier::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let frontier = Arc::clone(&frontier);
                thread::spawn(move || {
                    (0..500)
                        .filter(|i| frontier.try_enqueue(&format!("https://www.example.com/{}", i)))
                        .count()
                })
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 500);
        assert_eq!(frontier.len(), 500);
    }

    #[test]
    fn test_image_list_keeps_discovery_order() {
        let list = UniqueImageList::new();
        assert!(list.push("c.png"));
        assert!(list.push("a.png"));
        assert!(!list.push("c.png"));
        assert!(list.push("b.png"));
        assert_eq!(list.snapshot(), vec!["c.png", "a.png", "b.png"]);
    }

    #[test]
    fn test_image_list_concurrent_push() {
        let list = Arc::new(UniqueImageList::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let list = Arc::clone(&list);
                thread::spawn(move || {
                    for i in 0..200 {
                        list.push(&format!("{}.jpg", i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = list.snapshot();
        assert_eq!(snapshot.len(), 200);
        let unique: HashSet<_> = snapshot.iter().collect();
        assert_eq!(unique.len(), 200);
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why DashSet instead of Mutex<HashSet>?
//    - DashSet splits itself into shards, each with its own lock
//    - Workers inserting different URLs rarely touch the same shard
//    - insert() returns true only for the caller that added the URL first,
//      which is exactly the "schedule once" check we need
// -----------------------------------------------------------------------------
