use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    /// How many times the same message was raised while queued.
    pub occurrences: u32,
}

/// One visible toast, the rest queued in FIFO order. The TTL runs from the
/// moment a toast becomes visible.
#[derive(Debug)]
pub struct Notifier {
    ttl: Duration,
    queue: VecDeque<Toast>,
    shown_at: Option<Instant>,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            queue: VecDeque::new(),
            shown_at: None,
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.push_at(message, Instant::now());
    }

    pub fn push_at(&mut self, message: impl Into<String>, now: Instant) {
        let message = message.into();
        if let Some(existing) = self.queue.iter_mut().find(|t| t.message == message) {
            existing.occurrences += 1;
            return;
        }
        self.queue.push_back(Toast {
            message,
            occurrences: 1,
        });
        if self.queue.len() == 1 {
            self.shown_at = Some(now);
        }
    }

    /// The toast currently on screen.
    pub fn visible(&self) -> Option<&Toast> {
        self.queue.front()
    }

    pub fn pending(&self) -> usize {
        self.queue.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Dismiss the visible toast and promote the next one.
    pub fn dismiss(&mut self) -> Option<Toast> {
        self.dismiss_at(Instant::now())
    }

    pub fn dismiss_at(&mut self, now: Instant) -> Option<Toast> {
        let dismissed = self.queue.pop_front();
        self.shown_at = if self.queue.is_empty() { None } else { Some(now) };
        dismissed
    }

    /// Drop every toast whose display time ran out by `now`.
    pub fn expire(&mut self, now: Instant) {
        while let Some(shown_at) = self.shown_at {
            let deadline = shown_at + self.ttl;
            if now < deadline {
                break;
            }
            self.queue.pop_front();
            self.shown_at = if self.queue.is_empty() {
                None
            } else {
                Some(deadline)
            };
        }
    }

    /// Remove all toasts, visible one first.
    pub fn drain(&mut self) -> Vec<Toast> {
        self.shown_at = None;
        self.queue.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(6);

    #[test]
    fn only_one_toast_is_visible() {
        let start = Instant::now();
        let mut notifier = Notifier::new(TTL);
        notifier.push_at("Error fetching users.", start);
        notifier.push_at("Error fetching purchases.", start);

        assert_eq!(notifier.visible().unwrap().message, "Error fetching users.");
        assert_eq!(notifier.pending(), 1);

        notifier.dismiss_at(start);
        assert_eq!(notifier.visible().unwrap().message, "Error fetching purchases.");
        assert_eq!(notifier.pending(), 0);
    }

    #[test]
    fn expiry_counts_from_promotion() {
        let start = Instant::now();
        let mut notifier = Notifier::new(TTL);
        notifier.push_at("first", start);
        notifier.push_at("second", start + Duration::from_secs(1));

        notifier.expire(start + Duration::from_secs(5));
        assert_eq!(notifier.visible().unwrap().message, "first");

        notifier.expire(start + Duration::from_secs(6));
        assert_eq!(notifier.visible().unwrap().message, "second");

        notifier.expire(start + Duration::from_secs(11));
        assert_eq!(notifier.visible().unwrap().message, "second");

        notifier.expire(start + Duration::from_secs(12));
        assert!(notifier.is_empty());
    }

    #[test]
    fn repeated_message_is_coalesced() {
        let mut notifier = Notifier::new(TTL);
        notifier.push("Error creating purchase.");
        notifier.push("Error creating purchase.");
        assert_eq!(notifier.pending(), 0);
        assert_eq!(notifier.visible().unwrap().occurrences, 2);
    }

    #[test]
    fn dismiss_on_empty_is_noop() {
        let mut notifier = Notifier::new(TTL);
        assert!(notifier.dismiss().is_none());
        notifier.expire(Instant::now());
        assert!(notifier.visible().is_none());
    }
}
