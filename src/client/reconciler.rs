//! Optimistic state for a single interactive element.

use serde::{Deserialize, Serialize};

/// `Settled(value)` until an action starts, then `Pending` until the
/// network call resolves. Confirming keeps the tentative value; rolling
/// back restores the exact previous value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled<T> {
    Settled(T),
    Pending { tentative: T, previous: T },
}

impl<T: Clone> Reconciled<T> {
    pub fn new(value: T) -> Self {
        Reconciled::Settled(value)
    }

    /// What the UI shows right now.
    pub fn visible(&self) -> &T {
        match self {
            Reconciled::Settled(value) => value,
            Reconciled::Pending { tentative, .. } => tentative,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Reconciled::Pending { .. })
    }

    /// Starts a tentative change. Refused while another change is in flight.
    pub fn begin(&mut self, tentative: T) -> bool {
        match self {
            Reconciled::Settled(value) => {
                let previous = value.clone();
                *self = Reconciled::Pending {
                    tentative,
                    previous,
                };
                true
            }
            Reconciled::Pending { .. } => false,
        }
    }

    pub fn confirm(&mut self) -> bool {
        match self {
            Reconciled::Pending { tentative, .. } => {
                let value = tentative.clone();
                *self = Reconciled::Settled(value);
                true
            }
            Reconciled::Settled(_) => false,
        }
    }

    pub fn rollback(&mut self) -> bool {
        match self {
            Reconciled::Pending { previous, .. } => {
                let value = previous.clone();
                *self = Reconciled::Settled(value);
                true
            }
            Reconciled::Settled(_) => false,
        }
    }
}

/// Which ledger call a toggle issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LikeAction {
    Like,
    Unlike,
}

/// The like affordance of one post: the flag and the counter next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeState {
    pub liked: bool,
    pub likes_count: i32,
}

impl LikeState {
    /// The tentative state after the user presses the button, and the call to make.
    pub fn toggled(&self) -> (LikeState, LikeAction) {
        if self.liked {
            (
                LikeState {
                    liked: false,
                    likes_count: (self.likes_count - 1).max(0),
                },
                LikeAction::Unlike,
            )
        } else {
            (
                LikeState {
                    liked: true,
                    likes_count: self.likes_count + 1,
                },
                LikeAction::Like,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_keeps_tentative() {
        let mut state = Reconciled::new(1);
        assert!(state.begin(2));
        assert_eq!(*state.visible(), 2);
        assert!(state.confirm());
        assert_eq!(state, Reconciled::Settled(2));
    }

    #[test]
    fn rollback_restores_previous() {
        let before = LikeState {
            liked: false,
            likes_count: 4,
        };
        let mut state = Reconciled::new(before);
        let (tentative, action) = before.toggled();
        assert_eq!(action, LikeAction::Like);
        assert!(state.begin(tentative));
        assert_eq!(state.visible().likes_count, 5);

        assert!(state.rollback());
        assert_eq!(state, Reconciled::Settled(before));
    }

    #[test]
    fn second_begin_is_refused_while_pending() {
        let mut state = Reconciled::new(false);
        assert!(state.begin(true));
        assert!(!state.begin(false));
        assert_eq!(state, Reconciled::Pending { tentative: true, previous: false });
    }

    #[test]
    fn settle_without_pending_is_noop() {
        let mut state = Reconciled::new(3);
        assert!(!state.confirm());
        assert!(!state.rollback());
        assert_eq!(state, Reconciled::Settled(3));
    }

    #[test]
    fn toggle_twice_is_identity() {
        let start = LikeState {
            liked: true,
            likes_count: 1,
        };
        let (once, action) = start.toggled();
        assert_eq!(action, LikeAction::Unlike);
        assert_eq!(once, LikeState { liked: false, likes_count: 0 });
        assert_eq!(once.toggled().0, start);
    }

    #[test]
    fn tentative_unlike_never_goes_negative() {
        let stale = LikeState {
            liked: true,
            likes_count: 0,
        };
        let (tentative, action) = stale.toggled();
        assert_eq!(action, LikeAction::Unlike);
        assert_eq!(tentative.likes_count, 0);

        let mut state = Reconciled::new(stale);
        assert!(state.begin(tentative));
        assert!(state.rollback());
        assert_eq!(state, Reconciled::Settled(stale));
    }
}
