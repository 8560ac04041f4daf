//! Per-agent action arbitration.
//!
//! Each agent owns exactly one action slot. Competing requests (move,
//! attack, stop) are arbitrated by priority: a new request wins when its
//! priority is greater than or equal to the active one's, the displaced
//! behavior is cancelled, and the slot is handed over. The scheduler holds
//! only the slot bookkeeping; telling the displaced behavior to stand down
//! is the owning agent's job, driven by the [`Verdict`] it returns.

use crate::config::priority;

/// What an agent can be doing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
pub enum ActionType {
    Attack,
    Move,
    Stop,
    #[default]
    None,
}

/// Outcome of an action request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The slot was handed over. `displaced` names the behavior that must
    /// be cancelled, if any was active.
    Accepted { displaced: Option<ActionType> },
    /// Priority arbitration (or a frozen scheduler) refused the request.
    /// Not an error; the agent keeps doing what it was doing.
    Rejected,
}

impl Verdict {
    pub fn accepted(&self) -> bool {
        matches!(self, Verdict::Accepted { .. })
    }
}

/// Single-slot, priority-preemptive arbiter.
#[derive(Clone, Debug, Default)]
pub struct ActionScheduler {
    current: ActionType,
    current_priority: i32,
    frozen: bool,
}

impl ActionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> ActionType {
        self.current
    }

    pub fn current_priority(&self) -> i32 {
        self.current_priority
    }

    pub fn is_free(&self) -> bool {
        self.current == ActionType::None
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Whether a request at `request_priority` would currently be
    /// accepted. Lets callers with preparation work (path planning) bail
    /// out before committing the slot.
    pub fn would_accept(&self, request_priority: i32) -> bool {
        !self.frozen && request_priority >= self.current_priority
    }

    /// Requests the slot for `action` at `request_priority`.
    ///
    /// Accepted iff the scheduler is not frozen and either the slot is
    /// free or the request's priority ties or beats the active one (the
    /// newer request wins ties).
    pub fn request(&mut self, action: ActionType, request_priority: i32) -> Verdict {
        debug_assert_ne!(action, ActionType::None, "None is the idle slot state");
        if !self.would_accept(request_priority) {
            return Verdict::Rejected;
        }

        let displaced = match self.current {
            ActionType::None => None,
            active => Some(active),
        };
        self.current = action;
        self.current_priority = request_priority;
        Verdict::Accepted { displaced }
    }

    /// Unconditionally clears the slot back to idle `{None, 0}`.
    ///
    /// Returns the displaced behavior so the agent can cancel it. The
    /// caller fires the "action finished" notification exactly once per
    /// call; this is the sole channel through which waiting requesters
    /// learn the slot is free.
    pub fn clear(&mut self) -> Option<ActionType> {
        let displaced = match self.current {
            ActionType::None => None,
            active => Some(active),
        };
        self.current = ActionType::None;
        self.current_priority = priority::IDLE;
        displaced
    }

    /// Clears and locks the slot; no request is ever accepted again.
    /// Used on death.
    pub fn freeze(&mut self) -> Option<ActionType> {
        let displaced = self.clear();
        self.frozen = true;
        displaced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_slot_accepts_any_priority() {
        let mut s = ActionScheduler::new();
        let v = s.request(ActionType::Move, priority::AI);
        assert_eq!(v, Verdict::Accepted { displaced: None });
        assert_eq!(s.current(), ActionType::Move);
    }

    #[test]
    fn lower_priority_is_rejected_and_slot_unchanged() {
        let mut s = ActionScheduler::new();
        s.request(ActionType::Attack, priority::PLAYER);
        assert_eq!(s.request(ActionType::Move, priority::AI), Verdict::Rejected);
        assert_eq!(s.current(), ActionType::Attack);
        assert_eq!(s.current_priority(), priority::PLAYER);
    }

    #[test]
    fn equal_priority_preempts_and_names_displaced() {
        let mut s = ActionScheduler::new();
        s.request(ActionType::Move, priority::AI);
        let v = s.request(ActionType::Attack, priority::AI);
        assert_eq!(
            v,
            Verdict::Accepted {
                displaced: Some(ActionType::Move)
            }
        );
        assert_eq!(s.current(), ActionType::Attack);
    }

    #[test]
    fn priority_is_monotonic_until_cleared() {
        let mut s = ActionScheduler::new();
        let mut last = priority::IDLE;
        for p in [priority::AI, priority::AI, priority::PLAYER, priority::LEADER] {
            if s.request(ActionType::Move, p).accepted() {
                assert!(p >= last);
                last = p;
            }
        }
        s.clear();
        assert_eq!(s.current_priority(), priority::IDLE);
        assert!(s.request(ActionType::Stop, priority::AI).accepted());
    }

    #[test]
    fn clear_resets_to_idle_and_reports_displaced() {
        let mut s = ActionScheduler::new();
        s.request(ActionType::Attack, priority::LEADER);
        assert_eq!(s.clear(), Some(ActionType::Attack));
        assert_eq!(s.clear(), None);
        assert!(s.is_free());
        assert_eq!(s.current_priority(), priority::IDLE);
    }

    #[test]
    fn frozen_scheduler_refuses_everything() {
        let mut s = ActionScheduler::new();
        s.request(ActionType::Move, priority::AI);
        assert_eq!(s.freeze(), Some(ActionType::Move));
        assert_eq!(
            s.request(ActionType::Attack, priority::LEADER),
            Verdict::Rejected
        );
        assert!(s.is_free());
    }
}
