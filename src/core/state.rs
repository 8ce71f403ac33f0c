// core/state.rs

// Tracks the progress of one search attempt as a finite state machine
// (Ready, Orienting, Traversing, Inspecting, and the three terminal states).
// Every transition is checked against an explicit table and logged.

// Dependencies
use log::{debug, error, info, warn};

use crate::error::{Result, SearchError};

/// Search execution states
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchState {
    /// Path loaded, nothing moved yet
    Ready,
    /// Driving to the first waypoint and turning to the initial heading
    Orienting,
    /// Driving along the perimeter
    Traversing,
    /// Looking inward for the flag
    Inspecting,
    /// Flag confirmed, agent parked at it
    Captured,
    /// Budget exhausted before capture
    TimedOut,
    /// Every waypoint visited without capture
    Exhausted,
}

impl SearchState {
    /// Whether the state ends the attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SearchState::Captured | SearchState::TimedOut | SearchState::Exhausted
        )
    }

    /// Legal transition table.
    pub fn can_transition_to(&self, next: SearchState) -> bool {
        use SearchState::*;

        match (self, next) {
            (Ready, Orienting) | (Ready, Exhausted) => true,
            (Orienting, Traversing) | (Orienting, TimedOut) | (Orienting, Exhausted) => true,
            (Traversing, Inspecting) | (Traversing, TimedOut) | (Traversing, Exhausted) => true,
            (Inspecting, Traversing) | (Inspecting, Captured) | (Inspecting, TimedOut) => true,
            _ => false,
        }
    }
}

/// Holds the current search state and enforces the transition table.
#[derive(Debug)]
pub struct SearchStateMachine {
    current: SearchState,
    transitions: usize,
}

impl SearchStateMachine {
    /// Starts in Ready
    pub fn new() -> Self {
        SearchStateMachine {
            current: SearchState::Ready,
            transitions: 0,
        }
    }

    /// Moves to `next`, refusing anything outside the table.
    pub fn transition(&mut self, next: SearchState) -> Result<()> {
        if self.current == next {
            return Ok(());
        }
        if !self.current.can_transition_to(next) {
            error!("Illegal search transition {:?} -> {:?}", self.current, next);
            return Err(SearchError::Internal(format!(
                "illegal search transition {:?} -> {:?}",
                self.current, next
            )));
        }

        match next {
            SearchState::Captured => info!("Transitioned to Captured from {:?}", self.current),
            SearchState::TimedOut => warn!("Transitioned to TimedOut from {:?}", self.current),
            SearchState::Exhausted => info!("Transitioned to Exhausted: path walked without capture"),
            _ => debug!("Transitioned {:?} -> {:?}", self.current, next),
        }

        self.current = next;
        self.transitions += 1;
        Ok(())
    }

    /// Returns to Ready for a fresh attempt
    pub fn reset(&mut self) {
        self.current = SearchState::Ready;
        self.transitions = 0;
    }

    /// Returns current state
    pub fn get_state(&self) -> SearchState {
        self.current
    }

    /// Number of transitions taken since the last reset
    pub fn transition_count(&self) -> usize {
        self.transitions
    }
}

impl Default for SearchStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn walks_the_happy_path() {
        let mut fsm = SearchStateMachine::new();
        for next in [
            SearchState::Orienting,
            SearchState::Traversing,
            SearchState::Inspecting,
            SearchState::Traversing,
            SearchState::Inspecting,
            SearchState::Captured,
        ] {
            fsm.transition(next).unwrap();
        }
        assert_eq!(fsm.get_state(), SearchState::Captured);
        assert!(fsm.get_state().is_terminal());
        assert_eq!(fsm.transition_count(), 6);
    }

    #[rstest]
    #[case(SearchState::Ready, SearchState::Inspecting)]
    #[case(SearchState::Ready, SearchState::Captured)]
    #[case(SearchState::Orienting, SearchState::Captured)]
    #[case(SearchState::Traversing, SearchState::Captured)]
    #[case(SearchState::Captured, SearchState::Traversing)]
    #[case(SearchState::TimedOut, SearchState::Ready)]
    #[case(SearchState::Exhausted, SearchState::Orienting)]
    fn rejects_illegal_transitions(#[case] from: SearchState, #[case] to: SearchState) {
        assert!(!from.can_transition_to(to));
    }

    #[test]
    fn illegal_transition_is_internal_error() {
        let mut fsm = SearchStateMachine::new();
        let err = fsm.transition(SearchState::Captured).unwrap_err();
        assert!(matches!(err, SearchError::Internal(_)));
        assert_eq!(fsm.get_state(), SearchState::Ready);
    }

    #[test]
    fn reset_returns_to_ready() {
        let mut fsm = SearchStateMachine::new();
        fsm.transition(SearchState::Orienting).unwrap();
        fsm.transition(SearchState::TimedOut).unwrap();
        fsm.reset();
        assert_eq!(fsm.get_state(), SearchState::Ready);
        assert_eq!(fsm.transition_count(), 0);
    }
}
