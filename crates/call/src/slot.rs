//! A single-fire completion cell: the first outcome committed wins, later ones are
//! dropped.
//!
//! An outcome committed before anyone listens is parked and handed to the listener
//! as soon as it is attached.

use std::fmt;
use std::sync::{Mutex, PoisonError};

type Listener<T> = Box<dyn FnOnce(T) + Send>;

pub struct CompletionSlot<T> {
    state: Mutex<State<T>>,
}

enum State<T> {
    Pending(Option<Listener<T>>),
    Parked(T),
    Done,
}

impl<T> CompletionSlot<T> {
    pub fn new() -> Self {
        Self { state: Mutex::new(State::Pending(None)) }
    }

    /// Attaches the listener, which is called at most once, outside of the slot's lock.
    pub fn listen<F>(&self, listener: F)
    where
        F: FnOnce(T) + Send + 'static,
    {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match std::mem::replace(&mut *state, State::Done) {
            State::Pending(_) => *state = State::Pending(Some(Box::new(listener))),
            State::Parked(value) => {
                drop(state);
                listener(value);
            }
            State::Done => {}
        }
    }

    /// Commits the outcome; returns false if one was already committed.
    pub fn try_commit(&self, value: T) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match std::mem::replace(&mut *state, State::Done) {
            State::Pending(Some(listener)) => {
                drop(state);
                listener(value);
                true
            }
            State::Pending(None) => {
                *state = State::Parked(value);
                true
            }
            parked_or_done => {
                *state = parked_or_done;
                false
            }
        }
    }

    pub fn is_committed(&self) -> bool {
        !matches!(*self.state.lock().unwrap_or_else(PoisonError::into_inner), State::Pending(_))
    }
}

impl<V, E> CompletionSlot<Result<V, E>> {
    pub fn try_complete(&self, value: V) -> bool {
        self.try_commit(Ok(value))
    }

    pub fn try_fail(&self, error: E) -> bool {
        self.try_commit(Err(error))
    }
}

impl<T> Default for CompletionSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for CompletionSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match *self.state.lock().unwrap_or_else(PoisonError::into_inner) {
            State::Pending(None) => "pending",
            State::Pending(Some(_)) => "listening",
            State::Parked(_) => "parked",
            State::Done => "done",
        };
        f.debug_struct("CompletionSlot").field("state", &state).finish()
    }
}
