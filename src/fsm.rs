//! Generic finite-state-machine engine
//!
//! Every actor (camera, ship, enemies) and the game session itself run on one
//! of these. States are registered by key before `start`, constructed lazily
//! the first time they become current, and reused across re-entries. The
//! owner context is passed explicitly into every callback rather than held as
//! a back-pointer, so individual states can be exercised in isolation.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Transition request returned from a state's `update`.
///
/// Returning `To(key)` transitions synchronously within the same machine
/// `update` call: the old state's `exit` runs, then the new state's `enter`.
/// The new state's `update` is NOT invoked until the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<K> {
    /// Remain in the current state
    Stay,
    /// Switch to the state registered under `K`. Requesting the current key
    /// is a legal no-op.
    To(K),
}

/// A named behavior unit with enter / per-tick update / exit callbacks.
///
/// States own only their per-activation transient fields (timers, counters)
/// and reset them in `enter`; everything shared lives on the owner.
pub trait State<O, K> {
    fn enter(&mut self, _owner: &mut O) {}
    fn update(&mut self, owner: &mut O, dt: f32) -> Transition<K>;
    fn exit(&mut self, _owner: &mut O) {}
}

type StateFactory<O, K> = Box<dyn Fn() -> Box<dyn State<O, K>>>;

struct Slot<O, K> {
    factory: StateFactory<O, K>,
    /// Constructed on first entry, reused afterwards
    state: Option<Box<dyn State<O, K>>>,
}

/// Keyed state machine. Exactly one state is current at any time after
/// `start`; transitions to unregistered keys are programming errors and
/// fail fast.
pub struct StateMachine<O, K: Copy + Eq + Hash + Debug> {
    slots: HashMap<K, Slot<O, K>>,
    current: Option<K>,
}

impl<O, K: Copy + Eq + Hash + Debug> Default for StateMachine<O, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O, K: Copy + Eq + Hash + Debug> StateMachine<O, K> {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            current: None,
        }
    }

    /// Associate a key with a state factory. No instance is created yet.
    ///
    /// Panics if called after `start` or if the key is already registered.
    pub fn register<F>(&mut self, key: K, factory: F)
    where
        F: Fn() -> Box<dyn State<O, K>> + 'static,
    {
        assert!(
            self.current.is_none(),
            "state {key:?} registered after machine start"
        );
        let prev = self.slots.insert(
            key,
            Slot {
                factory: Box::new(factory),
                state: None,
            },
        );
        assert!(prev.is_none(), "state {key:?} registered twice");
    }

    /// Enter the initial state. Must be called exactly once before `update`.
    pub fn start(&mut self, owner: &mut O, initial: K) {
        assert!(self.current.is_none(), "state machine started twice");
        self.enter_state(owner, initial);
    }

    /// Key of the current state, if started.
    pub fn current(&self) -> Option<K> {
        self.current
    }

    /// Advance the current state by one tick, applying any transition it
    /// requests before returning.
    pub fn update(&mut self, owner: &mut O, dt: f32) {
        let key = self.current.expect("state machine updated before start");
        let mut state = self
            .slots
            .get_mut(&key)
            .expect("current state has a slot")
            .state
            .take()
            .expect("current state is constructed");
        let transition = state.update(owner, dt);
        self.slots.get_mut(&key).expect("slot exists").state = Some(state);

        if let Transition::To(next) = transition {
            if next != key {
                self.exit_state(owner, key);
                self.enter_state(owner, next);
            }
        }
    }

    fn enter_state(&mut self, owner: &mut O, key: K) {
        let slot = self
            .slots
            .get_mut(&key)
            .unwrap_or_else(|| panic!("transition to unregistered state {key:?}"));
        let state = slot.state.get_or_insert_with(|| (slot.factory)());
        self.current = Some(key);
        state.enter(owner);
        log::trace!("fsm: entered {key:?}");
    }

    fn exit_state(&mut self, owner: &mut O, key: K) {
        let mut state = self
            .slots
            .get_mut(&key)
            .expect("exiting a registered state")
            .state
            .take()
            .expect("exiting a constructed state");
        state.exit(owner);
        self.slots.get_mut(&key).expect("slot exists").state = Some(state);
    }
}
