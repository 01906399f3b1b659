// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{LoopSignal, StdMutex};
use std::sync::{Arc, Condvar};

pub type SafeHandoff = Arc<HandoffSlots>;

/// What the dispatch loop hands back to the caller waiting in
/// [`crate::Readline::read_line()`].
#[derive(Debug)]
pub enum Handoff {
    Line(Vec<char>),
    Signal(LoopSignal),
}

#[derive(Debug, Default)]
struct Slots {
    line: Option<Vec<char>>,
    signal: Option<LoopSignal>,
    is_closed: bool,
}

/// Two single slot channels, one for completed lines and one for signals, with one
/// consumer that waits on both at once.
///
/// A producer blocks while its slot is still full. The consumer blocks until either
/// slot has something in it. A line that is already waiting is handed out before a
/// signal that arrived after it.
#[derive(Debug, Default)]
pub struct HandoffSlots {
    slots: StdMutex<Slots>,
    changed: Condvar,
}

impl HandoffSlots {
    #[must_use]
    pub fn new() -> SafeHandoff { Arc::new(Self::default()) }

    /// Returns `false` if the consumer side is gone.
    pub fn send_line(&self, line: Vec<char>) -> bool {
        self.send_into(|slots| &mut slots.line, line)
    }

    /// Returns `false` if the consumer side is gone.
    pub fn send_signal(&self, signal: LoopSignal) -> bool {
        self.send_into(|slots| &mut slots.signal, signal)
    }

    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    fn send_into<T>(&self, slot: impl Fn(&mut Slots) -> &mut Option<T>, value: T) -> bool {
        let mut slots = self.slots.lock().unwrap();
        while !slots.is_closed && slot(&mut *slots).is_some() {
            slots = self.changed.wait(slots).unwrap();
        }
        if slots.is_closed {
            return false;
        }
        *slot(&mut *slots) = Some(value);
        self.changed.notify_all();
        true
    }

    /// Block until a line or a signal is available. Returns [`None`] once closed and
    /// drained.
    ///
    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    pub fn recv(&self) -> Option<Handoff> {
        let mut slots = self.slots.lock().unwrap();
        loop {
            if let Some(line) = slots.line.take() {
                self.changed.notify_all();
                return Some(Handoff::Line(line));
            }
            if let Some(signal) = slots.signal.take() {
                self.changed.notify_all();
                return Some(Handoff::Signal(signal));
            }
            if slots.is_closed {
                return None;
            }
            slots = self.changed.wait(slots).unwrap();
        }
    }

    /// Wake up everyone. Later sends are refused; anything already in a slot can still
    /// be received.
    ///
    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    pub fn close(&self) {
        self.slots.lock().unwrap().is_closed = true;
        self.changed.notify_all();
    }

    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.slots.lock().unwrap().is_closed }
}
