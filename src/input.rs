//! Keyboard input: a listener thread feeding a channel, and the key map.

use std::thread;

use crossbeam_channel::{Receiver, TryRecvError, unbounded};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A player command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Jump,
    Duck,
    Quit,
    Restart,
    Pause,
    Mute,
    /// Any other key; releases a held down input
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key { action: Action, raw: Option<char> },
    Resize(u16, u16),
}

pub fn map_key(key: &KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let action = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char(' ') | KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Action::Jump,
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Action::Duck,
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Restart,
        KeyCode::Char('p') | KeyCode::Char('P') => Action::Pause,
        KeyCode::Char('m') | KeyCode::Char('M') => Action::Mute,
        _ => Action::Other,
    };
    Some(action)
}

fn translate(event: Event) -> Option<InputEvent> {
    match event {
        Event::Key(key) => map_key(&key).map(|action| InputEvent::Key {
            action,
            raw: match key.code {
                KeyCode::Char(ch) => Some(ch),
                _ => None,
            },
        }),
        Event::Resize(cols, rows) => Some(InputEvent::Resize(cols, rows)),
        _ => None,
    }
}

/// Where the game loop gets its input from.
pub trait InputSource {
    /// The next pending event, without blocking.
    fn poll(&mut self) -> Option<InputEvent>;

    /// Block until the next event. `None` once the source is closed.
    fn wait(&mut self) -> Option<InputEvent>;
}

impl InputEvent {
    /// Events that autorepeat may flood the queue with. A run of them counts
    /// once; toggles never collapse.
    fn repeats(&self, next: &InputEvent) -> bool {
        match (self, next) {
            (InputEvent::Resize(..), InputEvent::Resize(..)) => true,
            (InputEvent::Key { action: a, .. }, InputEvent::Key { action: b, .. }) => {
                a == b && !matches!(a, Action::Pause | Action::Mute)
            }
            _ => false,
        }
    }
}

/// The game side of the listener channel.
///
/// Each read collapses a run of repeated events into one, so a held key
/// cannot queue up seconds of stale input at the tick rate.
pub struct InputQueue {
    receiver: Receiver<InputEvent>,
    pending: Option<InputEvent>,
}

impl InputQueue {
    pub fn new(receiver: Receiver<InputEvent>) -> Self {
        Self {
            receiver,
            pending: None,
        }
    }

    fn coalesce(&mut self, mut event: InputEvent) -> InputEvent {
        while let Ok(next) = self.receiver.try_recv() {
            if !event.repeats(&next) {
                self.pending = Some(next);
                break;
            }
            // Keep the latest size
            event = next;
        }
        event
    }
}

impl InputSource for InputQueue {
    fn poll(&mut self) -> Option<InputEvent> {
        let event = match self.pending.take() {
            Some(event) => event,
            None => match self.receiver.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return None,
            },
        };
        Some(self.coalesce(event))
    }

    fn wait(&mut self) -> Option<InputEvent> {
        let event = match self.pending.take() {
            Some(event) => event,
            None => self.receiver.recv().ok()?,
        };
        Some(self.coalesce(event))
    }
}

/// Reads terminal events on a dedicated thread.
pub struct InputListener;

impl InputListener {
    /// Start the listener. It stops once the queue is dropped or the
    /// terminal stops delivering events.
    pub fn spawn() -> InputQueue {
        let (sender, receiver) = unbounded();
        thread::spawn(move || {
            loop {
                let event = match event::read() {
                    Ok(event) => event,
                    Err(err) => {
                        log::warn!("input listener stopped: {err}");
                        return;
                    }
                };
                let Some(event) = translate(event) else {
                    continue;
                };
                if sender.send(event).is_err() {
                    log::debug!("input receiver dropped, listener exiting");
                    return;
                }
            }
        });
        InputQueue::new(receiver)
    }
}
