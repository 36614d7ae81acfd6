use std::sync::mpsc::{self, Receiver, RecvError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as TermEvent, KeyEvent};

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Resize,
    /// Fired every tick so the dashboard notices a date rollover.
    Tick,
}

/// Terminal input read on a background thread and forwarded over a channel.
pub struct EventHandler {
    rx: Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || pump(tx, tick));
        Self { rx }
    }

    pub fn next(&self) -> Result<Event, RecvError> {
        self.rx.recv()
    }
}

/// Runs until the receiver is dropped or the terminal stops delivering input.
fn pump(tx: Sender<Event>, tick: Duration) {
    let mut next_tick = Instant::now() + tick;
    loop {
        let wait = next_tick.saturating_duration_since(Instant::now());
        let ready = match event::poll(wait) {
            Ok(ready) => ready,
            Err(e) => {
                log::warn!("polling terminal input failed: {}", e);
                return;
            }
        };

        if ready {
            let forwarded = match event::read() {
                Ok(TermEvent::Key(key)) => Some(Event::Key(key)),
                Ok(TermEvent::Resize(..)) => Some(Event::Resize),
                Ok(_) => None,
                Err(e) => {
                    log::warn!("terminal input stopped: {}", e);
                    return;
                }
            };
            if let Some(ev) = forwarded {
                if tx.send(ev).is_err() {
                    return;
                }
            }
        }

        if Instant::now() >= next_tick {
            if tx.send(Event::Tick).is_err() {
                return;
            }
            next_tick = Instant::now() + tick;
        }
    }
}
