use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Resize(#[allow(dead_code)] u16, #[allow(dead_code)] u16),
}

/// Terminal input on a background thread. Only key presses are forwarded,
/// and a `Tick` goes out every `tick_rate` even while keys keep arriving so
/// countdowns never stall under fast typing.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        thread::spawn(move || {
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate.saturating_sub(last_tick.elapsed());
                if event::poll(timeout).unwrap_or(false) {
                    let sent = match event::read() {
                        Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                            tx.send(AppEvent::Key(key))
                        }
                        Ok(Event::Resize(w, h)) => tx.send(AppEvent::Resize(w, h)),
                        _ => Ok(()),
                    };
                    if sent.is_err() {
                        return;
                    }
                }
                if last_tick.elapsed() >= tick_rate {
                    if tx.send(AppEvent::Tick).is_err() {
                        return;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self { rx, _tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
