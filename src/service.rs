//! Message routing between the bubble and the background service that owns
//! settings storage and outbound translation calls. The two sides share
//! nothing but the command channel and the retranslate outcome slot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::settings::BubbleSettings;
use crate::translate;

/// Commands the bubble side sends to the background service. Each
/// request/response variant carries its own reply channel; the service keeps
/// that channel until it has answered.
pub enum Command {
    GetSettings {
        reply: Sender<BubbleSettings>,
    },
    SaveSettings {
        data: BubbleSettings,
        reply: Sender<bool>,
    },
    Retranslate {
        text: String,
        target_language: String,
        generation: u64,
    },
    /// Notification only, no reply.
    TranslationError {
        message: String,
    },
}

/// Completed retranslate call, tagged with the generation of the request
/// that started it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetranslateOutcome {
    pub generation: u64,
    pub result: Result<String, String>,
}

/// Bubble-side handle to the background service.
///
/// `get_settings`/`save_settings` are one-shot request/response exchanges
/// that block until the service answers. `retranslate` is fire-and-forget;
/// the outcome lands in a shared slot and is picked up via
/// [`Mediator::take_retranslate`], which drops results that are stale by the
/// time they arrive.
pub struct Mediator {
    tx: Option<Sender<Command>>,
    outcome: Arc<Mutex<Option<RetranslateOutcome>>>,
    generation: Arc<AtomicU64>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Mediator {
    pub fn spawn(settings_path: impl Into<String>) -> Self {
        Self::spawn_with_endpoint(settings_path, translate::DEFAULT_ENDPOINT)
    }

    pub fn spawn_with_endpoint(
        settings_path: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let outcome = Arc::new(Mutex::new(None));
        let path = settings_path.into();
        let endpoint = endpoint.into();
        let slot = outcome.clone();
        let handle = thread::spawn(move || run_service(rx, path, endpoint, slot));
        Self {
            tx: Some(tx),
            outcome,
            generation: Arc::new(AtomicU64::new(0)),
            handle: Some(handle),
        }
    }

    fn send(&self, cmd: Command) -> bool {
        self.tx
            .as_ref()
            .map(|tx| tx.send(cmd).is_ok())
            .unwrap_or(false)
    }

    pub fn get_settings(&self) -> BubbleSettings {
        let (reply, rx) = mpsc::channel();
        if !self.send(Command::GetSettings { reply }) {
            return BubbleSettings::default();
        }
        rx.recv().unwrap_or_default()
    }

    pub fn save_settings(&self, data: BubbleSettings) -> bool {
        let (reply, rx) = mpsc::channel();
        if !self.send(Command::SaveSettings { data, reply }) {
            return false;
        }
        rx.recv().unwrap_or(false)
    }

    /// Request a fresh translation of `text`. Returns the generation assigned
    /// to this request; any outcome carrying an older generation is discarded
    /// by [`Mediator::take_retranslate`].
    pub fn retranslate(&self, text: String, target_language: String) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.send(Command::Retranslate {
            text,
            target_language,
            generation,
        });
        generation
    }

    /// Take the completed retranslate outcome, if any. Outcomes from requests
    /// older than the newest issued one are dropped, never surfaced.
    pub fn take_retranslate(&self) -> Option<RetranslateOutcome> {
        let mut slot = self.outcome.lock().ok()?;
        let out = slot.take()?;
        if out.generation == self.generation.load(Ordering::SeqCst) {
            Some(out)
        } else {
            tracing::debug!(generation = out.generation, "dropping stale retranslate result");
            None
        }
    }

    pub fn notify_error(&self, message: String) {
        self.send(Command::TranslationError { message });
    }
}

impl Drop for Mediator {
    // Close the channel first so the service drains pending commands, then
    // wait for it to finish.
    fn drop(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_service(
    rx: Receiver<Command>,
    settings_path: String,
    endpoint: String,
    outcome: Arc<Mutex<Option<RetranslateOutcome>>>,
) {
    for cmd in rx {
        match cmd {
            Command::GetSettings { reply } => {
                let settings = BubbleSettings::load(&settings_path).unwrap_or_else(|e| {
                    tracing::warn!("failed to load settings: {e}; using defaults");
                    BubbleSettings::default()
                });
                let _ = reply.send(settings);
            }
            Command::SaveSettings { data, reply } => {
                let ok = match data.save(&settings_path) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!("failed to save settings: {e}");
                        false
                    }
                };
                let _ = reply.send(ok);
            }
            Command::Retranslate {
                text,
                target_language,
                generation,
            } => {
                // Each call runs on its own thread so a slow endpoint does
                // not block settings traffic; staleness is resolved by the
                // generation tag on the outcome.
                let endpoint = endpoint.clone();
                let slot = outcome.clone();
                thread::spawn(move || {
                    let result = translate::translate_with_endpoint(
                        &endpoint,
                        &text,
                        &target_language,
                    )
                    .map_err(|e| e.to_string());
                    if let Ok(mut lock) = slot.lock() {
                        // A slow response from an older request must not
                        // clobber a newer result still waiting to be polled.
                        let newer_pending =
                            lock.as_ref().map_or(false, |o| o.generation > generation);
                        if !newer_pending {
                            *lock = Some(RetranslateOutcome { generation, result });
                        }
                    }
                });
            }
            Command::TranslationError { message } => {
                tracing::error!("translation failed: {message}");
            }
        }
    }
}
