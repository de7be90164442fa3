//! Sequential webhook firing driven by the event queue.

use std::sync::{Arc, Mutex};
use std::thread;

use crate::event::{Event, EventReceiver, QueuePoll};
use crate::http::HttpClient;
use crate::webhooks::registry::{Webhook, WebhookRegistry};

/// Response codes treated as webhook success.
const SUCCESS_CODES: [u16; 2] = [200, 202];

/// Consumes events from its queue and fires the full registry for each, one
/// hook at a time. Network failures are logged and never surface to the
/// producer.
pub struct WebhookDispatcher {
    registry: Arc<Mutex<WebhookRegistry>>,
    client: Box<dyn HttpClient>,
}

impl WebhookDispatcher {
    pub fn new(registry: Arc<Mutex<WebhookRegistry>>, client: Box<dyn HttpClient>) -> Self {
        Self { registry, client }
    }

    /// Fires the registry for one dequeued event. Disabled registry means
    /// the event is discarded without firing.
    pub fn handle_event(&mut self, event: &Event) {
        let hooks = {
            let registry = self.registry.lock().unwrap();
            if !registry.enabled() {
                tracing::debug!("Webhooks disabled, discarding {}", event);
                return;
            }
            registry.hooks().to_vec()
        };
        self.fire_hooks(&hooks, event.kind().name(), event.context());
    }

    /// One firing pass over the hook list. An unrecognized method aborts the
    /// rest of the pass; any other failure moves on to the next hook.
    fn fire_hooks(&mut self, hooks: &[Webhook], event_name: &str, sound_file: &str) {
        tracing::info!("Firing {} webhooks for {}", hooks.len(), event_name);
        for hook in hooks {
            let query = build_query(hook, event_name, sound_file);

            let result = match hook.method.as_str() {
                "GET" => {
                    let url = if query.is_empty() {
                        hook.url.clone()
                    } else {
                        format!("{}?{}", hook.url, query)
                    };
                    self.client.get(&url)
                }
                "POST" => self.client.post_form(&hook.url, &query),
                other => {
                    tracing::error!("Unsupported HTTP method '{}', aborting dispatch pass", other);
                    break;
                }
            };

            match result {
                Ok(response) if SUCCESS_CODES.contains(&response.status) => {
                    tracing::info!("Webhook {} responded: {}", hook.url, response.body);
                }
                Ok(response) => {
                    tracing::error!("Unexpected response code {} from {}", response.status, hook.url);
                }
                Err(e) => {
                    tracing::error!("Webhook request to {} failed: {}", hook.url, e);
                }
            }
        }
    }

    /// Drains the queue for the lifetime of the process. Exits only once
    /// every producer handle is gone.
    pub fn run(mut self, events: EventReceiver) {
        loop {
            match events.poll() {
                QueuePoll::Event(event) => self.handle_event(&event),
                QueuePoll::Idle => continue,
                QueuePoll::Closed => break,
            }
        }
    }

    /// Starts the dispatch worker thread.
    pub fn spawn(self, events: EventReceiver) -> thread::JoinHandle<()> {
        thread::Builder::new()
            .name("webhook-events".to_string())
            .spawn(move || self.run(events))
            .expect("failed to spawn webhook worker")
    }
}

/// Builds a hook's query string from its parameter templates.
///
/// When the event carries no sound file and any template references
/// `%SOUND_FILE%`, the whole parameter set is abandoned and the hook fires
/// with no query string at all, not just without that one parameter. That
/// whole-set abort matches the shipped firmware and is kept deliberately.
fn build_query(hook: &Webhook, event_name: &str, sound_file: &str) -> String {
    let mut parts = Vec::with_capacity(hook.parameters.len());
    for (name, template) in &hook.parameters {
        if sound_file.is_empty() && template.contains("%SOUND_FILE%") {
            return String::new();
        }
        let value = template
            .replace("%EVENT%", event_name)
            .replace("%SOUND_FILE%", sound_file);
        parts.push(format!("{}={}", name, value));
    }
    parts.join("&")
}
