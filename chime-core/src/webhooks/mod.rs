//! Webhook registry and HTTP dispatch.

mod dispatcher;
mod registry;

pub use dispatcher::WebhookDispatcher;
pub use registry::{Webhook, WebhookRegistry};
