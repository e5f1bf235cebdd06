use std::sync::Arc;

use crate::{
    config::{EmailConfig, StoreBackend},
    services::email::{EmailLayer, LogNotifier, Notifier},
};

pub fn setup_email_service(config: &EmailConfig, backend: StoreBackend) -> Arc<dyn Notifier> {
    if config.api_key.is_empty() && backend == StoreBackend::Memory {
        tracing::warn!("RESEND_API_KEY not set; emails will be logged instead of sent");

        return Arc::new(LogNotifier {
            app_url: config.app_url.clone(),
        });
    }

    Arc::new(EmailLayer::new(config))
}
