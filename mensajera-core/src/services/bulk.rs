use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::services::dispatcher::{MessageDispatcher, SendRequest};
use crate::Error;
use mensajera_common::models::{FalloEnvio, SendOutcome};

/// Hook invoked after every individual send. The campaign layer uses it to
/// persist incremental progress; everyone else gets the no-op.
#[async_trait]
pub trait SendObserver: Send + Sync {
    async fn on_exito(&self, _outcome: &SendOutcome) {}
    async fn on_fallo(&self, _numero: &str, _error: &Error) {}
}

pub struct NoopObserver;

#[async_trait]
impl SendObserver for NoopObserver {}

/// Aggregate of one batch run. Outcomes are recorded in recipient input
/// order, so `exitosos.len() + fallidos.len()` always equals the number of
/// recipients handed in.
#[derive(Debug, Default)]
pub struct BulkOutcome {
    pub exitosos: Vec<SendOutcome>,
    pub fallidos: Vec<FalloEnvio>,
}

impl BulkOutcome {
    pub fn total(&self) -> usize {
        self.exitosos.len() + self.fallidos.len()
    }
}

/// Drives a dispatch loop over a recipient list: strictly sequential, in
/// input order, with a fixed inter-send delay. A single failure is recorded
/// and iteration continues; nothing aborts the batch and prior successes
/// are never rolled back.
pub struct BulkSendCoordinator {
    dispatcher: Arc<MessageDispatcher>,
}

impl BulkSendCoordinator {
    pub fn new(dispatcher: Arc<MessageDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// `delay` is the fixed pause between consecutive sends: none before
    /// the first recipient, none after the last. Fixed-interval pacing, not
    /// a token bucket; throughput is capped conservatively by design.
    pub async fn enviar_todos<F>(
        &self,
        telefonos: &[String],
        build_request: F,
        delay: Duration,
        observer: &dyn SendObserver,
    ) -> BulkOutcome
    where
        F: Fn(&str) -> SendRequest + Send + Sync,
    {
        let mut resultado = BulkOutcome::default();

        info!(
            "Bulk send starting: {} recipients, {}ms between sends",
            telefonos.len(),
            delay.as_millis()
        );

        for (i, numero) in telefonos.iter().enumerate() {
            let request = build_request(numero);
            match self.dispatcher.enviar(&request).await {
                Ok(result) => {
                    observer.on_exito(&result.outcome).await;
                    resultado.exitosos.push(result.outcome);
                }
                Err(e) => {
                    warn!("Send to {} failed: {}", numero, e);
                    observer.on_fallo(numero, &e).await;
                    resultado.fallidos.push(FalloEnvio {
                        numero: numero.clone(),
                        error: e.to_string(),
                    });
                }
            }

            if i + 1 < telefonos.len() && !delay.is_zero() {
                sleep(delay).await;
            }
        }

        info!(
            "Bulk send finished: {} ok, {} failed",
            resultado.exitosos.len(),
            resultado.fallidos.len()
        );

        resultado
    }
}
