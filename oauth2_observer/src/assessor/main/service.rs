use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::assessor::errors::ServiceError;
use crate::assessor::types::TrafficEvent;

use super::core::OAuthClientAssessor;
use super::notifier::UserNotifier;

/// Cloneable entry point for traffic sources.
#[derive(Debug, Clone)]
pub struct TrafficSender {
    sender: mpsc::UnboundedSender<TrafficEvent>,
}

impl TrafficSender {
    pub fn send(&self, event: TrafficEvent) -> Result<(), ServiceError> {
        self.sender.send(event).map_err(|_| ServiceError::Closed)
    }
}

/// Handle to a running assessor task. Dropping it stops the task.
pub struct AssessorHandle {
    sender: TrafficSender,
    stop: oneshot::Sender<()>,
    task: JoinHandle<OAuthClientAssessor>,
}

impl AssessorHandle {
    pub fn send(&self, event: TrafficEvent) -> Result<(), ServiceError> {
        self.sender.send(event)
    }

    pub fn sender(&self) -> TrafficSender {
        self.sender.clone()
    }

    /// Stop accepting events, process the ones already queued and return the assessor.
    pub async fn shutdown(self) -> Result<OAuthClientAssessor, ServiceError> {
        // The task may already be gone; joining reports why.
        let _ = self.stop.send(());
        self.task
            .await
            .map_err(|e| ServiceError::Join(e.to_string()))
    }
}

/// Run `assessor` on its own task, the single writer of its registries.
///
/// Events sent through the handle are processed in order. Eviction deadlines
/// fire without traffic. Notifications are delivered to `notifier`.
pub fn spawn_assessor<N>(assessor: OAuthClientAssessor, notifier: N) -> AssessorHandle
where
    N: UserNotifier,
{
    let (sender, events) = mpsc::unbounded_channel();
    let (stop, stopped) = oneshot::channel();
    let task = tokio::spawn(run(assessor, notifier, events, stopped));

    AssessorHandle {
        sender: TrafficSender { sender },
        stop,
        task,
    }
}

async fn run<N: UserNotifier>(
    mut assessor: OAuthClientAssessor,
    notifier: N,
    mut events: mpsc::UnboundedReceiver<TrafficEvent>,
    mut stopped: oneshot::Receiver<()>,
) -> OAuthClientAssessor {
    tracing::info!("Assessor started");

    loop {
        let deadline = assessor.next_deadline();

        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };
                deliver(&mut assessor, &notifier, &event).await;
            }
            _ = sleep_until(deadline) => {
                let evicted = assessor.evict_expired(Instant::now());
                tracing::debug!(evicted, "Eviction deadline reached");
            }
            _ = &mut stopped => {
                events.close();
                while let Some(event) = events.recv().await {
                    deliver(&mut assessor, &notifier, &event).await;
                }
                break;
            }
        }
    }

    tracing::info!(
        tracked_flows = assessor.detector().len(),
        "Assessor stopped"
    );
    assessor
}

async fn deliver<N: UserNotifier>(
    assessor: &mut OAuthClientAssessor,
    notifier: &N,
    event: &TrafficEvent,
) {
    for notification in assessor.handle_event(event, Instant::now()) {
        notifier
            .send_message(&notification.title, &notification.body)
            .await;
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
