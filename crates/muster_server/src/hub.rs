//! Real-time summary push channel.
//!
//! Check-ins publish the fresh summary into a broadcast channel; each
//! `GET /hub/summary` subscriber receives it as a server-sent event named
//! `SummaryUpdated`. Closing the hub ends every open stream so graceful
//! shutdown is not held up by connected dashboards.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use futures_util::stream::{self, Stream};
use log::{debug, warn};
use muster_core::{EventId, Summary, SummaryNotifier};
use serde::Deserialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;

use crate::AppState;

pub const SUMMARY_UPDATED_EVENT: &str = "SummaryUpdated";

/// Broadcast fan-out of summaries to push subscribers.
#[derive(Clone)]
pub struct SummaryHub {
    sender: broadcast::Sender<Summary>,
    closed: Arc<watch::Sender<bool>>,
}

impl SummaryHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        let (closed, _) = watch::channel(false);
        Self {
            sender,
            closed: Arc::new(closed),
        }
    }

    /// Ends every open summary stream. Streams opened afterwards end at once.
    pub fn close(&self) {
        self.closed.send_replace(true);
        debug!("event=hub_close module=hub status=ok");
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Summary> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl SummaryNotifier for SummaryHub {
    fn summary_changed(&self, summary: &Summary) {
        match self.sender.send(summary.clone()) {
            Ok(receivers) => debug!(
                "event=summary_push module=hub status=ok event_id={} receivers={}",
                summary.event_id, receivers
            ),
            Err(_) => debug!(
                "event=summary_push module=hub status=skipped event_id={} receivers=0",
                summary.event_id
            ),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamQuery {
    /// Only forward summaries of this event.
    pub event_id: Option<EventId>,
}

pub async fn summary_stream(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let receiver = state.hub.subscribe();
    let closed = state.hub.closed.subscribe();
    let filter = query.event_id;
    debug!(
        "event=hub_subscribe module=hub status=ok event_filter={}",
        filter.map_or_else(|| "*".to_string(), |id| id.to_string())
    );

    let events = stream::unfold(
        (receiver, closed),
        move |(mut receiver, mut closed)| async move {
            loop {
                let received = tokio::select! {
                    () = wait_closed(&mut closed) => return None,
                    received = receiver.recv() => received,
                };
                match received {
                    Ok(summary) => {
                        if filter.is_some_and(|event_id| event_id != summary.event_id) {
                            continue;
                        }
                        let event = match SseEvent::default()
                            .event(SUMMARY_UPDATED_EVENT)
                            .json_data(&summary)
                        {
                            Ok(event) => event,
                            Err(err) => {
                                warn!(
                                    "event=summary_push module=hub status=error event_id={} error={}",
                                    summary.event_id, err
                                );
                                continue;
                            }
                        };
                        return Some((Ok(event), (receiver, closed)));
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("event=summary_push module=hub status=lagged skipped={skipped}");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        },
    );

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Resolves once the hub is closed or dropped.
async fn wait_closed(closed: &mut watch::Receiver<bool>) {
    loop {
        let is_closed = *closed.borrow_and_update();
        if is_closed || closed.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SummaryHub;
    use muster_core::{Summary, SummaryNotifier};

    #[test]
    fn publishes_to_every_subscriber() {
        let hub = SummaryHub::new(4);
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        hub.summary_changed(&Summary::empty(5));

        assert_eq!(first.try_recv().unwrap().event_id, 5);
        assert_eq!(second.try_recv().unwrap().event_id, 5);
    }

    #[test]
    fn close_is_visible_to_every_clone() {
        let hub = SummaryHub::new(4);
        let clone = hub.clone();
        assert!(!clone.is_closed());
        hub.close();
        assert!(clone.is_closed());
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let hub = SummaryHub::new(0);
        hub.summary_changed(&Summary::empty(1));
        assert_eq!(hub.subscriber_count(), 0);
    }
}
