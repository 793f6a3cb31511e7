//! Pipeline counters, registered on the process-wide default registry so
//! each service's `/metrics` endpoint picks them up without wiring.

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts};

use crate::subscriber::HandleOutcome;

static VIEWED_EVENTS_PUBLISHED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new(
        "viewed_events_published_total",
        "Viewed events successfully handed to the bus",
    )
    .expect("failed to create viewed_events_published_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register viewed_events_published_total");
    counter
});

static VIEWED_EVENT_PUBLISH_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new(
        "viewed_event_publish_failures_total",
        "Viewed events dropped because the bus was unavailable",
    )
    .expect("failed to create viewed_event_publish_failures_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register viewed_event_publish_failures_total");
    counter
});

static VIEWED_EVENTS_CONSUMED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "viewed_events_consumed_total",
            "Viewed events handled by this consumer, by outcome",
        ),
        &["outcome"],
    )
    .expect("failed to create viewed_events_consumed_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register viewed_events_consumed_total");
    counter
});

pub(crate) fn record_publish() {
    VIEWED_EVENTS_PUBLISHED_TOTAL.inc();
}

pub(crate) fn record_publish_failure() {
    VIEWED_EVENT_PUBLISH_FAILURES_TOTAL.inc();
}

pub(crate) fn record_consumed(outcome: HandleOutcome) {
    VIEWED_EVENTS_CONSUMED_TOTAL
        .with_label_values(&[outcome.as_str()])
        .inc();
}
