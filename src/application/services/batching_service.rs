/// Batching Service - Single-writer Batching Engine
///
/// Owns the batching engine and processes intake commands strictly one at a
/// time, so rule evaluation and assignment always see a consistent view of
/// both registries.
///
/// ## Architecture
/// - Receives commands via MPSC channel (SubmitOrder, AdvanceOrder)
/// - Processes them sequentially against the engine
/// - Sends outcomes via output channel (the reporting sink)
/// - Publishes a fresh snapshot after every command for readers such as
///   the observability server
///
/// ## Usage
/// ```rust,ignore
/// use delivery_batcher::application::services::BatchingService;
/// use tokio::sync::mpsc;
///
/// let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
/// let (out_tx, out_rx) = mpsc::unbounded_channel();
///
/// let engine = BatchingEngine::new(BatchingConfig::default(), roster)?;
/// let mut service = BatchingService::new(engine, cmd_rx, out_tx);
/// std::thread::spawn(move || service.run());
/// ```

use crate::application::use_cases::{AdvanceOrderUseCase, SubmitOrderUseCase};
use crate::domain::batcher::BatchingEngine;
use crate::domain::matching::{BatchMatcher, RuleEngine};
use crate::domain::validation::OrderValidator;
use crate::shared::metrics::METRICS;
use crate::shared::protocol::{
    AdvanceOrderRequest, AssignmentOutcome, EngineSnapshot, NewOrderRequest, OrderId, OrderStatus,
};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Snapshot shared between the service (writer) and readers
pub type SharedSnapshot = Arc<RwLock<EngineSnapshot>>;

/// Commands that the batching service can receive
#[derive(Debug, Clone)]
pub enum EngineCommand {
    SubmitOrder(NewOrderRequest),
    AdvanceOrder(AdvanceOrderRequest),
}

/// Output results from the batching service
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineOutput {
    /// Result of a submission
    Outcome(AssignmentOutcome),

    /// Submission refused before registration, or registry refusal
    Rejected { order_id: OrderId, reason: String },

    /// Lifecycle update applied
    Advanced { order_id: OrderId, status: OrderStatus },

    /// Lifecycle update refused
    AdvanceFailed { order_id: OrderId, reason: String },
}

/// Single-threaded Batching Service
///
/// # Type Parameters
/// * `M` - BatchMatcher implementation used by the engine
pub struct BatchingService<M: BatchMatcher = RuleEngine> {
    engine: BatchingEngine<M>,
    submit: SubmitOrderUseCase,
    advance: AdvanceOrderUseCase,
    command_receiver: UnboundedReceiver<EngineCommand>,
    output_sender: UnboundedSender<EngineOutput>,
    snapshot: SharedSnapshot,
}

impl<M: BatchMatcher> BatchingService<M> {
    /// Creates a new batching service around an engine
    pub fn new(
        engine: BatchingEngine<M>,
        command_receiver: UnboundedReceiver<EngineCommand>,
        output_sender: UnboundedSender<EngineOutput>,
    ) -> Self {
        Self::with_validator(engine, OrderValidator::new(), command_receiver, output_sender)
    }

    pub fn with_validator(
        engine: BatchingEngine<M>,
        validator: OrderValidator,
        command_receiver: UnboundedReceiver<EngineCommand>,
        output_sender: UnboundedSender<EngineOutput>,
    ) -> Self {
        let snapshot = Arc::new(RwLock::new(engine.snapshot()));
        BatchingService {
            engine,
            submit: SubmitOrderUseCase::new(validator),
            advance: AdvanceOrderUseCase::new(),
            command_receiver,
            output_sender,
            snapshot,
        }
    }

    /// Handle for readers of the latest snapshot
    pub fn snapshot_handle(&self) -> SharedSnapshot {
        Arc::clone(&self.snapshot)
    }

    pub fn engine(&self) -> &BatchingEngine<M> {
        &self.engine
    }

    /// Runs the main event loop
    ///
    /// Blocks and processes commands until every sender is dropped. Must not
    /// be called from inside an async task.
    pub fn run(&mut self) {
        info!(riders = self.engine.riders().len(), "batching service started");
        while let Some(command) = self.command_receiver.blocking_recv() {
            let output = self.process_command(command);
            if self.output_sender.send(output).is_err() {
                warn!("output channel closed, dropping result");
            }
        }
        info!(orders = self.engine.orders().len(), "batching service stopped");
    }

    /// Processes one command and publishes the resulting snapshot
    pub fn process_command(&mut self, command: EngineCommand) -> EngineOutput {
        let output = match command {
            EngineCommand::SubmitOrder(request) => self.process_submit(request),
            EngineCommand::AdvanceOrder(request) => self.process_advance(request),
        };
        self.publish_snapshot();
        output
    }

    fn process_submit(&mut self, request: NewOrderRequest) -> EngineOutput {
        let order_id = request.order_id;
        let timer = METRICS
            .batching_duration
            .with_label_values(&["submit"])
            .start_timer();
        let result = self.submit.execute(&mut self.engine, request);
        timer.observe_duration();

        match result {
            Ok(outcome) => {
                METRICS.orders_total.with_label_values(&["accepted"]).inc();
                self.record_outcome(&outcome);
                EngineOutput::Outcome(outcome)
            }
            Err(e) => {
                METRICS.orders_total.with_label_values(&["rejected"]).inc();
                METRICS.errors_total.with_label_values(&[e.kind()]).inc();
                warn!(order_id, error = %e, "order rejected");
                EngineOutput::Rejected {
                    order_id,
                    reason: e.to_string(),
                }
            }
        }
    }

    fn process_advance(&mut self, request: AdvanceOrderRequest) -> EngineOutput {
        match self.advance.execute(&mut self.engine, request) {
            Ok(result) => {
                debug!(order_id = result.order_id, status = %result.status, "order advanced");
                EngineOutput::Advanced {
                    order_id: result.order_id,
                    status: result.status,
                }
            }
            Err(e) => {
                METRICS.errors_total.with_label_values(&["transition"]).inc();
                warn!(order_id = request.order_id, error = %e, "status update refused");
                EngineOutput::AdvanceFailed {
                    order_id: request.order_id,
                    reason: e.to_string(),
                }
            }
        }
    }

    fn record_outcome(&self, outcome: &AssignmentOutcome) {
        METRICS.outcomes_total.with_label_values(&[outcome.kind()]).inc();

        match outcome {
            AssignmentOutcome::Assigned(event) => {
                let rule = event.rule.to_string();
                METRICS.rule_hits_total.with_label_values(&[rule.as_str()]).inc();
                let rider = event.rider_id.to_string();
                METRICS
                    .rider_load
                    .with_label_values(&[rider.as_str()])
                    .set(event.rider_orders.len() as f64);
                info!(
                    order_id = event.order_id,
                    matched = event.matched_order_id,
                    rule = event.rule,
                    rider_id = event.rider_id,
                    "batch assigned"
                );
            }
            AssignmentOutcome::NoMatch { order_id } => {
                info!(order_id, "no matching rule");
            }
            AssignmentOutcome::NoRiderAvailable {
                order_id,
                matched_order_id,
                rule,
            } => {
                let rule_label = rule.to_string();
                METRICS.rule_hits_total.with_label_values(&[rule_label.as_str()]).inc();
                warn!(order_id, matched = matched_order_id, rule, "no rider available");
            }
        }
    }

    fn publish_snapshot(&self) {
        let snapshot = self.engine.snapshot();
        for status in [
            OrderStatus::Created,
            OrderStatus::Assigned,
            OrderStatus::WaitingPickup,
            OrderStatus::Delivered,
        ] {
            let count = snapshot.orders.iter().filter(|o| o.status == status).count();
            METRICS
                .order_status
                .with_label_values(&[status.as_str()])
                .set(count as f64);
        }
        *self.snapshot.write() = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::batcher::BatchingConfig;
    use crate::shared::geometry::Location;
    use crate::shared::protocol::RiderSpec;
    use tokio::sync::mpsc;

    fn engine() -> BatchingEngine {
        let roster = vec![
            RiderSpec { rider_id: 1, location: Location::new(0.0, 0.0) },
            RiderSpec { rider_id: 2, location: Location::new(5.0, 5.0) },
        ];
        BatchingEngine::new(BatchingConfig::default(), roster).unwrap()
    }

    fn request(id: u64, kitchen: u64, customer: u64, ready: i64) -> NewOrderRequest {
        NewOrderRequest {
            order_id: id,
            kitchen_id: kitchen,
            customer_id: customer,
            ready_time: ready,
            kitchen_location: Location::new(4.0, 4.0),
        }
    }

    #[test]
    fn test_process_command_updates_snapshot() {
        let (_cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (out_tx, _out_rx) = mpsc::unbounded_channel();
        let mut service = BatchingService::new(engine(), cmd_rx, out_tx);
        let handle = service.snapshot_handle();
        assert!(handle.read().orders.is_empty());

        service.process_command(EngineCommand::SubmitOrder(request(1, 1, 1, 10)));
        let output = service.process_command(EngineCommand::SubmitOrder(request(2, 1, 1, 10)));

        let EngineOutput::Outcome(AssignmentOutcome::Assigned(event)) = output else {
            panic!("expected assignment, got {:?}", output);
        };
        assert_eq!(event.rider_id, 2);

        let snapshot = handle.read();
        assert_eq!(snapshot.orders.len(), 2);
        assert!(snapshot.orders.iter().all(|o| o.assigned_rider == Some(2)));
    }

    #[test]
    fn test_invalid_order_is_rejected() {
        let (_cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (out_tx, _out_rx) = mpsc::unbounded_channel();
        let mut service = BatchingService::new(engine(), cmd_rx, out_tx);

        let mut bad = request(1, 1, 1, 10);
        bad.kitchen_location = Location::new(f64::INFINITY, 0.0);
        let output = service.process_command(EngineCommand::SubmitOrder(bad));
        assert!(matches!(output, EngineOutput::Rejected { order_id: 1, .. }));
        assert!(service.engine().orders().is_empty());
    }

    #[test]
    fn test_advance_through_service() {
        let (_cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (out_tx, _out_rx) = mpsc::unbounded_channel();
        let mut service = BatchingService::new(engine(), cmd_rx, out_tx);

        let refused = service.process_command(EngineCommand::AdvanceOrder(AdvanceOrderRequest {
            order_id: 1,
            status: OrderStatus::Delivered,
        }));
        assert!(matches!(refused, EngineOutput::AdvanceFailed { order_id: 1, .. }));

        service.process_command(EngineCommand::SubmitOrder(request(1, 1, 1, 10)));
        service.process_command(EngineCommand::SubmitOrder(request(2, 1, 1, 10)));
        let done = service.process_command(EngineCommand::AdvanceOrder(AdvanceOrderRequest {
            order_id: 1,
            status: OrderStatus::Delivered,
        }));
        assert_eq!(
            done,
            EngineOutput::Advanced {
                order_id: 1,
                status: OrderStatus::Delivered
            }
        );
    }

    #[test]
    fn test_run_loop_drains_commands() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let mut service = BatchingService::new(engine(), cmd_rx, out_tx);

        for (id, ready) in [(1, 10), (2, 12), (3, 60)] {
            cmd_tx
                .send(EngineCommand::SubmitOrder(request(id, 1, 1, ready)))
                .unwrap();
        }
        drop(cmd_tx); // Close command channel

        let worker = std::thread::spawn(move || service.run());

        let mut kinds = Vec::new();
        while let Some(output) = out_rx.blocking_recv() {
            if let EngineOutput::Outcome(outcome) = output {
                kinds.push(outcome.kind());
            }
        }
        worker.join().unwrap();

        assert_eq!(kinds, vec!["no_match", "assigned", "no_match"]);
    }
}
