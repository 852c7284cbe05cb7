//! Intake records pushed through the batching service actor

use delivery_batcher::application::services::{BatchingService, EngineCommand, EngineOutput};
use delivery_batcher::domain::batcher::{BatchingConfig, BatchingEngine};
use delivery_batcher::interfaces::intake::{demo_roster, parse_records};
use delivery_batcher::shared::protocol::{AssignmentOutcome, OrderStatus};
use tokio::sync::mpsc;

const INTAKE: &str = r#"
{"order_id":1,"kitchen_id":1,"customer_id":1,"ready_time":10,"kitchen_location":{"x":1.0,"y":1.0}}
{"order_id":2,"kitchen_id":1,"customer_id":1,"ready_time":15,"kitchen_location":{"x":1.0,"y":1.0}}
{"order_id":2,"status":"waiting_pickup"}
{"order_id":2,"status":"delivered"}
{"order_id":1,"status":"assigned"}
{"order_id":2,"kitchen_id":3,"customer_id":3,"ready_time":10,"kitchen_location":{"x":3.0,"y":3.0}}
{"order_id":3,"kitchen_id":3,"customer_id":3,"ready_time":10,"kitchen_location":{"x":1e9,"y":3.0}}
"#;

#[tokio::test]
async fn test_service_processes_intake_in_order() {
    let engine = BatchingEngine::new(BatchingConfig::default(), demo_roster()).unwrap();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel();
    let mut service = BatchingService::new(engine, cmd_rx, out_tx);
    let snapshot = service.snapshot_handle();

    let worker = tokio::task::spawn_blocking(move || service.run());

    for record in parse_records(INTAKE).unwrap() {
        cmd_tx.send(EngineCommand::from(record)).unwrap();
    }
    drop(cmd_tx);

    let mut outputs = Vec::new();
    while let Some(output) = out_rx.recv().await {
        outputs.push(output);
    }
    worker.await.unwrap();

    assert_eq!(outputs.len(), 7);
    assert_eq!(outputs[0], EngineOutput::Outcome(AssignmentOutcome::NoMatch { order_id: 1 }));

    let EngineOutput::Outcome(AssignmentOutcome::Assigned(event)) = &outputs[1] else {
        panic!("order 2 should be assigned, got {:?}", outputs[1]);
    };
    // 厨房 (1,1) 与骑手 2 重合
    assert_eq!(event.rider_id, 2);
    assert_eq!(event.rule, 1);

    assert_eq!(
        outputs[2],
        EngineOutput::Advanced { order_id: 2, status: OrderStatus::WaitingPickup }
    );
    assert_eq!(
        outputs[3],
        EngineOutput::Advanced { order_id: 2, status: OrderStatus::Delivered }
    );
    // assigned 只能通过派单进入
    assert!(matches!(outputs[4], EngineOutput::AdvanceFailed { order_id: 1, .. }));
    // 重复订单号与越界坐标在登记前被拒绝
    assert!(matches!(outputs[5], EngineOutput::Rejected { order_id: 2, .. }));
    assert!(matches!(outputs[6], EngineOutput::Rejected { order_id: 3, .. }));

    let snapshot = snapshot.read();
    assert_eq!(snapshot.orders.len(), 2);
    assert_eq!(snapshot.orders[0].status, OrderStatus::Assigned);
    assert_eq!(snapshot.orders[1].status, OrderStatus::Delivered);
    assert_eq!(snapshot.riders[1].assigned_orders, vec![1, 2]);
}
