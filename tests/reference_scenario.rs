//! The built-in demo data run end to end through the engine

use delivery_batcher::domain::batcher::{BatchingConfig, BatchingEngine};
use delivery_batcher::interfaces::intake::{demo_orders, demo_roster};
use delivery_batcher::shared::protocol::{AssignmentOutcome, OrderStatus};

fn run_demo() -> (BatchingEngine, Vec<AssignmentOutcome>) {
    let mut engine = BatchingEngine::new(BatchingConfig::default(), demo_roster()).unwrap();
    let outcomes = demo_orders()
        .into_iter()
        .map(|request| engine.submit(request).unwrap())
        .collect();
    (engine, outcomes)
}

#[test]
fn test_reference_outcomes() {
    let (_, outcomes) = run_demo();
    let kinds: Vec<&str> = outcomes.iter().map(|o| o.kind()).collect();
    assert_eq!(
        kinds,
        vec!["no_match", "no_match", "no_match", "assigned", "no_match", "assigned", "no_match"]
    );

    // 订单 4：同顾客不同厨房（规则 2），锚定订单 3 的厨房 (2,2)
    let AssignmentOutcome::Assigned(event) = &outcomes[3] else {
        panic!("order 4 should be assigned");
    };
    assert_eq!(event.matched_order_id, 3);
    assert_eq!(event.rule, 2);
    assert_eq!(event.rider_id, 3);
    assert_eq!(event.distance, 0.0);
    assert_eq!(event.rider_orders, vec![3, 4]);

    // 订单 6：同厨房不同顾客（规则 3）
    let AssignmentOutcome::Assigned(event) = &outcomes[5] else {
        panic!("order 6 should be assigned");
    };
    assert_eq!(event.matched_order_id, 5);
    assert_eq!(event.rule, 3);
    assert_eq!(event.rider_id, 5);
    assert_eq!(event.rider_orders, vec![5, 6]);
}

#[test]
fn test_reference_final_state() {
    let (engine, _) = run_demo();

    assert_eq!(engine.orders().len(), 7);
    for id in [1, 2, 7] {
        let order = engine.orders().get(id).unwrap();
        assert_eq!(order.status(), OrderStatus::Created);
        assert_eq!(order.assigned_rider(), None);
    }

    let busy: Vec<u64> = engine
        .riders()
        .iter()
        .filter(|r| r.order_count() > 0)
        .map(|r| r.id)
        .collect();
    assert_eq!(busy, vec![3, 5]);
}

#[test]
fn test_cross_registry_consistency() {
    let (engine, _) = run_demo();

    // 每个已分配订单恰好出现在其骑手的列表中一次
    for order in engine.orders().iter() {
        match order.assigned_rider() {
            Some(rider_id) => {
                assert_eq!(order.status(), OrderStatus::Assigned);
                let rider = engine.riders().get(rider_id).unwrap();
                let hits = rider.assigned_orders().iter().filter(|&&id| id == order.id).count();
                assert_eq!(hits, 1, "order {} on rider {}", order.id, rider_id);
            }
            None => assert_eq!(order.status(), OrderStatus::Created),
        }
    }

    // 骑手列表中的订单都指回该骑手，计数与列表长度一致
    for rider in engine.riders().iter() {
        assert_eq!(rider.order_count(), rider.assigned_orders().len());
        for &id in rider.assigned_orders() {
            let order = engine.orders().get(id).unwrap();
            assert_eq!(order.assigned_rider(), Some(rider.id));
        }
    }
}

#[test]
fn test_snapshot_mirrors_registries() {
    let (engine, _) = run_demo();
    let snapshot = engine.snapshot();

    let ids: Vec<u64> = snapshot.orders.iter().map(|o| o.order_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(snapshot.riders.len(), 8);
    assert_eq!(snapshot.riders[2].assigned_orders, vec![3, 4]);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["orders"][3]["status"], "assigned");
    assert_eq!(json["orders"][3]["assigned_rider"], 3);
}
