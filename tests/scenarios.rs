//! End-to-end scenarios across pots, nurseries and the greenhouse.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::time;

use greenhouse::{
    BoxError, Config, Greenhouse, Id, Nursery, Outcome, Pot, Reason, SequentialIds,
};

type Op<T> = BoxFuture<'static, Result<T, BoxError>>;

fn resolve<T: Send + 'static>(value: T) -> Op<T> {
    async move { Ok(value) }.boxed()
}

fn after<T: Send + 'static>(ms: u64, value: T) -> Op<T> {
    async move {
        time::sleep(Duration::from_millis(ms)).await;
        Ok(value)
    }
    .boxed()
}

fn never<T: Send + 'static>() -> Op<T> {
    std::future::pending().boxed()
}

#[tokio::test]
async fn test_submit_then_drain_leaves_registry_empty() {
    let greenhouse = Greenhouse::new();
    greenhouse
        .submit([resolve("a"), resolve("b")], None)
        .unwrap();

    greenhouse.drain().await;
    assert!(greenhouse.list_nurseries().is_empty());
}

#[tokio::test]
async fn test_never_resolving_pot_times_out() {
    let pot = Pot::<u8>::plant(never(), Some(Duration::from_millis(50))).unwrap();
    time::sleep(Duration::from_millis(100)).await;
    assert_eq!(pot.outcome(), Outcome::TimedOut);
}

#[tokio::test]
async fn test_rejected_operation_settles_as_failure() {
    let pot = Pot::plant(async { Err::<u8, _>("boom") }, None).unwrap();
    assert_eq!(pot.settle().await, Outcome::Failure(Reason::from("boom")));
}

#[tokio::test]
async fn test_cancelled_pot_ignores_late_resolution() {
    let pot = Pot::plant(after(20, "late"), None).unwrap();
    pot.cancel();

    time::sleep(Duration::from_millis(60)).await;
    assert_eq!(pot.outcome(), Outcome::Cancelled);
}

#[tokio::test]
async fn test_success_after_deadline_reports_timed_out() {
    let pot = Pot::plant(after(60, 1u8), Some(Duration::from_millis(15))).unwrap();
    time::sleep(Duration::from_millis(100)).await;
    assert_eq!(pot.outcome(), Outcome::TimedOut);
    assert_eq!(pot.settle().await, Outcome::TimedOut);
}

#[tokio::test]
async fn test_settled_nursery_is_evicted_automatically() {
    let greenhouse = Greenhouse::new();
    let nursery = greenhouse
        .submit([resolve(1u8), resolve(2u8)], None)
        .unwrap();

    time::sleep(Duration::from_millis(30)).await;
    assert!(
        greenhouse
            .list_nurseries()
            .iter()
            .all(|n| n.id() != nursery.id())
    );
}

#[tokio::test]
async fn test_nursery_results_follow_insertion_order() {
    let nursery = Nursery::with_operations(
        [after(40, 0usize), after(5, 1), after(20, 2), resolve(3)],
        None,
    )
    .unwrap();

    let values: Vec<usize> = nursery
        .settle()
        .await
        .into_iter()
        .filter_map(Outcome::into_value)
        .collect();
    assert_eq!(values, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn test_mixed_outcomes_in_one_nursery() {
    let failing: Op<&str> = async { Err("nope".into()) }.boxed();
    let nursery = Nursery::with_operations(
        [resolve("ok"), failing, never()],
        Some(Duration::from_millis(30)),
    )
    .unwrap();
    let pending = nursery.plant_one(never(), None).unwrap();
    pending.cancel();

    assert_eq!(
        nursery.settle().await,
        vec![
            Outcome::Success("ok"),
            Outcome::Failure(Reason::from("nope")),
            Outcome::TimedOut,
            Outcome::Cancelled,
        ]
    );
}

#[tokio::test]
async fn test_id_returned_by_submit_closes_the_nursery() {
    let greenhouse = Greenhouse::builder(Config::default())
        .with_id_generator(Arc::new(SequentialIds::new("bed")))
        .build();
    let nursery = greenhouse.submit([never::<u8>()], None).unwrap();
    assert_eq!(nursery.id(), &Id::from("bed-1"));

    assert!(greenhouse.close_nursery(&Id::from("bed-1")));
    assert_eq!(nursery.settle().await, vec![Outcome::Cancelled]);

    time::sleep(Duration::from_millis(20)).await;
    assert!(greenhouse.get(nursery.id()).is_none());
    assert!(!greenhouse.close_nursery(nursery.id()));
}

#[tokio::test]
async fn test_drain_does_not_wait_for_later_submissions() {
    let greenhouse = Greenhouse::new();
    greenhouse.submit([after(10, 1u8)], None).unwrap();

    let drain = {
        let g = Arc::clone(&greenhouse);
        tokio::spawn(async move { g.drain().await })
    };
    tokio::task::yield_now().await;
    let late = greenhouse.submit([never::<u8>()], None).unwrap();

    time::timeout(Duration::from_secs(1), drain)
        .await
        .expect("drain finished")
        .unwrap();
    assert_eq!(greenhouse.len(), 1);
    assert!(greenhouse.get(late.id()).is_some());
    late.close();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_waiters_agree_across_threads() {
    let nursery = Arc::new(
        Nursery::with_operations((0..32).map(|i| after(i % 7, i)), Some(Duration::from_millis(3)))
            .unwrap(),
    );

    let waiters: Vec<_> = (0..8)
        .map(|_| {
            let n = Arc::clone(&nursery);
            tokio::spawn(async move { n.settle().await })
        })
        .collect();

    let first = nursery.settle().await;
    for waiter in waiters {
        assert_eq!(waiter.await.unwrap(), first);
    }
    assert!(nursery.is_fully_settled());
}

#[tokio::test]
async fn test_deadline_runs_while_the_scheduler_is_blocked() {
    let (tx, rx) = tokio::sync::oneshot::channel::<u8>();
    let pot = Pot::plant(rx, Some(Duration::from_millis(20))).unwrap();

    let sender = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(40));
        let _ = tx.send(7);
    });
    std::thread::sleep(Duration::from_millis(50));
    sender.join().unwrap();

    assert_eq!(pot.settle().await, Outcome::TimedOut);
}

#[tokio::test]
async fn test_evicted_nursery_stays_settled_and_drain_has_nothing_to_wait_for() {
    let greenhouse = Greenhouse::new();
    let nursery = greenhouse.submit([resolve(1u8)], None).unwrap();
    time::sleep(Duration::from_millis(30)).await;

    assert!(nursery.plant([never()], None).is_err());
    assert!(nursery.is_fully_settled());

    time::timeout(Duration::from_secs(1), greenhouse.drain())
        .await
        .expect("drain finished");
    assert!(greenhouse.is_empty());
}
