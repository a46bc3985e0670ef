//! Concurrent invocations of one form never see each other's values.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use form_core::{
    Form, IntField, RequestAdapter, Source, current, request_scope, request_scope_async,
};

fn form() -> Arc<Form> {
    Form::builder("SharedForm")
        .field("a", IntField::new().source(Source::Query))
        .build()
        .expect("valid declaration")
}

fn query(id: &str, qs: &str) -> RequestAdapter {
    RequestAdapter::new(id.to_string()).with_query_string(qs)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_tasks_are_isolated() {
    let handler = Arc::new(form().wrap_async(|_: ()| async {
        let first = current().get::<i64>("a");
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = current().get::<i64>("a");
        (first, second)
    }));

    let mut tasks = Vec::new();
    for n in 0..16i64 {
        let handler = Arc::clone(&handler);
        let request = query(&format!("req-{n}"), &format!("a={n}"));
        tasks.push(tokio::spawn(request_scope_async(request, handler(()))));
    }

    for (n, task) in tasks.into_iter().enumerate() {
        let (first, second) = task.await.expect("task completed");
        assert_eq!(first, Ok(n as i64));
        assert_eq!(second, Ok(n as i64));
    }
}

#[tokio::test]
async fn interleaved_tasks_on_one_thread_are_isolated() {
    let handler = form().wrap_async(|_: ()| async {
        tokio::task::yield_now().await;
        current().get::<i64>("a")
    });

    let ten = tokio::spawn(request_scope_async(query("req-10", "a=10"), handler(())));
    let twenty = tokio::spawn(request_scope_async(query("req-20", "a=20"), handler(())));

    assert_eq!(ten.await.expect("task completed"), Ok(10));
    assert_eq!(twenty.await.expect("task completed"), Ok(20));
}

#[test]
fn concurrent_threads_are_isolated() {
    let handler = Arc::new(form().wrap(|_: ()| {
        let first = current().get::<i64>("a");
        thread::sleep(Duration::from_millis(2));
        (first, current().get::<i64>("a"))
    }));

    let workers: Vec<_> = (0..8i64)
        .map(|n| {
            let handler = Arc::clone(&handler);
            let request = query("req-thread", &format!("a={n}"));
            thread::spawn(move || request_scope(request, || handler(())))
        })
        .collect();

    for (n, worker) in workers.into_iter().enumerate() {
        let (first, second) = worker.join().expect("thread completed");
        assert_eq!(first, Ok(n as i64));
        assert_eq!(second, Ok(n as i64));
    }
}

#[test]
fn sequential_calls_do_not_reuse_cached_values() {
    let handler = form().wrap(|_: ()| current().get::<i64>("a"));
    for n in [1i64, 2, 3] {
        let result = request_scope(query("req-seq", &format!("a={n}")), || handler(()));
        assert_eq!(result, Ok(n));
    }
}
