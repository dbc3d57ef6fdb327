//! Parallel callers against one service.

use std::rc::Rc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::driver::{RequestSpec, send};

/// Issue `workers` requests concurrently and collect every status.
///
/// Each worker runs as a local task sharing `service`, reports its status on
/// a bounded results channel and then signals its own done channel. The
/// statuses are collected once every worker has signalled; their order is
/// unspecified. Must run inside an actix system (for example under
/// `#[actix_web::test]`).
///
/// # Panics
/// Panics when a worker dies before signalling completion.
pub async fn fan_out<S, B, F>(service: Rc<S>, workers: usize, make_spec: F) -> Vec<StatusCode>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: MessageBody + 'static,
    F: Fn(usize) -> RequestSpec,
{
    let (results_tx, mut results_rx) = mpsc::channel(workers.max(1));
    let mut done = Vec::with_capacity(workers);
    for worker in 0..workers {
        let spec = make_spec(worker);
        let service = Rc::clone(&service);
        let results = results_tx.clone();
        let (done_tx, done_rx) = oneshot::channel();
        done.push(done_rx);
        actix_web::rt::spawn(async move {
            let response = send(service.as_ref(), &spec).await;
            if results.send(response.status).await.is_err() {
                debug!(worker, "results receiver dropped");
            }
            if done_tx.send(()).is_err() {
                debug!(worker, "completion receiver dropped");
            }
        });
    }
    drop(results_tx);

    for (worker, signal) in done.into_iter().enumerate() {
        assert!(signal.await.is_ok(), "worker {worker} died before finishing");
    }
    let mut statuses = Vec::with_capacity(workers);
    while let Some(status) = results_rx.recv().await {
        statuses.push(status);
    }
    statuses
}
