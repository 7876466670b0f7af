//! Client execution logic with reconnection support.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::{
    buffer::PointBuffer,
    domain::{ReconnectPolicy, should_attempt_reconnect},
    error::ClientError,
    formatter::TrailFormatter,
    session::run_session,
    trail::TrailView,
};

/// Default period of the drain loop
pub const DEFAULT_DRAIN_INTERVAL: Duration = Duration::from_secs(1);

/// Follow the stream, reconnecting according to `policy`.
///
/// The attempt counter restarts after every session that got connected, so only consecutive
/// failures count against the limit.
pub async fn run_client(
    url: &str,
    buffer: Arc<PointBuffer>,
    policy: ReconnectPolicy,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), ClientError> {
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} (attempt {}/{})",
            url,
            reconnect_count + 1,
            policy.max_attempts
        );

        let error = match run_session(url, buffer.clone(), &mut shutdown).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                return Ok(());
            }
            Err(e) => e,
        };

        match &error {
            ClientError::Disconnected(_) => {
                tracing::warn!("Connection lost: {}", error);
                reconnect_count = 0;
            }
            _ => tracing::warn!("{}", error),
        }
        reconnect_count += 1;

        if !should_attempt_reconnect(&error, reconnect_count, policy.max_attempts) {
            tracing::error!(
                "Giving up after {} attempt(s): {}",
                reconnect_count,
                error
            );
            return Err(error);
        }

        tracing::info!(
            "Reconnecting in {:?}... (attempt {}/{})",
            policy.interval,
            reconnect_count + 1,
            policy.max_attempts
        );

        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return Ok(());
                }
            }
            _ = time::sleep(policy.interval) => {}
        }
    }
}

/// Spawn the drain loop.
///
/// Every `period` it drains the buffer, applies the points to the view and prints a summary
/// line. When `shutdown` flips it drains one last time and returns the view.
pub fn spawn_drain_loop(
    buffer: Arc<PointBuffer>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<TrailView> {
    tokio::spawn(async move {
        let mut view = TrailView::new();
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => update(&mut view, &buffer).await,
            }
        }

        update(&mut view, &buffer).await;
        view
    })
}

async fn update(view: &mut TrailView, buffer: &PointBuffer) {
    let points = buffer.drain().await;
    if points.is_empty() {
        return;
    }

    for point in &points {
        if let Some(line) = TrailFormatter::format_anomaly(point) {
            println!("{}", line);
        }
    }
    let applied = view.apply(&points);
    println!("{}", TrailFormatter::format_update(view, applied));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TrailPoint;
    use michi_shared::RoadState;

    #[tokio::test]
    async fn test_drain_loop_applies_points_and_returns_view() {
        // テスト項目: drain ループが積まれた点を反映し、終了時に残りも反映する
        // given (前提条件):
        let buffer = Arc::new(PointBuffer::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = spawn_drain_loop(buffer.clone(), Duration::from_millis(10), shutdown_rx);

        // when (操作):
        buffer
            .push(TrailPoint {
                latitude: 50.0,
                longitude: 30.0,
                road_state: RoadState::Pothole,
            })
            .await;
        time::sleep(Duration::from_millis(50)).await;
        buffer
            .push(TrailPoint {
                latitude: 50.1,
                longitude: 30.1,
                road_state: RoadState::Normal,
            })
            .await;
        shutdown_tx.send(true).unwrap();
        let view = handle.await.unwrap();

        // then (期待する結果):
        assert_eq!(view.trail().len(), 2);
        assert_eq!(view.potholes().len(), 1);
        assert!(buffer.is_empty().await);
    }

    #[tokio::test]
    async fn test_run_client_gives_up_after_max_attempts() {
        // テスト項目: 接続できない場合、上限回数で諦める
        // given (前提条件):
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let policy = ReconnectPolicy {
            max_attempts: 2,
            interval: Duration::from_millis(10),
        };
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        // when (操作):
        let result = run_client(
            &format!("ws://{}/ws/", addr),
            Arc::new(PointBuffer::new()),
            policy,
            shutdown_rx,
        )
        .await;

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::ConnectionError(_))));
    }

    #[tokio::test]
    async fn test_run_client_exits_on_invalid_url() {
        // テスト項目: 不正な URL の場合は再接続せずに終了する
        // given (前提条件):
        let policy = ReconnectPolicy {
            max_attempts: 5,
            interval: Duration::from_secs(60),
        };
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        // when (操作):
        let result = time::timeout(
            Duration::from_secs(5),
            run_client(
                "http://127.0.0.1/ws/",
                Arc::new(PointBuffer::new()),
                policy,
                shutdown_rx,
            ),
        )
        .await
        .expect("should not wait for a reconnect");

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }
}
