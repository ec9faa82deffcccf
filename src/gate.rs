use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::Result;

// Throttle state of one provider key
#[derive(Debug, Default)]
struct Lane {
    last_dispatch: Option<Instant>,
}

/// Spaces out calls per provider key.
///
/// Callers on the same key queue up in call order (the lane mutex is FIFO) and each
/// waits until `min_interval` has passed since the previous dispatch on that key. The
/// lane is released as soon as a call is dispatched, so a slow response never holds
/// back the next caller's timer. Different keys never wait on each other.
#[derive(Debug, Default, Clone)]
pub struct RequestGate {
    lanes: Arc<RwLock<HashMap<String, Arc<Mutex<Lane>>>>>,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    async fn lane(
        &self,
        key: &str,
    ) -> Arc<Mutex<Lane>> {
        if let Some(lane) = self.lanes.read().await.get(key) {
            return lane.clone();
        }
        self.lanes.write().await.entry(key.to_string()).or_default().clone()
    }

    pub async fn enqueue<T, F, Fut>(
        &self,
        key: &str,
        min_interval: Duration,
        operation: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let lane = self.lane(key).await;
        {
            let mut lane = lane.lock().await;
            if let Some(last) = lane.last_dispatch {
                let elapsed = last.elapsed();
                if elapsed < min_interval {
                    let delay = min_interval - elapsed;
                    debug!("gate_throttled::{}::delay_ms::{}", key, delay.as_millis());
                    tokio::time::sleep(delay).await;
                }
            }
            // Stamped on every attempt, successful or not
            lane.last_dispatch = Some(Instant::now());
        }

        debug!("gate_dispatched::{}", key);
        operation().await
    }

    pub async fn last_dispatch(
        &self,
        key: &str,
    ) -> Option<Instant> {
        let lane = self.lanes.read().await.get(key).cloned()?;
        lane.lock().await.last_dispatch
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use tokio_test::assert_pending;
    use tokio_test::assert_ready_ok;

    use super::*;
    use crate::error::TraceError;

    fn recorder() -> Arc<StdMutex<Vec<(&'static str, Instant)>>> {
        Arc::new(StdMutex::new(Vec::new()))
    }

    #[tokio::test(start_paused = true)]
    async fn first_call_is_not_delayed() {
        let gate = RequestGate::new();
        let start = Instant::now();
        let value = gate.enqueue("ethereum", Duration::from_millis(1000), || async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
        assert_eq!(Instant::now() - start, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn same_key_calls_are_spaced() {
        let gate = RequestGate::new();
        let dispatched = recorder();
        let start = Instant::now();

        let first = {
            let gate = gate.clone();
            let dispatched = dispatched.clone();
            tokio::spawn(async move {
                gate.enqueue("ethereum", Duration::from_millis(1000), || async move {
                    dispatched.lock().unwrap().push(("first", Instant::now()));
                    Ok(())
                })
                .await
            })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        let issued_second = Instant::now();
        let second = dispatched.clone();
        gate.enqueue("ethereum", Duration::from_millis(1000), || async move {
            second.lock().unwrap().push(("second", Instant::now()));
            Ok(())
        })
        .await
        .unwrap();
        first.await.unwrap().unwrap();

        let dispatched = dispatched.lock().unwrap();
        assert_eq!(dispatched[0], ("first", start));
        assert_eq!(dispatched[1].0, "second");
        assert!(dispatched[1].1 - issued_second >= Duration::from_millis(900));
        assert!(dispatched[1].1 - dispatched[0].1 >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn waiting_call_stays_pending_until_the_interval_passes() {
        let gate = RequestGate::new();
        let interval = Duration::from_millis(1000);
        gate.enqueue("bitcoin", interval, || async { Ok(()) }).await.unwrap();

        let mut second = tokio_test::task::spawn(gate.enqueue("bitcoin", interval, || async { Ok(1) }));
        assert_pending!(second.poll());
        tokio::time::advance(Duration::from_millis(500)).await;
        assert_pending!(second.poll());
        tokio::time::advance(Duration::from_millis(500)).await;
        assert_eq!(assert_ready_ok!(second.poll()), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn different_keys_do_not_wait_on_each_other() {
        let gate = RequestGate::new();
        let dispatched = recorder();
        let start = Instant::now();

        // An ethereum call just went out, other keys must not inherit its throttle
        gate.enqueue("ethereum", Duration::from_millis(1000), || async { Ok(()) }).await.unwrap();

        let (btc_log, domain_log) = (dispatched.clone(), dispatched.clone());
        let btc = gate.enqueue("bitcoin", Duration::from_millis(1000), || async move {
            btc_log.lock().unwrap().push(("bitcoin", Instant::now()));
            Ok(())
        });
        let domain = gate.enqueue("domain", Duration::from_millis(1000), || async move {
            domain_log.lock().unwrap().push(("domain", Instant::now()));
            Ok(())
        });
        let (a, b) = tokio::join!(btc, domain);
        a.unwrap();
        b.unwrap();

        let dispatched = dispatched.lock().unwrap();
        assert_eq!(dispatched.len(), 2);
        for (_, at) in dispatched.iter() {
            assert_eq!(*at, start);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn same_key_callers_dispatch_in_call_order() {
        let gate = RequestGate::new();
        let order = Arc::new(StdMutex::new(Vec::new()));

        let mut handles = Vec::new();
        for i in 0..4 {
            let gate = gate.clone();
            let order = order.clone();
            handles.push(tokio::spawn(async move {
                gate.enqueue("bitcoin", Duration::from_millis(500), || async move {
                    order.lock().unwrap().push(i);
                    Ok(())
                })
                .await
            }));
            // Let each caller reach the lane before the next is spawned
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_calls_still_reset_the_timer() {
        let gate = RequestGate::new();
        let result: Result<()> = gate
            .enqueue("ethereum", Duration::from_millis(1000), || async {
                Err(anyhow::anyhow!(TraceError::rate_limited("ethereum")))
            })
            .await;
        let err = result.unwrap_err();
        assert_eq!(TraceError::kind_of(&err), Some(&TraceError::rate_limited("ethereum")));

        let before = Instant::now();
        gate.enqueue("ethereum", Duration::from_millis(1000), || async { Ok(()) }).await.unwrap();
        assert!(Instant::now() - before >= Duration::from_millis(1000));
        assert!(gate.last_dispatch("ethereum").await.is_some());
    }
}
