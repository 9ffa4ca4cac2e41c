//! Handing packets to the handler, inline or through a worker pool.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

use super::config::DispatchMode;
use super::handler::TrapHandler;
use crate::notification::TrapPacket;

type Job = (TrapPacket, SocketAddr);

pub(crate) enum Dispatcher {
    Inline(Arc<dyn TrapHandler>),
    Queued(WorkerPool),
}

impl Dispatcher {
    /// Must be called from within a tokio runtime when `mode` is queued.
    pub(crate) fn new(handler: Arc<dyn TrapHandler>, mode: DispatchMode) -> Self {
        match mode {
            DispatchMode::Inline => Self::Inline(handler),
            DispatchMode::Queued { capacity, workers } => {
                Self::Queued(WorkerPool::start(handler, capacity.max(1), workers.max(1)))
            }
        }
    }

    pub(crate) fn dispatch(&mut self, packet: TrapPacket, source: SocketAddr) {
        match self {
            Self::Inline(handler) => handler.handle(packet, source),
            Self::Queued(pool) => pool.submit(packet, source),
        }
    }

    /// Stop accepting packets and wait for queued ones to be handled.
    ///
    /// Returns the number of packets dropped because the queue was full.
    pub(crate) async fn shutdown(self) -> u64 {
        match self {
            Self::Inline(_) => 0,
            Self::Queued(pool) => pool.shutdown().await,
        }
    }
}

pub(crate) struct WorkerPool {
    tx: mpsc::Sender<Job>,
    workers: Vec<JoinHandle<()>>,
    dropped: u64,
}

impl WorkerPool {
    fn start(handler: Arc<dyn TrapHandler>, capacity: usize, workers: usize) -> Self {
        let (tx, rx) = mpsc::channel::<Job>(capacity);
        let rx = Arc::new(Mutex::new(rx));

        let workers: Vec<JoinHandle<()>> = (0..workers)
            .map(|_| {
                let rx = rx.clone();
                let handler = handler.clone();
                tokio::task::spawn_blocking(move || worker_loop(&rx, handler.as_ref()))
            })
            .collect();

        tracing::debug!(
            snmp.queue_capacity = capacity,
            snmp.workers = workers.len(),
            "started dispatch workers"
        );

        Self {
            tx,
            workers,
            dropped: 0,
        }
    }

    fn submit(&mut self, packet: TrapPacket, source: SocketAddr) {
        match self.tx.try_send((packet, source)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                tracing::warn!(
                    snmp.source = %source,
                    snmp.dropped = self.dropped,
                    "dispatch queue full, dropping trap"
                );
            }
            Err(TrySendError::Closed(_)) => {
                self.dropped += 1;
                tracing::warn!(
                    snmp.source = %source,
                    snmp.dropped = self.dropped,
                    "no dispatch worker left, dropping trap"
                );
            }
        }
    }

    async fn shutdown(self) -> u64 {
        // Closing the channel lets workers drain the backlog and exit
        drop(self.tx);
        for worker in self.workers {
            if let Err(e) = worker.await {
                tracing::warn!(
                    error = %e,
                    "dispatch worker terminated abnormally"
                );
            }
        }
        self.dropped
    }
}

fn worker_loop(rx: &Mutex<mpsc::Receiver<Job>>, handler: &dyn TrapHandler) {
    loop {
        // The lock is released before the handler runs
        let job = {
            let mut rx = match rx.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            rx.blocking_recv()
        };
        match job {
            Some((packet, source)) => handler.handle(packet, source),
            None => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn source() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[test]
    fn test_inline_dispatch_runs_handler_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handler: Arc<dyn TrapHandler> = Arc::new(move |_: TrapPacket, _: SocketAddr| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let mut dispatcher = Dispatcher::new(handler, DispatchMode::Inline);
        dispatcher.dispatch(TrapPacket::default(), source());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_queued_dispatch_drains_backlog_on_shutdown() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handler: Arc<dyn TrapHandler> = Arc::new(move |_: TrapPacket, _: SocketAddr| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let mut dispatcher = Dispatcher::new(
            handler,
            DispatchMode::Queued {
                capacity: 64,
                workers: 2,
            },
        );
        for _ in 0..10 {
            dispatcher.dispatch(TrapPacket::default(), source());
        }
        let dropped = dispatcher.shutdown().await;
        assert_eq!(dropped, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_full_queue_drops_and_counts() {
        let (gate_tx, gate_rx) = std::sync::mpsc::channel::<()>();
        let gate_rx = Mutex::new(gate_rx);
        let (started_tx, started_rx) = std::sync::mpsc::channel::<()>();
        let started_tx = Mutex::new(started_tx);
        let handler: Arc<dyn TrapHandler> = Arc::new(move |_: TrapPacket, _: SocketAddr| {
            let _ = started_tx.lock().unwrap().send(());
            let _ = gate_rx.lock().unwrap().recv();
        });
        let mut dispatcher = Dispatcher::new(
            handler,
            DispatchMode::Queued {
                capacity: 1,
                workers: 1,
            },
        );

        // First packet occupies the worker, second fills the queue
        dispatcher.dispatch(TrapPacket::default(), source());
        started_rx.recv().unwrap();
        dispatcher.dispatch(TrapPacket::default(), source());
        dispatcher.dispatch(TrapPacket::default(), source());
        dispatcher.dispatch(TrapPacket::default(), source());

        drop(gate_tx);
        assert_eq!(dispatcher.shutdown().await, 2);
    }

    #[tokio::test]
    async fn test_zero_capacity_and_workers_are_clamped() {
        let handler: Arc<dyn TrapHandler> = Arc::new(|_: TrapPacket, _: SocketAddr| {});
        let mut dispatcher = Dispatcher::new(
            handler,
            DispatchMode::Queued {
                capacity: 0,
                workers: 0,
            },
        );
        dispatcher.dispatch(TrapPacket::default(), source());
        let _ = dispatcher.shutdown().await;
    }
}
