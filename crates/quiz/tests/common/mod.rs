#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use quizroom::{ConnectionError, Transport};

pub struct MockTransport {
    inbound: mpsc::UnboundedReceiver<Result<String, ConnectionError>>,
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

/// Test-side handle: scripts inbound messages and records what was sent.
pub struct MockServer {
    inbound: Option<mpsc::UnboundedSender<Result<String, ConnectionError>>>,
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

pub fn mock() -> (MockTransport, MockServer) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sent = Arc::new(Mutex::new(Vec::new()));
    let closed = Arc::new(AtomicBool::new(false));

    let transport = MockTransport {
        inbound: rx,
        sent: Arc::clone(&sent),
        closed: Arc::clone(&closed),
    };
    let server = MockServer {
        inbound: Some(tx),
        sent,
        closed,
    };
    (transport, server)
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, text: String) -> Result<(), ConnectionError> {
        self.sent.lock().unwrap().push(text);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, ConnectionError>> {
        self.inbound.recv().await
    }

    async fn close(&mut self) -> Result<(), ConnectionError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl MockServer {
    pub fn push(&self, text: &str) {
        if let Some(tx) = &self.inbound {
            tx.send(Ok(text.to_string())).unwrap();
        }
    }

    pub fn fail(&self, reason: &str) {
        if let Some(tx) = &self.inbound {
            tx.send(Err(ConnectionError::Receive(reason.to_string())))
                .unwrap();
        }
    }

    pub fn hang_up(&mut self) {
        self.inbound = None;
    }

    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<Value> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|text| serde_json::from_str(text).unwrap())
            .collect()
    }

    pub async fn wait_for_sent(&self, count: usize) -> Vec<Value> {
        for _ in 0..400 {
            if self.sent.lock().unwrap().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.sent()
    }
}
