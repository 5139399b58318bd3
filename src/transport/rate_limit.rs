// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tower-based request pacing for the Stellar RPC client.
//!
//! Request starts are spaced a fixed minimum apart. There is no burst
//! allowance.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use tokio::{sync::Mutex, time::Instant};
use tower::Layer;

/// A Tower layer that spaces requests at least `min_delay` apart.
///
/// Clones share one schedule, so every service built from the same layer
/// is paced together.
///
/// # Example
///
/// ```rust,ignore
/// use stellar_block_fetcher::transport::RateLimitLayer;
/// use alloy_rpc_client::ClientBuilder;
/// use std::time::Duration;
///
/// let client = ClientBuilder::default()
///     .layer(RateLimitLayer::with_min_delay(Duration::from_millis(100)))
///     .http(rpc_url);
/// ```
#[derive(Clone, Debug)]
pub struct RateLimitLayer {
    state: Arc<Mutex<PacingState>>,
}

impl RateLimitLayer {
    /// Creates a layer that waits at least `min_delay` between request starts.
    pub fn with_min_delay(min_delay: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(PacingState::new(min_delay))),
        }
    }

    /// Creates a layer allowing at most `requests` request starts per second.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stellar_block_fetcher::transport::RateLimitLayer;
    ///
    /// let layer = RateLimitLayer::per_second(20);
    /// ```
    pub fn per_second(requests: u32) -> Self {
        let requests = requests.max(1);
        Self::with_min_delay(Duration::from_secs(1) / requests)
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, service: S) -> Self::Service {
        RateLimitService {
            service,
            state: self.state.clone(),
        }
    }
}

#[derive(Debug)]
struct PacingState {
    min_delay: Duration,
    /// Earliest instant the next request may start
    next_slot: Option<Instant>,
}

impl PacingState {
    fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            next_slot: None,
        }
    }

    /// Reserves the next start slot and returns how long to wait for it.
    fn reserve(&mut self, now: Instant) -> Duration {
        let slot = match self.next_slot {
            Some(next) if next > now => next,
            _ => now,
        };
        self.next_slot = Some(slot + self.min_delay);
        slot.saturating_duration_since(now)
    }
}

/// A Tower service that paces requests.
#[derive(Clone, Debug)]
pub struct RateLimitService<S> {
    service: S,
    state: Arc<Mutex<PacingState>>,
}

impl<S, Request> tower::Service<Request> for RateLimitService<S>
where
    S: tower::Service<Request> + Clone + Send + 'static,
    S::Future: Send,
    Request: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let state = self.state.clone();
        // The readied instance serves this call
        let clone = self.service.clone();
        let mut service = std::mem::replace(&mut self.service, clone);

        Box::pin(async move {
            // Slot is reserved under the lock, the wait happens outside it
            let wait = state.lock().await.reserve(Instant::now());
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }

            service.call(request).await
        })
    }
}
