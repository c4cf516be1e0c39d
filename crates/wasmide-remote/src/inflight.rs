use crate::error::Result;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;
use wasmide_core::ProjectId;

/// Identity of a read request: the same key means the same answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub operation: &'static str,
    pub project: ProjectId,
    pub target: String,
}

impl RequestKey {
    pub fn new(operation: &'static str, project: &ProjectId, target: impl Into<String>) -> Self {
        Self {
            operation,
            project: project.clone(),
            target: target.into(),
        }
    }
}

type SharedRequest<T> = Shared<BoxFuture<'static, Result<T>>>;

struct Pending<T> {
    next_id: u64,
    requests: HashMap<RequestKey, (u64, SharedRequest<T>)>,
}

/// Coalesces concurrent identical requests into one round trip.
///
/// The first caller for a key starts the request; callers arriving while it is
/// outstanding await the same future and receive a clone of its result. Nothing
/// is cached: once the request settles the key is free again.
pub struct InFlight<T> {
    pending: Arc<Mutex<Pending<T>>>,
}

impl<T> Clone for InFlight<T> {
    fn clone(&self) -> Self {
        Self {
            pending: self.pending.clone(),
        }
    }
}

impl<T> Default for InFlight<T> {
    fn default() -> Self {
        Self {
            pending: Arc::new(Mutex::new(Pending {
                next_id: 0,
                requests: HashMap::new(),
            })),
        }
    }
}

impl<T> fmt::Debug for InFlight<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InFlight")
            .field("pending", &self.pending.lock().requests.len())
            .finish()
    }
}

impl<T> InFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the request for `key`, or join the one already outstanding.
    /// `start` is only called when no identical request is in flight.
    pub async fn run<F, Fut>(&self, key: RequestKey, start: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (id, request) = {
            let mut pending = self.pending.lock();
            match pending.requests.get(&key) {
                Some((id, request)) => {
                    debug!("Joining in-flight {} for {}", key.operation, key.project);
                    (*id, request.clone())
                }
                None => {
                    let id = pending.next_id;
                    pending.next_id += 1;
                    let request = start().boxed().shared();
                    pending.requests.insert(key.clone(), (id, request.clone()));
                    (id, request)
                }
            }
        };

        let result = request.await;

        let mut pending = self.pending.lock();
        if matches!(pending.requests.get(&key), Some((current, _)) if *current == id) {
            pending.requests.remove(&key);
        }
        result
    }

    /// Number of distinct requests currently outstanding.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().requests.len()
    }
}
