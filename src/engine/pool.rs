use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::engine::InferenceEngine;
use crate::error::Result;

/// Produces fresh engine instances for one model.
pub trait EngineFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn InferenceEngine>>;
}

impl<F> EngineFactory for F
where
    F: Fn() -> Result<Box<dyn InferenceEngine>> + Send + Sync,
{
    fn create(&self) -> Result<Box<dyn InferenceEngine>> {
        self()
    }
}

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

/// Checkout/checkin pool of engines for one model.
///
/// `checkout` hands out an idle engine or creates a fresh one, so callers
/// never wait. The returned guard owns its engine exclusively and gives it
/// back on drop while fewer than `capacity` engines are idle. A capacity of
/// zero means every request gets a fresh engine.
pub struct EnginePool {
    name:     String,
    factory:  Arc<dyn EngineFactory>,
    idle:     Mutex<Vec<Box<dyn InferenceEngine>>>,
    capacity: usize,
}

impl EnginePool {
    pub fn new(name: impl Into<String>, factory: Arc<dyn EngineFactory>, capacity: usize) -> Self {
        EnginePool {
            name: name.into(),
            factory,
            idle: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of engines currently waiting for reuse.
    pub fn idle_count(&self) -> usize {
        self.lock_idle().len()
    }

    /// Takes an engine out of the pool, creating one if none is idle.
    pub fn checkout(&self) -> Result<PooledEngine<'_>> {
        let reused = self.lock_idle().pop();
        let engine = match reused {
            Some(engine) => engine,
            None => {
                tracing::debug!(pool = %self.name, "creating engine");
                self.factory.create()?
            }
        };
        Ok(PooledEngine { engine: Some(engine), pool: self })
    }

    fn checkin(&self, engine: Box<dyn InferenceEngine>) {
        let mut idle = self.lock_idle();
        if idle.len() < self.capacity {
            idle.push(engine);
        }
    }

    // The idle list is only pushed to and popped from, so a poisoned lock
    // still guards a consistent Vec.
    fn lock_idle(&self) -> MutexGuard<'_, Vec<Box<dyn InferenceEngine>>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive handle to a checked-out engine.
pub struct PooledEngine<'a> {
    engine: Option<Box<dyn InferenceEngine>>,
    pool:   &'a EnginePool,
}

impl Deref for PooledEngine<'_> {
    type Target = dyn InferenceEngine;

    fn deref(&self) -> &Self::Target {
        self.engine.as_deref().expect("engine is present until the guard drops")
    }
}

impl DerefMut for PooledEngine<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.engine.as_deref_mut().expect("engine is present until the guard drops")
    }
}

impl Drop for PooledEngine<'_> {
    fn drop(&mut self) {
        if let Some(engine) = self.engine.take() {
            self.pool.checkin(engine);
        }
    }
}
