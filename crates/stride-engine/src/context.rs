//! The explicit simulation context handle.
//!
//! A [`SimContext`] owns the engine and every task the driver refreshes
//! before a run segment. It replaces an implicit "current" context: each
//! driver operation receives the context it acts on, so several
//! independent simulations can live in one process.
//!
//! # Readiness
//!
//! A context starts uninitialized. [`check_ready()`](SimContext::check_ready)
//! is the gate every run-family operation passes first; it fails with
//! [`RunError::NotInitialized`] until an engine is attached.

use indexmap::IndexMap;
use stride_core::{Integrator, Logger, NeighborList, RunError, Step, StepEngine};

/// A simulation's engine plus its periodic-task registries.
///
/// Loggers and neighbor lists are keyed by name and refreshed in
/// registration order.
#[derive(Default)]
pub struct SimContext {
    engine: Option<Box<dyn StepEngine>>,
    integrator: Option<Box<dyn Integrator>>,
    loggers: IndexMap<String, Box<dyn Logger>>,
    neighbor_lists: IndexMap<String, Box<dyn NeighborList>>,
}

/// Borrowed view of an initialized context.
///
/// Only obtainable through [`SimContext::check_ready()`], so holding one
/// proves the engine exists.
pub struct ReadyContext<'a> {
    pub(crate) engine: &'a mut dyn StepEngine,
    pub(crate) integrator: Option<&'a mut dyn Integrator>,
    pub(crate) loggers: &'a mut IndexMap<String, Box<dyn Logger>>,
    pub(crate) neighbor_lists: &'a mut IndexMap<String, Box<dyn NeighborList>>,
}

impl ReadyContext<'_> {
    /// The context's engine.
    pub fn engine(&mut self) -> &mut dyn StepEngine {
        &mut *self.engine
    }

    /// Current absolute step.
    pub fn current_step(&self) -> Step {
        self.engine.current_step()
    }
}

impl SimContext {
    /// An uninitialized context with no engine and no tasks.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context initialized with `engine`.
    pub fn with_engine(engine: Box<dyn StepEngine>) -> Self {
        let mut ctx = Self::new();
        ctx.initialize(engine);
        ctx
    }

    /// Attach the engine, making the context runnable.
    ///
    /// Returns the previously attached engine, if any.
    pub fn initialize(&mut self, engine: Box<dyn StepEngine>) -> Option<Box<dyn StepEngine>> {
        self.engine.replace(engine)
    }

    /// Whether an engine is attached.
    pub fn is_initialized(&self) -> bool {
        self.engine.is_some()
    }

    /// Gate for run-family operations that mutate the simulation.
    ///
    /// # Errors
    ///
    /// [`RunError::NotInitialized`] naming `operation` when no engine is
    /// attached. Nothing else is touched in that case.
    pub fn check_ready(&mut self, operation: &'static str) -> Result<ReadyContext<'_>, RunError> {
        let Some(engine) = self.engine.as_deref_mut() else {
            tracing::error!("cannot {operation} before initialization");
            return Err(RunError::NotInitialized { operation });
        };
        Ok(ReadyContext {
            engine,
            integrator: self
                .integrator
                .as_deref_mut()
                .map(|i| i as &mut dyn Integrator),
            loggers: &mut self.loggers,
            neighbor_lists: &mut self.neighbor_lists,
        })
    }

    /// Read-only gate, for queries such as `get_step`.
    pub fn require_engine(&self, operation: &'static str) -> Result<&dyn StepEngine, RunError> {
        self.engine.as_deref().ok_or_else(|| {
            tracing::error!("cannot {operation} before initialization");
            RunError::NotInitialized { operation }
        })
    }

    /// The attached engine, if any.
    pub fn engine(&self) -> Option<&dyn StepEngine> {
        self.engine.as_deref()
    }

    /// Set or clear the active integrator. Returns the previous one.
    pub fn set_integrator(
        &mut self,
        integrator: Option<Box<dyn Integrator>>,
    ) -> Option<Box<dyn Integrator>> {
        std::mem::replace(&mut self.integrator, integrator)
    }

    /// Register a logger under `name`, replacing any logger of that name.
    ///
    /// A replaced logger keeps its original position in refresh order.
    pub fn add_logger(
        &mut self,
        name: impl Into<String>,
        logger: Box<dyn Logger>,
    ) -> Option<Box<dyn Logger>> {
        self.loggers.insert(name.into(), logger)
    }

    /// Unregister the logger called `name`.
    pub fn remove_logger(&mut self, name: &str) -> Option<Box<dyn Logger>> {
        self.loggers.shift_remove(name)
    }

    /// Register a neighbor list under `name`, replacing any list of that
    /// name.
    pub fn add_neighbor_list(
        &mut self,
        name: impl Into<String>,
        nlist: Box<dyn NeighborList>,
    ) -> Option<Box<dyn NeighborList>> {
        self.neighbor_lists.insert(name.into(), nlist)
    }

    /// Unregister the neighbor list called `name`.
    pub fn remove_neighbor_list(&mut self, name: &str) -> Option<Box<dyn NeighborList>> {
        self.neighbor_lists.shift_remove(name)
    }

    /// Registered logger names, in refresh order.
    pub fn logger_names(&self) -> impl Iterator<Item = &str> {
        self.loggers.keys().map(String::as_str)
    }

    /// Registered neighbor-list names, in refresh order.
    pub fn neighbor_list_names(&self) -> impl Iterator<Item = &str> {
        self.neighbor_lists.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for SimContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimContext")
            .field(
                "current_step",
                &self.engine.as_ref().map(|e| e.current_step()),
            )
            .field("integrator", &self.integrator.as_ref().map(|i| i.name()))
            .field("loggers", &self.loggers.keys().collect::<Vec<_>>())
            .field(
                "neighbor_lists",
                &self.neighbor_lists.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}
