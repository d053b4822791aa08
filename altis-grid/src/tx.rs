//! Transaction scoping for grid reads.
//!
//! A scope begins a transaction only when its session has none active. It
//! commits exactly once on close, and only if it began the transaction, so a
//! transaction opened by an outer caller is never committed from here.

use altis_core::grid::{GridSession, ObjectGrid};
use altis_core::{GridError, GridResult};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct TxScope {
    session: Arc<dyn GridSession>,
    owned: bool,
    closed: bool,
}

impl TxScope {
    pub async fn acquire(session: Arc<dyn GridSession>) -> GridResult<Self> {
        let owned = if session.is_transaction_active() {
            debug!("joining caller transaction");
            false
        } else {
            match session.begin().await {
                Ok(()) => {
                    debug!("began grid transaction");
                    true
                }
                // Another caller on a shared session began first
                Err(GridError::TransactionAlreadyActive) => {
                    debug!("joining concurrently begun transaction");
                    false
                }
                Err(err) => return Err(err),
            }
        };
        Ok(Self {
            session,
            owned,
            closed: false,
        })
    }

    pub fn session(&self) -> &Arc<dyn GridSession> {
        &self.session
    }

    pub fn owns_transaction(&self) -> bool {
        self.owned
    }

    /// Ends the scope, committing if it owns the transaction. A failed
    /// `outcome` is still committed and returned unchanged.
    pub async fn close<T, E>(mut self, outcome: Result<T, E>) -> Result<T, E>
    where
        E: From<GridError>,
    {
        self.closed = true;
        if !self.owned {
            return outcome;
        }

        let committed = self.session.commit().await;
        match (outcome, committed) {
            (Ok(value), Ok(())) => {
                debug!("committed grid transaction");
                Ok(value)
            }
            (Ok(_), Err(err)) => Err(err.into()),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(commit_err)) => {
                warn!(error = %commit_err, "commit after failed read also failed");
                Err(err)
            }
        }
    }
}

impl Drop for TxScope {
    fn drop(&mut self) {
        if self.owned && !self.closed {
            warn!("transaction scope dropped without commit");
        }
    }
}

/// Scope that is only acquired on the first remote access, so a fully cached
/// lookup never touches a session.
pub struct LazyTx {
    grid: Arc<dyn ObjectGrid>,
    scope: Option<TxScope>,
}

impl LazyTx {
    pub fn new(grid: Arc<dyn ObjectGrid>) -> Self {
        Self { grid, scope: None }
    }

    pub async fn session(&mut self) -> GridResult<Arc<dyn GridSession>> {
        if let Some(scope) = &self.scope {
            return Ok(scope.session().clone());
        }
        let scope = TxScope::acquire(self.grid.session()?).await?;
        let session = scope.session().clone();
        self.scope = Some(scope);
        Ok(session)
    }

    pub fn is_acquired(&self) -> bool {
        self.scope.is_some()
    }

    pub async fn close<T, E>(self, outcome: Result<T, E>) -> Result<T, E>
    where
        E: From<GridError>,
    {
        match self.scope {
            Some(scope) => scope.close(outcome).await,
            None => outcome,
        }
    }
}
