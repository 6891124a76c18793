//! Transactions.

use std::sync::Arc;

use oxide_orm_core::{
    BoxFuture, BoxRow, Core, ExecResult, OrmError, Result, Rows, Session, SqlValue,
};
use sqlx::{Sqlite, Transaction};
use tokio::sync::Mutex;
use tracing::debug;

use crate::bind::prepare;
use crate::row::{first_row, into_rows};

/// An open transaction.
///
/// Statements run on a `Tx` are serialized on its connection. Once
/// [`commit`](Self::commit) or [`rollback`](Self::rollback) succeeded, further
/// statements fail with [`OrmError::TransactionClosed`]. Dropping an open
/// `Tx` rolls it back.
pub struct Tx {
    inner: Mutex<Option<Transaction<'static, Sqlite>>>,
    core: Arc<Core>,
}

impl Tx {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>, core: Arc<Core>) -> Self {
        Self {
            inner: Mutex::new(Some(tx)),
            core,
        }
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::TransactionClosed`] if it was already finished, or
    /// the driver's error.
    pub async fn commit(&self) -> Result<()> {
        let tx = self.take().await?;
        tx.commit().await.map_err(OrmError::database)?;
        debug!("transaction committed");
        Ok(())
    }

    /// Rolls the transaction back.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::TransactionClosed`] if it was already finished, or
    /// the driver's error.
    pub async fn rollback(&self) -> Result<()> {
        let tx = self.take().await?;
        tx.rollback().await.map_err(OrmError::database)?;
        debug!("transaction rolled back");
        Ok(())
    }

    /// Rolls back unless the transaction was already committed or rolled
    /// back. Meant for cleanup paths.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if the rollback itself fails.
    pub async fn rollback_if_not_commit(&self) -> Result<()> {
        match self.rollback().await {
            Err(OrmError::TransactionClosed) => Ok(()),
            other => other,
        }
    }

    /// Returns true while the transaction can still run statements.
    pub async fn is_open(&self) -> bool {
        self.inner.lock().await.is_some()
    }

    async fn take(&self) -> Result<Transaction<'static, Sqlite>> {
        self.inner
            .lock()
            .await
            .take()
            .ok_or(OrmError::TransactionClosed)
    }
}

impl Session for Tx {
    fn core(&self) -> &Core {
        &self.core
    }

    fn query<'a>(&'a self, sql: &'a str, args: &'a [SqlValue]) -> BoxFuture<'a, Result<Rows>> {
        Box::pin(async move {
            let mut guard = self.inner.lock().await;
            let tx = guard.as_mut().ok_or(OrmError::TransactionClosed)?;
            let rows = prepare(sql, args)
                .fetch_all(&mut **tx)
                .await
                .map_err(OrmError::database)?;
            Ok(into_rows(rows))
        })
    }

    fn query_one<'a>(
        &'a self,
        sql: &'a str,
        args: &'a [SqlValue],
    ) -> BoxFuture<'a, Result<BoxRow>> {
        Box::pin(async move {
            let mut guard = self.inner.lock().await;
            let tx = guard.as_mut().ok_or(OrmError::TransactionClosed)?;
            let row = prepare(sql, args)
                .fetch_optional(&mut **tx)
                .await
                .map_err(OrmError::database)?;
            first_row(row)
        })
    }

    fn exec<'a>(
        &'a self,
        sql: &'a str,
        args: &'a [SqlValue],
    ) -> BoxFuture<'a, Result<ExecResult>> {
        Box::pin(async move {
            let mut guard = self.inner.lock().await;
            let tx = guard.as_mut().ok_or(OrmError::TransactionClosed)?;
            let res = prepare(sql, args)
                .execute(&mut **tx)
                .await
                .map_err(OrmError::database)?;
            Ok(ExecResult {
                rows_affected: res.rows_affected(),
                last_insert_id: res.last_insert_rowid(),
            })
        })
    }
}
