//! Transaction guard

use crate::error::DbResult;
use crate::traits::SqlExecutor;

/// An open transaction on a borrowed executor.
///
/// Call [`commit`](Self::commit) or [`rollback`](Self::rollback) to finish it.
/// A guard dropped while still open rolls back.
pub struct Transaction<'a, C: SqlExecutor + ?Sized> {
    conn: &'a C,
    finished: bool,
}

impl<'a, C: SqlExecutor + ?Sized> Transaction<'a, C> {
    /// Issue `BEGIN` on `conn` and return the guard.
    pub fn begin(conn: &'a C) -> DbResult<Self> {
        conn.begin()?;
        log::debug!("BEGIN ({})", conn.db_type());
        Ok(Self {
            conn,
            finished: false,
        })
    }

    /// Commit the transaction.
    ///
    /// If the commit fails the guard is still open, so dropping it rolls
    /// back.
    pub fn commit(mut self) -> DbResult<()> {
        self.conn.commit()?;
        self.finished = true;
        log::debug!("COMMIT ({})", self.conn.db_type());
        Ok(())
    }

    /// Roll the transaction back.
    pub fn rollback(mut self) -> DbResult<()> {
        self.finished = true;
        self.conn.rollback()?;
        log::debug!("ROLLBACK ({})", self.conn.db_type());
        Ok(())
    }
}

impl<C: SqlExecutor + ?Sized> Drop for Transaction<'_, C> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.conn.rollback() {
            log::warn!("Rollback of abandoned transaction failed: {e}");
        }
    }
}
