//! Transactional execution with compensating cleanup.

use crate::error::MigrateResult;
use tw_core::{DdlBuilder, TableName};
use tw_db::{Connection, Transaction};

/// Run `body` inside a transaction on `conn`.
///
/// On success the transaction is committed and `true` is returned. On failure
/// `table` is dropped if it exists (for backends whose DDL is not
/// transactional), the transaction is rolled back, the error is logged and
/// `false` is returned. Errors raised during cleanup are logged as warnings
/// and never replace the original error.
pub fn run_in_transaction<C, F>(conn: &C, builder: &DdlBuilder, table: &TableName, body: F) -> bool
where
    C: Connection + ?Sized,
    F: FnOnce(&C) -> MigrateResult<()>,
{
    let physical = builder.physical_table(table);
    let tx = match Transaction::begin(conn) {
        Ok(tx) => tx,
        Err(e) => {
            log::error!("> error: could not start transaction for {physical}: {e}");
            return false;
        }
    };

    match body(conn) {
        Ok(()) => match tx.commit() {
            Ok(()) => {
                log::info!("> Transaction with {physical} was processed");
                true
            }
            Err(e) => {
                // the failed guard has already rolled back
                drop_if_present(conn, builder, table, &physical);
                log::error!("> error: {e}");
                false
            }
        },
        Err(e) => {
            drop_if_present(conn, builder, table, &physical);
            if let Err(rollback_err) = tx.rollback() {
                log::warn!("Rollback for {physical} failed: {rollback_err}");
            }
            log::error!("> error: {e}");
            false
        }
    }
}

fn drop_if_present<C: Connection + ?Sized>(
    conn: &C,
    builder: &DdlBuilder,
    table: &TableName,
    physical: &str,
) {
    match conn.list_table_names() {
        Ok(names) if names.contains(physical) => {
            log::info!("> drop table {physical} after failure");
            if let Err(e) = conn.execute(&builder.drop_table(table, true)) {
                log::warn!("Compensating drop of {physical} failed: {e}");
            }
        }
        Ok(_) => {}
        Err(e) => log::warn!("Could not list tables while cleaning up {physical}: {e}"),
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
