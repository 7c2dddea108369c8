//! Postgres ledger store
//!
//! sqlx-backed implementation of the ledger store. Each unit is one database
//! transaction; balance reads take `FOR UPDATE` row locks so racing transfers
//! serialize, and the schema's CHECK constraints (`migrations/0001_init.sql`)
//! are the commit-time guard behind the handlers' pre-checks.
//!
//! ## Error mapping
//!
//! | PostgreSQL error code | `StoreError` |
//! |-----------------------|--------------|
//! | `23514` (check violation, constraint name contains `balance`) | `Constraint(BalanceNonNegative)` |
//! | `23514` (other check violation) | `Constraint(AmountPositive)` |
//! | `23503` (foreign key violation) | `Constraint(ForeignKey)` |
//! | `23505` (unique violation) | `Constraint(Unique)` |
//! | `40001` / `40P01` (serialization failure, deadlock) | `Constraint(WriteConflict)` |
//! | anything else | `Backend` |

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::{
    AccountId, AuditRecordId, Employee, EmployeeId, EntryId, EntryKind, NewSalaryAudit,
};

use super::{ConstraintKind, LedgerStore, LedgerUnit, StoreError};

/// Postgres-backed ledger store.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    type Unit = PgLedgerUnit;

    async fn begin(&self) -> Result<PgLedgerUnit, StoreError> {
        let tx = self.pool.begin().await.map_err(map_sqlx)?;
        Ok(PgLedgerUnit { tx })
    }
}

/// One database transaction. Dropping it without committing rolls it back.
pub struct PgLedgerUnit {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerUnit for PgLedgerUnit {
    async fn account_balance(&mut self, account_id: AccountId) -> Result<Decimal, StoreError> {
        let balance: Option<Decimal> = sqlx::query_scalar(
            r#"
            SELECT balance FROM accounts WHERE account_id = $1 FOR UPDATE
            "#,
        )
        .bind(account_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;

        balance.ok_or(StoreError::AccountNotFound(account_id))
    }

    async fn write_account_balance(
        &mut self,
        account_id: AccountId,
        new_balance: Decimal,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET balance = $2 WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .bind(new_balance)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AccountNotFound(account_id));
        }
        Ok(())
    }

    async fn insert_entry(
        &mut self,
        account_id: AccountId,
        kind: EntryKind,
        amount: Decimal,
        employee_id: EmployeeId,
    ) -> Result<EntryId, StoreError> {
        let entry_id: EntryId = sqlx::query_scalar(
            r#"
            INSERT INTO transactions (account_id, transaction_type, amount, employee_id)
            VALUES ($1, $2, $3, $4)
            RETURNING transaction_id
            "#,
        )
        .bind(account_id)
        .bind(kind.as_str())
        .bind(amount)
        .bind(employee_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;

        Ok(entry_id)
    }

    async fn employee(&mut self, employee_id: EmployeeId) -> Result<Employee, StoreError> {
        let row: Option<(i64, String, String, Decimal, i64)> = sqlx::query_as(
            r#"
            SELECT employee_id, first_name, last_name, salary, department_id
            FROM employees
            WHERE employee_id = $1
            FOR UPDATE
            "#,
        )
        .bind(employee_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;

        let (employee_id, first_name, last_name, salary, department_id) =
            row.ok_or(StoreError::EmployeeNotFound(employee_id))?;

        Ok(Employee {
            employee_id,
            first_name,
            last_name,
            salary,
            department_id,
        })
    }

    async fn write_employee_salary(
        &mut self,
        employee_id: EmployeeId,
        new_salary: Decimal,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE employees SET salary = $2 WHERE employee_id = $1
            "#,
        )
        .bind(employee_id)
        .bind(new_salary)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::EmployeeNotFound(employee_id));
        }
        Ok(())
    }

    async fn insert_salary_audit(
        &mut self,
        record: NewSalaryAudit,
    ) -> Result<AuditRecordId, StoreError> {
        let audit_id: AuditRecordId = sqlx::query_scalar(
            r#"
            INSERT INTO salary_audit (employee_id, first_name, last_name, old_salary, new_salary)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING audit_id
            "#,
        )
        .bind(record.employee_id)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(record.old_salary)
        .bind(record.new_salary)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;

        tracing::debug!(audit_id, employee_id = record.employee_id, "salary audit row inserted");
        Ok(audit_id)
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(map_sqlx)
    }

    async fn abort(self) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(map_sqlx)
    }
}

/// Map a sqlx error onto the store's error taxonomy.
fn map_sqlx(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        let kind = match db.code().as_deref() {
            Some("23514") => {
                if db.constraint().unwrap_or_default().contains("balance") {
                    Some(ConstraintKind::BalanceNonNegative)
                } else {
                    Some(ConstraintKind::AmountPositive)
                }
            }
            Some("23503") => Some(ConstraintKind::ForeignKey),
            Some("23505") => Some(ConstraintKind::Unique),
            Some("40001") | Some("40P01") => Some(ConstraintKind::WriteConflict),
            _ => None,
        };
        if let Some(kind) = kind {
            return StoreError::Constraint(kind);
        }
    }
    StoreError::Backend(err.to_string())
}
