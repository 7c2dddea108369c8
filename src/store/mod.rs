//! Ledger Store boundary
//!
//! The store is the sole shared mutable resource. All mutation goes through
//! a [`LedgerUnit`]: a group of writes that is applied in full on `commit`
//! or not at all. Constraints (balance non-negativity, positive amounts,
//! referential integrity) are enforced by the store at write or commit time,
//! independently of any pre-check the handlers perform.

mod memory;
mod postgres;

pub use memory::{MemoryLedgerStore, MemoryUnit};
pub use postgres::{PgLedgerStore, PgLedgerUnit};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{
    AccountId, AuditRecordId, Employee, EmployeeId, EntryId, EntryKind, NewSalaryAudit,
};

/// Constraint classes a store enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// An account balance would become negative
    BalanceNonNegative,
    /// A ledger entry amount or salary would be non-positive
    AmountPositive,
    /// A referenced row does not exist
    ForeignKey,
    /// A row with the same key already exists
    Unique,
    /// A concurrent unit committed a conflicting write first
    WriteConflict,
}

impl ConstraintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::BalanceNonNegative => "balance_non_negative",
            ConstraintKind::AmountPositive => "amount_positive",
            ConstraintKind::ForeignKey => "foreign_key",
            ConstraintKind::Unique => "unique",
            ConstraintKind::WriteConflict => "write_conflict",
        }
    }
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors surfaced by a ledger store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Account row does not exist
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Employee row does not exist
    #[error("Employee not found: {0}")]
    EmployeeNotFound(EmployeeId),

    /// A write was rejected because it would break a declared invariant
    #[error("Constraint violation: {0}")]
    Constraint(ConstraintKind),

    /// Infrastructure-level failure (connection loss, fault, timeout)
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// A ledger store that can open atomic units of work.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    type Unit: LedgerUnit;

    /// Begin a new atomic unit. Writes staged in the unit become visible
    /// only after a successful `commit`.
    async fn begin(&self) -> Result<Self::Unit, StoreError>;
}

/// One atomic unit of work against the ledger store.
///
/// Dropping a unit without committing aborts it; none of its writes are
/// observable afterwards.
#[async_trait]
pub trait LedgerUnit: Send {
    /// Read an account's current balance.
    async fn account_balance(&mut self, account_id: AccountId) -> Result<Decimal, StoreError>;

    /// Write an account's balance. Non-negativity is enforced here and
    /// re-checked at commit.
    async fn write_account_balance(
        &mut self,
        account_id: AccountId,
        new_balance: Decimal,
    ) -> Result<(), StoreError>;

    /// Insert an immutable ledger entry. The store enforces amount > 0 and
    /// referential integrity, and assigns the id and timestamp.
    async fn insert_entry(
        &mut self,
        account_id: AccountId,
        kind: EntryKind,
        amount: Decimal,
        employee_id: EmployeeId,
    ) -> Result<EntryId, StoreError>;

    /// Read an employee row.
    async fn employee(&mut self, employee_id: EmployeeId) -> Result<Employee, StoreError>;

    /// Write an employee's salary. Positivity is enforced here.
    async fn write_employee_salary(
        &mut self,
        employee_id: EmployeeId,
        new_salary: Decimal,
    ) -> Result<(), StoreError>;

    /// Append a salary audit record. The store assigns the id and the
    /// change timestamp.
    async fn insert_salary_audit(
        &mut self,
        record: NewSalaryAudit,
    ) -> Result<AuditRecordId, StoreError>;

    /// Commit the unit, making all staged writes visible together.
    async fn commit(self) -> Result<(), StoreError>;

    /// Abort the unit, discarding all staged writes.
    async fn abort(self) -> Result<(), StoreError>;
}
