//! Ledger records
//!
//! Row-level record types shared by the handlers and the store backends.
//! `LedgerEntry` and `SalaryAuditRecord` are immutable once created; the
//! store assigns their ids and timestamps.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account row identifier
pub type AccountId = i64;
/// Employee row identifier
pub type EmployeeId = i64;
/// Ledger entry identifier (store-assigned, monotonic)
pub type EntryId = i64;
/// Salary audit record identifier (store-assigned, monotonic)
pub type AuditRecordId = i64;

/// A customer account holding a non-negative balance.
///
/// The balance is mutated only by the transfer operation; creation is
/// external provisioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    pub customer_id: i64,
    pub balance: Decimal,
}

/// An employee authorizing ledger entries; salary is always positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub salary: Decimal,
    pub department_id: i64,
}

/// Direction of a single-account balance movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Withdrawal,
    Deposit,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Withdrawal => "WITHDRAWAL",
            EntryKind::Deposit => "DEPOSIT",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WITHDRAWAL" => Ok(EntryKind::Withdrawal),
            "DEPOSIT" => Ok(EntryKind::Deposit),
            other => Err(format!("unknown entry kind: {other}")),
        }
    }
}

/// An immutable ledger entry recording one balance movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub entry_id: EntryId,
    pub account_id: AccountId,
    pub kind: EntryKind,
    pub amount: Decimal,
    pub employee_id: EmployeeId,
    pub created_at: DateTime<Utc>,
}

/// An immutable audit record of one committed salary change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryAuditRecord {
    pub audit_id: AuditRecordId,
    pub employee_id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub old_salary: Decimal,
    pub new_salary: Decimal,
    pub changed_at: DateTime<Utc>,
}

/// Audit record as handed to the store; id and timestamp are store-assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSalaryAudit {
    pub employee_id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub old_salary: Decimal,
    pub new_salary: Decimal,
}
