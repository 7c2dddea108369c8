//! Command definitions
//!
//! Commands represent intentions to change the ledger, plus the results
//! returned on success.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, AuditRecordId, EmployeeId, EntryId};

/// Command to move funds between two accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferCommand {
    pub sender_account: AccountId,
    pub receiver_account: AccountId,
    pub amount: Decimal,
    /// Employee authorizing the transfer
    pub employee_id: EmployeeId,
}

impl TransferCommand {
    pub fn new(
        sender_account: AccountId,
        receiver_account: AccountId,
        amount: Decimal,
        employee_id: EmployeeId,
    ) -> Self {
        Self {
            sender_account,
            receiver_account,
            amount,
            employee_id,
        }
    }
}

/// Result of a completed transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub sender_account: AccountId,
    pub receiver_account: AccountId,
    pub amount: Decimal,
    /// WITHDRAWAL entry recorded against the sender
    pub withdrawal_entry: EntryId,
    /// DEPOSIT entry recorded against the receiver
    pub deposit_entry: EntryId,
    pub sender_balance: Decimal,
    pub receiver_balance: Decimal,
}

/// Command to change an employee's salary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSalaryCommand {
    pub employee_id: EmployeeId,
    pub new_salary: Decimal,
}

impl UpdateSalaryCommand {
    pub fn new(employee_id: EmployeeId, new_salary: Decimal) -> Self {
        Self {
            employee_id,
            new_salary,
        }
    }
}

/// Result of a salary update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryUpdateOutcome {
    pub employee_id: EmployeeId,
    pub old_salary: Decimal,
    pub new_salary: Decimal,
    /// Audit record created for the change; `None` when the update was a
    /// no-op (new salary equal to the old one).
    pub audit_id: Option<AuditRecordId>,
    pub updated_at: DateTime<Utc>,
}

impl SalaryUpdateOutcome {
    /// Whether the update actually changed the salary.
    pub fn changed(&self) -> bool {
        self.audit_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transfer_command() {
        let cmd = TransferCommand::new(1, 2, dec!(200), 7);
        assert_eq!(cmd.sender_account, 1);
        assert_eq!(cmd.receiver_account, 2);
        assert_eq!(cmd.amount, dec!(200));
        assert_eq!(cmd.employee_id, 7);
    }

    #[test]
    fn test_salary_outcome_changed() {
        let outcome = SalaryUpdateOutcome {
            employee_id: 7,
            old_salary: dec!(80000),
            new_salary: dec!(90000),
            audit_id: Some(1),
            updated_at: Utc::now(),
        };
        assert!(outcome.changed());

        let noop = SalaryUpdateOutcome {
            audit_id: None,
            new_salary: dec!(80000),
            ..outcome
        };
        assert!(!noop.changed());
    }
}
