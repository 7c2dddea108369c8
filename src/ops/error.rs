//! Operation error types
//!
//! Business-level errors surfaced by the transfer and salary operations.
//! Every failure means the whole atomic unit was aborted; callers can rely
//! on state being exactly as before the call.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::{AccountId, EmployeeId};
use crate::store::StoreError;

/// Errors from the transfer operation.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Caller input error: non-positive or malformed amount, or a
    /// self-transfer.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Sender or receiver account does not exist
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Business-rule rejection: the sender cannot cover the amount
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },

    /// Infrastructure-level failure; the caller may retry the whole request
    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl TransferError {
    /// Check if this is a client error (caller's fault, never retried).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_) | Self::AccountNotFound(_) | Self::InsufficientFunds { .. }
        )
    }
}

/// Errors from the salary update operation.
#[derive(Debug, Error)]
pub enum SalaryUpdateError {
    /// Caller input error: non-positive or malformed salary
    #[error("Invalid salary: {0}")]
    InvalidSalary(String),

    /// Employee does not exist
    #[error("Employee not found: {0}")]
    EmployeeNotFound(EmployeeId),

    /// Infrastructure-level failure; the salary and audit trail are
    /// untouched
    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl SalaryUpdateError {
    /// Check if this is a client error (caller's fault, never retried).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidSalary(_) | Self::EmployeeNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transfer_error_classification() {
        let err = TransferError::InsufficientFunds {
            requested: dec!(1000),
            available: dec!(300),
        };
        assert!(err.is_client_error());
        assert!(err.to_string().contains("1000"));
        assert!(err.to_string().contains("300"));

        let err = TransferError::Storage(StoreError::Backend("connection reset".to_string()));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_salary_error_classification() {
        assert!(SalaryUpdateError::EmployeeNotFound(9).is_client_error());
        assert!(
            !SalaryUpdateError::Storage(StoreError::Backend("timeout".to_string()))
                .is_client_error()
        );
    }
}
