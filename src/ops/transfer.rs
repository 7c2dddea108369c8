//! Transfer operation
//!
//! Moves funds between two accounts as one atomic unit: debit the sender,
//! credit the receiver, and record a WITHDRAWAL and a DEPOSIT entry. Any
//! failure aborts the whole unit; no partial effect is ever observable.
//!
//! The sufficiency pre-check is a fast-fail only. The store re-enforces
//! balance non-negativity at write/commit time, which closes the race
//! window between concurrent transfers debiting the same sender.

use crate::domain::{Amount, EntryKind, OperationContext};
use crate::store::{ConstraintKind, LedgerStore, LedgerUnit, StoreError};

use super::error::TransferError;
use super::{TransferCommand, TransferReceipt};

/// Handler for fund transfers.
pub struct TransferHandler<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> TransferHandler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Execute the transfer command.
    ///
    /// A unit that loses a write-write race to a concurrent transfer is
    /// retried once against the freshly committed state; the retry either
    /// succeeds or reports `InsufficientFunds` with accurate balances.
    pub async fn execute(
        &self,
        command: TransferCommand,
        context: &OperationContext,
    ) -> Result<TransferReceipt, TransferError> {
        let amount = Amount::new(command.amount)
            .map_err(|e| TransferError::InvalidAmount(e.to_string()))?;

        if command.sender_account == command.receiver_account {
            return Err(TransferError::InvalidAmount(
                "sender and receiver accounts must differ".to_string(),
            ));
        }

        let receipt = match self.attempt(&command, amount).await {
            Err(TransferError::Storage(StoreError::Constraint(ConstraintKind::WriteConflict))) => {
                tracing::warn!(
                    correlation_id = ?context.correlation_id,
                    sender = command.sender_account,
                    receiver = command.receiver_account,
                    "concurrent transfer committed first, retrying once"
                );
                self.attempt(&command, amount).await
            }
            outcome => outcome,
        }?;

        tracing::info!(
            correlation_id = ?context.correlation_id,
            sender = receipt.sender_account,
            receiver = receipt.receiver_account,
            amount = %amount,
            withdrawal_entry = receipt.withdrawal_entry,
            deposit_entry = receipt.deposit_entry,
            "transfer completed"
        );

        Ok(receipt)
    }

    /// One attempt: a single atomic unit covering both balance writes and
    /// both ledger entries.
    async fn attempt(
        &self,
        command: &TransferCommand,
        amount: Amount,
    ) -> Result<TransferReceipt, TransferError> {
        let amount_value = amount.value();
        let mut unit = self.store.begin().await.map_err(map_read)?;

        let sender_balance = unit
            .account_balance(command.sender_account)
            .await
            .map_err(map_read)?;

        if sender_balance < amount_value {
            if let Err(e) = unit.abort().await {
                tracing::debug!(error = %e, "abort after insufficient-funds rejection failed");
            }
            return Err(TransferError::InsufficientFunds {
                requested: amount_value,
                available: sender_balance,
            });
        }

        let receiver_balance = unit
            .account_balance(command.receiver_account)
            .await
            .map_err(map_read)?;

        // The store's non-negativity guard firing here means a concurrent
        // debit got in after our pre-check; report it as the business
        // rejection it is.
        let map_write = |e: StoreError| match e {
            StoreError::Constraint(ConstraintKind::BalanceNonNegative) => {
                TransferError::InsufficientFunds {
                    requested: amount_value,
                    available: sender_balance,
                }
            }
            StoreError::AccountNotFound(id) => TransferError::AccountNotFound(id),
            other => TransferError::Storage(other),
        };

        unit.write_account_balance(command.sender_account, sender_balance - amount_value)
            .await
            .map_err(map_write)?;
        unit.write_account_balance(command.receiver_account, receiver_balance + amount_value)
            .await
            .map_err(map_write)?;

        let withdrawal_entry = unit
            .insert_entry(
                command.sender_account,
                EntryKind::Withdrawal,
                amount_value,
                command.employee_id,
            )
            .await
            .map_err(TransferError::Storage)?;
        let deposit_entry = unit
            .insert_entry(
                command.receiver_account,
                EntryKind::Deposit,
                amount_value,
                command.employee_id,
            )
            .await
            .map_err(TransferError::Storage)?;

        unit.commit().await.map_err(map_write)?;

        Ok(TransferReceipt {
            sender_account: command.sender_account,
            receiver_account: command.receiver_account,
            amount: amount_value,
            withdrawal_entry,
            deposit_entry,
            sender_balance: sender_balance - amount_value,
            receiver_balance: receiver_balance + amount_value,
        })
    }
}

/// Map store errors from the read phase, before any write is staged.
fn map_read(e: StoreError) -> TransferError {
    match e {
        StoreError::AccountNotFound(id) => TransferError::AccountNotFound(id),
        other => TransferError::Storage(other),
    }
}
