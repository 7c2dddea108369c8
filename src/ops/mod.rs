//! Ledger operations
//!
//! Handlers that orchestrate the core operations over a ledger store: the
//! atomic fund transfer and the audited salary update.

pub mod audit;
mod commands;
mod error;
mod salary;
mod transfer;

pub use commands::{SalaryUpdateOutcome, TransferCommand, TransferReceipt, UpdateSalaryCommand};
pub use error::{SalaryUpdateError, TransferError};
pub use salary::SalaryUpdateHandler;
pub use transfer::TransferHandler;
