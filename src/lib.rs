//! bank_ledger
//!
//! Transactional core of a banking ledger: an atomic fund-transfer operation
//! and a salary audit routine, layered over a relational store that provides
//! durable tables and constraint enforcement.
//!
//! The store boundary is the [`store::LedgerStore`] / [`store::LedgerUnit`]
//! trait pair; [`store::PgLedgerStore`] runs against Postgres and
//! [`store::MemoryLedgerStore`] backs the test suites.

pub mod config;
pub mod db;
pub mod domain;
pub mod ops;
pub mod store;

pub use config::Config;
pub use domain::{Amount, AmountError, OperationContext};
pub use ops::{
    SalaryUpdateError, SalaryUpdateHandler, SalaryUpdateOutcome, TransferCommand, TransferError,
    TransferHandler, TransferReceipt, UpdateSalaryCommand,
};
pub use store::{LedgerStore, LedgerUnit, MemoryLedgerStore, PgLedgerStore, StoreError};
