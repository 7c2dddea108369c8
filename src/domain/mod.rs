//! Domain module
//!
//! Domain primitives and record types, independent of any storage backend.

mod context;
mod model;
mod money;

pub use context::OperationContext;
pub use model::{
    Account, AccountId, AuditRecordId, Employee, EmployeeId, EntryId, EntryKind, LedgerEntry,
    NewSalaryAudit, SalaryAuditRecord,
};
pub use money::{Amount, AmountError};
