//! Salary update and audit trail integration tests

mod common;

use bank_ledger::ops::{SalaryUpdateError, SalaryUpdateHandler, UpdateSalaryCommand};
use bank_ledger::store::{MemoryLedgerStore, StoreError};
use bank_ledger::OperationContext;
use rust_decimal_macros::dec;

fn handler(store: &MemoryLedgerStore) -> SalaryUpdateHandler<MemoryLedgerStore> {
    SalaryUpdateHandler::new(store.clone())
}

fn ctx() -> OperationContext {
    OperationContext::new().with_initiator("test")
}

#[tokio::test]
async fn test_salary_change_creates_exactly_one_audit_record() {
    let store = common::seeded_store();
    let outcome = handler(&store)
        .execute(UpdateSalaryCommand::new(7, dec!(90000)), &ctx())
        .await
        .unwrap();

    assert_eq!(outcome.old_salary, dec!(80000));
    assert_eq!(outcome.new_salary, dec!(90000));
    assert!(outcome.changed());
    assert_eq!(store.salary_of(7), Some(dec!(90000)));

    let records = store.audit_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].audit_id, outcome.audit_id.unwrap());
    assert_eq!(records[0].employee_id, 7);
    assert_eq!(records[0].old_salary, dec!(80000));
    assert_eq!(records[0].new_salary, dec!(90000));
    assert_eq!(records[0].first_name, "Maria");
    assert_eq!(records[0].last_name, "Santos");
}

#[tokio::test]
async fn test_noop_update_creates_no_audit_record() {
    // 80000 -> 90000 audits once; 90000 -> 90000 audits nothing.
    let store = common::seeded_store();
    let handler = handler(&store);

    handler
        .execute(UpdateSalaryCommand::new(7, dec!(90000)), &ctx())
        .await
        .unwrap();
    assert_eq!(store.audit_records().len(), 1);

    let outcome = handler
        .execute(UpdateSalaryCommand::new(7, dec!(90000)), &ctx())
        .await
        .unwrap();
    assert!(!outcome.changed());
    assert_eq!(outcome.audit_id, None);
    assert_eq!(store.salary_of(7), Some(dec!(90000)));
    assert_eq!(store.audit_records().len(), 1);
}

#[tokio::test]
async fn test_audit_insert_failure_rolls_back_salary_write() {
    // The audit trail is a strict co-requirement: if the audit insert
    // fails, the salary update must not persist either.
    let store = common::seeded_store();
    store.fail_next_audit_insert();

    let err = handler(&store)
        .execute(UpdateSalaryCommand::new(7, dec!(90000)), &ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, SalaryUpdateError::Storage(StoreError::Backend(_))));

    assert_eq!(store.salary_of(7), Some(dec!(80000)));
    assert!(store.audit_records().is_empty());
}

#[tokio::test]
async fn test_commit_failure_rolls_back_salary_and_audit() {
    let store = common::seeded_store();
    store.fail_next_commit();

    let err = handler(&store)
        .execute(UpdateSalaryCommand::new(7, dec!(90000)), &ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, SalaryUpdateError::Storage(StoreError::Backend(_))));

    assert_eq!(store.salary_of(7), Some(dec!(80000)));
    assert!(store.audit_records().is_empty());
}

#[tokio::test]
async fn test_invalid_salary_rejected() {
    let store = common::seeded_store();
    let handler = handler(&store);

    for salary in [dec!(0), dec!(-1)] {
        let err = handler
            .execute(UpdateSalaryCommand::new(7, salary), &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, SalaryUpdateError::InvalidSalary(_)));
    }
    assert_eq!(store.salary_of(7), Some(dec!(80000)));
    assert!(store.audit_records().is_empty());
}

#[tokio::test]
async fn test_unknown_employee_rejected() {
    let store = common::seeded_store();
    let err = handler(&store)
        .execute(UpdateSalaryCommand::new(99, dec!(50000)), &ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, SalaryUpdateError::EmployeeNotFound(99)));
    assert!(store.audit_records().is_empty());
}

#[tokio::test]
async fn test_successive_changes_accumulate_ordered_records() {
    let store = common::seeded_store();
    let handler = handler(&store);

    for salary in [dec!(85000), dec!(91000), dec!(88000)] {
        handler
            .execute(UpdateSalaryCommand::new(7, salary), &ctx())
            .await
            .unwrap();
    }

    let records = store.audit_records();
    assert_eq!(records.len(), 3);
    assert!(records.windows(2).all(|w| w[0].audit_id < w[1].audit_id));
    assert_eq!(records[0].old_salary, dec!(80000));
    assert_eq!(records[1].old_salary, dec!(85000));
    assert_eq!(records[2].old_salary, dec!(91000));
    assert_eq!(records[2].new_salary, dec!(88000));
    assert_eq!(store.salary_of(7), Some(dec!(88000)));
}
