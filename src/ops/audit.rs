//! Salary audit routine
//!
//! Appends the audit record for a salary change inside the caller's atomic
//! unit. This is an explicit call on the salary update path rather than a
//! storage-engine callback, so the coupling is visible and the routine can
//! be exercised in isolation against any unit.

use rust_decimal::Decimal;

use crate::domain::{AuditRecordId, Employee, NewSalaryAudit};
use crate::store::{LedgerUnit, StoreError};

/// Append one audit record for a salary change.
///
/// Runs inside the caller's unit: if the unit is later aborted the record
/// does not persist, and if this insert fails the caller must abort the
/// whole unit. The caller guarantees `new_salary` differs from the
/// employee's current salary.
pub async fn append_salary_change<U: LedgerUnit>(
    unit: &mut U,
    employee: &Employee,
    new_salary: Decimal,
) -> Result<AuditRecordId, StoreError> {
    let audit_id = unit
        .insert_salary_audit(NewSalaryAudit {
            employee_id: employee.employee_id,
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            old_salary: employee.salary,
            new_salary,
        })
        .await?;

    tracing::debug!(
        audit_id,
        employee_id = employee.employee_id,
        old_salary = %employee.salary,
        new_salary = %new_salary,
        "salary change audited"
    );

    Ok(audit_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LedgerStore, MemoryLedgerStore};
    use rust_decimal_macros::dec;

    fn employee() -> Employee {
        Employee {
            employee_id: 7,
            first_name: "Maria".to_string(),
            last_name: "Santos".to_string(),
            salary: dec!(80000),
            department_id: 1,
        }
    }

    #[tokio::test]
    async fn test_append_records_old_and_new() {
        let store = MemoryLedgerStore::new();
        store.create_employee(employee()).unwrap();

        let mut unit = store.begin().await.unwrap();
        let audit_id = append_salary_change(&mut unit, &employee(), dec!(90000))
            .await
            .unwrap();
        unit.commit().await.unwrap();

        let records = store.audit_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].audit_id, audit_id);
        assert_eq!(records[0].old_salary, dec!(80000));
        assert_eq!(records[0].new_salary, dec!(90000));
        assert_eq!(records[0].first_name, "Maria");
    }

    #[tokio::test]
    async fn test_append_discarded_when_unit_aborts() {
        let store = MemoryLedgerStore::new();
        store.create_employee(employee()).unwrap();

        let mut unit = store.begin().await.unwrap();
        append_salary_change(&mut unit, &employee(), dec!(90000))
            .await
            .unwrap();
        unit.abort().await.unwrap();

        assert!(store.audit_records().is_empty());
    }
}
