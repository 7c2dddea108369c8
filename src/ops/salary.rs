//! Salary update operation
//!
//! Updates an employee's salary and, in the same atomic unit, appends the
//! audit record for the change. A no-op update (new salary equal to the
//! old) writes nothing and produces no audit record. If the audit insert
//! fails, the salary write is aborted with it: the audit trail is a strict
//! co-requirement of the update, not best-effort.

use chrono::Utc;

use crate::domain::{Amount, OperationContext};
use crate::store::{LedgerStore, LedgerUnit, StoreError};

use super::error::SalaryUpdateError;
use super::{SalaryUpdateOutcome, UpdateSalaryCommand};

/// Handler for employee salary updates.
pub struct SalaryUpdateHandler<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> SalaryUpdateHandler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Execute the salary update command.
    pub async fn execute(
        &self,
        command: UpdateSalaryCommand,
        context: &OperationContext,
    ) -> Result<SalaryUpdateOutcome, SalaryUpdateError> {
        let new_salary = Amount::new(command.new_salary)
            .map_err(|e| SalaryUpdateError::InvalidSalary(e.to_string()))?;

        let mut unit = self.store.begin().await.map_err(map_store)?;

        let employee = unit.employee(command.employee_id).await.map_err(map_store)?;
        let old_salary = employee.salary;

        if old_salary == new_salary.value() {
            if let Err(e) = unit.abort().await {
                tracing::debug!(error = %e, "abort after no-op salary update failed");
            }
            tracing::debug!(
                correlation_id = ?context.correlation_id,
                employee_id = command.employee_id,
                "salary unchanged, no audit record"
            );
            return Ok(SalaryUpdateOutcome {
                employee_id: command.employee_id,
                old_salary,
                new_salary: old_salary,
                audit_id: None,
                updated_at: Utc::now(),
            });
        }

        unit.write_employee_salary(command.employee_id, new_salary.value())
            .await
            .map_err(map_store)?;

        let audit_id = super::audit::append_salary_change(&mut unit, &employee, new_salary.value())
            .await
            .map_err(map_store)?;

        unit.commit().await.map_err(map_store)?;

        tracing::info!(
            correlation_id = ?context.correlation_id,
            employee_id = command.employee_id,
            old_salary = %old_salary,
            new_salary = %new_salary,
            audit_id,
            "salary updated"
        );

        Ok(SalaryUpdateOutcome {
            employee_id: command.employee_id,
            old_salary,
            new_salary: new_salary.value(),
            audit_id: Some(audit_id),
            updated_at: Utc::now(),
        })
    }
}

fn map_store(e: StoreError) -> SalaryUpdateError {
    match e {
        StoreError::EmployeeNotFound(id) => SalaryUpdateError::EmployeeNotFound(id),
        other => SalaryUpdateError::Storage(other),
    }
}
