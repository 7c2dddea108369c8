//! In-memory ledger store
//!
//! Backend for unit and property tests. Writes are staged per unit and
//! re-validated at commit under one lock: non-negativity and positivity are
//! checked again against committed state, and per-row version counters detect
//! a conflicting concurrent commit (the commit-time guard that a database
//! provides with row locks and check constraints).
//!
//! The store also carries the provisioning surface (account and employee
//! creation) and one-shot fault injection hooks for atomicity tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use crate::domain::{
    Account, AccountId, AuditRecordId, Employee, EmployeeId, EntryId, EntryKind, LedgerEntry,
    NewSalaryAudit, SalaryAuditRecord,
};

use super::{ConstraintKind, LedgerStore, LedgerUnit, StoreError};

#[derive(Debug, Clone)]
struct AccountRow {
    customer_id: i64,
    balance: Decimal,
    version: u64,
}

#[derive(Debug, Clone)]
struct EmployeeRow {
    first_name: String,
    last_name: String,
    salary: Decimal,
    department_id: i64,
    version: u64,
}

/// One-shot fault plan; each armed fault fires once and disarms.
#[derive(Debug, Default)]
struct FaultPlan {
    entry_inserts_until_fault: Option<u32>,
    fail_next_audit_insert: bool,
    fail_next_commit: bool,
}

#[derive(Debug, Default)]
struct MemoryState {
    accounts: BTreeMap<AccountId, AccountRow>,
    employees: BTreeMap<EmployeeId, EmployeeRow>,
    entries: Vec<LedgerEntry>,
    audits: Vec<SalaryAuditRecord>,
    next_entry_id: EntryId,
    next_audit_id: AuditRecordId,
    faults: FaultPlan,
}

impl MemoryState {
    fn new() -> Self {
        Self {
            next_entry_id: 1,
            next_audit_id: 1,
            ..Self::default()
        }
    }
}

/// In-memory ledger store. Cloning shares the underlying state.
#[derive(Debug, Clone)]
pub struct MemoryLedgerStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory store lock poisoned")
    }

    // -- provisioning ------------------------------------------------------

    /// Provision an account with an opening balance.
    pub fn create_account(
        &self,
        account_id: AccountId,
        customer_id: i64,
        opening_balance: Decimal,
    ) -> Result<(), StoreError> {
        if opening_balance < Decimal::ZERO {
            return Err(StoreError::Constraint(ConstraintKind::BalanceNonNegative));
        }
        let mut state = self.lock();
        if state.accounts.contains_key(&account_id) {
            return Err(StoreError::Constraint(ConstraintKind::Unique));
        }
        state.accounts.insert(
            account_id,
            AccountRow {
                customer_id,
                balance: opening_balance,
                version: 1,
            },
        );
        Ok(())
    }

    /// Provision an employee row.
    pub fn create_employee(&self, employee: Employee) -> Result<(), StoreError> {
        if employee.salary <= Decimal::ZERO {
            return Err(StoreError::Constraint(ConstraintKind::AmountPositive));
        }
        let mut state = self.lock();
        if state.employees.contains_key(&employee.employee_id) {
            return Err(StoreError::Constraint(ConstraintKind::Unique));
        }
        state.employees.insert(
            employee.employee_id,
            EmployeeRow {
                first_name: employee.first_name,
                last_name: employee.last_name,
                salary: employee.salary,
                department_id: employee.department_id,
                version: 1,
            },
        );
        Ok(())
    }

    // -- committed-state inspection ----------------------------------------

    /// Committed balance of an account, if it exists.
    pub fn balance_of(&self, account_id: AccountId) -> Option<Decimal> {
        self.lock().accounts.get(&account_id).map(|row| row.balance)
    }

    /// Committed account row, if it exists.
    pub fn account(&self, account_id: AccountId) -> Option<Account> {
        self.lock().accounts.get(&account_id).map(|row| Account {
            account_id,
            customer_id: row.customer_id,
            balance: row.balance,
        })
    }

    /// Committed salary of an employee, if it exists.
    pub fn salary_of(&self, employee_id: EmployeeId) -> Option<Decimal> {
        self.lock().employees.get(&employee_id).map(|row| row.salary)
    }

    /// All committed ledger entries, in insertion order.
    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.lock().entries.clone()
    }

    /// All committed salary audit records, in insertion order.
    pub fn audit_records(&self) -> Vec<SalaryAuditRecord> {
        self.lock().audits.clone()
    }

    // -- fault injection ----------------------------------------------------

    /// Let `after` more ledger-entry inserts succeed, then fail the next one.
    pub fn fail_entry_insert_after(&self, after: u32) {
        self.lock().faults.entry_inserts_until_fault = Some(after);
    }

    /// Fail the next salary-audit insert.
    pub fn fail_next_audit_insert(&self) {
        self.lock().faults.fail_next_audit_insert = true;
    }

    /// Fail the next commit.
    pub fn fail_next_commit(&self) {
        self.lock().faults.fail_next_commit = true;
    }
}

impl Default for MemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    type Unit = MemoryUnit;

    async fn begin(&self) -> Result<MemoryUnit, StoreError> {
        Ok(MemoryUnit {
            state: Arc::clone(&self.state),
            staged: Staged::default(),
        })
    }
}

#[derive(Debug, Clone)]
struct StagedBalance {
    new_balance: Decimal,
    base_version: u64,
}

#[derive(Debug, Clone)]
struct StagedSalary {
    new_salary: Decimal,
    base_version: u64,
}

#[derive(Debug, Default)]
struct Staged {
    balances: BTreeMap<AccountId, StagedBalance>,
    salaries: BTreeMap<EmployeeId, StagedSalary>,
    entries: Vec<LedgerEntry>,
    audits: Vec<SalaryAuditRecord>,
    account_reads: BTreeMap<AccountId, u64>,
    employee_reads: BTreeMap<EmployeeId, u64>,
}

/// One atomic unit against the memory store. Dropping it discards all
/// staged writes.
#[derive(Debug)]
pub struct MemoryUnit {
    state: Arc<Mutex<MemoryState>>,
    staged: Staged,
}

impl MemoryUnit {
    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory store lock poisoned")
    }
}

#[async_trait]
impl LedgerUnit for MemoryUnit {
    async fn account_balance(&mut self, account_id: AccountId) -> Result<Decimal, StoreError> {
        if let Some(staged) = self.staged.balances.get(&account_id) {
            return Ok(staged.new_balance);
        }
        let state = self.lock();
        let row = state
            .accounts
            .get(&account_id)
            .ok_or(StoreError::AccountNotFound(account_id))?;
        let balance = row.balance;
        let version = row.version;
        drop(state);
        self.staged.account_reads.entry(account_id).or_insert(version);
        Ok(balance)
    }

    async fn write_account_balance(
        &mut self,
        account_id: AccountId,
        new_balance: Decimal,
    ) -> Result<(), StoreError> {
        if new_balance < Decimal::ZERO {
            return Err(StoreError::Constraint(ConstraintKind::BalanceNonNegative));
        }
        let current_version = {
            let state = self.lock();
            state
                .accounts
                .get(&account_id)
                .ok_or(StoreError::AccountNotFound(account_id))?
                .version
        };
        // Anchor the write at the version this unit first observed, so a
        // concurrent commit between our read and our commit is detected.
        let base_version = *self
            .staged
            .account_reads
            .entry(account_id)
            .or_insert(current_version);
        self.staged.balances.insert(
            account_id,
            StagedBalance {
                new_balance,
                base_version,
            },
        );
        Ok(())
    }

    async fn insert_entry(
        &mut self,
        account_id: AccountId,
        kind: EntryKind,
        amount: Decimal,
        employee_id: EmployeeId,
    ) -> Result<EntryId, StoreError> {
        if amount <= Decimal::ZERO {
            return Err(StoreError::Constraint(ConstraintKind::AmountPositive));
        }
        let mut state = self.lock();
        match state.faults.entry_inserts_until_fault {
            Some(0) => {
                state.faults.entry_inserts_until_fault = None;
                return Err(StoreError::Backend(
                    "injected fault: ledger entry insert".to_string(),
                ));
            }
            Some(n) => state.faults.entry_inserts_until_fault = Some(n - 1),
            None => {}
        }
        if !state.accounts.contains_key(&account_id) {
            return Err(StoreError::Constraint(ConstraintKind::ForeignKey));
        }
        if !state.employees.contains_key(&employee_id) {
            return Err(StoreError::Constraint(ConstraintKind::ForeignKey));
        }
        // Ids come off a sequence; like a database sequence they are not
        // reclaimed if the unit later aborts.
        let entry_id = state.next_entry_id;
        state.next_entry_id += 1;
        drop(state);
        self.staged.entries.push(LedgerEntry {
            entry_id,
            account_id,
            kind,
            amount,
            employee_id,
            created_at: Utc::now(),
        });
        Ok(entry_id)
    }

    async fn employee(&mut self, employee_id: EmployeeId) -> Result<Employee, StoreError> {
        let state = self.lock();
        let row = state
            .employees
            .get(&employee_id)
            .ok_or(StoreError::EmployeeNotFound(employee_id))?;
        let mut employee = Employee {
            employee_id,
            first_name: row.first_name.clone(),
            last_name: row.last_name.clone(),
            salary: row.salary,
            department_id: row.department_id,
        };
        let version = row.version;
        drop(state);
        self.staged.employee_reads.entry(employee_id).or_insert(version);
        if let Some(staged) = self.staged.salaries.get(&employee_id) {
            employee.salary = staged.new_salary;
        }
        Ok(employee)
    }

    async fn write_employee_salary(
        &mut self,
        employee_id: EmployeeId,
        new_salary: Decimal,
    ) -> Result<(), StoreError> {
        if new_salary <= Decimal::ZERO {
            return Err(StoreError::Constraint(ConstraintKind::AmountPositive));
        }
        let current_version = {
            let state = self.lock();
            state
                .employees
                .get(&employee_id)
                .ok_or(StoreError::EmployeeNotFound(employee_id))?
                .version
        };
        let base_version = *self
            .staged
            .employee_reads
            .entry(employee_id)
            .or_insert(current_version);
        self.staged.salaries.insert(
            employee_id,
            StagedSalary {
                new_salary,
                base_version,
            },
        );
        Ok(())
    }

    async fn insert_salary_audit(
        &mut self,
        record: NewSalaryAudit,
    ) -> Result<AuditRecordId, StoreError> {
        let mut state = self.lock();
        if state.faults.fail_next_audit_insert {
            state.faults.fail_next_audit_insert = false;
            return Err(StoreError::Backend(
                "injected fault: salary audit insert".to_string(),
            ));
        }
        if !state.employees.contains_key(&record.employee_id) {
            return Err(StoreError::Constraint(ConstraintKind::ForeignKey));
        }
        let audit_id = state.next_audit_id;
        state.next_audit_id += 1;
        drop(state);
        self.staged.audits.push(SalaryAuditRecord {
            audit_id,
            employee_id: record.employee_id,
            first_name: record.first_name,
            last_name: record.last_name,
            old_salary: record.old_salary,
            new_salary: record.new_salary,
            changed_at: Utc::now(),
        });
        Ok(audit_id)
    }

    async fn commit(self) -> Result<(), StoreError> {
        let MemoryUnit { state, staged } = self;
        let mut state = state.lock().expect("memory store lock poisoned");
        if state.faults.fail_next_commit {
            state.faults.fail_next_commit = false;
            return Err(StoreError::Backend("injected fault: commit".to_string()));
        }

        // Validate everything against committed state before applying
        // anything, so a failed commit leaves no partial effect.
        for (account_id, staged_balance) in &staged.balances {
            let row = state
                .accounts
                .get(account_id)
                .ok_or(StoreError::AccountNotFound(*account_id))?;
            if row.version != staged_balance.base_version {
                return Err(StoreError::Constraint(ConstraintKind::WriteConflict));
            }
            if staged_balance.new_balance < Decimal::ZERO {
                return Err(StoreError::Constraint(ConstraintKind::BalanceNonNegative));
            }
        }
        for (employee_id, staged_salary) in &staged.salaries {
            let row = state
                .employees
                .get(employee_id)
                .ok_or(StoreError::EmployeeNotFound(*employee_id))?;
            if row.version != staged_salary.base_version {
                return Err(StoreError::Constraint(ConstraintKind::WriteConflict));
            }
            if staged_salary.new_salary <= Decimal::ZERO {
                return Err(StoreError::Constraint(ConstraintKind::AmountPositive));
            }
        }

        for (account_id, staged_balance) in staged.balances {
            let row = state.accounts.get_mut(&account_id).expect("validated above");
            row.balance = staged_balance.new_balance;
            row.version += 1;
        }
        for (employee_id, staged_salary) in staged.salaries {
            let row = state.employees.get_mut(&employee_id).expect("validated above");
            row.salary = staged_salary.new_salary;
            row.version += 1;
        }
        state.entries.extend(staged.entries);
        state.audits.extend(staged.audits);
        Ok(())
    }

    async fn abort(self) -> Result<(), StoreError> {
        // Staged writes are dropped with the unit.
        Ok(())
    }
}
