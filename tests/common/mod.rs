//! Common test fixtures

use bank_ledger::domain::Employee;
use bank_ledger::store::MemoryLedgerStore;
use rust_decimal_macros::dec;

/// Memory store seeded with the stock scenario: account 1 (balance 500),
/// account 2 (balance 100), employee 7 (salary 80000).
pub fn seeded_store() -> MemoryLedgerStore {
    let store = MemoryLedgerStore::new();
    store.create_account(1, 10, dec!(500)).expect("seed account 1");
    store.create_account(2, 11, dec!(100)).expect("seed account 2");
    store
        .create_employee(Employee {
            employee_id: 7,
            first_name: "Maria".to_string(),
            last_name: "Santos".to_string(),
            salary: dec!(80000),
            department_id: 1,
        })
        .expect("seed employee 7");
    store
}
