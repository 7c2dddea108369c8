//! bank_ledger driver
//!
//! Small command-line driver for running ledger operations against a
//! provisioned Postgres database:
//!
//!   bank_ledger transfer <sender> <receiver> <amount> <employee>
//!   bank_ledger set-salary <employee> <new-salary>

use std::str::FromStr;

use anyhow::{bail, Context};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bank_ledger::ops::{
    SalaryUpdateHandler, TransferCommand, TransferHandler, UpdateSalaryCommand,
};
use bank_ledger::store::PgLedgerStore;
use bank_ledger::{config::Config, db, OperationContext};

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bank_ledger=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn parse_decimal(arg: &str, what: &str) -> anyhow::Result<Decimal> {
    Decimal::from_str(arg).with_context(|| format!("invalid {what}: {arg}"))
}

fn parse_id(arg: &str, what: &str) -> anyhow::Result<i64> {
    arg.parse()
        .with_context(|| format!("invalid {what}: {arg}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::connect(&config).await?;

    if !db::check_schema(&pool).await? {
        bail!("Database schema incomplete. Please apply migrations/0001_init.sql");
    }

    let store = PgLedgerStore::new(pool.clone());
    let mut context = OperationContext::new().with_initiator("cli");
    context.ensure_correlation_id();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("transfer") => {
            let [sender, receiver, amount, employee] = match &args[2..] {
                [a, b, c, d] => [a, b, c, d],
                _ => bail!("usage: bank_ledger transfer <sender> <receiver> <amount> <employee>"),
            };
            let command = TransferCommand::new(
                parse_id(sender, "sender account id")?,
                parse_id(receiver, "receiver account id")?,
                parse_decimal(amount, "amount")?,
                parse_id(employee, "employee id")?,
            );
            let receipt = TransferHandler::new(store).execute(command, &context).await?;
            println!(
                "transferred {} from account {} (balance {}) to account {} (balance {})",
                receipt.amount,
                receipt.sender_account,
                receipt.sender_balance,
                receipt.receiver_account,
                receipt.receiver_balance,
            );
        }
        Some("set-salary") => {
            let [employee, salary] = match &args[2..] {
                [a, b] => [a, b],
                _ => bail!("usage: bank_ledger set-salary <employee> <new-salary>"),
            };
            let command = UpdateSalaryCommand::new(
                parse_id(employee, "employee id")?,
                parse_decimal(salary, "salary")?,
            );
            let outcome = SalaryUpdateHandler::new(store).execute(command, &context).await?;
            match outcome.audit_id {
                Some(audit_id) => println!(
                    "salary of employee {} changed {} -> {} (audit record {})",
                    outcome.employee_id, outcome.old_salary, outcome.new_salary, audit_id
                ),
                None => println!(
                    "salary of employee {} unchanged at {}",
                    outcome.employee_id, outcome.old_salary
                ),
            }
        }
        _ => bail!("usage: bank_ledger <transfer|set-salary> ..."),
    }

    pool.close().await;
    Ok(())
}
