//! Balances and settlement for groups sharing expenses.

pub mod balance;
pub mod config;
pub mod engine;
pub mod error;
pub mod exchange;
pub mod group;
pub mod routes;
pub mod schemas;
pub mod store;

pub use balance::{aggregate, Aggregate, Balance, ReferencePolicy};
pub use config::Config;
pub use engine::{Outcome, SettlementEngine, SettlementReport};
pub use error::{Error, Result};
pub use exchange::{GreedySettlement, SettlementStrategy, Transaction, TOLERANCE};
pub use group::{Group, RemovalReport, Snapshot};
pub use schemas::{Expense, ExpenseId, Participant, ParticipantId, ShareScope};
