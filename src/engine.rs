use serde::Serialize;
use tracing::info;

use crate::balance::{aggregate, Balance, ReferencePolicy};
use crate::error::Result;
use crate::exchange::{GreedySettlement, SettlementStrategy, Transaction};
use crate::schemas::{Expense, Participant};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SettlementReport {
    pub total_spent: f64,
    pub balances: Vec<Balance>,
    pub transactions: Vec<Transaction>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Fewer than two participants, or nothing spent yet
    InsufficientData,
    Settled(SettlementReport),
    Unsettled(SettlementReport),
}

impl Outcome {
    pub fn report(&self) -> Option<&SettlementReport> {
        match self {
            Outcome::InsufficientData => None,
            Outcome::Settled(report) | Outcome::Unsettled(report) => Some(report),
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Outcome::Settled(_))
    }
}

#[derive(Clone, Debug)]
pub struct SettlementEngine<S = GreedySettlement> {
    strategy: S,
    policy: ReferencePolicy,
}

impl SettlementEngine<GreedySettlement> {
    pub fn new(policy: ReferencePolicy) -> Self {
        Self::with_strategy(GreedySettlement, policy)
    }
}

impl Default for SettlementEngine {
    fn default() -> Self {
        Self::new(ReferencePolicy::default())
    }
}

impl<S: SettlementStrategy> SettlementEngine<S> {
    pub fn with_strategy(strategy: S, policy: ReferencePolicy) -> Self {
        Self { strategy, policy }
    }

    pub fn policy(&self) -> ReferencePolicy {
        self.policy
    }

    #[tracing::instrument(
        skip_all,
        fields(participants = participants.len(), expenses = expenses.len())
    )]
    pub fn evaluate(&self, participants: &[Participant], expenses: &[Expense]) -> Result<Outcome> {
        let Some(aggregate) = aggregate(participants, expenses, self.policy)? else {
            info!("Not enough data to compute balances");
            return Ok(Outcome::InsufficientData);
        };

        let transactions = self.strategy.settle(&aggregate.balances);
        info!(
            total_spent = aggregate.total_spent,
            transactions = transactions.len(),
            "Computed settlement"
        );

        let report = SettlementReport {
            total_spent: aggregate.total_spent,
            balances: aggregate.balances,
            transactions,
        };
        if report.transactions.is_empty() {
            Ok(Outcome::Settled(report))
        } else {
            Ok(Outcome::Unsettled(report))
        }
    }
}
