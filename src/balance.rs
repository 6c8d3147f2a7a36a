use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::schemas::{Expense, Participant, ParticipantId};

/// What to do with an expense pointing at a participant that isn't in the roster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePolicy {
    /// Drop the stray contribution and keep going.
    #[default]
    Lenient,
    /// Fail with [`Error::InvalidReference`].
    Strict,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Balance {
    pub participant: ParticipantId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_info: Option<String>,
    pub paid: f64,
    pub owes: f64,
    pub balance: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Aggregate {
    pub total_spent: f64,
    pub balances: Vec<Balance>,
}

/// Computes what every participant paid and owes.
///
/// Returns `Ok(None)` when there isn't enough data to say anything useful:
/// fewer than two participants or no expenses at all. Balances come back in
/// the same order as `participants`.
pub fn aggregate(
    participants: &[Participant],
    expenses: &[Expense],
    policy: ReferencePolicy,
) -> Result<Option<Aggregate>> {
    if participants.len() < 2 || expenses.is_empty() {
        return Ok(None);
    }

    let index: HashMap<&ParticipantId, usize> = participants
        .iter()
        .enumerate()
        .map(|(position, participant)| (&participant.id, position))
        .collect();
    let mut paid = vec![0.0; participants.len()];
    let mut owes = vec![0.0; participants.len()];
    let mut total_spent = 0.0;

    for expense in expenses {
        let share_set = expense.shared_by.resolve(participants);
        // Stray ids still count toward the divisor, their share is just absorbed
        let split_amount = expense.amount / share_set.len() as f64;
        total_spent += expense.amount;

        match index.get(&expense.paid_by) {
            Some(&position) => paid[position] += expense.amount,
            None => dangling_reference(policy, expense, &expense.paid_by)?,
        }

        for id in share_set {
            match index.get(id) {
                Some(&position) => owes[position] += split_amount,
                None => dangling_reference(policy, expense, id)?,
            }
        }
    }

    let balances = participants
        .iter()
        .zip(paid.into_iter().zip(owes))
        .map(|(participant, (paid, owes))| Balance {
            participant: participant.id.clone(),
            name: participant.name.clone(),
            payment_info: participant.payment_info.clone(),
            paid,
            owes,
            balance: paid - owes,
        })
        .collect();

    Ok(Some(Aggregate {
        total_spent,
        balances,
    }))
}

fn dangling_reference(
    policy: ReferencePolicy,
    expense: &Expense,
    participant: &ParticipantId,
) -> Result<()> {
    match policy {
        ReferencePolicy::Lenient => {
            warn!(
                expense = %expense.id,
                participant = %participant,
                "Dropping contribution of unknown participant"
            );
            Ok(())
        }
        ReferencePolicy::Strict => Err(Error::InvalidReference {
            expense: expense.id.clone(),
            participant: participant.clone(),
        }),
    }
}
