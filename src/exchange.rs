use serde::Serialize;
use tracing::debug;

use crate::balance::Balance;
use crate::schemas::ParticipantId;

/// Balances closer to zero than this are treated as settled. Absorbs the
/// drift left behind by dividing expenses into shares.
pub const TOLERANCE: f64 = 0.01;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub from: ParticipantId,
    pub to: ParticipantId,
    /// Whole currency units
    pub amount: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_payment_info: Option<String>,
}

impl Transaction {
    /// Key under which proof-of-payment attachments are filed.
    pub fn receipt_key(&self) -> String {
        format!("{}-{}", self.from, self.to)
    }
}

/// Turns net balances into a list of payments that brings everyone to zero.
pub trait SettlementStrategy {
    fn settle(&self, balances: &[Balance]) -> Vec<Transaction>;
}

/// Matches the largest debtor with the largest creditor, repeatedly.
///
/// Gives few, large payments in practice but makes no promise of the minimum
/// number of transactions.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedySettlement;

#[derive(Clone, Debug)]
struct PersonalBalance<'a> {
    id: &'a ParticipantId,
    payment_info: Option<&'a String>,
    remaining: f64,
}

impl SettlementStrategy for GreedySettlement {
    fn settle(&self, balances: &[Balance]) -> Vec<Transaction> {
        // Divide people into debtors and creditors, both tracked as positive amounts
        let mut debtors = Vec::new();
        let mut creditors = Vec::new();

        for balance in balances {
            let person = PersonalBalance {
                id: &balance.participant,
                payment_info: balance.payment_info.as_ref(),
                remaining: balance.balance.abs(),
            };
            if balance.balance < -TOLERANCE {
                debtors.push(person);
            } else if balance.balance > TOLERANCE {
                creditors.push(person);
            }
        }

        // Stable sort, ties keep roster order
        debtors.sort_by(|a, b| b.remaining.total_cmp(&a.remaining));
        creditors.sort_by(|a, b| b.remaining.total_cmp(&a.remaining));

        let mut transactions = Vec::new();

        for debtor in &mut debtors {
            for creditor in &mut creditors {
                while debtor.remaining > TOLERANCE && creditor.remaining > TOLERANCE {
                    let amount = debtor.remaining.min(creditor.remaining);
                    let rounded = amount.round();
                    if rounded > TOLERANCE {
                        debug!(from = %debtor.id, to = %creditor.id, amount = rounded, "Emitting transaction");
                        transactions.push(Transaction {
                            from: debtor.id.clone(),
                            to: creditor.id.clone(),
                            amount: rounded as u64,
                            to_payment_info: creditor.payment_info.cloned(),
                        });
                    }
                    // The running remainder stays unrounded so rounding errors don't pile up
                    debtor.remaining -= amount;
                    creditor.remaining -= amount;
                }
                if debtor.remaining <= TOLERANCE {
                    break;
                }
            }
        }

        transactions
    }
}
