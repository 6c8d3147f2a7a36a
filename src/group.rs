use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::schemas::{Expense, ExpenseId, Participant, ParticipantId, ShareScope};

/// Inputs for one engine evaluation, in roster and entry order.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Snapshot {
    pub participants: Vec<Participant>,
    pub expenses: Vec<Expense>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupView {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

/// What removing a participant took with it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RemovalReport {
    pub participant: Participant,
    /// Expenses the participant had paid, deleted outright
    pub deleted_expenses: Vec<ExpenseId>,
    /// Expenses that no longer count the participant among their sharers
    pub stripped_expenses: Vec<ExpenseId>,
}

#[derive(Clone, Debug)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    participants: HashMap<ParticipantId, Participant>,
    order: Vec<ParticipantId>,
    expenses: Vec<Expense>,
}

impl Group {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            created_at: Utc::now(),
            participants: HashMap::new(),
            order: Vec::new(),
            expenses: Vec::new(),
        }
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.get(id)
    }

    pub fn participants(&self) -> impl Iterator<Item = &Participant> + '_ {
        self.order.iter().filter_map(|id| self.participants.get(id))
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn add_participant(
        &mut self,
        name: impl Into<String>,
        payment_info: Option<String>,
    ) -> Result<Participant> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::EmptyName);
        }

        let participant = Participant {
            id: ParticipantId::generate(),
            name,
            payment_info: payment_info.filter(|info| !info.trim().is_empty()),
        };
        info!(group = %self.id, participant = %participant.id, "Participant added");
        self.order.push(participant.id.clone());
        self.participants
            .insert(participant.id.clone(), participant.clone());
        Ok(participant)
    }

    pub fn update_payment_info(
        &mut self,
        id: &ParticipantId,
        payment_info: Option<String>,
    ) -> Result<Participant> {
        let participant = self
            .participants
            .get_mut(id)
            .ok_or_else(|| Error::ParticipantNotFound(id.clone()))?;
        participant.payment_info = payment_info.filter(|info| !info.trim().is_empty());
        Ok(participant.clone())
    }

    /// Removes a participant along with everything that depended on them.
    ///
    /// Expenses they paid are deleted, and they are struck from every subset
    /// they shared. A subset left empty falls back to [`ShareScope::All`].
    pub fn remove_participant(&mut self, id: &ParticipantId) -> Result<RemovalReport> {
        let participant = self
            .participants
            .remove(id)
            .ok_or_else(|| Error::ParticipantNotFound(id.clone()))?;
        self.order.retain(|other| other != id);

        let mut deleted_expenses = Vec::new();
        self.expenses.retain(|expense| {
            if expense.paid_by == *id {
                deleted_expenses.push(expense.id.clone());
                false
            } else {
                true
            }
        });

        let mut stripped_expenses = Vec::new();
        for expense in &mut self.expenses {
            let emptied = match &mut expense.shared_by {
                ShareScope::Subset(ids) if ids.contains(id) => {
                    ids.retain(|other| other != id);
                    stripped_expenses.push(expense.id.clone());
                    ids.is_empty()
                }
                _ => false,
            };
            if emptied {
                expense.shared_by = ShareScope::All;
            }
        }

        info!(
            group = %self.id,
            participant = %participant.id,
            deleted = deleted_expenses.len(),
            stripped = stripped_expenses.len(),
            "Participant removed"
        );
        Ok(RemovalReport {
            participant,
            deleted_expenses,
            stripped_expenses,
        })
    }

    pub fn add_expense(
        &mut self,
        description: impl Into<String>,
        amount: f64,
        paid_by: ParticipantId,
        shared_by: ShareScope,
    ) -> Result<Expense> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::InvalidAmount(amount));
        }
        if !self.participants.contains_key(&paid_by) {
            return Err(Error::ParticipantNotFound(paid_by));
        }
        if let ShareScope::Subset(ids) = &shared_by {
            if let Some(unknown) = ids.iter().find(|id| !self.participants.contains_key(*id)) {
                return Err(Error::ParticipantNotFound(unknown.clone()));
            }
        }

        let expense = Expense {
            id: ExpenseId::generate(),
            description: description.into(),
            amount,
            paid_by,
            shared_by,
        };
        info!(group = %self.id, expense = %expense.id, amount, "Expense added");
        self.expenses.push(expense.clone());
        Ok(expense)
    }

    pub fn remove_expense(&mut self, id: &ExpenseId) -> Result<Expense> {
        let position = self
            .expenses
            .iter()
            .position(|expense| expense.id == *id)
            .ok_or_else(|| Error::ExpenseNotFound(id.clone()))?;
        Ok(self.expenses.remove(position))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            participants: self.participants().cloned().collect(),
            expenses: self.expenses.clone(),
        }
    }

    pub fn view(&self) -> GroupView {
        GroupView {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            snapshot: self.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    struct Trip {
        group: Group,
        ana: ParticipantId,
        bruno: ParticipantId,
        carla: ParticipantId,
    }

    #[fixture]
    fn trip() -> Trip {
        let mut group = Group::new("trip", "Beach trip");
        let ana = group.add_participant("Ana", None).unwrap().id;
        let bruno = group.add_participant("Bruno", None).unwrap().id;
        let carla = group.add_participant("Carla", None).unwrap().id;
        Trip {
            group,
            ana,
            bruno,
            carla,
        }
    }

    #[rstest]
    fn removal_deletes_paid_expenses_and_strips_shares(trip: Trip) {
        let Trip {
            mut group,
            ana,
            bruno,
            carla,
        } = trip;
        let paid_by_bruno = group
            .add_expense("Fuel", 60.0, bruno.clone(), ShareScope::All)
            .unwrap();
        let shared_with_bruno = group
            .add_expense(
                "Tickets",
                40.0,
                ana.clone(),
                ShareScope::Subset(vec![ana.clone(), bruno.clone()]),
            )
            .unwrap();
        let untouched = group
            .add_expense(
                "Snacks",
                10.0,
                carla.clone(),
                ShareScope::Subset(vec![ana.clone(), carla.clone()]),
            )
            .unwrap();

        let report = group.remove_participant(&bruno).unwrap();

        assert_eq!(report.participant.name, "Bruno");
        assert_eq!(report.deleted_expenses, vec![paid_by_bruno.id]);
        assert_eq!(report.stripped_expenses, vec![shared_with_bruno.id.clone()]);
        assert!(group.participant(&bruno).is_none());

        let remaining: Vec<&ExpenseId> = group.expenses().iter().map(|e| &e.id).collect();
        assert_eq!(remaining, vec![&shared_with_bruno.id, &untouched.id]);
        assert_eq!(
            group.expenses()[0].shared_by,
            ShareScope::Subset(vec![ana.clone()])
        );
        assert_eq!(group.expenses()[1], untouched);
    }

    #[rstest]
    fn emptied_subset_falls_back_to_everyone(trip: Trip) {
        let Trip {
            mut group,
            ana,
            bruno,
            ..
        } = trip;
        group
            .add_expense("Gift", 30.0, ana, ShareScope::Subset(vec![bruno.clone()]))
            .unwrap();

        group.remove_participant(&bruno).unwrap();

        assert_eq!(group.expenses()[0].shared_by, ShareScope::All);
    }

    #[rstest]
    fn snapshot_keeps_roster_order(trip: Trip) {
        let Trip {
            mut group, bruno, ..
        } = trip;
        group.remove_participant(&bruno).unwrap();
        group.add_participant("Diego", Some("diego.alias".into())).unwrap();

        let names: Vec<String> = group
            .snapshot()
            .participants
            .into_iter()
            .map(|p| p.name)
            .collect();

        assert_eq!(names, vec!["Ana", "Carla", "Diego"]);
    }

    #[rstest]
    #[case::zero(0.0)]
    #[case::negative(-12.5)]
    #[case::not_a_number(f64::NAN)]
    #[case::infinite(f64::INFINITY)]
    fn rejects_invalid_amounts(trip: Trip, #[case] amount: f64) {
        let Trip { mut group, ana, .. } = trip;

        let result = group.add_expense("Broken", amount, ana, ShareScope::All);

        assert!(matches!(result, Err(Error::InvalidAmount(_))));
        assert!(group.expenses().is_empty());
    }

    #[rstest]
    fn rejects_unknown_references(trip: Trip) {
        let Trip { mut group, ana, .. } = trip;

        let unknown_payer =
            group.add_expense("Ghost", 10.0, ParticipantId::from("nobody"), ShareScope::All);
        let unknown_sharer = group.add_expense(
            "Ghost",
            10.0,
            ana.clone(),
            ShareScope::Subset(vec![ana, ParticipantId::from("nobody")]),
        );

        assert!(matches!(unknown_payer, Err(Error::ParticipantNotFound(_))));
        assert!(matches!(unknown_sharer, Err(Error::ParticipantNotFound(_))));
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank("   ")]
    fn rejects_blank_names(#[case] name: &str) {
        let mut group = Group::new("g", "Group");

        assert!(matches!(
            group.add_participant(name, None),
            Err(Error::EmptyName)
        ));
    }

    #[rstest]
    fn ids_are_never_reused(trip: Trip) {
        let Trip {
            mut group, carla, ..
        } = trip;
        group.remove_participant(&carla).unwrap();

        let again = group.add_participant("Carla", None).unwrap();

        assert_ne!(again.id, carla);
    }

    #[rstest]
    fn updates_and_clears_payment_info(trip: Trip) {
        let Trip { mut group, ana, .. } = trip;

        let updated = group
            .update_payment_info(&ana, Some("ana.alias".into()))
            .unwrap();
        assert_eq!(updated.payment_info.as_deref(), Some("ana.alias"));

        let cleared = group.update_payment_info(&ana, Some(" ".into())).unwrap();
        assert_eq!(cleared.payment_info, None);
    }

    #[rstest]
    fn removes_expenses_by_id(trip: Trip) {
        let Trip { mut group, ana, .. } = trip;
        let expense = group
            .add_expense("Coffee", 9.0, ana, ShareScope::All)
            .unwrap();

        assert_eq!(group.remove_expense(&expense.id).unwrap(), expense);
        assert!(matches!(
            group.remove_expense(&expense.id),
            Err(Error::ExpenseNotFound(_))
        ));
    }
}
