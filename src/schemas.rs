use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ExpenseId(pub String);

impl ParticipantId {
    /// Fresh random id. Ids are never reused once handed out.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ExpenseId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for ExpenseId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    /// Bank alias or account where this participant receives transfers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_info: Option<String>,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            payment_info: None,
        }
    }

    pub fn with_payment_info(mut self, payment_info: impl Into<String>) -> Self {
        self.payment_info = Some(payment_info.into());
        self
    }
}

/// Who an expense is divided across.
///
/// `All` is bound late: it resolves to whoever is a participant when the
/// balances are evaluated, not when the expense was recorded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "scope", content = "participants", rename_all = "snake_case")]
pub enum ShareScope {
    #[default]
    All,
    Subset(Vec<ParticipantId>),
}

impl ShareScope {
    /// Builds a scope from a plain id list, where an empty list means everyone.
    pub fn from_ids(ids: Vec<ParticipantId>) -> Self {
        if ids.is_empty() {
            ShareScope::All
        } else {
            ShareScope::Subset(ids)
        }
    }

    /// The participants sharing the cost, in a stable order with duplicates removed.
    pub fn resolve<'a>(&'a self, participants: &'a [Participant]) -> Vec<&'a ParticipantId> {
        match self {
            ShareScope::Subset(ids) if !ids.is_empty() => {
                let mut resolved: Vec<&ParticipantId> = Vec::with_capacity(ids.len());
                for id in ids {
                    if !resolved.contains(&id) {
                        resolved.push(id);
                    }
                }
                resolved
            }
            _ => participants.iter().map(|p| &p.id).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub description: String,
    pub amount: f64,
    pub paid_by: ParticipantId,
    #[serde(default)]
    pub shared_by: ShareScope,
}

impl Expense {
    pub fn new(
        id: impl Into<ExpenseId>,
        description: impl Into<String>,
        amount: f64,
        paid_by: impl Into<ParticipantId>,
        shared_by: ShareScope,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            amount,
            paid_by: paid_by.into(),
            shared_by,
        }
    }
}
