use crate::model::ids::AccountId;

/// An authenticated account reference, as supplied by the authentication
/// provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
}

impl Account {
    #[must_use]
    pub fn new(id: AccountId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}

/// The identity that owns the current completed set.
///
/// Anonymous progress lives in the device-local store; account progress
/// lives in the per-account remote record. Identity transitions are the
/// only externally triggered state change the progress store reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    Account(Account),
}

impl Identity {
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    /// Returns the account reference, or `None` when anonymous.
    #[must_use]
    pub fn account(&self) -> Option<&Account> {
        match self {
            Identity::Anonymous => None,
            Identity::Account(account) => Some(account),
        }
    }
}
