//! Result of a store operation as the UI sees it.

use shop_commerce::ids::ProductId;

/// Prompt shown when a guest touches the wishlist.
pub const LOGIN_PROMPT: &str = "Please log in to use your wishlist.";

/// What happened to a store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The change took effect and the store is current.
    Applied,
    /// The store fell back to cached or stale state.
    Degraded { reason: String },
    /// The change was refused; state is unchanged.
    Rejected { message: String },
    /// Guests can't do this.
    LoginRequired,
    /// The local cart has no server line for this product. Reload to recover.
    Desynced { product_id: ProductId },
}

impl StoreOutcome {
    pub(crate) fn rejected(message: impl Into<String>) -> Self {
        StoreOutcome::Rejected {
            message: message.into(),
        }
    }

    pub(crate) fn degraded(reason: impl ToString) -> Self {
        StoreOutcome::Degraded {
            reason: reason.to_string(),
        }
    }

    /// Check if the change took effect.
    pub fn is_applied(&self) -> bool {
        matches!(self, StoreOutcome::Applied)
    }

    /// Check if the operation was refused outright.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StoreOutcome::Rejected { .. } | StoreOutcome::LoginRequired | StoreOutcome::Desynced { .. }
        )
    }

    /// Text to show the user, if the outcome warrants any.
    pub fn user_message(&self) -> Option<String> {
        match self {
            StoreOutcome::Applied | StoreOutcome::Degraded { .. } => None,
            StoreOutcome::Rejected { message } => Some(message.clone()),
            StoreOutcome::LoginRequired => Some(LOGIN_PROMPT.to_string()),
            StoreOutcome::Desynced { .. } => {
                Some("Your cart is out of date. Reload it and try again.".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_is_not_a_failure() {
        let outcome = StoreOutcome::degraded("offline");
        assert!(!outcome.is_applied());
        assert!(!outcome.is_failure());
        assert_eq!(outcome.user_message(), None);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            StoreOutcome::rejected("Out of stock").user_message().as_deref(),
            Some("Out of stock")
        );
        assert_eq!(
            StoreOutcome::LoginRequired.user_message().as_deref(),
            Some(LOGIN_PROMPT)
        );
        assert!(StoreOutcome::Desynced {
            product_id: ProductId::new(3)
        }
        .is_failure());
    }
}
