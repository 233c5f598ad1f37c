//! Errors surfaced by the cart state manager.
//!
//! All three are recoverable: the caller may retry the same call, and none of
//! them changes the cart held by the manager.

use serde::Serialize;
use thiserror::Error;

use super::gateway::GatewayError;

/// A failed cart operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// No cart could be created for the first add.
    #[error("cart creation failed: {0}")]
    CartCreationFailed(String),

    /// The backend refused the mutation.
    #[error("cart mutation rejected: {0}")]
    MutationRejected(String),

    /// The backend could not be reached.
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),
}

impl CartError {
    #[must_use]
    pub const fn kind(&self) -> CartErrorKind {
        match self {
            Self::CartCreationFailed(_) => CartErrorKind::CartCreationFailed,
            Self::MutationRejected(_) => CartErrorKind::MutationRejected,
            Self::NetworkUnavailable(_) => CartErrorKind::NetworkUnavailable,
        }
    }

    /// Map a failed cart-create call.
    pub(crate) fn from_create(error: GatewayError) -> Self {
        match error {
            GatewayError::Transport(msg) => Self::NetworkUnavailable(msg),
            GatewayError::Missing => Self::CartCreationFailed("backend returned no cart".into()),
            GatewayError::Rejected(msg) => Self::CartCreationFailed(msg),
        }
    }

    /// Map a failed line mutation or read.
    pub(crate) fn from_mutation(error: GatewayError) -> Self {
        match error {
            GatewayError::Transport(msg) => Self::NetworkUnavailable(msg),
            GatewayError::Missing => Self::MutationRejected("cart no longer exists".into()),
            GatewayError::Rejected(msg) => Self::MutationRejected(msg),
        }
    }
}

/// The kind of the last failure, kept in the snapshot for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CartErrorKind {
    CartCreationFailed,
    MutationRejected,
    NetworkUnavailable,
}

impl CartErrorKind {
    /// Short message shown next to the control that failed.
    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::CartCreationFailed => "Não foi possível criar o carrinho. Tente novamente.",
            Self::MutationRejected => "Não foi possível atualizar o carrinho.",
            Self::NetworkUnavailable => "Sem conexão com a loja. Verifique sua internet.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_failures() {
        assert_eq!(
            CartError::from_create(GatewayError::Missing).kind(),
            CartErrorKind::CartCreationFailed
        );
        assert_eq!(
            CartError::from_create(GatewayError::Transport("timeout".into())),
            CartError::NetworkUnavailable("timeout".into())
        );
    }

    #[test]
    fn test_mutation_failures() {
        assert_eq!(
            CartError::from_mutation(GatewayError::Rejected("Sold out".into())),
            CartError::MutationRejected("Sold out".into())
        );
        assert_eq!(
            CartError::from_mutation(GatewayError::Missing).kind(),
            CartErrorKind::MutationRejected
        );
    }

    #[test]
    fn test_user_messages_are_distinct() {
        let messages = [
            CartErrorKind::CartCreationFailed.user_message(),
            CartErrorKind::MutationRejected.user_message(),
            CartErrorKind::NetworkUnavailable.user_message(),
        ];
        assert_ne!(messages[0], messages[1]);
        assert_ne!(messages[1], messages[2]);
    }
}
