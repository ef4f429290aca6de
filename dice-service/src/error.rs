use actix_web::{http::StatusCode, HttpResponse, ResponseError};

use crate::model::ApiResponse;
use crate::store::StoreError;

/// Everything that can end a player's request. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("{0}")]
    Validation(String),

    #[error("user does not exist, kindly create user account")]
    NotFound { user_id: String },

    #[error("you already have an active game in progress, end previous game to start another")]
    AlreadyInSession,

    #[error("you have no active game in progress, please start a new game")]
    NoActiveGame,

    #[error("you have no roll in progress, roll the dice to start one")]
    NoActiveRoll,

    #[error("you do not have enough funds to {action}, please fund your account")]
    InsufficientFunds {
        action: &'static str,
        required: i64,
        balance: i64,
    },

    #[error("unfortunately you cannot fund your wallet unless its balance is {cap} or less")]
    FundingNotAllowed { cap: i64, balance: i64 },

    #[error("something went wrong, please contact support")]
    Storage(#[from] StoreError),
}

impl GameError {
    pub fn not_found(user_id: &str) -> Self {
        GameError::NotFound {
            user_id: user_id.to_string(),
        }
    }
}

impl ResponseError for GameError {
    fn status_code(&self) -> StatusCode {
        match self {
            GameError::Validation(_) => StatusCode::BAD_REQUEST,
            GameError::NotFound { .. } => StatusCode::NOT_FOUND,
            GameError::AlreadyInSession | GameError::NoActiveGame | GameError::NoActiveRoll => {
                StatusCode::CONFLICT
            }
            GameError::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
            GameError::FundingNotAllowed { .. } => StatusCode::FORBIDDEN,
            GameError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let GameError::Storage(source) = self {
            tracing::error!(error = %source, "Request failed in the store");
        }
        HttpResponse::build(self.status_code()).json(ApiResponse::failure(self.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_failures_hide_their_cause_from_players() {
        let err = GameError::from(StoreError::WorkerUnavailable);
        assert_eq!(err.to_string(), "something went wrong, please contact support");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn domain_errors_map_to_client_statuses() {
        let cases = [
            (GameError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (GameError::not_found("ada"), StatusCode::NOT_FOUND),
            (GameError::AlreadyInSession, StatusCode::CONFLICT),
            (GameError::NoActiveRoll, StatusCode::CONFLICT),
            (
                GameError::InsufficientFunds {
                    action: "start the game",
                    required: 20,
                    balance: 0,
                },
                StatusCode::PAYMENT_REQUIRED,
            ),
            (
                GameError::FundingNotAllowed {
                    cap: 35,
                    balance: 36,
                },
                StatusCode::FORBIDDEN,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err}");
        }
    }

    #[test]
    fn messages_read_naturally() {
        let err = GameError::InsufficientFunds {
            action: "roll dice",
            required: 5,
            balance: 3,
        };
        assert_eq!(
            err.to_string(),
            "you do not have enough funds to roll dice, please fund your account"
        );
        let err = GameError::FundingNotAllowed {
            cap: 35,
            balance: 36,
        };
        assert_eq!(
            err.to_string(),
            "unfortunately you cannot fund your wallet unless its balance is 35 or less"
        );
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GameError>();
    }
}
