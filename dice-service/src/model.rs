use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Body of every response: `status` tells success apart, `message` is meant
/// for the player and `data` carries the entity when there is one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: true,
            message: message.into(),
            data,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: false,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub wallet: i64,
    pub asset: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Debit,
    Credit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub description: String,
    pub time: i64,
    pub amount: i64,
    #[serde(rename = "userID")]
    pub user_id: String,
}

impl Transaction {
    pub fn debit(user_id: &str, amount: i64, description: &str) -> Self {
        Self::new(TransactionType::Debit, user_id, amount, description)
    }

    pub fn credit(user_id: &str, amount: i64, description: &str) -> Self {
        Self::new(TransactionType::Credit, user_id, amount, description)
    }

    fn new(
        transaction_type: TransactionType,
        user_id: &str,
        amount: i64,
        description: &str,
    ) -> Self {
        Self {
            transaction_type,
            description: description.to_string(),
            time: unix_timestamp(),
            amount,
            user_id: user_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    #[serde(rename = "sessionID")]
    pub session_id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "gameStatus")]
    pub status: SessionStatus,
}

impl GameSession {
    pub fn is_active_for(&self, user_id: &str) -> bool {
        self.user_id == user_id && self.status == SessionStatus::InProgress
    }
}

/// Two dice rolled against a target. `second_roll` stays empty until the roll
/// completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollSession {
    #[serde(rename = "rollID")]
    pub roll_id: String,
    #[serde(rename = "gameSessionID")]
    pub game_session_id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub target_total: u32,
    pub first_roll: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_roll: Option<u32>,
    #[serde(rename = "rollStatus")]
    pub status: SessionStatus,
}

impl RollSession {
    pub fn is_won(&self) -> bool {
        self.second_roll
            .is_some_and(|second| self.first_roll + second == self.target_total)
    }
}

fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or_default()
}
