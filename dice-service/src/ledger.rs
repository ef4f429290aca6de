//! Typed access to the game collections inside a unit of work.

use std::ops::ControlFlow;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::model::{GameSession, RollSession, SessionStatus, Transaction, User};
use crate::store::{StoreError, Tx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Transactions,
    GameSessions,
    RollSessions,
}

impl Collection {
    pub const fn name(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Transactions => "transactions",
            Collection::GameSessions => "gameSession",
            Collection::RollSessions => "rollSession",
        }
    }
}

pub struct Ledger<'u, 'c> {
    unit: &'u Tx<'c>,
}

impl<'u, 'c> Ledger<'u, 'c> {
    pub fn new(unit: &'u Tx<'c>) -> Self {
        Self { unit }
    }

    pub fn user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        self.unit
            .get(Collection::Users.name(), user_id.as_bytes())?
            .map(|bytes| decode(Collection::Users, &bytes))
            .transpose()
    }

    pub fn put_user(&self, user: &User) -> Result<(), StoreError> {
        self.put(Collection::Users, user.user_id.as_bytes(), user)
    }

    /// Appends to the ledger and returns the entry's sequence number.
    pub fn append_transaction(&self, transaction: &Transaction) -> Result<u64, StoreError> {
        let collection = Collection::Transactions;
        let seq = self.unit.next_sequence(collection.name())?;
        self.put(collection, &seq.to_be_bytes(), transaction)?;
        Ok(seq)
    }

    /// The user's entries in the order they were appended.
    pub fn transactions_for(&self, user_id: &str) -> Result<Vec<Transaction>, StoreError> {
        self.collect(Collection::Transactions, |t: &Transaction| t.user_id == user_id)
    }

    pub fn active_game_session(&self, user_id: &str) -> Result<Option<GameSession>, StoreError> {
        self.find(Collection::GameSessions, |s: &GameSession| {
            s.is_active_for(user_id)
        })
    }

    pub fn active_game_sessions(&self, user_id: &str) -> Result<Vec<GameSession>, StoreError> {
        self.collect(Collection::GameSessions, |s: &GameSession| {
            s.is_active_for(user_id)
        })
    }

    pub fn put_game_session(&self, session: &GameSession) -> Result<(), StoreError> {
        self.put(Collection::GameSessions, session.session_id.as_bytes(), session)
    }

    pub fn active_roll_session(
        &self,
        game_session_id: &str,
    ) -> Result<Option<RollSession>, StoreError> {
        self.find(Collection::RollSessions, |r: &RollSession| {
            r.game_session_id == game_session_id && r.status == SessionStatus::InProgress
        })
    }

    pub fn active_roll_sessions_of(&self, user_id: &str) -> Result<Vec<RollSession>, StoreError> {
        self.collect(Collection::RollSessions, |r: &RollSession| {
            r.user_id == user_id && r.status == SessionStatus::InProgress
        })
    }

    pub fn put_roll_session(&self, roll: &RollSession) -> Result<(), StoreError> {
        self.put(Collection::RollSessions, roll.roll_id.as_bytes(), roll)
    }

    fn put<T: Serialize>(
        &self,
        collection: Collection,
        key: &[u8],
        value: &T,
    ) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value).map_err(|source| StoreError::Encode {
            collection: collection.name(),
            source,
        })?;
        self.unit.put(collection.name(), key, &bytes)
    }

    fn find<T, P>(&self, collection: Collection, mut matches: P) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned,
        P: FnMut(&T) -> bool,
    {
        let mut found = None;
        self.scan(collection, |record: T| {
            if matches(&record) {
                found = Some(record);
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })?;
        Ok(found)
    }

    fn collect<T, P>(&self, collection: Collection, mut matches: P) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
        P: FnMut(&T) -> bool,
    {
        let mut records = Vec::new();
        self.scan(collection, |record: T| {
            if matches(&record) {
                records.push(record);
            }
            ControlFlow::Continue(())
        })?;
        Ok(records)
    }

    // Records that no longer decode are logged and passed over so a single bad
    // row cannot hide the rest of the collection.
    fn scan<T, F>(&self, collection: Collection, mut visit: F) -> Result<(), StoreError>
    where
        T: DeserializeOwned,
        F: FnMut(T) -> ControlFlow<()>,
    {
        self.unit.scan(collection.name(), |key, value| {
            match decode::<T>(collection, value) {
                Ok(record) => visit(record),
                Err(e) => {
                    tracing::warn!(
                        collection = collection.name(),
                        key = %String::from_utf8_lossy(key),
                        error = %e,
                        "Skipping undecodable record"
                    );
                    ControlFlow::Continue(())
                }
            }
        })
    }
}

fn decode<T: DeserializeOwned>(collection: Collection, bytes: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|source| StoreError::Decode {
        collection: collection.name(),
        source,
    })
}
