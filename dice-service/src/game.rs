//! The dice game: player registration, wallet movements and the
//! start / roll / end session lifecycle.
//!
//! Every mutating operation reads, checks and writes inside a single
//! [`Store::update`], so the checks and the writes they guard commit together.

use std::sync::Arc;

use serde::Serialize;

use crate::configuration::GameSettings;
use crate::dice::Dice;
use crate::error::GameError;
use crate::ids;
use crate::ledger::Ledger;
use crate::model::{GameSession, RollSession, SessionStatus, Transaction, User};
use crate::store::Store;

/// What a call to [`DiceGame::roll`] produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RollOutcome {
    /// A roll session was opened; `remaining` is what the second die must show.
    /// `winnable` is false when no face of the die equals `remaining`.
    FirstRoll {
        rolled: u32,
        remaining: i64,
        winnable: bool,
    },
    Won { rolled: u32, amount: i64 },
    Lost { rolled: u32 },
}

impl RollOutcome {
    pub fn message(&self) -> String {
        match self {
            RollOutcome::FirstRoll {
                rolled,
                remaining,
                winnable: true,
            } => format!("Congrats, you rolled {rolled}, to win you have to roll {remaining}"),
            RollOutcome::FirstRoll { rolled, .. } => format!(
                "You rolled {rolled}, this round can no longer be won, roll again to close it"
            ),
            RollOutcome::Won { amount, .. } => {
                format!("Hurray, you have won {amount}, do you want to try again")
            }
            RollOutcome::Lost { rolled } => {
                format!("Oops, you did not win, you rolled {rolled}, but you can try again")
            }
        }
    }
}

pub struct DiceGame {
    store: Store,
    rules: GameSettings,
    dice: Arc<dyn Dice>,
}

impl DiceGame {
    pub fn new(store: Store, rules: GameSettings, dice: Arc<dyn Dice>) -> Self {
        Self { store, rules, dice }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    #[tracing::instrument(name = "Registering a new player", skip(self))]
    pub fn register(&self, first_name: &str, last_name: &str) -> Result<User, GameError> {
        let (first_name, last_name) = (first_name.trim(), last_name.trim());
        if first_name.is_empty() || last_name.is_empty() {
            return Err(GameError::Validation(
                "Please complete both first and last name".to_string(),
            ));
        }

        let user = User {
            user_id: ids::user_id(first_name, last_name),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            wallet: 0,
            asset: self.rules.asset.clone(),
        };
        self.store
            .update(|unit| Ledger::new(unit).put_user(&user))?;

        tracing::info!(user_id = %user.user_id, "Player registered");
        Ok(user)
    }

    #[tracing::instrument(name = "Starting a game session", skip(self))]
    pub fn start_game(&self, user_id: &str) -> Result<GameSession, GameError> {
        let cost = self.rules.start_cost;

        let session = self.store.update(|unit| -> Result<_, GameError> {
            let ledger = Ledger::new(unit);
            let mut user = load_user(&ledger, user_id)?;
            if user.wallet < cost {
                return Err(GameError::InsufficientFunds {
                    action: "start the game",
                    required: cost,
                    balance: user.wallet,
                });
            }
            if ledger.active_game_session(user_id)?.is_some() {
                return Err(GameError::AlreadyInSession);
            }

            let session = GameSession {
                session_id: ids::session_id(),
                user_id: user_id.to_string(),
                status: SessionStatus::InProgress,
            };
            user.wallet -= cost;

            ledger.append_transaction(&Transaction::debit(user_id, cost, "Started new game"))?;
            ledger.put_user(&user)?;
            ledger.put_game_session(&session)?;
            Ok(session)
        })?;

        tracing::info!(session_id = %session.session_id, "Game session started");
        Ok(session)
    }

    /// First call opens a paid roll session, the next one completes it and
    /// settles the winnings in the same unit of work.
    #[tracing::instrument(name = "Rolling the dice", skip(self))]
    pub fn roll(&self, user_id: &str) -> Result<RollOutcome, GameError> {
        let outcome = self.store.update(|unit| -> Result<_, GameError> {
            let ledger = Ledger::new(unit);
            let mut user = load_user(&ledger, user_id)?;
            let game = ledger
                .active_game_session(user_id)?
                .ok_or(GameError::NoActiveGame)?;

            match ledger.active_roll_session(&game.session_id)? {
                None => self.first_roll(&ledger, &mut user, &game),
                Some(pending) => self.second_roll(&ledger, &mut user, pending),
            }
        })?;

        tracing::info!(?outcome, "Dice rolled");
        Ok(outcome)
    }

    fn first_roll(
        &self,
        ledger: &Ledger<'_, '_>,
        user: &mut User,
        game: &GameSession,
    ) -> Result<RollOutcome, GameError> {
        let cost = self.rules.first_roll_cost;
        if user.wallet < cost {
            return Err(GameError::InsufficientFunds {
                action: "roll dice",
                required: cost,
                balance: user.wallet,
            });
        }

        let roll = RollSession {
            roll_id: ids::roll_id(),
            game_session_id: game.session_id.clone(),
            user_id: user.user_id.clone(),
            target_total: self.dice.target(),
            first_roll: self.dice.roll(),
            second_roll: None,
            status: SessionStatus::InProgress,
        };
        user.wallet -= cost;

        ledger.append_transaction(&Transaction::debit(&user.user_id, cost, "Rolled dice"))?;
        ledger.put_user(user)?;
        ledger.put_roll_session(&roll)?;

        let remaining = i64::from(roll.target_total) - i64::from(roll.first_roll);
        let faces = i64::from(self.rules.dice.roll_min)..=i64::from(self.rules.dice.roll_max);
        Ok(RollOutcome::FirstRoll {
            rolled: roll.first_roll,
            remaining,
            winnable: faces.contains(&remaining),
        })
    }

    fn second_roll(
        &self,
        ledger: &Ledger<'_, '_>,
        user: &mut User,
        mut roll: RollSession,
    ) -> Result<RollOutcome, GameError> {
        let rolled = self.dice.roll();
        roll.second_roll = Some(rolled);
        roll.status = SessionStatus::Completed;
        ledger.put_roll_session(&roll)?;

        if !roll.is_won() {
            return Ok(RollOutcome::Lost { rolled });
        }

        let amount = self.rules.winning_amount;
        user.wallet += amount;
        ledger.append_transaction(&Transaction::credit(&user.user_id, amount, "Winnings"))?;
        ledger.put_user(user)?;
        Ok(RollOutcome::Won { rolled, amount })
    }

    /// Completes every open game and roll session of the player. Ending with
    /// nothing open is not an error.
    #[tracing::instrument(name = "Ending game sessions", skip(self))]
    pub fn end_game(&self, user_id: &str) -> Result<(), GameError> {
        let (games, rolls) = self.store.update(|unit| -> Result<_, GameError> {
            let ledger = Ledger::new(unit);
            load_user(&ledger, user_id)?;

            let games = ledger.active_game_sessions(user_id)?;
            for mut session in games.iter().cloned() {
                session.status = SessionStatus::Completed;
                ledger.put_game_session(&session)?;
            }

            let rolls = ledger.active_roll_sessions_of(user_id)?;
            for mut roll in rolls.iter().cloned() {
                roll.status = SessionStatus::Completed;
                ledger.put_roll_session(&roll)?;
            }
            Ok((games.len(), rolls.len()))
        })?;

        tracing::info!(games, rolls, "Game sessions ended");
        Ok(())
    }

    #[tracing::instrument(name = "Checking for an active game", skip(self))]
    pub fn active_game(&self, user_id: &str) -> Result<GameSession, GameError> {
        self.store.view(|unit| {
            let ledger = Ledger::new(unit);
            load_user(&ledger, user_id)?;
            ledger
                .active_game_session(user_id)?
                .ok_or(GameError::NoActiveGame)
        })
    }

    #[tracing::instrument(name = "Checking for an active roll", skip(self))]
    pub fn active_roll(&self, user_id: &str) -> Result<RollSession, GameError> {
        self.store.view(|unit| {
            let ledger = Ledger::new(unit);
            load_user(&ledger, user_id)?;
            let game = ledger
                .active_game_session(user_id)?
                .ok_or(GameError::NoActiveGame)?;
            ledger
                .active_roll_session(&game.session_id)?
                .ok_or(GameError::NoActiveRoll)
        })
    }

    /// Tops the wallet up by the fund amount, only while it is at or below
    /// the funding cap.
    #[tracing::instrument(name = "Funding a wallet", skip(self))]
    pub fn fund_wallet(&self, user_id: &str) -> Result<User, GameError> {
        let (amount, cap) = (self.rules.fund_amount, self.rules.funding_cap);

        let user = self.store.update(|unit| -> Result<_, GameError> {
            let ledger = Ledger::new(unit);
            let mut user = load_user(&ledger, user_id)?;
            if user.wallet > cap {
                return Err(GameError::FundingNotAllowed {
                    cap,
                    balance: user.wallet,
                });
            }

            user.wallet += amount;
            ledger.append_transaction(&Transaction::credit(user_id, amount, "Wallet funding"))?;
            ledger.put_user(&user)?;
            Ok(user)
        })?;

        tracing::info!(wallet = user.wallet, "Wallet funded");
        Ok(user)
    }

    #[tracing::instrument(name = "Reading wallet balance", skip(self))]
    pub fn wallet_balance(&self, user_id: &str) -> Result<User, GameError> {
        self.store
            .view(|unit| load_user(&Ledger::new(unit), user_id))
    }

    #[tracing::instrument(name = "Listing transactions", skip(self))]
    pub fn transactions(&self, user_id: &str) -> Result<Vec<Transaction>, GameError> {
        self.store.view(|unit| {
            let ledger = Ledger::new(unit);
            load_user(&ledger, user_id)?;
            Ok(ledger.transactions_for(user_id)?)
        })
    }
}

fn load_user(ledger: &Ledger<'_, '_>, user_id: &str) -> Result<User, GameError> {
    ledger
        .user(user_id)?
        .ok_or_else(|| GameError::not_found(user_id))
}
