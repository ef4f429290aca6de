use std::path::PathBuf;

use config::{Config, ConfigError};
use serde::Deserialize;

use crate::dice::DiceBounds;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub game: GameSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9000,
        }
    }
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("dice.db"),
        }
    }
}

/// Prices, payouts and wallet rules of the game. Amounts are in `asset` units.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub start_cost: i64,
    pub first_roll_cost: i64,
    pub winning_amount: i64,
    pub fund_amount: i64,
    /// Funding is refused while the wallet holds more than this.
    pub funding_cap: i64,
    pub asset: String,
    pub dice: DiceSettings,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            start_cost: 20,
            first_roll_cost: 5,
            winning_amount: 20,
            fund_amount: 155,
            funding_cap: 35,
            asset: "sat".to_string(),
            dice: DiceSettings::default(),
        }
    }
}

/// Inclusive dice bounds. `seed` pins the process random source, otherwise it
/// is seeded from OS entropy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiceSettings {
    pub roll_min: u32,
    pub roll_max: u32,
    pub target_min: u32,
    pub target_max: u32,
    pub seed: Option<u64>,
}

impl Default for DiceSettings {
    fn default() -> Self {
        Self {
            roll_min: 1,
            roll_max: 6,
            target_min: 2,
            target_max: 12,
            seed: None,
        }
    }
}

impl DiceSettings {
    pub fn bounds(&self) -> DiceBounds {
        DiceBounds {
            roll: self.roll_min..=self.roll_max,
            target: self.target_min..=self.target_max,
        }
    }

    /// Every target must be reachable as the sum of two rolls.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| Err(ConfigError::Message(format!("game.dice: {reason}")));

        if self.roll_min == 0 {
            return invalid("roll_min must be at least 1".to_string());
        }
        if self.roll_min > self.roll_max {
            return invalid(format!(
                "roll_min ({}) exceeds roll_max ({})",
                self.roll_min, self.roll_max
            ));
        }
        if self.target_min > self.target_max {
            return invalid(format!(
                "target_min ({}) exceeds target_max ({})",
                self.target_min, self.target_max
            ));
        }
        if self.target_min < 2 * self.roll_min || self.target_max > 2 * self.roll_max {
            return invalid(format!(
                "targets {}..={} are not all reachable with two rolls of {}..={}",
                self.target_min, self.target_max, self.roll_min, self.roll_max
            ));
        }
        Ok(())
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let game = &self.game;
        let amounts = [
            ("start_cost", game.start_cost),
            ("first_roll_cost", game.first_roll_cost),
            ("winning_amount", game.winning_amount),
            ("fund_amount", game.fund_amount),
        ];
        if let Some((name, _)) = amounts.iter().find(|(_, amount)| *amount <= 0) {
            return Err(ConfigError::Message(format!("game.{name} must be positive")));
        }
        game.dice.validate()
    }
}

/// Reads `configuration.(yaml|toml|json)` when present, then `APP_*`
/// environment overrides, e.g. `APP_APPLICATION__PORT=9001`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings: Settings = settings.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}
