#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use dice_service::{
    configuration::{get_configuration, GameSettings},
    dice::{Dice, SeededDice},
    game::DiceGame,
    ledger::Ledger,
    store::Store,
    telemetry::{get_subscriber, init_subscriber},
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber).expect("Failed to initialise telemetry.");
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber).expect("Failed to initialise telemetry.");
    };
});

/// Dice that replay fixed targets and rolls in order.
pub struct ScriptedDice {
    targets: Mutex<VecDeque<u32>>,
    rolls: Mutex<VecDeque<u32>>,
}

impl ScriptedDice {
    pub fn new(targets: &[u32], rolls: &[u32]) -> Arc<Self> {
        Arc::new(Self {
            targets: Mutex::new(targets.iter().copied().collect()),
            rolls: Mutex::new(rolls.iter().copied().collect()),
        })
    }
}

impl Dice for ScriptedDice {
    fn roll(&self) -> u32 {
        self.rolls
            .lock()
            .unwrap()
            .pop_front()
            .expect("No scripted roll left.")
    }

    fn target(&self) -> u32 {
        self.targets
            .lock()
            .unwrap()
            .pop_front()
            .expect("No scripted target left.")
    }
}

pub fn random_dice() -> Arc<dyn Dice> {
    Arc::new(SeededDice::new(
        GameSettings::default().dice.bounds(),
        Some(7),
    ))
}

/// A game over a fresh database; keep the directory alive for the test.
pub fn test_game(dice: Arc<dyn Dice>) -> (TempDir, DiceGame) {
    Lazy::force(&TRACING);

    let dir = tempfile::tempdir().expect("Failed to create temp dir.");
    let store = Store::open(dir.path().join("game.db")).expect("Failed to open store.");
    let game = DiceGame::new(store, GameSettings::default(), dice);
    (dir, game)
}

pub fn set_wallet(game: &DiceGame, user_id: &str, wallet: i64) {
    game.store()
        .update(|unit| {
            let ledger = Ledger::new(unit);
            let mut user = ledger.user(user_id)?.expect("User should exist.");
            user.wallet = wallet;
            ledger.put_user(&user)
        })
        .expect("Failed to set wallet.");
}

pub fn funded_player(game: &DiceGame) -> String {
    let user = game.register("Ada", "Lovelace").expect("Register failed.");
    game.fund_wallet(&user.user_id).expect("Funding failed.");
    user.user_id
}

pub struct TestApp {
    pub address: String,
    pub db_dir: TempDir,
}

pub async fn spawn_app(dice: Arc<dyn Dice>) -> TestApp {
    Lazy::force(&TRACING);

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let mut configuration = get_configuration().expect("Failed to read configuration.");
    let db_dir = tempfile::tempdir().expect("Failed to create temp dir.");
    configuration.database.path = db_dir.path().join("api.db");

    let store = Store::open(&configuration.database.path).expect("Failed to open store.");
    let game = DiceGame::new(store, configuration.game.clone(), dice);

    let server = dice_service::run(listener, game)
        .await
        .expect("Server initialization failed.");

    tokio::spawn(server);

    TestApp { address, db_dir }
}
