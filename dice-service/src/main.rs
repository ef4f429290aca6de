use std::io;
use std::net::TcpListener;
use std::sync::Arc;

use dice_service::configuration::get_configuration;
use dice_service::dice::SeededDice;
use dice_service::game::DiceGame;
use dice_service::run;
use dice_service::store::Store;
use dice_service::telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> io::Result<()> {
    let subscriber = get_subscriber("dice-service".into(), "info".into(), io::stdout);
    init_subscriber(subscriber).map_err(io::Error::other)?;

    let configuration = get_configuration().map_err(io::Error::other)?;
    let store = Store::open(&configuration.database.path).map_err(io::Error::other)?;
    let dice_settings = &configuration.game.dice;
    let dice = SeededDice::new(dice_settings.bounds(), dice_settings.seed);
    let game = DiceGame::new(store, configuration.game.clone(), Arc::new(dice));

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!(%address, database = %game.store().path().display(), "Dice service listening");

    let server = run(listener, game).await?;
    server.await
}
