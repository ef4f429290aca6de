use std::net::TcpListener;

use actix_web::{dev::Server, web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use crate::error::GameError;
use crate::game::DiceGame;

pub mod configuration;
pub mod dice;
pub mod error;
pub mod game;
pub mod ids;
pub mod ledger;
pub mod model;
pub mod routes;
pub mod store;
pub mod telemetry;

pub async fn run(listener: TcpListener, game: DiceGame) -> Result<Server, std::io::Error> {
    let game = web::Data::new(game);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(game.clone())
            .app_data(web::FormConfig::default().error_handler(|err, _| {
                GameError::Validation(format!("Unable to parse form: {err}")).into()
            }))
            .service(routes::health_check)
            .service(routes::register)
            .service(routes::fund_wallet)
            .service(routes::get_wallet_balance)
            .service(routes::start_game)
            .service(routes::roll_dice)
            .service(routes::end_game)
            .service(routes::check_active_game)
            .service(routes::check_active_roll)
            .service(routes::transactions)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
