use actix_web::{post, route, web, HttpResponse};

use crate::error::GameError;
use crate::game::DiceGame;

use super::{blocking, ok, user_id_from, UserInput, UserRequest};

#[tracing::instrument(name = "Starting a game for /start-game request", skip(game))]
#[post("/start-game")]
pub async fn start_game(
    game: web::Data<DiceGame>,
    form: web::Form<UserRequest>,
) -> Result<HttpResponse, GameError> {
    let user_id = form.into_inner().user_id()?;
    let session = blocking(game, move |game| game.start_game(&user_id)).await?;

    Ok(ok(
        "Congrats your game session started, you can now roll",
        Some(session),
    ))
}

#[tracing::instrument(name = "Rolling dice for /roll-dice request", skip(game))]
#[post("/roll-dice")]
pub async fn roll_dice(
    game: web::Data<DiceGame>,
    form: web::Form<UserRequest>,
) -> Result<HttpResponse, GameError> {
    let user_id = form.into_inner().user_id()?;
    let outcome = blocking(game, move |game| game.roll(&user_id)).await?;

    Ok(ok(outcome.message(), Some(outcome)))
}

#[tracing::instrument(name = "Ending games for /end-game request", skip(game))]
#[post("/end-game")]
pub async fn end_game(
    game: web::Data<DiceGame>,
    form: web::Form<UserRequest>,
) -> Result<HttpResponse, GameError> {
    let user_id = form.into_inner().user_id()?;
    blocking(game, move |game| game.end_game(&user_id)).await?;

    Ok(ok(
        "Successfully ended all games, we hope to see you again",
        None::<()>,
    ))
}

#[tracing::instrument(
    name = "Checking active game for /check-active-game request",
    skip(game, input)
)]
#[route("/check-active-game", method = "GET", method = "POST")]
pub async fn check_active_game(
    game: web::Data<DiceGame>,
    input: UserInput,
) -> Result<HttpResponse, GameError> {
    let user_id = user_id_from(input)?;
    let session = blocking(game, move |game| game.active_game(&user_id)).await?;

    Ok(ok("You have a game in progress", Some(session)))
}

#[tracing::instrument(
    name = "Checking active roll for /check-active-roll request",
    skip(game, input)
)]
#[route("/check-active-roll", method = "GET", method = "POST")]
pub async fn check_active_roll(
    game: web::Data<DiceGame>,
    input: UserInput,
) -> Result<HttpResponse, GameError> {
    let user_id = user_id_from(input)?;
    let roll = blocking(game, move |game| game.active_roll(&user_id)).await?;

    let message = format!(
        "You rolled {}, roll again to finish this round",
        roll.first_roll
    );
    Ok(ok(message, Some(roll)))
}
