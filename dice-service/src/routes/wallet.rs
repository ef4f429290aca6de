use actix_web::{post, route, web, HttpResponse};
use serde::Deserialize;

use crate::error::GameError;
use crate::game::DiceGame;

use super::{blocking, ok, user_id_from, UserInput, UserRequest};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
}

#[tracing::instrument(name = "Registering a player for /register request", skip(game))]
#[post("/register")]
pub async fn register(
    game: web::Data<DiceGame>,
    form: web::Form<RegisterRequest>,
) -> Result<HttpResponse, GameError> {
    let RegisterRequest {
        first_name,
        last_name,
    } = form.into_inner();
    let user = blocking(game, move |game| game.register(&first_name, &last_name)).await?;

    Ok(ok("New user created, you can now start games", Some(user)))
}

#[tracing::instrument(name = "Funding a wallet for /fund-wallet request", skip(game))]
#[post("/fund-wallet")]
pub async fn fund_wallet(
    game: web::Data<DiceGame>,
    form: web::Form<UserRequest>,
) -> Result<HttpResponse, GameError> {
    let user_id = form.into_inner().user_id()?;
    let user = blocking(game, move |game| game.fund_wallet(&user_id)).await?;

    Ok(ok("Wallet funding successful", Some(user)))
}

#[tracing::instrument(
    name = "Reading a wallet for /get-wallet-balance request",
    skip(game, input)
)]
#[route("/get-wallet-balance", method = "GET", method = "POST")]
pub async fn get_wallet_balance(
    game: web::Data<DiceGame>,
    input: UserInput,
) -> Result<HttpResponse, GameError> {
    let user_id = user_id_from(input)?;
    let user = blocking(game, move |game| game.wallet_balance(&user_id)).await?;

    let message = format!("Your wallet balance is {} {}", user.wallet, user.asset);
    Ok(ok(message, Some(user)))
}
