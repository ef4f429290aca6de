use actix_web::{route, web, HttpResponse};

use crate::error::GameError;
use crate::game::DiceGame;

use super::{blocking, ok, user_id_from, UserInput};

#[tracing::instrument(name = "Getting transactions for /transactions request", skip(game, input))]
#[route("/transactions", method = "GET", method = "POST")]
pub async fn transactions(
    game: web::Data<DiceGame>,
    input: UserInput,
) -> Result<HttpResponse, GameError> {
    let user_id = user_id_from(input)?;
    let transactions = blocking(game, move |game| game.transactions(&user_id)).await?;

    let message = format!("{} transactions found", transactions.len());
    Ok(ok(message, Some(transactions)))
}
