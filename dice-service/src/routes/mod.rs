use actix_web::web::{self, Either};
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::game::DiceGame;
use crate::model::ApiResponse;
use crate::store::StoreError;

mod game;
mod health;
mod history;
mod wallet;

pub use game::{check_active_game, check_active_roll, end_game, roll_dice, start_game};
pub use health::health_check;
pub use history::transactions;
pub use wallet::{fund_wallet, get_wallet_balance, register};

/// Form or query carrying the acting player.
#[derive(Debug, Deserialize)]
pub struct UserRequest {
    #[serde(rename = "userId", default)]
    user_id: Option<String>,
}

impl UserRequest {
    fn user_id(self) -> Result<String, GameError> {
        self.user_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GameError::Validation("Please enter User ID".to_string()))
    }
}

/// Read-only actions accept the player either as a form body or in the
/// query string.
type UserInput = Either<web::Form<UserRequest>, web::Query<UserRequest>>;

fn user_id_from(input: UserInput) -> Result<String, GameError> {
    match input {
        Either::Left(form) => form.into_inner().user_id(),
        Either::Right(query) => query.into_inner().user_id(),
    }
}

/// Store work is synchronous, so it runs on the blocking pool.
async fn blocking<T, F>(game: web::Data<DiceGame>, operation: F) -> Result<T, GameError>
where
    F: FnOnce(&DiceGame) -> Result<T, GameError> + Send + 'static,
    T: Send + 'static,
{
    web::block(move || operation(game.get_ref()))
        .await
        .map_err(|_| GameError::Storage(StoreError::WorkerUnavailable))?
}

fn ok<T: Serialize>(message: impl Into<String>, data: Option<T>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(message, data))
}
