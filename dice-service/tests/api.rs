mod common;

use common::{random_dice, spawn_app, ScriptedDice, TestApp};
use dice_service::model::ApiResponse;
use serde_json::Value;

async fn post_form(app: &TestApp, path: &str, form: &[(&str, &str)]) -> (u16, ApiResponse<Value>) {
    let response = reqwest::Client::new()
        .post(&format!("{}{}", &app.address, path))
        .form(form)
        .send()
        .await
        .expect("Failed to execute request.");
    let status = response.status().as_u16();
    let body = response
        .json()
        .await
        .expect("Failed to deserialize response");
    (status, body)
}

async fn get_query(app: &TestApp, path: &str, user_id: &str) -> (u16, ApiResponse<Value>) {
    let response = reqwest::Client::new()
        .get(&format!("{}{}", &app.address, path))
        .query(&[("userId", user_id)])
        .send()
        .await
        .expect("Failed to execute request.");
    let status = response.status().as_u16();
    let body = response
        .json()
        .await
        .expect("Failed to deserialize response");
    (status, body)
}

async fn register(app: &TestApp) -> String {
    let (_, body) = post_form(
        app,
        "/register",
        &[("first_name", "Ada"), ("last_name", "Lovelace")],
    )
    .await;
    body.data.expect("Missing user")["userID"]
        .as_str()
        .expect("Missing user id")
        .to_string()
}

#[actix_web::test]
async fn register_returns_a_player_with_an_empty_wallet() {
    // Given
    let app = spawn_app(random_dice()).await;

    // When
    let (status, body) = post_form(
        &app,
        "/register",
        &[("first_name", "Ada"), ("last_name", "Lovelace")],
    )
    .await;

    // Then
    assert_eq!(200, status);
    assert!(body.status);
    let user = body.data.expect("Missing user");
    assert_eq!(user["wallet"], 0);
    assert_eq!(user["asset"], "sat");
    assert_eq!(user["firstName"], "Ada");
    assert!(user["userID"].as_str().unwrap().starts_with("ada-lovelace-"));
}

#[actix_web::test]
async fn register_without_names_returns_a_failure_envelope() {
    let app = spawn_app(random_dice()).await;

    let (status, body) = post_form(&app, "/register", &[("first_name", "Ada")]).await;

    assert_eq!(400, status);
    assert!(!body.status);
    assert_eq!(body.message, "Please complete both first and last name");
    assert!(body.data.is_none());
}

#[actix_web::test]
async fn actions_without_a_user_id_are_rejected() {
    let app = spawn_app(random_dice()).await;

    for path in ["/start-game", "/roll-dice", "/end-game", "/fund-wallet"] {
        let (status, body) = post_form(&app, path, &[]).await;
        assert_eq!(400, status, "{path}");
        assert!(!body.status);
        assert_eq!(body.message, "Please enter User ID");
    }
}

#[actix_web::test]
async fn unknown_players_get_not_found() {
    let app = spawn_app(random_dice()).await;

    let (status, body) = post_form(&app, "/start-game", &[("userId", "ghost")]).await;
    assert_eq!(404, status);
    assert!(!body.status);

    let (status, body) = get_query(&app, "/transactions", "ghost").await;
    assert_eq!(404, status);
    assert_eq!(body.message, "user does not exist, kindly create user account");
}

#[actix_web::test]
async fn a_winning_round_over_http() {
    // Given
    let app = spawn_app(ScriptedDice::new(&[7], &[3, 4])).await;
    let user_id = register(&app).await;
    let player = [("userId", user_id.as_str())];

    // When
    let (status, funded) = post_form(&app, "/fund-wallet", &player).await;
    assert_eq!(200, status);
    assert_eq!(funded.data.unwrap()["wallet"], 155);

    let (status, started) = post_form(&app, "/start-game", &player).await;
    assert_eq!(200, status);
    let session = started.data.unwrap();
    assert_eq!(session["gameStatus"], "IN_PROGRESS");

    let (_, first) = post_form(&app, "/roll-dice", &player).await;
    let first = first.data.unwrap();
    assert_eq!(first["outcome"], "first_roll");
    assert_eq!(first["rolled"], 3);
    assert_eq!(first["remaining"], 4);
    assert_eq!(first["winnable"], true);

    let (_, pending) = get_query(&app, "/check-active-roll", &user_id).await;
    assert_eq!(pending.data.unwrap()["targetTotal"], 7);

    let (_, second) = post_form(&app, "/roll-dice", &player).await;

    // Then
    assert!(second.status);
    let second = second.data.unwrap();
    assert_eq!(second["outcome"], "won");
    assert_eq!(second["amount"], 20);

    let (_, balance) = get_query(&app, "/get-wallet-balance", &user_id).await;
    assert_eq!(balance.data.unwrap()["wallet"], 150);

    let (_, history) = post_form(&app, "/transactions", &player).await;
    let history = history.data.unwrap();
    let entries: Vec<(String, i64)> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|t| {
            (
                t["type"].as_str().unwrap().to_string(),
                t["amount"].as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        entries,
        vec![
            ("CREDIT".to_string(), 155),
            ("DEBIT".to_string(), 20),
            ("DEBIT".to_string(), 5),
            ("CREDIT".to_string(), 20),
        ]
    );
}

#[actix_web::test]
async fn ending_a_game_clears_the_active_session() {
    // Given
    let app = spawn_app(random_dice()).await;
    let user_id = register(&app).await;
    let player = [("userId", user_id.as_str())];
    post_form(&app, "/fund-wallet", &player).await;
    post_form(&app, "/start-game", &player).await;

    let (status, active) = get_query(&app, "/check-active-game", &user_id).await;
    assert_eq!(200, status);
    assert!(active.status);

    // When
    let (status, ended) = post_form(&app, "/end-game", &player).await;

    // Then
    assert_eq!(200, status);
    assert!(ended.status);
    assert!(ended.data.is_none());

    let (status, active) = post_form(&app, "/check-active-game", &player).await;
    assert_eq!(409, status);
    assert!(!active.status);
    assert_eq!(
        active.message,
        "you have no active game in progress, please start a new game"
    );
}

#[actix_web::test]
async fn starting_twice_conflicts() {
    let app = spawn_app(random_dice()).await;
    let user_id = register(&app).await;
    let player = [("userId", user_id.as_str())];
    post_form(&app, "/fund-wallet", &player).await;
    post_form(&app, "/start-game", &player).await;

    let (status, body) = post_form(&app, "/start-game", &player).await;

    assert_eq!(409, status);
    assert!(!body.status);
}

#[actix_web::test]
async fn starting_without_funds_is_refused() {
    let app = spawn_app(random_dice()).await;
    let user_id = register(&app).await;

    let (status, body) = post_form(&app, "/start-game", &[("userId", user_id.as_str())]).await;

    assert_eq!(402, status);
    assert_eq!(
        body.message,
        "you do not have enough funds to start the game, please fund your account"
    );
}
