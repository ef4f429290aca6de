mod common;

use common::{random_dice, spawn_app};

#[actix_web::test]
async fn servers_is_working() {
    // Given
    let app = spawn_app(random_dice()).await;
    let client = reqwest::Client::new();

    // When
    let response = client
        .get(&format!("{}/health_check", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    // Then
    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}
