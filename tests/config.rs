use flakymock::{Configuration, ConfigurationUpdate, MockServer, NetworkFault, ResponseEnvelope};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

async fn get_config(mock_server: &MockServer) -> Value {
    reqwest::get(format!("{}/config", mock_server.uri()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn post_config(mock_server: &MockServer, body: Value) -> reqwest::Response {
    Client::new()
        .post(format!("{}/config", mock_server.uri()))
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn default_configuration_is_exposed() {
    // Arrange
    let mock_server = MockServer::start().await;

    // Act
    let config = get_config(&mock_server).await;

    // Assert
    assert_eq!(
        config,
        json!({"statusCode": 200, "delay": 0, "networkError": "none"})
    );
}

#[tokio::test]
async fn partial_update_only_changes_the_given_fields() {
    // Arrange
    let mock_server = MockServer::start().await;

    // Act
    let response = post_config(&mock_server, json!({"statusCode": 404})).await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "message": "Configuration updated",
            "config": {"statusCode": 404, "delay": 0, "networkError": "none"}
        })
    );
    assert_eq!(
        get_config(&mock_server).await,
        json!({"statusCode": 404, "delay": 0, "networkError": "none"})
    );

    let response = reqwest::get(format!("{}/api", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let envelope: ResponseEnvelope = response.json().await.unwrap();
    assert_eq!(envelope.status, "error");
    assert_eq!(envelope.code, 404);
}

#[tokio::test]
async fn updates_from_http_and_from_the_store_are_the_same_thing() {
    // Arrange
    let mock_server = MockServer::start().await;

    // Act
    post_config(&mock_server, json!({"delay": 25, "networkError": "timeout"})).await;
    mock_server
        .configuration()
        .update(ConfigurationUpdate::default().status_code(500));

    // Assert
    assert_eq!(
        mock_server.configuration().get(),
        Configuration {
            status_code: 500,
            delay_millis: 25,
            network_fault: NetworkFault::Timeout,
        }
    );
    assert_eq!(
        get_config(&mock_server).await,
        json!({"statusCode": 500, "delay": 25, "networkError": "timeout"})
    );
}

#[tokio::test]
async fn the_same_update_twice_yields_the_same_configuration() {
    // Arrange
    let mock_server = MockServer::start().await;
    let update = json!({"statusCode": 503, "delay": 10, "networkError": "reset"});

    // Act
    let first: Value = post_config(&mock_server, update.clone())
        .await
        .json()
        .await
        .unwrap();
    let second: Value = post_config(&mock_server, update).await.json().await.unwrap();

    // Assert
    assert_eq!(first, second);
    assert_eq!(get_config(&mock_server).await, second["config"]);
}

#[tokio::test]
async fn unknown_network_error_is_rejected_and_nothing_changes() {
    // Arrange
    let mock_server = MockServer::start().await;
    post_config(&mock_server, json!({"statusCode": 418})).await;
    let before = get_config(&mock_server).await;

    // Act
    let response = post_config(
        &mock_server,
        json!({"statusCode": 500, "networkError": "garbage-value"}),
    )
    .await;

    // Assert
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "InvalidConfiguration");
    assert_eq!(body["field"], "networkError");
    assert_eq!(get_config(&mock_server).await, before);
}

#[tokio::test]
async fn negative_or_non_numeric_delay_is_rejected() {
    // Arrange
    let mock_server = MockServer::start().await;

    for delay in [json!(-100), json!("soon"), json!(1.5)] {
        // Act
        let response = post_config(&mock_server, json!({ "delay": delay })).await;

        // Assert
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["field"], "delay");
    }
    assert_eq!(mock_server.configuration().get(), Configuration::default());
}

#[tokio::test]
async fn numeric_strings_are_accepted() {
    // Arrange
    let mock_server = MockServer::start().await;

    // Act
    let response = post_config(&mock_server, json!({"statusCode": "500", "delay": "100"})).await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        get_config(&mock_server).await,
        json!({"statusCode": 500, "delay": 100, "networkError": "none"})
    );
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    // Arrange
    let mock_server = MockServer::start().await;

    // Act
    let response = Client::new()
        .post(format!("{}/config", mock_server.uri()))
        .header("Content-Type", "application/json")
        .body("{\"statusCode\": ")
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["field"], "body");
}

#[tokio::test]
async fn empty_body_leaves_the_configuration_as_is() {
    // Arrange
    let mock_server = MockServer::start().await;

    // Act
    let response = Client::new()
        .post(format!("{}/config", mock_server.uri()))
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(mock_server.configuration().get(), Configuration::default());
}

#[tokio::test]
async fn preflight_requests_are_answered() {
    // Arrange
    let mock_server = MockServer::start().await;

    // Act
    let response = Client::new()
        .request(
            reqwest::Method::OPTIONS,
            format!("{}/config", mock_server.uri()),
        )
        .header("Origin", "http://localhost:8080")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(
        response.headers()["access-control-allow-headers"],
        "Content-Type"
    );
}

#[tokio::test]
async fn other_methods_on_config_are_not_found() {
    // Arrange
    let mock_server = MockServer::start().await;

    // Act
    let response = Client::new()
        .delete(format!("{}/config", mock_server.uri()))
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn servers_do_not_share_configuration() {
    // Arrange
    let mock_server_one = MockServer::start().await;
    let mock_server_two = MockServer::start().await;

    // Act
    post_config(&mock_server_one, json!({"statusCode": 500})).await;

    // Assert
    assert_eq!(mock_server_one.configuration().get().status_code, 500);
    assert_eq!(mock_server_two.configuration().get().status_code, 200);
}
