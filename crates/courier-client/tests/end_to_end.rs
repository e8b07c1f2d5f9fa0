//! Client against a real server on a loopback port.

use courier_api::{build_router, AppState};
use courier_client::{ClientError, ClientSync, RestClient, SyncOutcome};
use courier_common::config::{
    AppConfig, AuthConfig, CryptoConfig, DatabaseConfig, LimitsConfig, ServerConfig,
};
use courier_common::crypto::private_key_from_pem;
use courier_db::Database;

async fn serve() -> String {
    let config = AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: "end-to-end-test-secret-0123456789abcdef".into(),
            access_token_ttl_secs: 300,
            retain_private_keys: false,
        },
        crypto: CryptoConfig { rsa_bits: 2048 },
        limits: LimitsConfig {
            max_payload_bytes: 1_048_576,
        },
    };

    let db = Database::in_memory().await.unwrap();
    let router = build_router(AppState::from_config(db, &config).unwrap());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn register_send_and_sync() {
    let base = serve().await;

    let mut alice = RestClient::new(Some(&base)).unwrap();
    let mut bob = RestClient::new(Some(&base)).unwrap();
    let alice_reg = alice
        .register("alice@example.test", "555-0100", "alice password")
        .await
        .unwrap();
    let bob_reg = bob
        .register("bob@example.test", "555-0199", "bob password")
        .await
        .unwrap();

    alice.login(&alice_reg.code, "alice password").await.unwrap();
    let login = bob.login(&bob_reg.code, "bob password").await.unwrap();
    assert!(login.user.private_key.is_none());

    alice.send_message(&bob_reg.code, "hello").await.unwrap();

    let err = alice.send_message("zzzz9999", "nobody home").await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 404, .. }));

    let key = private_key_from_pem(&bob_reg.private_key).unwrap();
    let sync = ClientSync::new(bob, key);

    // Restore sees the message; the drain returns it too but it is not duplicated.
    assert_eq!(sync.restore_history().await.unwrap(), SyncOutcome::Applied(1));
    assert_eq!(sync.sync_pending().await.unwrap(), SyncOutcome::Applied(0));

    let messages = sync.messages().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].from, alice_reg.code);
    assert_eq!(messages[0].body.to_string(), "hello");

    assert!(sync.source().fetch_messages().await.unwrap().is_empty());
    assert_eq!(sync.source().message_history().await.unwrap().len(), 1);
}

#[tokio::test]
async fn requests_without_login_are_rejected() {
    let base = serve().await;
    let rest = RestClient::new(Some(&base)).unwrap();

    let err = rest.fetch_messages().await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 401, .. }));

    let err = rest.public_key("zzzz9999").await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "User not found");
        }
        other => panic!("unexpected error: {other}"),
    }
}
