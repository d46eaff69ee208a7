use std::net::SocketAddr;
use std::path::Path;

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;

use minibox::client::ApiClient;
use minibox::client::config::{ClientConfig, FunctionIds};
use minibox::client::error::ClientError;
use minibox::client::messages::ComposeMessage;
use minibox::client::session::{Session, TokenStore};
use minibox::client::storage::AttachmentUpload;
use minibox::config::{Config, FunctionRoutes};
use minibox::db::{auth_db, schema, store};
use minibox::routes;
use minibox::state::AppState;

struct TestServer {
    addr: SocketAddr,
    pool: SqlitePool,
    _data_dir: TempDir,
}

async fn spawn_server(max_upload_size_bytes: u64) -> TestServer {
    let data_dir = tempfile::tempdir().unwrap();
    let config = Config {
        port: 0,
        data_dir: data_dir.path().to_path_buf(),
        db_path: data_dir.path().join("test.sqlite"),
        objects_dir: data_dir.path().join("objects"),
        max_upload_size_bytes,
        application_id: "inboxapp".to_string(),
        functions: FunctionRoutes {
            list_messages: "getlstfn".to_string(),
            get_message: "getmsgfn".to_string(),
            send_message: "pstmsgfn".to_string(),
        },
    };

    let db_url = format!("sqlite:{}?mode=rwc", config.db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await
        .unwrap();
    schema::run_migrations(&pool).await.unwrap();

    let state = AppState {
        db: pool.clone(),
        config,
    };
    let app = routes::build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        addr,
        pool,
        _data_dir: data_dir,
    }
}

fn client_config(addr: SocketAddr) -> ClientConfig {
    ClientConfig {
        base_url: format!("http://{}", addr),
        application_id: "inboxapp".to_string(),
        bucket: "inbox-bucket".to_string(),
        redirect_url: format!("http://{}/auth-callback.html", addr),
        functions: FunctionIds::default(),
    }
}

fn anonymous_client(server: &TestServer, state_dir: &Path) -> ApiClient {
    let session = Session::load(TokenStore::new(state_dir));
    ApiClient::new(client_config(server.addr), session).unwrap()
}

/// Seeds an access token directly (standing in for the magic-link callback)
/// and builds a client holding it.
async fn signed_in_client(server: &TestServer, state_dir: &Path, email: &str) -> ApiClient {
    let token = store::new_guid();
    auth_db::insert_token(&server.pool, &token, email, auth_db::KIND_ACCESS)
        .await
        .unwrap();

    let mut session = Session::load(TokenStore::new(state_dir));
    session.set_tokens(token, Some(store::new_guid()));
    ApiClient::new(client_config(server.addr), session).unwrap()
}

fn compose(to: &str, subject: &str, body: &str) -> ComposeMessage {
    ComposeMessage {
        to: to.to_string(),
        subject: subject.to_string(),
        body: body.to_string(),
        from: None,
        attachments: vec![],
    }
}

#[tokio::test]
async fn signin_returns_confirmation_message() {
    let server = spawn_server(10_485_760).await;
    let dir = tempfile::tempdir().unwrap();
    let client = anonymous_client(&server, dir.path());

    let message = client.signin("x@example.com").await.unwrap();
    assert_eq!(message, "Check your email for a magic link to sign in!");
}

#[tokio::test]
async fn signin_with_unknown_application_fails_with_server_text() {
    let server = spawn_server(10_485_760).await;
    let dir = tempfile::tempdir().unwrap();
    let mut client = anonymous_client(&server, dir.path());
    client.config.application_id = "someone-elses-app".to_string();

    let err = client.signin("x@example.com").await.unwrap_err();
    match err {
        ClientError::Auth(message) => assert_eq!(message, "Unknown application"),
        other => panic!("expected Auth error, got {:?}", other),
    }
}

#[tokio::test]
async fn identity_is_resolved_and_cached() {
    let server = spawn_server(10_485_760).await;
    let dir = tempfile::tempdir().unwrap();
    let mut client = signed_in_client(&server, dir.path(), "x@example.com").await;

    let identity = client.resolve_identity().await.unwrap();
    assert_eq!(identity.email, "x@example.com");
    assert_eq!(client.user_email(), Some("x@example.com"));
}

#[tokio::test]
async fn invalid_token_clears_session_and_demands_reauth() {
    let server = spawn_server(10_485_760).await;
    let dir = tempfile::tempdir().unwrap();
    let mut client = anonymous_client(&server, dir.path());
    client
        .session
        .set_tokens("bogus-token".to_string(), None);

    let err = client.resolve_identity().await.unwrap_err();
    assert!(matches!(err, ClientError::Auth(_)));
    assert!(!client.session.is_authenticated());
}

#[tokio::test]
async fn messages_are_scoped_to_their_recipient() {
    let server = spawn_server(10_485_760).await;
    let dir = tempfile::tempdir().unwrap();
    let client = signed_in_client(&server, dir.path(), "sender@example.com").await;

    let id_x = client
        .send_message(compose("x@example.com", "for x", "hello x"))
        .await
        .unwrap();
    let id_y = client
        .send_message(compose("y@example.com", "for y", "hello y"))
        .await
        .unwrap();

    let inbox = client.list_messages("x@example.com").await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].id, id_x);
    assert_eq!(inbox[0].to, "x@example.com");

    let owned = client.get_message("x@example.com", &id_x).await.unwrap();
    assert_eq!(owned.subject, "for x");

    // A foreign id fails as a permission error, not as not-found.
    let err = client.get_message("x@example.com", &id_y).await.unwrap_err();
    assert!(matches!(err, ClientError::Authorization));
}

#[tokio::test]
async fn oversized_attachment_is_dropped_but_message_still_sends() {
    // Cap uploads at 1 KiB so the middle attachment fails.
    let server = spawn_server(1024).await;
    let dir = tempfile::tempdir().unwrap();
    let client = signed_in_client(&server, dir.path(), "sender@example.com").await;

    let mut message = compose("x@example.com", "pics", "three attached");
    message.attachments = vec![
        AttachmentUpload {
            name: "one.png".to_string(),
            bytes: vec![1u8; 100],
        },
        AttachmentUpload {
            name: "two.png".to_string(),
            bytes: vec![2u8; 4096],
        },
        AttachmentUpload {
            name: "three.png".to_string(),
            bytes: vec![3u8; 100],
        },
    ];

    let id = client.send_message(message).await.unwrap();
    let stored = client.get_message("x@example.com", &id).await.unwrap();

    assert_eq!(stored.images.len(), 2);
    assert!(stored.images[0].ends_with("-one.png"));
    assert!(stored.images[1].ends_with("-three.png"));

    // The surviving keys point at retrievable objects.
    let url = client.object_url(&client.config.bucket, &stored.images[0]);
    let bytes = reqwest::get(url).await.unwrap().bytes().await.unwrap();
    assert_eq!(bytes.as_ref(), &[1u8; 100][..]);
}

#[tokio::test]
async fn upload_without_token_is_rejected() {
    let server = spawn_server(10_485_760).await;
    let dir = tempfile::tempdir().unwrap();
    let client = anonymous_client(&server, dir.path());

    let err = client
        .upload_object("inbox-bucket", "messages/1-abc-x.png", "x.png", vec![0u8; 8])
        .await
        .unwrap_err();
    match err {
        ClientError::Request { status, .. } => assert_eq!(status, 401),
        other => panic!("expected Request error, got {:?}", other),
    }
}

#[tokio::test]
async fn sign_out_strips_the_bearer_credential_immediately() {
    let server = spawn_server(10_485_760).await;
    let dir = tempfile::tempdir().unwrap();
    let mut client = signed_in_client(&server, dir.path(), "x@example.com").await;

    client.resolve_identity().await.unwrap();
    client.sign_out();

    // The next call goes out with no Authorization header at all; the server
    // distinguishes an absent credential from an invalid one.
    let err = client
        .request("/identity/whoami", Default::default())
        .await
        .unwrap_err();
    match err {
        ClientError::Request { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Missing bearer token");
        }
        other => panic!("expected Request error, got {:?}", other),
    }

    // Persisted keys are cleared together.
    assert!(!dir.path().join("tokens.json").exists());

    // A reloaded session starts signed out.
    let reloaded = Session::load(TokenStore::new(dir.path()));
    assert!(!reloaded.is_authenticated());
}

#[tokio::test]
async fn unknown_function_id_is_not_found() {
    let server = spawn_server(10_485_760).await;
    let dir = tempfile::tempdir().unwrap();
    let mut client = signed_in_client(&server, dir.path(), "x@example.com").await;
    client.config.functions.list_messages = "nosuchfn".to_string();

    let err = client.list_messages("x@example.com").await.unwrap_err();
    match err {
        ClientError::Request { status, .. } => assert_eq!(status, 404),
        other => panic!("expected Request error, got {:?}", other),
    }
}
