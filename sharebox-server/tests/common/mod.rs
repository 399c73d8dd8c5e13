use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde_json::{Value, json};
use sharebox_server::config::Config;
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub struct TestServer {
    pub url: String,
    #[allow(dead_code)]
    pub addr: SocketAddr,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(Config::default()).await
    }

    pub async fn start_with(mut config: Config) -> Self {
        config.port = 0; // OS assigns port
        config.auth.token_secret = Some("integration-test-secret".into());

        let state = sharebox_server::state::AppState::new(&config).await.unwrap();
        let app = sharebox_server::routes::router(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give server a moment to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            url: format!("http://{addr}"),
            addr,
        }
    }

    /// Register a user and return a bearer token for them
    #[allow(dead_code)]
    pub async fn user(&self, client: &Client, username: &str) -> String {
        let creds = json!({ "username": username, "password": "pw1" });

        let res = client
            .post(format!("{}/register", self.url))
            .json(&creds)
            .send()
            .await
            .expect("Failed to register");
        assert_eq!(res.status(), 201);

        let res = client
            .post(format!("{}/login", self.url))
            .json(&creds)
            .send()
            .await
            .expect("Failed to log in");
        assert_eq!(res.status(), 200);

        let body: Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    /// Upload one file and return its key
    #[allow(dead_code)]
    pub async fn upload(&self, client: &Client, token: &str, name: &str, data: &[u8]) -> String {
        let part = Part::bytes(data.to_vec())
            .file_name(name.to_string())
            .mime_str("text/plain")
            .unwrap();
        let form = Form::new().part("files", part);

        let res = client
            .post(format!("{}/file", self.url))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .expect("Failed to upload");
        assert_eq!(res.status(), 201);

        let body: Value = res.json().await.unwrap();
        body[0]["key"].as_str().unwrap().to_string()
    }
}
