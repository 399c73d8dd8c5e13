//! File lifecycle over HTTP

use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde_json::{Value, json};
use sharebox_server::config::Config;

mod common;

#[tokio::test]
async fn test_upload_and_download() {
    let server = common::TestServer::start().await;
    let client = Client::new();
    let token = server.user(&client, "alice").await;

    let key = server.upload(&client, &token, "notes.txt", b"hello world").await;

    let res = client
        .get(format!("{}/file/{key}", server.url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let file: Value = res.json().await.unwrap();
    assert_eq!(file["name"], "notes.txt");
    assert_eq!(file["size"], 11);
    assert_eq!(file["deleted"], false);

    let res = client
        .get(format!("{}/file/{key}/download", server.url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "text/plain");
    assert_eq!(
        res.headers()["content-disposition"],
        "attachment; filename=\"notes.txt\""
    );
    assert_eq!(res.bytes().await.unwrap().as_ref(), b"hello world");
}

#[tokio::test]
async fn test_upload_oversized_item_in_batch() {
    let mut config = Config::default();
    config.uploads.max_file_size = 8;
    let server = common::TestServer::start_with(config).await;
    let client = Client::new();
    let token = server.user(&client, "alice").await;

    let form = Form::new()
        .part("files", Part::bytes(b"tiny".to_vec()).file_name("a.txt"))
        .part("files", Part::bytes(vec![0u8; 64]).file_name("b.bin"));

    let res = client
        .post(format!("{}/file", server.url))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body[0]["name"], "a.txt");
    assert!(body[0]["key"].is_string());
    assert_eq!(body[1]["name"], "b.bin");
    assert_eq!(body[1]["size"], 64);
    assert!(body[1]["error"].is_string());

    // Nothing stored at all
    let form = Form::new().part("files", Part::bytes(vec![0u8; 64]).file_name("c.bin"));
    let res = client
        .post(format!("{}/file", server.url))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 413);
}

#[tokio::test]
async fn test_share_and_stop_seeing() {
    let server = common::TestServer::start().await;
    let client = Client::new();
    let alice = server.user(&client, "alice").await;
    let bob = server.user(&client, "bob").await;
    let key = server.upload(&client, &alice, "a.txt", b"shared").await;

    // Bob cannot see it yet
    let res = client
        .get(format!("{}/file/{key}", server.url))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);

    for expected in [201, 200] {
        let res = client
            .post(format!("{}/file/{key}/share", server.url))
            .bearer_auth(&alice)
            .json(&json!({ "share_with": "bob" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), expected);
    }

    let res = client
        .get(format!("{}/files/shared", server.url))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    let shared: Value = res.json().await.unwrap();
    assert_eq!(shared.as_array().unwrap().len(), 1);
    assert_eq!(shared[0]["key"], key.as_str());

    let res = client
        .patch(format!("{}/file/{key}/rename", server.url))
        .bearer_auth(&bob)
        .json(&json!({ "name": "stolen.txt" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);

    let res = client
        .delete(format!("{}/file/{key}/stop_seeing", server.url))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);

    let res = client
        .get(format!("{}/file/{key}/download", server.url))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);
}

#[tokio::test]
async fn test_share_with_unknown_user() {
    let server = common::TestServer::start().await;
    let client = Client::new();
    let alice = server.user(&client, "alice").await;
    let key = server.upload(&client, &alice, "a.txt", b"x").await;

    let res = client
        .post(format!("{}/file/{key}/share", server.url))
        .bearer_auth(&alice)
        .json(&json!({ "share_with": "nobody" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_rename_and_patch() {
    let server = common::TestServer::start().await;
    let client = Client::new();
    let alice = server.user(&client, "alice").await;
    let key = server.upload(&client, &alice, "a.txt", b"x").await;

    let res = client
        .patch(format!("{}/file/{key}/rename", server.url))
        .bearer_auth(&alice)
        .json(&json!({ "name": "b.txt" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let file: Value = res.json().await.unwrap();
    assert_eq!(file["name"], "b.txt");

    let res = client
        .patch(format!("{}/file/{key}", server.url))
        .bearer_auth(&alice)
        .json(&json!({ "name": "c.txt" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let file: Value = res.json().await.unwrap();
    assert_eq!(file["name"], "c.txt");
    assert_eq!(file["key"], key.as_str());
}

#[tokio::test]
async fn test_change_owner() {
    let server = common::TestServer::start().await;
    let client = Client::new();
    let alice = server.user(&client, "alice").await;
    let bob = server.user(&client, "bob").await;
    let key = server.upload(&client, &alice, "a.txt", b"x").await;

    let res = client
        .patch(format!("{}/file/{key}/change_owner", server.url))
        .bearer_auth(&alice)
        .json(&json!({ "new_owner": "bob" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let owned: Value = client
        .get(format!("{}/files/owned", server.url))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(owned[0]["key"], key.as_str());

    let all: Value = client
        .get(format!("{}/files", server.url))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.as_array().unwrap().len(), 1);

    // Alice is now only a viewer
    let res = client
        .delete(format!("{}/file/{key}", server.url))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);
}

#[tokio::test]
async fn test_trash_restore_and_purge() {
    let server = common::TestServer::start().await;
    let client = Client::new();
    let alice = server.user(&client, "alice").await;
    let key = server.upload(&client, &alice, "a.txt", b"x").await;

    let res = client
        .delete(format!("{}/trash/{key}", server.url))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "File is not in trash");

    let res = client
        .delete(format!("{}/file/{key}", server.url))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let trash: Value = client
        .get(format!("{}/trash", server.url))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(trash[0]["key"], key.as_str());

    let res = client
        .patch(format!("{}/trash/{key}", server.url))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let file: Value = res.json().await.unwrap();
    assert_eq!(file["deleted"], false);
    assert_eq!(file["name"], "a.txt");

    let res = client
        .patch(format!("{}/file/{key}/send_to_trash", server.url))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let res = client
        .delete(format!("{}/trash/{key}", server.url))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let res = client
        .get(format!("{}/file/{key}", server.url))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_local_storage_backend() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.storage.backend = "local".into();
    config.storage.local_path = Some(dir.path().to_string_lossy().into_owned());

    let server = common::TestServer::start_with(config).await;
    let client = Client::new();
    let alice = server.user(&client, "alice").await;
    let key = server.upload(&client, &alice, "disk.txt", b"on disk").await;

    let res = client
        .get(format!("{}/file/{key}/download", server.url))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.bytes().await.unwrap().as_ref(), b"on disk");
    assert!(dir.path().join("blobs").join(&key).exists());
}
