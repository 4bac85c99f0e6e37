use reqwest::Client;
use tatsuzin_watch::models::NotifierConfig;
use tatsuzin_watch::services::{Notifier, WebhookNotifier};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn notifier_for(server: &MockServer, message: &str) -> WebhookNotifier {
    let config = NotifierConfig {
        webhook_url: format!("{}/services/T000/B000", server.uri()),
        message: message.to_string(),
    };
    WebhookNotifier::new(Client::new(), &config)
}

#[tokio::test]
async fn posts_link_and_version_attachment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/T000/B000"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({
            "text": "サーバ更新までお待ちください。\n<https://www.tatsuzin.info/info/9.html|減価償却の達人公開のお知らせ>",
            "attachments": [{ "text": "公開プログラムバージョン\nV9\nデータベース更新。" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = notifier_for(&server, "サーバ更新までお待ちください。");
    notifier
        .notify(
            "https://www.tatsuzin.info/info/9.html",
            "減価償却の達人公開のお知らせ",
            "公開プログラムバージョン\nV9\nデータベース更新。",
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn error_status_from_webhook_is_not_inspected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("invalid_payload"))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = notifier_for(&server, "注意");
    assert!(notifier.notify("https://x.example/1", "t", "v").await.is_ok());
}

#[tokio::test]
async fn unreachable_webhook_is_reported() {
    let config = NotifierConfig {
        webhook_url: "http://127.0.0.1:9/hook".to_string(),
        message: "注意".to_string(),
    };
    let notifier = WebhookNotifier::new(Client::new(), &config);
    assert!(notifier.notify("https://x.example/1", "t", "v").await.is_err());
}
