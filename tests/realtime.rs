// Alert service against a mock feed server.
use holiday_feed::models::RealtimeConfig;
use holiday_feed::services::AlertService;
use mockito::Server;

const FEED: &str = r##"{
    "title": "停班停課",
    "updated": "2024-07-24T20:00:00+08:00",
    "entry": [
        {
            "id": "1",
            "title": "停班停課",
            "updated": "2024-07-24T20:00:00+08:00",
            "summary": { "@type": "html", "#text": "[停班停課通知]臺北市:明天停止上班、停止上課。" }
        },
        {
            "id": "2",
            "title": "停班停課",
            "summary": { "@type": "html", "#text": "[停班停課通知]臺北市北投區:明天停止上班、停止上課。" }
        },
        {
            "id": "3",
            "title": "停班停課",
            "summary": { "#text": "[停班停課通知]新北市:明天停止上班、停止上課。" }
        },
        {
            "id": "4",
            "title": "停班停課",
            "summary": { "text": "[停班停課通知]台北市：明天停止上班、停止上課。" }
        },
        { "id": "5", "title": "no summary" }
    ]
}"##;

fn config(url: String, cache_ttl_secs: u64) -> RealtimeConfig {
    RealtimeConfig {
        feed_url: url,
        cache_ttl_secs,
        ..RealtimeConfig::default()
    }
}

#[tokio::test]
async fn test_keeps_city_wide_entries_in_feed_order() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/feed")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(FEED)
        .create_async()
        .await;

    let service = AlertService::new(&config(format!("{}/feed", server.url()), 60)).unwrap();
    let alerts = service.current_alerts().await;

    let ids: Vec<_> = alerts.iter().filter_map(|a| a.id.as_deref()).collect();
    assert_eq!(ids, vec!["1", "4"]);
}

#[tokio::test]
async fn test_successful_result_is_cached_until_invalidated() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/feed")
        .with_status(200)
        .with_body(FEED)
        .expect(2)
        .create_async()
        .await;

    let service = AlertService::new(&config(format!("{}/feed", server.url()), 60)).unwrap();
    assert_eq!(service.current_alerts().await.len(), 2);
    assert_eq!(service.current_alerts().await.len(), 2);

    service.invalidate();
    assert_eq!(service.current_alerts().await.len(), 2);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_zero_ttl_fetches_every_time() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/feed")
        .with_status(200)
        .with_body(FEED)
        .expect(2)
        .create_async()
        .await;

    let service = AlertService::new(&config(format!("{}/feed", server.url()), 0)).unwrap();
    service.current_alerts().await;
    service.current_alerts().await;

    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_yields_empty_and_is_not_cached() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/feed")
        .with_status(500)
        .expect(2)
        .create_async()
        .await;

    let service = AlertService::new(&config(format!("{}/feed", server.url()), 60)).unwrap();
    assert!(service.current_alerts().await.is_empty());
    assert!(service.current_alerts().await.is_empty());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_invalid_json_yields_empty() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/feed")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let service = AlertService::new(&config(format!("{}/feed", server.url()), 60)).unwrap();
    assert!(service.current_alerts().await.is_empty());
    assert!(service.fetch_feed().await.is_err());
}
