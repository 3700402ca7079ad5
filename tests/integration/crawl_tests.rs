//! End-to-end crawl tests against a mock board

use crate::common::*;
use board_harvest::crawler::{harvest, FetchError, RetryPolicy, Walker, AGE_COOKIE};
use board_harvest::output::MemorySink;
use board_harvest::{HarvestError, Vote};
use reqwest::Client;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts a board whose newest page follows page 9000; every index page
/// lists one thread titled after the page
async fn mount_board(server: &MockServer) {
    for (route, label, prev) in [
        ("/bbs/Test/index.html", "newest", 9000),
        ("/bbs/Test/index9000.html", "p9000", 8999),
        ("/bbs/Test/index8999.html", "p8999", 8998),
        ("/bbs/Test/index8998.html", "p8998", 8997),
    ] {
        let href = format!("/bbs/Test/M.{}.A.001.html", label);
        serve(server, route, index_page(prev, &[(label, href.as_str())])).await;
        serve(
            server,
            &href,
            thread_page(BOARD, label, "Mon Jan  1 08:00:00 2024", "1.2.3.4", &[]),
        )
        .await;
    }
}

#[tokio::test]
async fn test_pages_visited_oldest_first() {
    let server = MockServer::start().await;
    mount_board(&server).await;

    let mut walker = Walker::new(crawler_config(&server.uri(), 3), fetcher(), None).unwrap();
    let mut sink = MemorySink::default();
    let stats = walker.run(&mut sink).await.unwrap();

    let titles: Vec<&str> = sink.articles.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["p8999", "p9000", "newest"]);
    assert_eq!(stats.pages, 3);
    assert_eq!(sink.pages, 3);
    assert!(sink.finished);
}

#[tokio::test]
async fn test_single_page_visits_only_newest() {
    let server = MockServer::start().await;
    mount_board(&server).await;

    let mut walker = Walker::new(crawler_config(&server.uri(), 1), fetcher(), None).unwrap();
    let mut sink = MemorySink::default();
    walker.run(&mut sink).await.unwrap();

    assert_eq!(sink.articles.len(), 1);
    assert_eq!(sink.articles[0].title, "newest");
    assert_eq!(
        sink.articles[0].url,
        format!("{}/bbs/Test/M.newest.A.001.html", server.uri())
    );
}

#[tokio::test]
async fn test_missing_previous_link_is_fatal() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/bbs/Test/index.html",
        "<html><body>no navigation</body></html>".to_string(),
    )
    .await;

    let mut walker = Walker::new(crawler_config(&server.uri(), 3), fetcher(), None).unwrap();
    let result = walker.run(&mut MemorySink::default()).await;
    assert!(matches!(result, Err(HarvestError::Index { .. })));
}

#[tokio::test]
async fn test_fetch_sends_age_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bbs/Gossiping/index.html"))
        .and(header("cookie", AGE_COOKIE))
        .respond_with(ResponseTemplate::new(200).set_body_string("welcome"))
        .expect(1)
        .mount(&server)
        .await;

    let page = fetcher()
        .fetch(&format!("{}/bbs/Gossiping/index.html", server.uri()))
        .await
        .unwrap();

    assert_eq!(page.status, 200);
    assert_eq!(page.body, "welcome");
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let page = fetcher()
        .fetch(&format!("{}/flaky", server.uri()))
        .await
        .unwrap();

    assert_eq!(page.body, "ok");
    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
}

#[tokio::test]
async fn test_not_found_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("404 - Not Found."))
        .expect(1)
        .mount(&server)
        .await;

    let page = fetcher()
        .fetch(&format!("{}/gone", server.uri()))
        .await
        .unwrap();
    assert!(page.is_not_found());
}

#[tokio::test]
async fn test_bounded_retry_gives_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let fetcher = board_harvest::crawler::Fetcher::new(
        Client::new(),
        RetryPolicy::unbounded(Duration::from_millis(1)).with_max_attempts(3),
    );
    let result = fetcher.fetch(&format!("{}/down", server.uri())).await;

    assert!(matches!(
        result,
        Err(FetchError::UnexpectedStatus { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_page_drops_damaged_forwarded_and_skipped_threads() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/bbs/Test/index.html",
        index_page(
            41,
            &[
                ("[公告] 板規", "/bbs/Test/M.1.A.000.html"),
                ("Deleted", "/bbs/Test/M.2.A.000.html"),
                ("Fw: Repost", "/bbs/Test/M.3.A.000.html"),
                ("Wrong board", "/bbs/Test/M.4.A.000.html"),
                ("Real", "/bbs/Test/M.5.A.000.html"),
            ],
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/bbs/Test/M.1.A.000.html"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bbs/Test/M.2.A.000.html"))
        .respond_with(ResponseTemplate::new(404).set_body_string("404 - Not Found."))
        .mount(&server)
        .await;
    serve(&server, "/bbs/Test/M.3.A.000.html", forward_page(BOARD, "Fw: Repost")).await;
    serve(
        &server,
        "/bbs/Test/M.4.A.000.html",
        thread_page("Other", "Wrong board", "Mon Jan  1 08:00:00 2024", "1.2.3.4", &[]),
    )
    .await;
    serve(
        &server,
        "/bbs/Test/M.5.A.000.html",
        thread_page(
            BOARD,
            "Real",
            "Mon Jan  1 08:00:00 2024",
            "1.2.3.4",
            &[
                push("推", "bob", "nice", "5.6.7.8 01/01 08:05"),
                push("→", "carol", "hmm", "01/01 08:06"),
            ],
        ),
    )
    .await;

    let mut walker = Walker::new(crawler_config(&server.uri(), 1), fetcher(), None).unwrap();
    let mut sink = MemorySink::default();
    let stats = walker.run(&mut sink).await.unwrap();

    assert_eq!(stats.threads_seen, 5);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.damaged, 2);
    assert_eq!(stats.forwarded, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.articles, 1);
    assert_eq!(stats.comments, 2);

    let article = &sink.articles[0];
    assert_eq!(article.title, "Real");
    assert_eq!((article.ups, article.downs, article.comments), (1, 0, 1));
    assert_eq!(sink.comments[0].vote, Vote::Up);
    assert_eq!(sink.comments[1].ip, None);
}

#[tokio::test]
async fn test_unparseable_thread_does_not_abort_page() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/bbs/Test/index.html",
        index_page(
            41,
            &[
                ("Broken date", "/bbs/Test/M.1.A.000.html"),
                ("Fine", "/bbs/Test/M.2.A.000.html"),
            ],
        ),
    )
    .await;
    serve(
        &server,
        "/bbs/Test/M.1.A.000.html",
        thread_page(BOARD, "Broken date", "sometime", "1.2.3.4", &[]),
    )
    .await;
    serve(
        &server,
        "/bbs/Test/M.2.A.000.html",
        thread_page(BOARD, "Fine", "Mon Jan  1 08:00:00 2024", "1.2.3.4", &[]),
    )
    .await;

    let mut walker = Walker::new(crawler_config(&server.uri(), 1), fetcher(), None).unwrap();
    let mut sink = MemorySink::default();
    let stats = walker.run(&mut sink).await.unwrap();

    assert_eq!(stats.failed, 1);
    assert_eq!(sink.articles.len(), 1);
    assert_eq!(sink.articles[0].title, "Fine");
}

#[tokio::test]
async fn test_missing_year_uses_current_year() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/bbs/Test/index.html",
        index_page(41, &[("Truncated", "/bbs/Test/M.1.A.000.html")]),
    )
    .await;
    serve(
        &server,
        "/bbs/Test/M.1.A.000.html",
        thread_page(BOARD, "Truncated", "Mon Jan  1 00:00:00", "1.2.3.4", &[]),
    )
    .await;

    let mut walker = Walker::new(crawler_config(&server.uri(), 1), fetcher(), None)
        .unwrap()
        .with_current_year(2024);
    let mut sink = MemorySink::default();
    walker.run(&mut sink).await.unwrap();

    assert_eq!(
        sink.articles[0].date.format("%Y-%m-%d %H:%M:%S").to_string(),
        "2024-01-01 00:00:00"
    );
}

#[tokio::test]
async fn test_harvest_writes_and_appends_csv() {
    let server = MockServer::start().await;
    mount_board(&server).await;
    let dir = TempDir::new().unwrap();
    let articles = dir.path().join("Test_run.csv");
    let comments = dir.path().join("Test_run_push.csv");

    let config = full_config(&server.uri(), 2, articles.to_str().unwrap(), None);
    let stats = harvest(config.clone()).await.unwrap();
    assert_eq!(stats.articles, 2);

    let content = std::fs::read_to_string(&articles).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines[0],
        "author,alias,title,date,ip,city,country,ups,downs,comments,url"
    );
    assert!(lines[1].starts_with("alice,Alice,p9000,2024-01-01 08:00:00,1.2.3.4,,,0,0,0,"));
    assert!(lines[2].starts_with("alice,Alice,newest,"));
    assert!(comments.exists());

    harvest(config).await.unwrap();
    let content = std::fs::read_to_string(&articles).unwrap();
    assert_eq!(content.lines().count(), 5);
    assert_eq!(content.matches("author,alias").count(), 1);
}

#[tokio::test]
async fn test_page_floor_paces_the_crawl() {
    let server = MockServer::start().await;
    mount_board(&server).await;

    let config = board_harvest::config::CrawlerConfig {
        page_floor_ms: 150,
        ..crawler_config(&server.uri(), 3)
    };
    let mut walker = Walker::new(config, fetcher(), None).unwrap();
    let stats = walker.run(&mut MemorySink::default()).await.unwrap();

    assert_eq!(stats.pages, 3);
    // Two padded pages; the last one is not padded
    assert!(
        stats.elapsed >= Duration::from_millis(300),
        "crawl took only {:?}",
        stats.elapsed
    );
}

#[tokio::test]
async fn test_no_floor_after_last_page() {
    let server = MockServer::start().await;
    mount_board(&server).await;

    let config = board_harvest::config::CrawlerConfig {
        page_floor_ms: 20_000,
        ..crawler_config(&server.uri(), 1)
    };
    let mut walker = Walker::new(config, fetcher(), None).unwrap();
    let stats = walker.run(&mut MemorySink::default()).await.unwrap();

    assert_eq!(stats.pages, 1);
    assert!(stats.elapsed < Duration::from_secs(20));
}
