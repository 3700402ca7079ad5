//! Page builders and configuration shared by the integration tests

use board_harvest::config::{Config, CrawlerConfig, GeolocationConfig, OutputConfig};
use board_harvest::crawler::{Fetcher, RetryPolicy};
use reqwest::Client;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const BOARD: &str = "Test";

/// An index page whose "previous page" button points at `prev`
pub fn index_page(prev: u32, threads: &[(&str, &str)]) -> String {
    let entries: String = threads
        .iter()
        .map(|(title, href)| {
            format!(
                r#"<div class="r-ent"><div class="nrec"></div><div class="title"><a href="{}">{}</a></div></div>"#,
                href, title
            )
        })
        .collect();

    format!(
        r#"<html><body>
<div class="btn-group btn-group-paging">
<a class="btn wide" href="/bbs/{board}/index1.html">最舊</a>
<a class="btn wide" href="/bbs/{board}/index{prev}.html">&lsaquo; 上頁</a>
<a class="btn wide disabled">下頁 &rsaquo;</a>
<a class="btn wide" href="/bbs/{board}/index.html">最新</a>
</div>
<div class="r-list-container">{entries}</div>
</body></html>"#,
        board = BOARD,
        prev = prev,
        entries = entries
    )
}

/// One push line: tag, user, text, ip/datetime column
pub fn push(tag: &str, user: &str, text: &str, ip_time: &str) -> String {
    format!(
        r#"<div class="push"><span class="hl push-tag">{} </span><span class="f3 hl push-userid">{}</span><span class="f3 push-content">: {}</span><span class="push-ipdatetime"> {}
</span></div>"#,
        tag, user, text, ip_time
    )
}

/// A thread page posted from `ip` on board `board`
pub fn thread_page(board: &str, title: &str, date: &str, ip: &str, pushes: &[String]) -> String {
    format!(
        r#"<html><body><div id="main-content" class="bbs-screen bbs-content">
<div class="article-metaline"><span class="article-meta-tag">作者</span><span class="article-meta-value">alice (Alice)</span></div>
<div class="article-metaline-right"><span class="article-meta-tag">看板</span><span class="article-meta-value">{board}</span></div>
<div class="article-metaline"><span class="article-meta-tag">標題</span><span class="article-meta-value">{title}</span></div>
<div class="article-metaline"><span class="article-meta-tag">時間</span><span class="article-meta-value">{date}</span></div>
article body
--
<span class="f2">※ 發信站: 批踢踢實業坊(ptt.cc), 來自: {ip} (臺灣)</span>
<span class="f2">※ 文章網址: https://www.ptt.cc/bbs/{board}/M.1.A.000.html</span>
{pushes}</div></body></html>"#,
        board = board,
        title = title,
        date = date,
        ip = ip,
        pushes = pushes.concat()
    )
}

/// A thread page reposted from another board
pub fn forward_page(board: &str, title: &str) -> String {
    format!(
        r#"<html><body><div id="main-content" class="bbs-screen bbs-content">
<div class="article-metaline"><span class="article-meta-tag">作者</span><span class="article-meta-value">bob (Bob)</span></div>
<div class="article-metaline-right"><span class="article-meta-tag">看板</span><span class="article-meta-value">{board}</span></div>
<div class="article-metaline"><span class="article-meta-tag">標題</span><span class="article-meta-value">{title}</span></div>
<div class="article-metaline"><span class="article-meta-tag">時間</span><span class="article-meta-value">Mon Jan  1 09:00:00 2024</span></div>
<span class="f2">※ [本文轉錄自 Stock 看板 #1abcdEF ]</span>
reposted body
<span class="f2">※ 發信站: 批踢踢實業坊(ptt.cc), 來自: 8.8.8.8 (臺灣)</span>
</div></body></html>"#,
        board = board,
        title = title
    )
}

/// Serves `body` for GET `route`
pub async fn serve(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// A crawler configuration pointed at the mock board, without pacing
pub fn crawler_config(host: &str, pages: u32) -> CrawlerConfig {
    CrawlerConfig {
        board: BOARD.to_string(),
        pages,
        host: host.to_string(),
        page_floor_ms: 0,
        retry_delay_ms: 10,
        ..Default::default()
    }
}

pub fn full_config(
    host: &str,
    pages: u32,
    articles_path: &str,
    geolocation: Option<GeolocationConfig>,
) -> Config {
    Config {
        crawler: crawler_config(host, pages),
        geolocation: geolocation.unwrap_or_default(),
        output: OutputConfig {
            articles_path: Some(articles_path.to_string()),
        },
    }
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::unbounded(Duration::from_millis(10))
}

pub fn fetcher() -> Fetcher {
    Fetcher::new(Client::new(), fast_retry())
}
