mod common;

use std::time::Duration;

use common::{client, MockUpstream, Reply, StreamingUpstream, TestProxy};
use github_proxy::config::ProxyConfig;

#[tokio::test]
async fn test_archive_download_is_relayed() {
    let mock = MockUpstream::start(|_| {
        Reply::ok("PK-archive-bytes").header("Content-Type", "application/zip")
    })
    .await;
    let proxy = TestProxy::start(ProxyConfig::default(), &mock).await;

    let res = client()
        .get(proxy.url("http://github.com/octocat/Hello-World/archive/master.zip"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/zip");
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "PK-archive-bytes");

    let seen = mock.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0].request_line,
        "GET http://github.com/octocat/Hello-World/archive/master.zip HTTP/1.1"
    );
}

#[tokio::test]
async fn test_blob_page_is_fetched_as_raw() {
    let mock = MockUpstream::start(|_| Reply::ok("# Hello")).await;
    let proxy = TestProxy::start(ProxyConfig::default(), &mock).await;

    let res = client()
        .get(proxy.url("http://github.com/a/b/blob/main/README.md"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "# Hello");
    assert_eq!(
        mock.requests()[0].request_line,
        "GET http://github.com/a/b/raw/main/README.md HTTP/1.1"
    );
}

#[tokio::test]
async fn test_query_string_is_preserved() {
    let mock = MockUpstream::start(|_| Reply::ok("refs")).await;
    let proxy = TestProxy::start(ProxyConfig::default(), &mock).await;

    let res = client()
        .get(proxy.url("http://github.com/a/b.git/info/refs?service=git-upload-pack"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(
        mock.requests()[0].request_line,
        "GET http://github.com/a/b.git/info/refs?service=git-upload-pack HTTP/1.1"
    );
}

#[tokio::test]
async fn test_request_body_reaches_upstream() {
    let mock = MockUpstream::start(|_| Reply::ok("pack")).await;
    let proxy = TestProxy::start(ProxyConfig::default(), &mock).await;

    let res = client()
        .post(proxy.url("http://github.com/a/b.git/git-upload-pack"))
        .header("content-type", "application/x-git-upload-pack-request")
        .body("0032want deadbeef\n0000")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let seen = &mock.requests()[0];
    assert!(seen.request_line.starts_with("POST "));
    assert_eq!(seen.body, b"0032want deadbeef\n0000");
    assert_eq!(
        seen.header("content-type"),
        Some("application/x-git-upload-pack-request")
    );
}

#[tokio::test]
async fn test_declared_length_over_limit_is_rejected() {
    let mock = MockUpstream::start(|_| {
        Reply::status(200).header("Content-Length", "20000000000")
    })
    .await;
    let proxy = TestProxy::start(ProxyConfig::default(), &mock).await;

    let res = client()
        .get(proxy.url("http://github.com/a/b/releases/download/v1/huge.iso"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 413);
    let body = res.text().await.unwrap();
    assert!(body.contains("File too large"), "{body}");
}

#[tokio::test]
async fn test_github_redirect_points_back_through_proxy() {
    let mock = MockUpstream::start(|_| {
        Reply::status(302).header(
            "Location",
            "https://github.com/a/b/releases/download/v1/app.tar.gz",
        )
    })
    .await;
    let mut config = ProxyConfig::default();
    config.upstream.follow_redirects = false;
    let proxy = TestProxy::start(config, &mock).await;

    let res = client()
        .get(proxy.url("http://github.com/a/b/releases/latest/download/app.tar.gz"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 302);
    assert_eq!(
        res.headers()["location"],
        "/https://github.com/a/b/releases/download/v1/app.tar.gz"
    );
}

#[tokio::test]
async fn test_origin_policy_headers_are_dropped() {
    let mock = MockUpstream::start(|_| {
        Reply::ok("body")
            .header("Content-Security-Policy", "default-src 'none'")
            .header("Strict-Transport-Security", "max-age=31536000")
            .header("Referrer-Policy", "no-referrer")
            .header("ETag", "\"abc\"")
    })
    .await;
    let proxy = TestProxy::start(ProxyConfig::default(), &mock).await;

    let res = client()
        .get(proxy.url("http://raw.githubusercontent.com/a/b/main/file.txt"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert!(!res.headers().contains_key("content-security-policy"));
    assert!(!res.headers().contains_key("strict-transport-security"));
    assert!(!res.headers().contains_key("referrer-policy"));
    assert_eq!(res.headers()["etag"], "\"abc\"");
}

#[tokio::test]
async fn test_hop_by_hop_request_headers_are_dropped() {
    let mock = MockUpstream::start(|_| Reply::ok("ok")).await;
    let proxy = TestProxy::start(ProxyConfig::default(), &mock).await;

    let res = client()
        .get(proxy.url("http://github.com/a/b/archive/main.tar.gz"))
        .header("proxy-authorization", "Basic c2VjcmV0")
        .header("range", "bytes=0-99")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let seen = &mock.requests()[0];
    assert_eq!(seen.header("proxy-authorization"), None);
    assert_eq!(seen.header("range"), Some("bytes=0-99"));
    assert_eq!(seen.header("host"), Some("github.com"));
}

#[tokio::test]
async fn test_upstream_status_is_relayed() {
    let mock = MockUpstream::start(|_| Reply::status(404)).await;
    let proxy = TestProxy::start(ProxyConfig::default(), &mock).await;

    let res = client()
        .get(proxy.url("http://github.com/a/b/releases/download/v0/missing"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_blacklisted_repo_is_forbidden() {
    let mock = MockUpstream::start(|_| Reply::ok("never")).await;
    let config = ProxyConfig {
        black_list: vec!["evil/*".into()],
        ..ProxyConfig::default()
    };
    let proxy = TestProxy::start(config, &mock).await;

    let res = client()
        .get(proxy.url("http://github.com/evil/repo/archive/main.zip"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 403);
    assert_eq!(
        res.text().await.unwrap(),
        "This GitHub repository is blacklisted"
    );
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_non_github_target_is_refused_by_default() {
    let mock = MockUpstream::start(|_| Reply::ok("never")).await;
    let proxy = TestProxy::start(ProxyConfig::default(), &mock).await;

    let res = client()
        .get(proxy.url("http://example.com/file.bin"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 403);
    assert_eq!(
        res.text().await.unwrap(),
        "Invalid URL: proxying non-GitHub addresses is disabled"
    );
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_allow_proxy_all_relays_other_hosts() {
    let mock = MockUpstream::start(|_| Reply::ok("mirror")).await;
    let config = ProxyConfig {
        allow_proxy_all: true,
        other_black_list: vec!["blocked.example".into()],
        ..ProxyConfig::default()
    };
    let proxy = TestProxy::start(config, &mock).await;

    let res = client()
        .get(proxy.url("http://example.com/file.bin"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "mirror");

    let res = client()
        .get(proxy.url("http://blocked.example/file.bin"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);

    let seen = mock.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].request_line, "GET http://example.com/file.bin HTTP/1.1");
}

#[tokio::test]
async fn test_head_request_is_relayed() {
    let mock = MockUpstream::start(|_| Reply::status(200).header("Content-Length", "0")).await;
    let proxy = TestProxy::start(ProxyConfig::default(), &mock).await;

    let res = client()
        .head(proxy.url("http://github.com/a/b/releases/download/v1/app.tar.gz"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert!(mock.requests()[0].request_line.starts_with("HEAD "));
}

#[tokio::test]
async fn test_client_disconnect_closes_upstream() {
    let mut upstream = StreamingUpstream::start().await;
    let proxy = TestProxy::start_via(ProxyConfig::default(), upstream.proxy_url()).await;

    let mut res = client()
        .get(proxy.url("http://github.com/a/b/releases/download/v1/big.iso"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let first = res.chunk().await.unwrap().unwrap();
    assert!(!first.is_empty());
    drop(res);

    let written = tokio::time::timeout(Duration::from_secs(10), upstream.wait_closed())
        .await
        .expect("upstream connection stayed open after the client left")
        .unwrap();
    assert!(written < 1024 * 1024 * 1024);
}
