//! End-to-end tests of the rewriting pipeline against a mock upstream.

use origin_proxy::config::ProxyConfig;
use std::net::SocketAddr;

mod common;

use common::EchoedRequest;

fn config_for(upstream: SocketAddr, base_path: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.upstream.origin = format!("http://{}{}", upstream, base_path);
    config.upstream.local_prefix = "/something/".to_string();
    config
}

#[tokio::test]
async fn test_forwards_rewritten_path_and_query() {
    let upstream = common::start_echo_upstream(&[]).await;
    let (proxy, shutdown) = common::start_proxy(config_for(upstream, "/base")).await;

    let res = common::client()
        .get(format!("http://{}/something/get?foo=bar&x=1", proxy))
        .send()
        .await
        .expect("Proxy unreachable");
    assert_eq!(res.status(), 200);

    let echoed = EchoedRequest::parse(&res.text().await.unwrap());
    assert_eq!(echoed.request_line, "GET /base/get?foo=bar&x=1 HTTP/1.1");
    assert_eq!(echoed.get("host"), Some(upstream.to_string().as_str()));

    shutdown.trigger();
}

#[tokio::test]
async fn test_prefix_only_request_hits_upstream_root() {
    let upstream = common::start_echo_upstream(&[]).await;
    let (proxy, shutdown) = common::start_proxy(config_for(upstream, "/base")).await;

    let res = common::client()
        .get(format!("http://{}/something/?q=1", proxy))
        .send()
        .await
        .unwrap();

    let echoed = EchoedRequest::parse(&res.text().await.unwrap());
    assert_eq!(echoed.request_line, "GET /?q=1 HTTP/1.1");

    shutdown.trigger();
}

#[tokio::test]
async fn test_trailing_slash_is_stripped() {
    let upstream = common::start_echo_upstream(&[]).await;
    let (proxy, shutdown) = common::start_proxy(config_for(upstream, "")).await;

    let res = common::client()
        .get(format!("http://{}/something/a/b/", proxy))
        .send()
        .await
        .unwrap();

    let echoed = EchoedRequest::parse(&res.text().await.unwrap());
    assert_eq!(echoed.request_line, "GET /a/b HTTP/1.1");

    shutdown.trigger();
}

#[tokio::test]
async fn test_forwarding_headers_without_client_values() {
    let upstream = common::start_echo_upstream(&[]).await;
    let (proxy, shutdown) = common::start_proxy(config_for(upstream, "/")).await;
    let proxy_host = proxy.to_string();

    let res = common::client()
        .get(format!("http://{}/something/headers", proxy))
        .send()
        .await
        .unwrap();

    let echoed = EchoedRequest::parse(&res.text().await.unwrap());
    // Defaulted first, then appended by the director.
    assert_eq!(echoed.all("x-forwarded-host"), vec![proxy_host.as_str(), proxy_host.as_str()]);
    assert_eq!(echoed.all("x-forwarded-proto"), vec!["http"]);
    assert_eq!(echoed.all("x-origin-host"), vec![upstream.to_string().as_str()]);
    assert_eq!(echoed.get("x-forwarded-for"), Some("127.0.0.1"));
    assert!(echoed.get("x-request-id").is_some());

    shutdown.trigger();
}

#[tokio::test]
async fn test_forwarding_headers_keep_client_values() {
    let upstream = common::start_echo_upstream(&[]).await;
    let (proxy, shutdown) = common::start_proxy(config_for(upstream, "/")).await;
    let proxy_host = proxy.to_string();

    let res = common::client()
        .get(format!("http://{}/something/headers", proxy))
        .header("X-Forwarded-Host", "edge.example")
        .header("X-Forwarded-Proto", "https")
        .header("X-Forwarded-For", "203.0.113.7")
        .send()
        .await
        .unwrap();

    let echoed = EchoedRequest::parse(&res.text().await.unwrap());
    assert_eq!(echoed.all("x-forwarded-host"), vec!["edge.example", proxy_host.as_str()]);
    assert_eq!(echoed.all("x-forwarded-proto"), vec!["https"]);
    assert_eq!(echoed.get("x-forwarded-for"), Some("203.0.113.7, 127.0.0.1"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_set_cookie_domains_rewritten_per_cookie() {
    static COOKIES: &[&str] = &[
        "a=1; Domain=old.domain; Path=/",
        "b=2; Domain=unchanged.domain; HttpOnly",
        "c=3; Domain=tracker.test; Secure",
        "d=4; Path=/",
    ];
    let upstream = common::start_echo_upstream(COOKIES).await;

    let mut config = config_for(upstream, "/");
    for (from, to) in [
        ("unchanged.domain", "unchanged.domain"),
        ("old.domain", "new.domain"),
        ("*", ""),
    ] {
        config.cookie_domains.insert(from.to_string(), to.to_string());
    }
    let (proxy, shutdown) = common::start_proxy(config).await;

    let res = common::client()
        .get(format!("http://{}/something/cookies", proxy))
        .send()
        .await
        .unwrap();

    let cookies: Vec<_> = res
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(
        cookies,
        vec![
            "a=1; Domain=new.domain; Path=/",
            "b=2; Domain=unchanged.domain; HttpOnly",
            "c=3; Secure",
            "d=4; Path=/",
        ]
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let upstream = common::start_echo_upstream(&[]).await;
    let (proxy, shutdown) = common::start_proxy(config_for(upstream, "/")).await;

    let res = common::client()
        .get(format!("http://{}/something/id", proxy))
        .header("x-request-id", "req-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers().get("x-request-id").unwrap(), "req-123");

    let echoed = EchoedRequest::parse(&res.text().await.unwrap());
    assert_eq!(echoed.get("x-request-id"), Some("req-123"));

    let res = common::client()
        .get(format!("http://{}/something/id", proxy))
        .send()
        .await
        .unwrap();
    assert!(res.headers().get("x-request-id").is_some());

    shutdown.trigger();
}

#[tokio::test]
async fn test_paths_outside_prefix_are_not_routed() {
    let upstream = common::start_echo_upstream(&[]).await;
    let (proxy, shutdown) = common::start_proxy(config_for(upstream, "/")).await;

    for path in ["/", "/other/thing", "/somethingelse/x"] {
        let res = common::client()
            .get(format!("http://{}{}", proxy, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 404, "path {}", path);
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let upstream = common::closed_port().await;
    let (proxy, shutdown) = common::start_proxy(config_for(upstream, "/")).await;

    let res = common::client()
        .get(format!("http://{}/something/get", proxy))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);

    shutdown.trigger();
}

#[tokio::test]
async fn test_bare_prefix_accepts_trailing_slash() {
    let upstream = common::start_echo_upstream(&[]).await;
    let mut config = config_for(upstream, "/");
    config.upstream.local_prefix = "/api".to_string();
    let (proxy, shutdown) = common::start_proxy(config).await;

    for (path, expected) in [
        ("/api", "GET / HTTP/1.1"),
        ("/api/", "GET / HTTP/1.1"),
        ("/api/x", "GET /x HTTP/1.1"),
    ] {
        let res = common::client()
            .get(format!("http://{}{}", proxy, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200, "path {}", path);

        let echoed = EchoedRequest::parse(&res.text().await.unwrap());
        assert_eq!(echoed.request_line, expected, "path {}", path);
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_silent_upstream_is_gateway_timeout() {
    let upstream = common::start_silent_upstream().await;
    let mut config = config_for(upstream, "/");
    config.timeouts.request_secs = 1;
    let (proxy, shutdown) = common::start_proxy(config).await;

    let res = common::client()
        .get(format!("http://{}/something/slow", proxy))
        .timeout(std::time::Duration::from_secs(10))
        .send()
        .await
        .expect("Proxy should answer before the client gives up");
    assert_eq!(res.status(), 504);

    shutdown.trigger();
}
