#![allow(clippy::unwrap_used)]
// Integration tests for `Handle` against a wiremock Pi-hole.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pihole_api::{
    BlockingState, Client, Error, ForwardDestination, Handle, HardwareAddress, Instance,
    SessionKind, SparseClientTimeline,
};

const PASSWORD: &str = "8MzrcBRm";
const API_KEY: &str = "af90e024ac7f515011ae0c9b326a7e9ff7a00fa9d7f770d323c848f12659e3b9";
const SESSION: &str = "k2b0rk9mt5q5a4lpl3tr5g0r81";

// ── Helpers ─────────────────────────────────────────────────────────

fn instance_for(server: &MockServer) -> Instance {
    let addr = server.address();
    Instance::new(addr.ip().to_string(), addr.port())
}

async fn setup() -> (MockServer, Handle) {
    let server = MockServer::start().await;
    let instance = instance_for(&server).with_password(SecretString::from(PASSWORD));
    let handle = Handle::with_client(instance, reqwest::Client::new());
    (server, handle)
}

async fn mount_login(server: &MockServer, accept: bool) {
    let response = if accept {
        ResponseTemplate::new(200)
            .insert_header("set-cookie", format!("PHPSESSID={SESSION}; path=/; HttpOnly").as_str())
    } else {
        ResponseTemplate::new(200).set_body_string("<html>Wrong password!</html>")
    };
    Mock::given(method("POST"))
        .and(path("/admin/login.php"))
        .and(body_string(format!("pw={PASSWORD}")))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_key_probe(server: &MockServer, accept: bool) {
    let body = if accept { "ads.example.com" } else { "[]" };
    Mock::given(method("GET"))
        .and(path("/admin/api.php"))
        .and(query_param("recentBlocked", ""))
        .and(query_param("auth", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Anything not matched by a more specific mock gets the sentinel.
async fn mount_sentinel_fallback(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .with_priority(10)
        .mount(server)
        .await;
}

/// Mount an authenticated API endpoint that only answers with both
/// credential forms present.
async fn mount_authed(server: &MockServer, query_key: &str, query_value: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/admin/api.php"))
        .and(query_param(query_key, query_value))
        .and(query_param("auth", API_KEY))
        .and(header("cookie", format!("PHPSESSID={SESSION}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .with_priority(1)
        .mount(server)
        .await;
}

async fn authenticated() -> (MockServer, Handle) {
    let (server, handle) = setup().await;
    mount_login(&server, true).await;
    mount_key_probe(&server, true).await;
    mount_sentinel_fallback(&server).await;
    assert_eq!(handle.authenticate().await.unwrap(), SessionKind::Both);
    (server, handle)
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_cookie_and_key_yield_both() {
    let (_server, handle) = authenticated().await;
    assert_eq!(handle.session_kind(), SessionKind::Both);
}

#[tokio::test]
async fn test_cookie_only() {
    let (server, handle) = setup().await;
    mount_login(&server, true).await;
    mount_key_probe(&server, false).await;

    assert_eq!(handle.authenticate().await.unwrap(), SessionKind::CookieOnly);
}

#[tokio::test]
async fn test_key_only_when_login_sets_no_cookie() {
    let (server, handle) = setup().await;
    mount_login(&server, false).await;
    mount_key_probe(&server, true).await;

    assert_eq!(handle.authenticate().await.unwrap(), SessionKind::ApiKeyOnly);
}

#[tokio::test]
async fn test_neither_probe_succeeds() {
    let (server, handle) = setup().await;
    mount_login(&server, false).await;
    mount_key_probe(&server, false).await;

    assert_eq!(
        handle.authenticate().await.unwrap(),
        SessionKind::Unauthenticated
    );
}

#[tokio::test]
async fn test_reauthenticate_restarts_from_scratch() {
    let (server, handle) = authenticated().await;
    server.reset().await;
    mount_login(&server, false).await;
    mount_key_probe(&server, true).await;

    assert_eq!(handle.authenticate().await.unwrap(), SessionKind::ApiKeyOnly);
    assert_eq!(handle.session_kind(), SessionKind::ApiKeyOnly);
}

#[tokio::test]
async fn test_concurrent_authenticate_does_not_interleave() {
    let (server, handle) = setup().await;
    Mock::given(method("POST"))
        .and(path("/admin/login.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", format!("PHPSESSID={SESSION}; path=/").as_str())
                .set_delay(Duration::from_millis(150)),
        )
        .mount(&server)
        .await;
    mount_key_probe(&server, true).await;

    let (first, second) = tokio::join!(handle.authenticate(), handle.authenticate());
    assert_eq!(first.unwrap(), SessionKind::Both);
    assert_eq!(second.unwrap(), SessionKind::Both);
    assert_eq!(handle.session_kind(), SessionKind::Both);

    let order: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.method.to_string())
        .collect();
    assert_eq!(order, ["POST", "GET", "POST", "GET"]);
}

#[tokio::test]
async fn test_authenticate_transport_failure_leaves_unauthenticated() {
    // Bind and release a port so nothing is listening on it.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let instance = Instance::new("127.0.0.1", port).with_password(SecretString::from(PASSWORD));
    let handle = Handle::with_client(instance, reqwest::Client::new());

    let err = handle.authenticate().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
    assert!(err.is_transient());
    assert_eq!(handle.session_kind(), SessionKind::Unauthenticated);
}

// ── Sentinel and errors ─────────────────────────────────────────────

#[tokio::test]
async fn test_unauthenticated_call_hits_sentinel() {
    let (server, handle) = setup().await;
    mount_authed(&server, "topItems", "10", json!({"top_queries": {}, "top_ads": {}})).await;
    mount_sentinel_fallback(&server).await;

    let err = handle.get_top_queries(10).await.unwrap_err();
    assert!(err.is_auth_required(), "got: {err:?}");
}

#[tokio::test]
async fn test_invalid_hostname_fails_before_network() {
    let handle = Handle::with_client(Instance::new("not a host", 80), reqwest::Client::new());
    let err = handle.get_summary().await.unwrap_err();
    assert!(matches!(err, Error::InvalidHostname(_)), "got: {err:?}");

    let err = handle.authenticate().await.unwrap_err();
    assert!(matches!(err, Error::InvalidHostname(_)), "got: {err:?}");
}

#[tokio::test]
async fn test_html_body_is_decoding_error() {
    let (server, handle) = setup().await;
    Mock::given(method("GET"))
        .and(path("/admin/api.php"))
        .and(query_param("summaryRaw", ""))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = handle.get_summary().await.unwrap_err();
    assert!(matches!(err, Error::Decoding(Some(_))), "got: {err:?}");
}

#[tokio::test]
async fn test_missing_envelope_key_is_decoding_error_without_cause() {
    let (server, handle) = authenticated().await;
    mount_authed(&server, "getQueryTypes", "", json!({"something_else": {}})).await;

    let err = handle.get_query_types().await.unwrap_err();
    assert!(matches!(err, Error::Decoding(None)), "got: {err:?}");
}

// ── Unauthenticated reads ───────────────────────────────────────────

#[tokio::test]
async fn test_get_status_without_credentials() {
    let (server, handle) = setup().await;
    Mock::given(method("GET"))
        .and(path("/admin/api.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"status":"enabled","domains_being_blocked":"92699"}"#),
        )
        .mount(&server)
        .await;

    let status = handle.get_status().await.unwrap();
    assert_eq!(status.state, BlockingState::Enabled);
    assert_eq!(status.blocked_domain_count, 92_699);
}

#[tokio::test]
async fn test_get_summary() {
    let (server, handle) = setup().await;
    Mock::given(method("GET"))
        .and(path("/admin/api.php"))
        .and(query_param("summaryRaw", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "domains_being_blocked": 92699,
            "dns_queries_today": 27031,
            "ads_blocked_today": 3189,
            "ads_percentage_today": 11.79,
            "unique_domains": 2114,
            "queries_forwarded": 15306,
            "queries_cached": 8352,
            "clients_ever_seen": 24,
            "unique_clients": 21,
            "privacy_level": 0,
            "status": "enabled",
            "gravity_last_updated": {"file_exists": true, "absolute": 1_616_284_965}
        })))
        .mount(&server)
        .await;

    let summary = handle.get_summary().await.unwrap();
    assert_eq!(summary.blocklist_size, 92_699);
    assert_eq!(summary.unique_client_count, 21);
    assert!(summary.gravity.exists);
}

#[tokio::test]
async fn test_get_request_ratio_timeline() {
    let (server, handle) = setup().await;
    Mock::given(method("GET"))
        .and(path("/admin/api.php"))
        .and(query_param("overTimeData10mins", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "domains_over_time": {"1616284800": 40, "1616285400": 22},
            "ads_over_time": {"1616284800": 3, "1616285400": 1}
        })))
        .mount(&server)
        .await;

    let timeline = handle.get_request_ratio_timeline().await.unwrap();
    assert_eq!(timeline.rows().len(), 2);
    assert_eq!(timeline.blocked["1616284800"], 3);
}

// ── Authenticated operations ────────────────────────────────────────

#[tokio::test]
async fn test_get_hardware_info_sends_cookie() {
    let (server, handle) = authenticated().await;
    Mock::given(method("GET"))
        .and(path("/admin/index.php"))
        .and(header("cookie", format!("PHPSESSID={SESSION}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<span id="rawtemp" hidden>47.2</span>
               Load:&nbsp;0.03&nbsp;0.07&nbsp;0.08
               Memory usage:&nbsp;&nbsp;38.0&thinsp;%"#,
        ))
        .with_priority(1)
        .mount(&server)
        .await;

    let info = handle.get_hardware_info().await.unwrap();
    assert!((info.cpu_temp.unwrap() - 47.2).abs() < 0.01);
    assert!((info.load_15min.unwrap() - 0.08).abs() < 0.01);
    assert!((info.memory_usage.unwrap() - 38.0).abs() < 0.01);
}

#[tokio::test]
async fn test_get_top_queries() {
    let (server, handle) = authenticated().await;
    mount_authed(
        &server,
        "topItems",
        "5",
        json!({
            "top_queries": {"example.com": 120},
            "top_ads": {"ads.example.net": 31}
        }),
    )
    .await;

    let top = handle.get_top_queries(5).await.unwrap();
    assert_eq!(top.top_passed["example.com"], 120);
    assert_eq!(top.top_blocked["ads.example.net"], 31);
}

#[tokio::test]
async fn test_get_top_clients_and_blocked() {
    let (server, handle) = authenticated().await;
    mount_authed(
        &server,
        "getQuerySources",
        "10",
        json!({"top_sources": {"laptop.lan|192.168.1.20": 400, "192.168.1.21": 12}}),
    )
    .await;
    mount_authed(
        &server,
        "topClientsBlocked",
        "10",
        json!({"top_sources_blocked": []}),
    )
    .await;

    let top = handle.get_top_clients(10).await.unwrap();
    assert_eq!(top.len(), 2);
    let first = top.keys().next().unwrap();
    assert_eq!(first.name.as_deref(), Some("laptop.lan"));
    assert_eq!(top[&Client::new("192.168.1.21", None)], 12);

    let blocked = handle.get_top_blocked_clients(10).await.unwrap();
    assert!(blocked.is_empty());
}

#[tokio::test]
async fn test_get_query_types() {
    let (server, handle) = authenticated().await;
    mount_authed(
        &server,
        "getQueryTypes",
        "",
        json!({"querytypes": {"A (IPv4)": 61.5, "AAAA (IPv6)": 30.25, "PTR": 8.25}}),
    )
    .await;

    let types = handle.get_query_types().await.unwrap();
    assert_eq!(types.len(), 3);
    assert!((types["PTR"] - 8.25).abs() < 0.01);
}

#[tokio::test]
async fn test_get_forward_destinations() {
    let (server, handle) = authenticated().await;
    mount_authed(
        &server,
        "getForwardDestinations",
        "",
        json!({"forward_destinations": {
            "cache|cache": 31.2,
            "blocklist|blocklist": 11.8,
            "router.lan|192.168.1.1#53": 57.0
        }}),
    )
    .await;

    let dests = handle.get_forward_destinations().await.unwrap();
    assert_eq!(dests.len(), 3);
    assert!(dests.contains_key(&ForwardDestination::Cache));
    assert!(dests.contains_key(&ForwardDestination::Blocklist));
    let remote = ForwardDestination::Remote {
        name: "router.lan".into(),
        ip: "192.168.1.1".into(),
    };
    assert!((dests[&remote] - 57.0).abs() < 0.01);
}

#[tokio::test]
async fn test_get_client_timeline_and_sparse_view() {
    let (server, handle) = authenticated().await;
    Mock::given(method("GET"))
        .and(path("/admin/api.php"))
        .and(query_param("overTimeDataClients", ""))
        .and(query_param("getClientNames", ""))
        .and(query_param("auth", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "clients": [{"name": "laptop.lan", "ip": "192.168.1.20"}, {"name": "", "ip": "192.168.1.30"}],
            "over_time": {"1616284800": [5, 0], "1616285400": [0, 7]}
        })))
        .with_priority(1)
        .mount(&server)
        .await;

    let timeline = handle.get_client_timeline().await.unwrap();
    assert_eq!(timeline.clients.len(), 2);

    let sparse = SparseClientTimeline::from(&timeline);
    assert!(sparse.records.values().all(|r| r.len() == 1));
}

#[tokio::test]
async fn test_get_request_ratio_timeline_between() {
    let (server, handle) = authenticated().await;
    Mock::given(method("GET"))
        .and(path("/admin/api_db.php"))
        .and(query_param("getGraphData", ""))
        .and(query_param("from", "1616284800"))
        .and(query_param("until", "1616371200"))
        .and(query_param("interval", "3600"))
        .and(query_param("auth", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "domains_over_time": {"1616284800": 400},
            "ads_over_time": []
        })))
        .with_priority(1)
        .mount(&server)
        .await;

    let timeline = handle
        .get_request_ratio_timeline_between(1_616_284_800, 1_616_371_200, Duration::from_secs(3600))
        .await
        .unwrap();
    assert_eq!(timeline.permitted["1616284800"], 400);
    assert!(timeline.blocked.is_empty());
}

#[tokio::test]
async fn test_get_network() {
    let (server, handle) = authenticated().await;
    Mock::given(method("GET"))
        .and(path("/admin/api_db.php"))
        .and(query_param("network", ""))
        .and(query_param("auth", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"network": [
            {
                "id": 22,
                "hwaddr": "52:54:00:4e:14:33",
                "interface": "eth0",
                "firstSeen": 1_595_913_120,
                "lastQuery": 1_610_571_652,
                "numQueries": 45,
                "macVendor": "Realtek",
                "ip": ["192.168.1.50"],
                "name": ["nas.lan"]
            },
            {
                "id": 23,
                "hwaddr": "ip-10.8.0.2",
                "interface": "tun0",
                "firstSeen": 1_595_913_120,
                "lastQuery": 1_610_571_652,
                "numQueries": 3,
                "macVendor": "",
                "ip": ["10.8.0.2"],
                "name": [""]
            }
        ]})))
        .with_priority(1)
        .mount(&server)
        .await;

    let network = handle.get_network().await.unwrap();
    assert_eq!(network.len(), 2);
    assert_eq!(network[0].aliases[0].name.as_deref(), Some("nas.lan"));
    assert_eq!(
        network[1].hardware_address,
        HardwareAddress::Ip("10.8.0.2".into())
    );
}

#[tokio::test]
async fn test_enable_and_disable() {
    let (server, handle) = authenticated().await;
    mount_authed(&server, "enable", "", json!({"status": "enabled"})).await;
    mount_authed(&server, "disable", "300", json!({"status": "disabled"})).await;
    mount_authed(&server, "disable", "", json!({"status": "disabled"})).await;

    assert_eq!(handle.enable().await.unwrap(), BlockingState::Enabled);
    assert_eq!(
        handle
            .disable(Some(Duration::from_secs(300)))
            .await
            .unwrap(),
        BlockingState::Disabled
    );
    assert_eq!(handle.disable(None).await.unwrap(), BlockingState::Disabled);
}

#[tokio::test]
async fn test_enable_without_credentials_is_auth_required() {
    let (server, handle) = setup().await;
    mount_sentinel_fallback(&server).await;

    let err = handle.enable().await.unwrap_err();
    assert!(matches!(err, Error::AuthenticationRequired));
}
