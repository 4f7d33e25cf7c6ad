//! Integration tests for Manse MCP Server
//!
//! These tests drive the JSON-RPC dispatcher and the HTTP router end to end.
//! The manse database is a throwaway SQLite file.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use manse_mcp_server::calendar::SolarTermTable;
use manse_mcp_server::manse::SqliteManseStore;
use manse_mcp_server::mcp::dispatcher::Dispatcher;
use manse_mcp_server::mcp::server::McpServer;
use manse_mcp_server::mcp::tools::{build_registry, ToolContext};

/// Helper to create a JSON-RPC request
fn make_request(id: Value, method: &str, params: Option<Value>) -> Value {
    let mut request = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
    });
    if let Some(p) = params {
        request["params"] = p;
    }
    request
}

fn call_tool(id: Value, name: &str, arguments: Value) -> Value {
    make_request(
        id,
        "mcp.call_tool",
        Some(json!({ "name": name, "arguments": arguments })),
    )
}

struct Fixture {
    dispatcher: Dispatcher,
    _dir: tempfile::TempDir,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("manse.db");

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute_batch(
        "CREATE TABLE manse (solar_date TEXT, lunar_date TEXT, year_ganji TEXT);",
    )
    .unwrap();
    for day in 1..=20 {
        conn.execute(
            "INSERT INTO manse VALUES (?1, ?2, '을사')",
            [format!("2025-02-{:02}", day), format!("2025-01-{:02}", day + 3)],
        )
        .unwrap();
    }

    let registry = build_registry(ToolContext {
        rows: Arc::new(SqliteManseStore::new(&db_path)),
        terms: Arc::new(SolarTermTable::builtin().unwrap()),
        query_timeout: Duration::from_secs(5),
    })
    .unwrap();

    Fixture {
        dispatcher: Dispatcher::new(Arc::new(registry)),
        _dir: dir,
    }
}

async fn dispatch(dispatcher: &Dispatcher, request: Value) -> Value {
    serde_json::to_value(dispatcher.handle_value(request).await).unwrap()
}

mod mcp_protocol_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_tools_is_deterministic() {
        let f = fixture();
        let mut seen = Vec::new();

        for id in 0..5 {
            let resp = dispatch(&f.dispatcher, make_request(json!(id), "mcp.list_tools", None)).await;
            let names: Vec<String> = resp["result"]["tools"]
                .as_array()
                .unwrap()
                .iter()
                .map(|t| t["name"].as_str().unwrap().to_string())
                .collect();
            seen.push(names);
        }

        assert!(seen.iter().all(|names| names == &seen[0]));
        assert_eq!(seen[0], ["echo", "uppercase", "query_manse", "calc_daewoon"]);
    }

    #[tokio::test]
    async fn test_list_tools_descriptor_shape() {
        let f = fixture();
        let resp = dispatch(&f.dispatcher, make_request(json!(1), "mcp.list_tools", None)).await;

        for tool in resp["result"]["tools"].as_array().unwrap() {
            assert!(tool["name"].is_string());
            assert!(tool["description"].is_string());
            assert_eq!(tool["inputSchema"]["type"], "object");
        }
    }

    #[tokio::test]
    async fn test_id_is_echoed() {
        let f = fixture();

        for id in [json!("abc"), json!(42), json!(-7), Value::Null] {
            let ok = dispatch(&f.dispatcher, call_tool(id.clone(), "echo", json!({"text": "x"}))).await;
            assert_eq!(ok["id"], id);

            let err = dispatch(&f.dispatcher, make_request(id.clone(), "mcp.unknown", None)).await;
            assert_eq!(err["id"], id);
        }
    }

    #[tokio::test]
    async fn test_result_xor_error() {
        let f = fixture();
        let requests = [
            make_request(json!(1), "mcp.list_tools", None),
            call_tool(json!(2), "echo", json!({"text": "hi"})),
            call_tool(json!(3), "echo", json!({})),
            call_tool(json!(4), "nonexistent", json!({})),
            make_request(json!(5), "other", None),
        ];

        for request in requests {
            let resp = dispatch(&f.dispatcher, request).await;
            let obj = resp.as_object().unwrap();
            assert_eq!(obj["jsonrpc"], "2.0");
            assert!(obj.contains_key("result") ^ obj.contains_key("error"), "{resp}");
        }
    }

    #[tokio::test]
    async fn test_missing_argument_is_invalid_params() {
        let f = fixture();
        let resp = dispatch(&f.dispatcher, call_tool(json!(99), "echo", json!({}))).await;

        assert_eq!(resp["error"]["code"], -32602);
        assert!(resp["error"]["message"].as_str().unwrap().contains("required"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let f = fixture();
        let resp = dispatch(&f.dispatcher, call_tool(json!("req-7"), "nonexistent", json!({}))).await;

        assert_eq!(resp["id"], "req-7");
        assert_eq!(resp["error"]["code"], -32001);
        assert_eq!(resp["error"]["message"], "Tool not found");
    }
}

mod tool_tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_and_uppercase() {
        let f = fixture();

        let resp = dispatch(&f.dispatcher, call_tool(json!(1), "echo", json!({"text": "hello"}))).await;
        assert_eq!(resp["result"]["outputs"][0], json!({"type": "text", "content": "hello"}));

        let resp = dispatch(&f.dispatcher, call_tool(json!(2), "uppercase", json!({"text": "hello"}))).await;
        assert_eq!(resp["result"]["outputs"][0]["content"], "HELLO");
    }

    #[tokio::test]
    async fn test_query_manse() {
        let f = fixture();

        let resp = dispatch(&f.dispatcher, call_tool(json!(1), "query_manse", json!({}))).await;
        let output = &resp["result"]["outputs"][0];
        assert_eq!(output["type"], "json");
        let rows = output["content"].as_array().unwrap();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0]["solar_date"], "2025-02-01");
        assert_eq!(rows[0]["year_ganji"], "을사");

        let resp = dispatch(&f.dispatcher, call_tool(json!(2), "query_manse", json!({"limit": 3}))).await;
        assert_eq!(resp["result"]["outputs"][0]["content"].as_array().unwrap().len(), 3);

        let resp = dispatch(&f.dispatcher, call_tool(json!(3), "query_manse", json!({"limit": 500}))).await;
        assert_eq!(resp["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_query_manse_unreachable_database() {
        let dir = tempfile::tempdir().unwrap();
        let registry = build_registry(ToolContext {
            rows: Arc::new(SqliteManseStore::new(dir.path().join("missing.db"))),
            terms: Arc::new(SolarTermTable::builtin().unwrap()),
            query_timeout: Duration::from_secs(5),
        })
        .unwrap();
        let dispatcher = Dispatcher::new(Arc::new(registry));

        let resp = dispatch(&dispatcher, call_tool(json!(1), "query_manse", json!({}))).await;
        assert_eq!(resp["id"], 1);
        assert_eq!(resp["error"]["code"], -32002);
        assert_eq!(resp["error"]["message"], "Upstream unavailable");

        // Other tools are unaffected.
        let resp = dispatch(&dispatcher, call_tool(json!(2), "echo", json!({"text": "ok"}))).await;
        assert_eq!(resp["result"]["outputs"][0]["content"], "ok");
    }

    #[tokio::test]
    async fn test_calc_daewoon() {
        let f = fixture();
        let resp = dispatch(
            &f.dispatcher,
            call_tool(json!(1), "calc_daewoon", json!({"yyyymmdd": "20250115"})),
        )
        .await;

        let output = &resp["result"]["outputs"][0];
        assert_eq!(output["type"], "json");
        let asc = output["content"]["asc_diff_days"].as_i64().unwrap();
        let desc = output["content"]["desc_diff_days"].as_i64().unwrap();
        assert!(asc >= 0 && desc >= 0);
        // 소한 (01-05) to 대한 (01-20) spans 15 days.
        assert!(((asc + desc) * 3 - 15).abs() <= 2);
    }

    #[tokio::test]
    async fn test_calc_daewoon_malformed_dates() {
        let f = fixture();

        for (i, bad) in [json!("20250232"), json!("2025-01-15"), json!("abc"), json!(20250115)]
            .into_iter()
            .enumerate()
        {
            let resp = dispatch(
                &f.dispatcher,
                call_tool(json!(i), "calc_daewoon", json!({"yyyymmdd": bad})),
            )
            .await;
            assert_eq!(resp["error"]["code"], -32602, "{bad}");
            assert_eq!(resp["id"], i);
        }
    }

    #[tokio::test]
    async fn test_concurrent_calls_do_not_cross_talk() {
        let f = fixture();
        let dispatcher = Arc::new(f.dispatcher);
        let mut handles = Vec::new();

        for i in 0..100 {
            let dispatcher = Arc::clone(&dispatcher);
            handles.push(tokio::spawn(async move {
                let tool = if i % 2 == 0 { "echo" } else { "uppercase" };
                let text = format!("message-{i}");
                let resp = dispatch(&dispatcher, call_tool(json!(i), tool, json!({"text": text}))).await;
                (i, tool, text, resp)
            }));
        }

        for handle in handles {
            let (i, tool, text, resp) = handle.await.unwrap();
            let expected = if tool == "echo" { text } else { text.to_uppercase() };
            assert_eq!(resp["id"], i);
            assert_eq!(resp["result"]["outputs"][0]["content"], expected);
        }
    }
}

mod http_tests {
    use super::*;

    fn router() -> (axum::Router, tempfile::TempDir) {
        let f = fixture();
        (McpServer::new(f.dispatcher).router(), f._dir)
    }

    async fn send(router: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    #[tokio::test]
    async fn test_rest_echo() {
        let (router, _dir) = router();
        let (status, body) = send(router, post_json("/mcp", r#"{"inputs": {"text": "hello"}}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["outputs"][0]["content"], "hello");
        assert!(body["id"].is_string());
    }

    #[tokio::test]
    async fn test_rest_missing_inputs() {
        let (router, _dir) = router();
        let (status, body) = send(router, post_json("/mcp/", "{}")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("inputs"));
    }

    #[tokio::test]
    async fn test_usage() {
        let (router, _dir) = router();
        let request = Request::builder().uri("/mcp").body(Body::empty()).unwrap();
        let (status, body) = send(router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["allowed_methods"], json!(["POST"]));
    }

    #[tokio::test]
    async fn test_rpc_over_http() {
        let (router, _dir) = router();
        let request = call_tool(json!("abc"), "echo", json!({"text": "hello"}));
        let (status, body) = send(router, post_json("/mcp/rpc", request.to_string())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "abc");
        assert_eq!(body["result"]["outputs"][0]["content"], "hello");
    }

    #[tokio::test]
    async fn test_rpc_parse_error_is_http_ok() {
        let (router, _dir) = router();
        let (status, body) = send(router, post_json("/mcp/rpc", "{oops")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["code"], -32700);
        assert_eq!(body["id"], Value::Null);
    }
}
