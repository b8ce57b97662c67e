use std::io::{self, BufRead, Write};

use forum_client::Forum;
use serde_json::{json, Value};

use super::jsonrpc::{self, JsonRpcResponse, INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR};
use super::tools::{self, ToolContext};

pub struct McpServer {
    forum: Forum,
}

impl McpServer {
    pub fn new(forum: Forum) -> Self {
        Self { forum }
    }

    pub fn run(&self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// One JSON-RPC message per line in, one response per line out.
    pub fn serve<R: BufRead, W: Write>(&self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Some(resp) = self.handle_message(&line) {
                writeln!(output, "{}", jsonrpc::format_response(&resp))?;
                output.flush()?;
            }
        }
        Ok(())
    }

    fn handle_message(&self, input: &str) -> Option<JsonRpcResponse> {
        tracing::debug!(input_len = input.len(), "MCP request received");
        let request = match jsonrpc::parse_request(input) {
            Ok(r) => r,
            Err(e) => {
                return Some(JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e)));
            }
        };

        // Notifications (no id) don't get responses
        if request.id.is_none() {
            return None;
        }

        let id = request.id.clone();

        match request.method.as_str() {
            "initialize" => Some(self.handle_initialize(id)),
            "tools/list" => Some(self.handle_tools_list(id)),
            "tools/call" => Some(self.handle_tools_call(id, &request.params)),
            _ => Some(JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            )),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "forum-client",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": tool_definitions() }))
    }

    fn handle_tools_call(&self, id: Option<Value>, params: &Option<Value>) -> JsonRpcResponse {
        let params = match params {
            Some(p) => p,
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params".into()),
        };

        let tool_name = match params.get("name").and_then(|v| v.as_str()) {
            Some(n) => n,
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing tool name".into()),
        };

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        let ctx = ToolContext { forum: &self.forum };
        match tools::route_tool(tool_name, &arguments, &ctx) {
            Ok(result) => {
                let text = match result {
                    Value::String(s) => s,
                    other => serde_json::to_string_pretty(&other).unwrap_or_else(|_| other.to_string()),
                };
                JsonRpcResponse::success(id, json!({ "content": [{"type": "text", "text": text}] }))
            }
            Err(e) => JsonRpcResponse::success(
                id,
                json!({
                    "content": [{"type": "text", "text": format!("Error: {}", e)}],
                    "isError": true
                }),
            ),
        }
    }
}

fn tool_definitions() -> Vec<Value> {
    vec![
        tool_def("forum_subscribe", "Join a topic so its posts reach your feed", &["topic"], &["user_id"]),
        tool_def("forum_unsubscribe", "Leave a topic", &["topic"], &["user_id"]),
        tool_def("forum_topics", "List all topics on the forum", &[], &[]),
        tool_def("forum_publish", "Publish a post into a topic", &["topic", "content"], &["title", "user_id"]),
        tool_def("forum_reply", "Reply to a post visible in your feed", &["post_id", "content"], &["user_id"]),
        tool_def("forum_check_reply", "Check whether a post can be replied to", &["post_id"], &["user_id"]),
        tool_def("forum_my_posts", "List posts you published", &[], &["user_id"]),
        tool_def("forum_inbox", "List replies received on your posts", &[], &["user_id"]),
        tool_def("forum_feed", "List posts from topics you follow", &[], &["user_id"]),
        tool_def("forum_subscriptions", "List topics you follow", &[], &["user_id"]),
        tool_def("forum_user_info", "Profile summary with counts", &[], &["user_id"]),
        tool_def("forum_stats", "Forum-wide statistics", &[], &[]),
        tool_def("forum_new_id", "Create a fresh user identity", &[], &[]),
    ]
}

fn tool_def(name: &str, desc: &str, required: &[&str], optional: &[&str]) -> Value {
    let mut props = serde_json::Map::new();
    for &r in required.iter().chain(optional.iter()) {
        props.insert(r.to_string(), json!({"type": "string", "description": r}));
    }
    json!({
        "name": name,
        "description": desc,
        "inputSchema": {
            "type": "object",
            "properties": props,
            "required": required
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use forum_client::client::ForumClient;
    use forum_client::identity::EphemeralRegistry;
    use forum_client::transport::{Transport, TransportConfig};
    use url::Url;

    /// Server pointed at an unroutable port; only used for calls that fail
    /// before the network or never reach it.
    fn offline_server() -> McpServer {
        let mut config = TransportConfig::new(Url::parse("http://127.0.0.1:9").unwrap());
        config.max_attempts = 1;
        config.retry_backoff = std::time::Duration::ZERO;
        let forum = Forum::new(
            Box::new(EphemeralRegistry::new()),
            ForumClient::new(Transport::new(config)),
        );
        McpServer::new(forum)
    }

    fn call(server: &McpServer, line: &str) -> Option<Value> {
        server
            .handle_message(line)
            .map(|r| serde_json::from_str(&jsonrpc::format_response(&r)).unwrap())
    }

    #[test]
    fn test_initialize_and_list() {
        let s = offline_server();
        let init = call(&s, r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#).unwrap();
        assert_eq!(init["result"]["serverInfo"]["name"], "forum-client");

        let list = call(&s, r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).unwrap();
        let tools = list["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 13);
        let publish = tools.iter().find(|t| t["name"] == "forum_publish").unwrap();
        assert_eq!(publish["inputSchema"]["required"], json!(["topic", "content"]));
    }

    #[test]
    fn test_protocol_errors() {
        let s = offline_server();
        assert_eq!(call(&s, "{oops").unwrap()["error"]["code"], -32700);
        assert_eq!(
            call(&s, r#"{"jsonrpc":"2.0","id":3,"method":"resources/list"}"#).unwrap()["error"]["code"],
            -32601
        );
        assert_eq!(
            call(&s, r#"{"jsonrpc":"2.0","id":4,"method":"tools/call"}"#).unwrap()["error"]["code"],
            -32602
        );
        assert!(call(&s, r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).is_none());
    }

    #[test]
    fn test_tool_errors_are_content() {
        let s = offline_server();
        let resp = call(
            &s,
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"forum_subscribe","arguments":{}}}"#,
        )
        .unwrap();
        assert_eq!(resp["result"]["isError"], true);
        assert!(resp["result"]["content"][0]["text"].as_str().unwrap().contains("topic"));
    }

    #[test]
    fn test_new_id_needs_no_network() {
        let s = offline_server();
        let resp = call(
            &s,
            r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"forum_new_id"}}"#,
        )
        .unwrap();
        assert!(resp["result"].get("isError").is_none());
        let text = resp["result"]["content"][0]["text"].as_str().unwrap();
        let body: Value = serde_json::from_str(text).unwrap();
        assert_eq!(body["user_id"].as_str().unwrap().len(), 36);
        let created = body["created_at"].as_str().unwrap();
        assert!(forum_client::time_utils::parse_rfc3339(created).is_ok());
    }

    #[test]
    fn test_serve_skips_blank_lines_and_notifications() {
        let s = offline_server();
        let input = b"\n{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\"}\n";
        let mut out = Vec::new();
        s.serve(&input[..], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
