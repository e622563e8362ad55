//! Example: Custom MCP client in Rust.
//!
//! Spawns the capability-hub-mcp server as a subprocess and talks to it over
//! stdio: handshake, list tools, call a few of them, read a resource and
//! expand a prompt.
//!
//! Usage:
//!   cargo build && cargo run --example custom_client

use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

use serde_json::{json, Value};

/// Minimal line-oriented JSON-RPC client.
struct SimpleClient {
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
    next_id: i64,
}

impl SimpleClient {
    /// Send a request and block for its reply.
    fn request(&mut self, method: &str, params: Value) -> Value {
        self.next_id += 1;
        let request = json!({
            "jsonrpc": "2.0",
            "id": self.next_id,
            "method": method,
            "params": params
        });

        let line = serde_json::to_string(&request).unwrap() + "\n";
        self.stdin.write_all(line.as_bytes()).unwrap();
        self.stdin.flush().unwrap();

        let mut response_line = String::new();
        self.reader.read_line(&mut response_line).unwrap();
        serde_json::from_str(&response_line).unwrap()
    }

    fn notify(&mut self, method: &str) {
        let notification = json!({ "jsonrpc": "2.0", "method": method });
        let line = serde_json::to_string(&notification).unwrap() + "\n";
        self.stdin.write_all(line.as_bytes()).unwrap();
        self.stdin.flush().unwrap();
    }

    fn call_tool(&mut self, name: &str, arguments: Value) -> String {
        let response = self.request("tools/call", json!({ "name": name, "arguments": arguments }));
        response["result"]["content"][0]["text"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| response["error"]["message"].to_string())
    }
}

fn main() {
    println!("=== Capability Hub MCP Client Example ===\n");

    let server_path = std::env::current_dir()
        .unwrap()
        .join("target/debug/capability-hub-mcp");

    if !server_path.exists() {
        eprintln!("Server binary not found. Run `cargo build` first.");
        std::process::exit(1);
    }

    let workspace = tempfile::tempdir().expect("Failed to create temp dir");

    let mut child = Command::new(&server_path)
        .args(["--transport", "stdio", "--workspace"])
        .arg(workspace.path())
        .arg("serve")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to start server");

    let stdin = child.stdin.take().expect("Failed to open stdin");
    let stdout = child.stdout.take().expect("Failed to open stdout");

    let mut client = SimpleClient {
        stdin,
        reader: BufReader::new(stdout),
        next_id: 0,
    };

    // 1. Initialize
    println!("1. Initializing...");
    let init_response = client.request(
        "initialize",
        json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": { "name": "example-client", "version": "1.0.0" }
        }),
    );
    println!(
        "   Server: {} v{}",
        init_response["result"]["serverInfo"]["name"],
        init_response["result"]["serverInfo"]["version"]
    );
    client.notify("notifications/initialized");

    // 2. List tools
    println!("\n2. Listing tools...");
    let tools_response = client.request("tools/list", json!({}));
    let tools = tools_response["result"]["tools"].as_array().unwrap();
    println!("   Available tools ({}):", tools.len());
    for tool in tools {
        println!("   - {}", tool["name"].as_str().unwrap());
    }

    // 3. Call tools
    println!("\n3. Calling tools...");
    println!(
        "   calculate_bmi -> {}",
        client.call_tool("calculate_bmi", json!({ "weight_kg": 70, "height_m": 1.75 }))
    );
    println!(
        "   generate_slug -> {}",
        client.call_tool("generate_slug", json!({ "text": "Hello, MCP World!" }))
    );
    println!(
        "   write_json_file -> {}",
        client.call_tool(
            "write_json_file",
            json!({ "file_path": "example.json", "data": { "greeting": "hi" } })
        )
    );

    // 4. Read a templated resource
    println!("\n4. Reading config://user/42...");
    let resource = client.request("resources/read", json!({ "uri": "config://user/42" }));
    println!("   {}", resource["result"]["contents"][0]["text"]);

    // 5. Expand a prompt
    println!("\n5. Expanding the code_review prompt...");
    let prompt = client.request(
        "prompts/get",
        json!({ "name": "code_review", "arguments": { "code": "fn main() {}", "language": "rust" } }),
    );
    let text = prompt["result"]["messages"][0]["content"]["text"]
        .as_str()
        .unwrap_or_default();
    println!("   {}", text.lines().next().unwrap_or_default());

    // Closing stdin stops the server.
    drop(client);
    let _ = child.wait();

    println!("\n=== Example complete ===");
}
