/// Drive the JSON-RPC server end to end over in-memory pipes
use habit_tracker::mcp::McpServer;
use habit_tracker::*;
use serde_json::{json, Value};

async fn session(server: &mut McpServer, requests: &[Value]) -> Vec<Value> {
    let input: String = requests.iter().map(|r| format!("{}\n", r)).collect();
    let mut output = Vec::new();

    server
        .serve(input.as_bytes(), &mut output)
        .await
        .expect("session failed");

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn call(id: u64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
}

#[tokio::test]
async fn test_full_session() {
    let tracker = HabitTrackerServer::in_memory(OwnerId::new("alice").unwrap()).unwrap();
    let mut server = McpServer::new(tracker);

    let responses = session(
        &mut server,
        &[
            json!({"jsonrpc": "2.0", "id": 0, "method": "initialize", "params": {"protocolVersion": "2024-11-05"}}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            call(1, "habit_create", json!({"name": "Water plants", "description": "Balcony"})),
        ],
    )
    .await;

    // The notification gets no reply
    assert_eq!(responses.len(), 2);
    let habit_id = responses[1]["result"]["structuredContent"]["habit"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let responses = session(
        &mut server,
        &[
            call(2, "habit_toggle", json!({"habit_id": habit_id, "note": "before work"})),
            call(3, "habit_toggle", json!({"habit_id": habit_id})),
            call(4, "habit_list", json!({})),
            call(5, "habit_stats", json!({})),
            call(6, "habit_calendar", json!({})),
            call(7, "habit_delete", json!({"habit_id": habit_id})),
            call(8, "habit_list", json!({})),
        ],
    )
    .await;

    assert_eq!(responses.len(), 7);
    assert_eq!(responses[0]["result"]["structuredContent"]["action"], "completed");
    assert_eq!(responses[1]["result"]["structuredContent"]["action"], "uncompleted");
    // Unmarking keeps the best streak
    assert_eq!(responses[1]["result"]["structuredContent"]["habit"]["best_streak"], 1);
    assert_eq!(responses[1]["result"]["structuredContent"]["habit"]["streak"], 0);
    assert_eq!(responses[2]["result"]["structuredContent"]["summary"]["total_habits"], 1);
    assert_eq!(responses[3]["result"]["structuredContent"]["completed_today"], 0);
    assert!(responses[4]["result"]["structuredContent"]["days"].is_array());
    assert_eq!(responses[5]["result"]["structuredContent"]["success"], true);
    assert_eq!(responses[6]["result"]["structuredContent"]["summary"]["total_habits"], 0);

    for (id, response) in responses.iter().enumerate() {
        assert_eq!(response["id"], json!(id as u64 + 2));
        assert!(response.get("error").is_none(), "unexpected error: {}", response);
    }
}

#[tokio::test]
async fn test_future_day_is_a_validation_error() {
    let tracker = HabitTrackerServer::in_memory(OwnerId::new("alice").unwrap()).unwrap();
    let mut server = McpServer::new(tracker);

    let responses = session(&mut server, &[call(1, "habit_day", json!({"date": "2999-01-01"}))]).await;

    assert_eq!(responses[0]["error"]["code"], -32003);
}
