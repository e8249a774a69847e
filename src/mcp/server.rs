/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads line-delimited JSON-RPC requests
/// 2. Routes tool calls to the habit operations for the configured owner
/// 3. Writes JSON-RPC responses back, one per line

use chrono::Local;
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::analytics::DayStatus;
use crate::mcp::protocol::*;
use crate::tools;
use crate::{HabitTrackerServer, ServerError};

/// MCP server that handles communication with the client
pub struct McpServer {
    /// The underlying habit tracker server
    habit_tracker: HabitTrackerServer,
    /// Whether the client has sent its `initialized` notification
    initialized: bool,
}

/// Build a tool definition whose input schema comes from the params type
fn tool<P: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: serde_json::to_value(schema_for!(P)).unwrap_or_default(),
    }
}

/// Deserialize tool arguments into the tool's params type
fn parse_args<P: DeserializeOwned>(args: Map<String, Value>) -> Result<P, JsonRpcError> {
    serde_json::from_value(Value::Object(args)).map_err(|e| JsonRpcError {
        code: error_codes::INVALID_PARAMS,
        message: format!("Invalid arguments: {}", e),
        data: None,
    })
}

/// Wrap a tool response as a successful result
fn tool_result<T: Serialize>(text: String, response: &T) -> Result<ToolCallResult, JsonRpcError> {
    Ok(ToolCallResult::success(text, serde_json::to_value(response)?))
}

fn plural(count: u32) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(habit_tracker: HabitTrackerServer) -> Self {
        Self {
            habit_tracker,
            initialized: false,
        }
    }

    /// Run the MCP server over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve requests from `reader` until it is closed, answering on `writer`
    pub async fn serve<R, W>(&mut self, reader: R, mut writer: W) -> Result<(), ServerError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let mut reader = BufReader::new(reader);
        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (input closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.process_line(&line) {
                        let response_str = serde_json::to_string(&response)?;

                        writer.write_all(response_str.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                        writer.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read request: {}", e);
                    return Err(e.into());
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    fn process_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        self.handle_request(request)
    }

    /// Handle a JSON-RPC request; notifications produce no response
    fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            self.handle_notification(&request.method);
            return None;
        };

        let outcome = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params),
            "ping" => Ok(json!({})),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(request.params),
            _ => Err(JsonRpcError {
                code: error_codes::METHOD_NOT_FOUND,
                message: format!("Method '{}' not found", request.method),
                data: None,
            }),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error),
        })
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "initialized" | "notifications/initialized" => {
                self.initialized = true;
                info!("MCP client finished initialization");
            }
            other => debug!("Ignoring notification '{}'", other),
        }
    }

    /// Handle MCP initialization request
    fn handle_initialize(&mut self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        match params.map(serde_json::from_value::<InitializeParams>) {
            Some(Ok(init)) => info!(
                client = init.client_info.as_ref().map(|c| c.name.as_str()).unwrap_or("unknown"),
                protocol_version = %init.protocol_version,
                "MCP client connected"
            ),
            Some(Err(e)) => warn!("Unrecognized initialize parameters: {}", e),
            None => info!("MCP client connected"),
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: "Habit Tracker".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Ok(serde_json::to_value(result)?)
    }

    /// Handle tools/list request
    fn handle_tools_list(&self) -> Result<Value, JsonRpcError> {
        let definitions = vec![
            tool::<tools::CreateHabitParams>("habit_create", "Create a new daily habit to track"),
            tool::<tools::ListHabitsParams>(
                "habit_list",
                "List your habits, newest first, with current and best streaks",
            ),
            tool::<tools::ToggleCompletionParams>(
                "habit_toggle",
                "Mark a habit done for today, or unmark it if it is already done",
            ),
            tool::<tools::DeleteHabitParams>(
                "habit_delete",
                "Delete a habit; its history is kept but it no longer appears anywhere",
            ),
            tool::<tools::DayOverviewParams>(
                "habit_day",
                "Show which habits applied to a day and which of them were done",
            ),
            tool::<tools::CalendarParams>(
                "habit_calendar",
                "Show a month of days with how many habits were done on each",
            ),
            tool::<tools::StatsParams>(
                "habit_stats",
                "Show total habits, habits done today and the best streak",
            ),
        ];

        Ok(json!({ "tools": definitions }))
    }

    /// Handle tools/call request
    fn handle_tools_call(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params = params.ok_or_else(|| JsonRpcError {
            code: error_codes::INVALID_PARAMS,
            message: "Missing parameters".to_string(),
            data: None,
        })?;
        let call: ToolCallParams = serde_json::from_value(params).map_err(|e| JsonRpcError {
            code: error_codes::INVALID_PARAMS,
            message: format!("Invalid parameters: {}", e),
            data: None,
        })?;

        if !self.initialized {
            debug!(tool = %call.name, "tool called before initialization finished");
        }

        let result = match call.name.as_str() {
            "habit_create" => self.call_habit_create(call.arguments),
            "habit_list" => self.call_habit_list(call.arguments),
            "habit_toggle" => self.call_habit_toggle(call.arguments),
            "habit_delete" => self.call_habit_delete(call.arguments),
            "habit_day" => self.call_habit_day(call.arguments),
            "habit_calendar" => self.call_habit_calendar(call.arguments),
            "habit_stats" => self.call_habit_stats(call.arguments),
            _ => Ok(ToolCallResult::error(format!("Unknown tool: {}", call.name))),
        };

        if let Err(e) = &result {
            warn!(tool = %call.name, code = e.code, "tool call failed: {}", e.message);
        }

        Ok(serde_json::to_value(result?)?)
    }

    fn call_habit_create(&self, args: Map<String, Value>) -> Result<ToolCallResult, JsonRpcError> {
        let params = parse_args(args)?;
        let response = tools::create_habit(
            self.habit_tracker.storage(),
            self.habit_tracker.owner(),
            params,
            &Local::now(),
        )?;

        let text = format!("{}\nHabit ID: {}", response.message, response.habit.id);
        tool_result(text, &response)
    }

    fn call_habit_list(&self, args: Map<String, Value>) -> Result<ToolCallResult, JsonRpcError> {
        let params = parse_args(args)?;
        let today = Local::now().date_naive();
        let response = tools::list_habits(self.habit_tracker.storage(), self.habit_tracker.owner(), params, today)?;

        if response.habits.is_empty() {
            return tool_result(
                "No habits found. Create your first habit to get started!".to_string(),
                &response,
            );
        }

        let header = format!("📋 **Your Habits** ({})\n\n", response.summary.total_habits);
        let lines = response
            .habits
            .iter()
            .map(|h| {
                format!(
                    "🎯 **{}** ({})\n   🔥 Streak: {} day{} | 🏆 Best: {} | ✅ Total: {}",
                    h.name,
                    h.id,
                    h.streak,
                    plural(h.streak),
                    h.best_streak,
                    h.completions.len()
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        tool_result(format!("{}{}", header, lines), &response)
    }

    fn call_habit_toggle(&self, args: Map<String, Value>) -> Result<ToolCallResult, JsonRpcError> {
        let params = parse_args(args)?;
        let response = tools::toggle_completion(
            self.habit_tracker.storage(),
            self.habit_tracker.owner(),
            params,
            &Local::now(),
        )?;

        tool_result(response.message.clone(), &response)
    }

    fn call_habit_delete(&self, args: Map<String, Value>) -> Result<ToolCallResult, JsonRpcError> {
        let params = parse_args(args)?;
        let response = tools::soft_delete_habit(self.habit_tracker.storage(), self.habit_tracker.owner(), params)?;

        tool_result(response.message.clone(), &response)
    }

    fn call_habit_day(&self, args: Map<String, Value>) -> Result<ToolCallResult, JsonRpcError> {
        let params = parse_args(args)?;
        let today = Local::now().date_naive();
        let overview = tools::day_overview(self.habit_tracker.storage(), self.habit_tracker.owner(), params, today)?;

        let mut text = format!(
            "📅 **{}**{}: {}/{} done\n",
            overview.date.format("%A, %B %-d, %Y"),
            if overview.is_today { " (today)" } else { "" },
            overview.completed,
            overview.total
        );
        for entry in &overview.habits {
            text.push_str(&format!(
                "\n{} {} (🔥 {})",
                if entry.completed { "✅" } else { "⬜" },
                entry.name,
                entry.current_streak
            ));
            if let Some(note) = &entry.note {
                text.push_str(&format!(" - {}", note));
            }
        }

        tool_result(text, &overview)
    }

    fn call_habit_calendar(&self, args: Map<String, Value>) -> Result<ToolCallResult, JsonRpcError> {
        let params = parse_args(args)?;
        let today = Local::now().date_naive();
        let calendar = tools::month_calendar(self.habit_tracker.storage(), self.habit_tracker.owner(), params, today)?;

        let marks: String = calendar
            .days
            .iter()
            .map(|d| match d.status {
                DayStatus::Completed => '●',
                DayStatus::Partial => '◐',
                DayStatus::Missed => '○',
                DayStatus::NoHabits | DayStatus::Future => '·',
            })
            .collect();
        let text = format!(
            "🗓️ **{}-{:02}**\n{}\n\n{} perfect day{} out of {} tracked, {:.1}% completion",
            calendar.year,
            calendar.month,
            marks,
            calendar.summary.perfect_days,
            plural(calendar.summary.perfect_days),
            calendar.summary.tracked_days,
            calendar.summary.completion_rate * 100.0
        );

        tool_result(text, &calendar)
    }

    fn call_habit_stats(&self, args: Map<String, Value>) -> Result<ToolCallResult, JsonRpcError> {
        let params = parse_args(args)?;
        let today = Local::now().date_naive();
        let stats = tools::dashboard(self.habit_tracker.storage(), self.habit_tracker.owner(), params, today)?;

        let text = format!(
            "📊 **Overview**\n- Habits: {}\n- Done today: {}\n- Best streak: {} day{}\n- Streaks alive: {}",
            stats.total_habits,
            stats.completed_today,
            stats.best_streak,
            plural(stats.best_streak),
            stats.live_streaks
        );

        tool_result(text, &stats)
    }
}
