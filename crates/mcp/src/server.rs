//! MCP Server Implementation
//!
//! Routes the Vanguide tool calls onto one shared [`GuidedSessionService`].

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData, ServerHandler, ServiceExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use vanguide_core::domain::vehicle::{BudgetBand, Region, Terrain};
use vanguide_core::{
    Catalog, GuidedAction, GuidedSessionInput, GuidedSessionService, GuidedSessionUpdate,
    GuidedSessionView, Issue, IssueId, Kpis, OpsBoardPayload, OptionId, Session, SessionId,
    SubmissionResult,
};

use crate::{McpError, McpResult};

/// Main MCP server for Vanguide
#[derive(Clone)]
pub struct VanguideMcpServer {
    service: Arc<Mutex<GuidedSessionService>>,
    tool_router: ToolRouter<Self>,
}

impl VanguideMcpServer {
    /// Create a server that owns its session state
    pub fn new(service: GuidedSessionService) -> Self {
        Self::with_shared(Arc::new(Mutex::new(service)))
    }

    /// Create a server over session state shared with another surface
    pub fn with_shared(service: Arc<Mutex<GuidedSessionService>>) -> Self {
        Self { service, tool_router: Self::tool_router() }
    }

    /// Run the server with stdio transport
    pub async fn run_stdio(self) -> anyhow::Result<()> {
        info!(event_name = "mcp.server.started", transport = "stdio", "starting MCP server");

        let service = self.serve(rmcp::transport::stdio()).await?;
        let reason = service.waiting().await?;

        info!(event_name = "mcp.server.stopped", reason = ?reason, "MCP server shutdown complete");
        Ok(())
    }

    /// Names of every registered tool
    pub fn tool_names(&self) -> Vec<String> {
        self.tool_router.list_all().into_iter().map(|tool| tool.name.to_string()).collect()
    }

    /// JSON schema advertised for a tool's arguments
    pub fn input_schema(&self, tool_name: &str) -> Option<Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .find(|tool| tool.name == tool_name)
            .map(|tool| Value::Object((*tool.input_schema).clone()))
    }
}

#[tool_handler]
impl ServerHandler for VanguideMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Vanguide MCP Server - guided adventure van configuration. \
                 Start a session, answer one step at a time, toggle options, submit for a \
                 readiness check, and work the ops board."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}

// ============================================================================
// Tool inputs
// ============================================================================

/// Customer profile fields shared by session start and advance.
#[derive(Debug, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionProfileInput {
    #[schemars(description = "Customer display name", length(min = 1))]
    #[serde(default)]
    pub customer_name: Option<String>,

    #[schemars(description = "Explicit budget in dollars; must be positive")]
    #[serde(default)]
    pub budget: Option<f64>,

    #[schemars(description = "Budget band used when no explicit budget is given")]
    #[serde(default)]
    pub budget_band: Option<BudgetBand>,

    #[schemars(description = "Number of travellers", range(min = 1))]
    #[serde(default)]
    pub occupancy: Option<u32>,

    #[schemars(description = "Primary terrain for the trip")]
    #[serde(default)]
    pub terrain: Option<Terrain>,

    #[schemars(description = "Home region")]
    #[serde(default)]
    pub region: Option<Region>,

    #[schemars(description = "Free-form trip style")]
    #[serde(default)]
    pub trip_style: Option<String>,

    #[schemars(description = "Trip moods such as family, adventure, safety, luxury, winter, water")]
    #[serde(default)]
    pub moods: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceSessionInput {
    #[schemars(description = "Guided session id")]
    pub session_id: String,

    #[schemars(description = "Quick action to apply; submit runs the readiness check")]
    #[serde(default)]
    pub action: Option<GuidedAction>,

    #[serde(flatten)]
    pub profile: SessionProfileInput,

    #[schemars(description = "Option to toggle on or off")]
    #[serde(default)]
    pub option_id: Option<String>,

    #[schemars(description = "Replacement option selection; unknown ids are ignored")]
    #[serde(default)]
    pub option_ids: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionInput {
    #[schemars(description = "Guided session id")]
    pub session_id: String,

    #[schemars(description = "Option to toggle; required by customer.updateOptions")]
    #[serde(default)]
    pub option_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionIssuesInput {
    #[schemars(description = "Guided session id")]
    pub session_id: String,
}

#[derive(Debug, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpsBoardInput {
    #[schemars(description = "Limit fix candidates to one session")]
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FixIssueInput {
    #[schemars(description = "Issue to fix")]
    pub issue_id: String,
}

/// Result of `dev.fixIssue`: the closed issue and the session it repaired.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixOutcome {
    pub issue: Issue,
    pub session: Session,
}

fn non_empty(field: &str, value: Option<String>) -> McpResult<Option<String>> {
    match value {
        Some(text) if text.is_empty() => {
            Err(McpError::Validation(format!("{field} must not be empty")))
        }
        other => Ok(other),
    }
}

fn positive_budget(budget: Option<f64>) -> McpResult<Option<Decimal>> {
    budget
        .map(|value| {
            if !value.is_finite() || value <= 0.0 {
                return Err(McpError::Validation(format!(
                    "budget must be a positive number, got {value}"
                )));
            }
            Decimal::try_from(value).map_err(|err| {
                McpError::Validation(format!("budget {value} is out of range: {err}"))
            })
        })
        .transpose()
}

fn positive_occupancy(occupancy: Option<u32>) -> McpResult<Option<u32>> {
    match occupancy {
        Some(0) => Err(McpError::Validation("occupancy must be a positive integer".to_string())),
        other => Ok(other),
    }
}

impl SessionProfileInput {
    fn into_session_input(self) -> McpResult<GuidedSessionInput> {
        Ok(GuidedSessionInput {
            customer_name: non_empty("customerName", self.customer_name)?,
            budget: positive_budget(self.budget)?,
            budget_band: self.budget_band,
            occupancy: positive_occupancy(self.occupancy)?,
            terrain: self.terrain,
            region: self.region,
            trip_style: self.trip_style,
            moods: self.moods,
        })
    }
}

impl AdvanceSessionInput {
    fn into_update(self) -> McpResult<(SessionId, GuidedSessionUpdate)> {
        let profile = self.profile.into_session_input()?;
        let update = GuidedSessionUpdate {
            action: self.action,
            customer_name: profile.customer_name,
            budget: profile.budget,
            budget_band: profile.budget_band,
            occupancy: profile.occupancy,
            terrain: profile.terrain,
            region: profile.region,
            trip_style: profile.trip_style,
            moods: profile.moods,
            option_id: self.option_id.map(OptionId),
            option_ids: self.option_ids.map(|ids| ids.into_iter().map(OptionId).collect()),
        };
        Ok((SessionId(self.session_id), update))
    }
}

// ============================================================================
// Tool handlers
// ============================================================================

impl VanguideMcpServer {
    pub async fn catalog(&self) -> Catalog {
        self.service.lock().await.catalog().clone()
    }

    pub async fn start_session(&self, input: SessionProfileInput) -> McpResult<GuidedSessionView> {
        let input = input.into_session_input()?;
        Ok(self.service.lock().await.start_session(input))
    }

    pub async fn advance_session(
        &self,
        input: AdvanceSessionInput,
    ) -> McpResult<GuidedSessionView> {
        let (session_id, update) = input.into_update()?;
        Ok(self.service.lock().await.advance_session(&session_id, update)?)
    }

    pub async fn refresh_session(&self, input: SessionInput) -> McpResult<GuidedSessionView> {
        let session_id = SessionId(input.session_id);
        Ok(self.service.lock().await.refresh_session(&session_id)?)
    }

    /// Toggles one option and returns the refreshed journey.
    pub async fn update_options(&self, input: SessionInput) -> McpResult<GuidedSessionView> {
        let option_id = input
            .option_id
            .filter(|id| !id.is_empty())
            .map(OptionId)
            .ok_or_else(|| McpError::Validation("optionId is required".to_string()))?;
        let session_id = SessionId(input.session_id);

        let mut service = self.service.lock().await;
        service.toggle_option(&session_id, &option_id)?;
        Ok(service.refresh_session(&session_id)?)
    }

    pub async fn submit_session(&self, input: SessionInput) -> McpResult<SubmissionResult> {
        let session_id = SessionId(input.session_id);
        Ok(self.service.lock().await.submit_session(&session_id)?)
    }

    pub async fn kpis(&self) -> Kpis {
        self.service.lock().await.kpis()
    }

    pub async fn session_issues(&self, input: SessionIssuesInput) -> Vec<Issue> {
        self.service.lock().await.issues_for_session(&SessionId(input.session_id))
    }

    pub async fn issues(&self) -> Vec<Issue> {
        self.service.lock().await.issue_list()
    }

    pub async fn ops_board(&self, input: OpsBoardInput) -> OpsBoardPayload {
        self.service.lock().await.ops_board(input.session_id.map(SessionId))
    }

    pub async fn fix_issue(&self, input: FixIssueInput) -> McpResult<FixOutcome> {
        let mut service = self.service.lock().await;
        let issue = service.apply_fix(&IssueId(input.issue_id))?;
        let session = service.get_session(&issue.session_id)?.clone();
        Ok(FixOutcome { issue, session })
    }
}

fn respond<T: Serialize>(
    tool: &'static str,
    outcome: McpResult<T>,
) -> Result<CallToolResult, ErrorData> {
    match outcome {
        Ok(value) => {
            let content = serde_json::to_string_pretty(&value)
                .map_err(|err| ErrorData::from(McpError::Internal(err.to_string())))?;
            debug!(event_name = "mcp.tool.completed", tool, "tool call completed");
            Ok(CallToolResult::success(vec![Content::text(content)]))
        }
        Err(error) => {
            warn!(event_name = "mcp.tool.rejected", tool, error = %error, "tool call rejected");
            Err(error.into())
        }
    }
}

// ============================================================================
// Tools
// ============================================================================

#[tool_router]
impl VanguideMcpServer {
    #[tool(
        name = "catalog.getCatalog",
        description = "Get adventure van catalog and available option modules."
    )]
    async fn get_catalog(&self) -> Result<CallToolResult, ErrorData> {
        respond("catalog.getCatalog", Ok(self.catalog().await))
    }

    #[tool(
        name = "customer.startSession",
        description = "Start the guided customer configuration flow. Returns widget-ready journey state."
    )]
    async fn customer_start_session(
        &self,
        Parameters(input): Parameters<SessionProfileInput>,
    ) -> Result<CallToolResult, ErrorData> {
        respond("customer.startSession", self.start_session(input).await)
    }

    #[tool(
        name = "customer.advanceSession",
        description = "Advance a guided session by collecting one response at a time, applying quick actions, and optionally running the readiness check with submit."
    )]
    async fn customer_advance_session(
        &self,
        Parameters(input): Parameters<AdvanceSessionInput>,
    ) -> Result<CallToolResult, ErrorData> {
        respond("customer.advanceSession", self.advance_session(input).await)
    }

    #[tool(
        name = "customer.refreshSession",
        description = "Refresh guided session state and return deterministic widget payloads."
    )]
    async fn customer_refresh_session(
        &self,
        Parameters(input): Parameters<SessionInput>,
    ) -> Result<CallToolResult, ErrorData> {
        respond("customer.refreshSession", self.refresh_session(input).await)
    }

    #[tool(
        name = "customer.updateOptions",
        description = "Add or remove one option from a customer session."
    )]
    async fn customer_update_options(
        &self,
        Parameters(input): Parameters<SessionInput>,
    ) -> Result<CallToolResult, ErrorData> {
        respond("customer.updateOptions", self.update_options(input).await)
    }

    #[tool(
        name = "customer.submitSession",
        description = "Submit a customer session and run compatibility and budget checks."
    )]
    async fn customer_submit_session(
        &self,
        Parameters(input): Parameters<SessionInput>,
    ) -> Result<CallToolResult, ErrorData> {
        respond("customer.submitSession", self.submit_session(input).await)
    }

    #[tool(name = "ops.getKpis", description = "Get operational KPIs.")]
    async fn ops_get_kpis(&self) -> Result<CallToolResult, ErrorData> {
        respond("ops.getKpis", Ok(self.kpis().await))
    }

    #[tool(name = "ops.getSessionIssues", description = "List issues for a specific session.")]
    async fn ops_get_session_issues(
        &self,
        Parameters(input): Parameters<SessionIssuesInput>,
    ) -> Result<CallToolResult, ErrorData> {
        respond("ops.getSessionIssues", Ok(self.session_issues(input).await))
    }

    #[tool(name = "ops.getIssues", description = "List all open and closed issues.")]
    async fn ops_get_issues(&self) -> Result<CallToolResult, ErrorData> {
        respond("ops.getIssues", Ok(self.issues().await))
    }

    #[tool(
        name = "ops.getOpsBoard",
        description = "Get prioritized operational fixes and feature suggestions for the ops cockpit."
    )]
    async fn ops_get_ops_board(
        &self,
        Parameters(input): Parameters<OpsBoardInput>,
    ) -> Result<CallToolResult, ErrorData> {
        respond("ops.getOpsBoard", Ok(self.ops_board(input).await))
    }

    #[tool(name = "dev.fixIssue", description = "Apply the fix for an open issue.")]
    async fn dev_fix_issue(
        &self,
        Parameters(input): Parameters<FixIssueInput>,
    ) -> Result<CallToolResult, ErrorData> {
        respond("dev.fixIssue", self.fix_issue(input).await)
    }
}
