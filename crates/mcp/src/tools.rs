//! MCP tool names for Vanguide
//!
//! Tools are grouped the way agents use them:
//! - Catalog: van models and option modules
//! - Customer: the guided configuration session
//! - Ops: KPIs, issues and the prioritized board
//! - Dev: applying a fix to an open issue

/// Catalog tools category
pub struct CatalogTools;

/// Customer session tools category
pub struct CustomerTools;

/// Ops cockpit tools category
pub struct OpsTools;

/// Developer fix tools category
pub struct DevTools;

/// Tool category trait
pub trait ToolCategory {
    /// Category name, also the prefix of every tool name in it
    fn category_name() -> &'static str
    where
        Self: Sized;
    /// List of tool names in this category
    fn tool_names() -> &'static [&'static str]
    where
        Self: Sized;
}

impl ToolCategory for CatalogTools {
    fn category_name() -> &'static str {
        "catalog"
    }
    fn tool_names() -> &'static [&'static str] {
        &["catalog.getCatalog"]
    }
}

impl ToolCategory for CustomerTools {
    fn category_name() -> &'static str {
        "customer"
    }
    fn tool_names() -> &'static [&'static str] {
        &[
            "customer.startSession",
            "customer.advanceSession",
            "customer.refreshSession",
            "customer.updateOptions",
            "customer.submitSession",
        ]
    }
}

impl ToolCategory for OpsTools {
    fn category_name() -> &'static str {
        "ops"
    }
    fn tool_names() -> &'static [&'static str] {
        &["ops.getKpis", "ops.getSessionIssues", "ops.getIssues", "ops.getOpsBoard"]
    }
}

impl ToolCategory for DevTools {
    fn category_name() -> &'static str {
        "dev"
    }
    fn tool_names() -> &'static [&'static str] {
        &["dev.fixIssue"]
    }
}

/// All tool names
pub const ALL_TOOL_NAMES: &[&str] = &[
    "catalog.getCatalog",
    "customer.startSession",
    "customer.advanceSession",
    "customer.refreshSession",
    "customer.updateOptions",
    "customer.submitSession",
    "ops.getKpis",
    "ops.getSessionIssues",
    "ops.getIssues",
    "ops.getOpsBoard",
    "dev.fixIssue",
];

/// Total number of tools
pub const TOTAL_TOOLS: usize = ALL_TOOL_NAMES.len();
