use serde_json::json;
use vanguide_core::{Catalog, GuidedSessionService};

use crate::commands::CommandResult;

/// Rebuilds the seeded catalog through the validating constructor and reports the
/// resulting (empty) store state.
pub fn run() -> CommandResult {
    let seeded = Catalog::seeded();
    let catalog = match Catalog::new(seeded.vans().to_vec(), seeded.options().to_vec()) {
        Ok(catalog) => catalog,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "catalog_integrity",
                format!("seed catalog rejected: {error}"),
                5,
            );
        }
    };

    let service = GuidedSessionService::new(catalog);
    let summary = service.seed_state_summary();
    let van_ids: Vec<&str> = service.catalog().vans().iter().map(|van| van.id.0.as_str()).collect();
    let option_ids: Vec<&str> =
        service.catalog().options().iter().map(|option| option.id.0.as_str()).collect();

    CommandResult::success(
        "seed",
        format!("catalog seeded: {} vans, {} options", summary.van_count, summary.option_count),
        Some(json!({
            "summary": summary,
            "vanIds": van_ids,
            "optionIds": option_ids,
        })),
    )
}
