//! Markers and sentinels found in Terraform/OpenTofu plan output

use super::blocks::BlockMarkers;

/// Drift notice printed before the plan when state was modified out of band
pub const OUTSIDE_BLOCK: BlockMarkers = BlockMarkers {
    start: "Note: Objects have changed outside of Terraform",
    end: "Unless you have made equivalent changes to your configuration",
};

/// The list of resource actions the plan intends to perform
pub const CHANGE_BLOCK: BlockMarkers = BlockMarkers {
    start: "Terraform will perform the following actions:",
    end: SUMMARY_LINE_PREFIX,
};

pub const WARNING_BLOCK: BlockMarkers = BlockMarkers {
    start: "Warning:",
    end: "─────",
};

/// Prefix of the `Plan: N to add, N to change, N to destroy.` tally
pub const SUMMARY_LINE_PREFIX: &str = "Plan: ";

/// Reported as the summary when the plan has no tally line at all
pub const NO_CHANGES: &str = "No changes. Infrastructure is up-to-date.";
