use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub ticket_number: String,
    pub valid_from: String,
    pub valid_until: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(
        default,
        rename = "class",
        skip_serializing_if = "Option::is_none"
    )]
    pub ticket_class: Option<String>,
    pub last_updated: String,
    pub update_status: String,
}

/// Result of one refresh cycle. Serialized as-is by the manual-trigger
/// endpoint and `refresh --json`, so the record travels under `ticket_data`.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub success: bool,
    pub message: String,
    #[serde(rename = "ticket_data")]
    pub record: TicketRecord,
}

/// Current wall-clock time in the display format the mirrored page uses.
pub fn display_timestamp() -> String {
    Local::now().format(DISPLAY_TIMESTAMP_FORMAT).to_string()
}

/// Calendar validity window for a monthly ticket: first day of the given
/// month at 00:00 through first day of the next month at 03:00.
pub fn computed_validity_window(today: NaiveDate) -> (String, String) {
    let month_start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);
    let next_month_start = if today.month() == 12 {
        NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
    }
    .unwrap_or(month_start);

    (
        format!("{} 00:00", month_start.format("%d.%m.%Y")),
        format!("{} 03:00", next_month_start.format("%d.%m.%Y")),
    )
}
