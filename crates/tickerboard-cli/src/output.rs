use serde::Serialize;
use tickerboard_core::{BoardReport, FailureRecord, InstrumentSnapshot, UtcDateTime};
use uuid::Uuid;

/// Machine-readable form of one refresh.
#[derive(Debug, Serialize)]
pub struct ReportDocument<'a> {
    pub generated_at: UtcDateTime,
    pub cycle_id: Uuid,
    pub snapshots: Vec<&'a InstrumentSnapshot>,
    pub failures: Vec<&'a FailureRecord>,
}

impl<'a> From<&'a BoardReport> for ReportDocument<'a> {
    fn from(report: &'a BoardReport) -> Self {
        Self {
            generated_at: report.generated_at,
            cycle_id: report.cycle_id,
            snapshots: report.snapshots().collect(),
            failures: report.failures().collect(),
        }
    }
}

pub fn render_json(report: &BoardReport, pretty: bool) -> Result<String, serde_json::Error> {
    let document = ReportDocument::from(report);
    if pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    }
}
