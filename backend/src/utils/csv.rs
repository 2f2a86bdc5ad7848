use crate::models::AttendanceRecord;

pub const ATTENDANCE_HEADER: [&str; 10] = [
    "record_id",
    "recorded_at_epoch",
    "recorded_at",
    "session_id",
    "token_suffix",
    "student_id",
    "status",
    "ip",
    "user_agent",
    "request_id",
];

// Spreadsheet apps evaluate cells starting with these characters.
fn needs_formula_guard(value: &str) -> bool {
    matches!(
        value.chars().next(),
        Some('=' | '+' | '-' | '@' | '\t' | '\r')
    )
}

fn escape_cell(value: &str) -> String {
    let mut sanitized = value.replace('"', "\"\"");
    if needs_formula_guard(&sanitized) {
        sanitized.insert(0, '\'');
    }
    format!("\"{}\"", sanitized)
}

pub fn append_csv_row<S: AsRef<str>>(buffer: &mut String, fields: &[S]) {
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            buffer.push(',');
        }
        buffer.push_str(&escape_cell(field.as_ref()));
    }
    buffer.push('\n');
}

pub fn attendance_row(record: &AttendanceRecord) -> [String; 10] {
    let provenance = &record.provenance;
    [
        record.id.to_string(),
        record.recorded_at_epoch.to_string(),
        record.recorded_at_local.clone(),
        record.session_id.to_string(),
        record.token_suffix.clone(),
        record.student_id.clone(),
        record.status.as_str().to_string(),
        provenance.ip.clone().unwrap_or_default(),
        provenance.user_agent.clone().unwrap_or_default(),
        provenance.request_id.clone().unwrap_or_default(),
    ]
}
