use chrono::{DateTime, Local, Offset, TimeZone};

use crate::models::{ContentPart, PromptRequest};
use crate::session::Session;

/// Caller-facing options for one streaming prompt
#[derive(Debug, Clone, Default)]
pub struct PromptOptions {
    pub input: Vec<ContentPart>,
    pub personality_summary: String,
    pub memory_stats: Option<String>,
}

impl PromptOptions {
    pub fn new(input: Vec<ContentPart>) -> Self {
        Self {
            input,
            ..Default::default()
        }
    }

    pub fn with_personality_summary(mut self, summary: impl Into<String>) -> Self {
        self.personality_summary = summary.into();
        self
    }

    pub fn with_memory_stats(mut self, stats: impl Into<String>) -> Self {
        self.memory_stats = Some(stats.into());
        self
    }
}

/// Ambient values injected into every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub device_id: String,
    pub user_local_time: String,
}

impl RequestContext {
    /// Capture the local clock at call time
    pub fn now(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            user_local_time: format_local_time(&Local::now()),
        }
    }
}

/// Format as `10/19/2026, 3:04:05 PM GMT+2`
pub fn format_local_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let offset_secs = time.offset().fix().local_minus_utc();
    format!(
        "{} {}",
        time.format("%-m/%-d/%Y, %-I:%M:%S %p"),
        gmt_label(offset_secs)
    )
}

fn gmt_label(offset_secs: i32) -> String {
    if offset_secs == 0 {
        return "GMT".to_string();
    }
    let sign = if offset_secs < 0 { '-' } else { '+' };
    let abs = offset_secs.abs();
    let (hours, minutes) = (abs / 3600, (abs % 3600) / 60);
    if minutes == 0 {
        format!("GMT{}{}", sign, hours)
    } else {
        format!("GMT{}{}:{:02}", sign, hours, minutes)
    }
}

/// Assemble the prompt body; input order is preserved as given
pub fn build_request(
    options: PromptOptions,
    session: &Session,
    context: &RequestContext,
) -> PromptRequest {
    PromptRequest {
        user_id: session.user_id.clone(),
        input: options.input,
        personality_summary: options.personality_summary,
        user_local_time: context.user_local_time.clone(),
        device_id: context.device_id.clone(),
        memory_stats: options.memory_stats.unwrap_or_default(),
    }
}
