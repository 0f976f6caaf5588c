use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// One of the user's most frequent conversation subjects
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SubjectStat {
    pub subject_text: String,
    pub pair_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Aggregate view of the user's stored memories
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MemoryStats {
    pub total_memory_count: u64,
    #[serde(default)]
    pub top_subjects: Vec<SubjectStat>,
}

impl MemoryStats {
    /// Render the memory context section sent as `memoryStats`
    pub fn to_prompt(&self) -> String {
        let mut prompt = String::from("\n\n## USER MEMORY CONTEXT\n");
        let _ = writeln!(prompt, "Total Conversations: {}", self.total_memory_count);

        if !self.top_subjects.is_empty() {
            prompt.push_str("\nTop Conversation Subjects:\n");
            for (i, subject) in self.top_subjects.iter().enumerate() {
                let description = match subject.description.as_deref() {
                    Some(d) if !d.is_empty() => format!(" - {}", d),
                    _ => String::new(),
                };
                let _ = writeln!(
                    prompt,
                    "{}. {} ({} conversations){}",
                    i + 1,
                    subject.subject_text,
                    subject.pair_count,
                    description
                );
            }
        }

        prompt.push_str(
            "\nThis context helps you understand the user's interests and conversation patterns. \
             Use this information to provide more relevant and personalized responses.",
        );
        prompt
    }
}
