//! Final answer and source extraction
//!
//! Turns the structured history of one agent run into the text shown to the
//! user: the narrative after `Final Answer:` plus the URLs surfaced by every
//! search tool response, in the order they were encountered.

use serde::Deserialize;
use std::fmt;

use crate::core::{AgentResponse, Result, ScoutError};

/// Marker that introduces the answer inside an assistant message
pub const FINAL_ANSWER_MARKER: &str = "Final Answer";

const FINAL_ANSWER_PREFIX: &str = "Final Answer:";

/// Header placed above the list of cited URLs
const SOURCES_HEADER: &str = "\n\nSources:\n";

/// Answer text and cited URLs derived from one agent run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedAnswer {
    pub answer: String,
    /// Every URL in encounter order; duplicates are kept
    pub urls: Vec<String>,
}

impl ExtractedAnswer {
    /// The string displayed to the user
    pub fn text(&self) -> String {
        if self.urls.is_empty() {
            self.answer.clone()
        } else {
            format!("{}{}{}", self.answer, SOURCES_HEADER, self.urls.join("\n"))
        }
    }
}

impl fmt::Display for ExtractedAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Strict shape of one search result inside a tool payload
#[derive(Debug, Deserialize)]
struct SourceRecord {
    #[serde(default)]
    url: Option<String>,
}

/// Pull the answer out of a message, if it qualifies as a final answer
fn final_answer_in(content: &str, termination_marker: &str) -> Option<String> {
    if !content.contains(FINAL_ANSWER_MARKER) || !content.contains(termination_marker) {
        return None;
    }

    let after = content
        .rsplit(FINAL_ANSWER_PREFIX)
        .next()
        .unwrap_or(content);
    let before = after.split(termination_marker).next().unwrap_or(after);
    Some(before.trim().to_string())
}

/// Decode a tool payload as a sequence of objects and collect their URLs
pub fn decode_source_urls(payload: &str) -> Result<Vec<String>> {
    let records: Vec<SourceRecord> = serde_json::from_str(payload)
        .map_err(|e| ScoutError::MalformedPayload(e.to_string()))?;

    Ok(records.into_iter().filter_map(|r| r.url).collect())
}

/// Extract the final answer and sources from an agent run.
///
/// When several messages qualify as final answers the last one wins.
/// Payloads that do not decode are skipped.
pub fn extract_answer(response: &AgentResponse, termination_marker: &str) -> ExtractedAnswer {
    let mut extracted = ExtractedAnswer::default();

    for entry in &response.chat_history {
        if let Some(answer) = entry
            .content
            .as_deref()
            .and_then(|c| final_answer_in(c, termination_marker))
        {
            extracted.answer = answer;
        }

        let Some(tool_responses) = &entry.tool_responses else {
            continue;
        };

        for tool_response in tool_responses {
            match decode_source_urls(&tool_response.content) {
                Ok(urls) => extracted.urls.extend(urls),
                Err(e) => tracing::warn!(
                    tool_call_id = %tool_response.tool_call_id,
                    error = %e,
                    "skipping tool response without sources"
                ),
            }
        }
    }

    extracted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{HistoryEntry, Role, ToolResponse};

    const MARKER: &str = "TERMINATE";

    fn assistant(content: &str) -> HistoryEntry {
        HistoryEntry::text(Role::Assistant, "Assistant", content)
    }

    fn tools(payloads: &[&str]) -> HistoryEntry {
        HistoryEntry::tool_results(
            "User",
            payloads
                .iter()
                .enumerate()
                .map(|(i, p)| ToolResponse::new(format!("call_{}", i), *p))
                .collect(),
        )
    }

    fn response(entries: Vec<HistoryEntry>) -> AgentResponse {
        AgentResponse {
            chat_history: entries,
            ..Default::default()
        }
    }

    #[test]
    fn test_single_final_answer() {
        let run = response(vec![assistant("Thought: done\nFinal Answer: PARIS TERMINATE")]);
        let extracted = extract_answer(&run, MARKER);
        assert_eq!(extracted.answer, "PARIS");
        assert_eq!(extracted.text(), "PARIS");
    }

    #[test]
    fn test_sources_in_encounter_order() {
        let run = response(vec![
            tools(&[r#"[{"url":"http://a"}]"#]),
            tools(&[r#"[{"url":"http://b"}]"#]),
            assistant("Final Answer: It is B. TERMINATE"),
        ]);
        let text = extract_answer(&run, MARKER).text();
        assert!(text.ends_with("Sources:\nhttp://a\nhttp://b"));
        assert_eq!(text, "It is B.\n\nSources:\nhttp://a\nhttp://b");
    }

    #[test]
    fn test_no_final_answer_still_lists_sources() {
        let run = response(vec![
            assistant("Final Answer: missing the marker"),
            tools(&[r#"[{"url":"http://a","content":"x"}]"#]),
            assistant("I am done TERMINATE"),
        ]);
        let extracted = extract_answer(&run, MARKER);
        assert_eq!(extracted.answer, "");
        assert_eq!(extracted.text(), "\n\nSources:\nhttp://a");
    }

    #[test]
    fn test_nothing_found_is_empty() {
        let run = response(vec![
            assistant("thinking"),
            HistoryEntry {
                role: Role::User,
                name: None,
                content: None,
                tool_calls: Vec::new(),
                tool_responses: None,
            },
        ]);
        assert_eq!(extract_answer(&run, MARKER), ExtractedAnswer::default());
    }

    #[test]
    fn test_malformed_payload_is_skipped() {
        let run = response(vec![
            tools(&[
                "Error: quota exceeded",
                r#"[{"url":"http://good"}]"#,
                r#"[{'url': 'http://python-literal'}]"#,
                r#"{"url":"http://not-a-list"}"#,
                r#"[{"url": 42}]"#,
            ]),
            assistant("Final Answer: ok TERMINATE"),
        ]);
        let extracted = extract_answer(&run, MARKER);
        assert_eq!(extracted.answer, "ok");
        assert_eq!(extracted.urls, vec!["http://good"]);
    }

    #[test]
    fn test_objects_without_url_are_ignored() {
        let urls = decode_source_urls(r#"[{"title":"no link"},{"url":"http://x","score":1}]"#)
            .unwrap();
        assert_eq!(urls, vec!["http://x"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let run = response(vec![tools(&[
            r#"[{"url":"http://a"},{"url":"http://a"}]"#,
        ])]);
        assert_eq!(extract_answer(&run, MARKER).urls, vec!["http://a", "http://a"]);
    }

    #[test]
    fn test_last_qualifying_entry_wins() {
        let run = response(vec![
            assistant("Final Answer: first TERMINATE"),
            assistant("Final Answer: second TERMINATE"),
        ]);
        assert_eq!(extract_answer(&run, MARKER).answer, "second");
    }

    #[test]
    fn test_text_after_last_prefix_before_marker() {
        let content = "Final Answer: draft\nFinal Answer:  Rome \nTERMINATE trailing";
        assert_eq!(final_answer_in(content, MARKER).as_deref(), Some("Rome"));
    }

    #[test]
    fn test_marker_without_colon_keeps_whole_text() {
        let content = "The Final Answer is 4 TERMINATE";
        assert_eq!(
            final_answer_in(content, MARKER).as_deref(),
            Some("The Final Answer is 4")
        );
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let run = response(vec![
            tools(&[r#"[{"url":"http://a"}]"#, "garbage"]),
            assistant("Final Answer: yes TERMINATE"),
        ]);
        assert_eq!(extract_answer(&run, MARKER), extract_answer(&run, MARKER));
    }
}
