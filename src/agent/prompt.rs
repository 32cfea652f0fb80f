//! Prompt construction
//!
//! Replays the session into a single ReAct-style instruction and holds the
//! assistant's system message.

use crate::core::Turn;

/// Placeholder replaced by the rendered history
const INPUT_PLACEHOLDER: &str = "{input}";

/// Reasoning-then-acting scaffold wrapped around the conversation
pub const REACT_TEMPLATE: &str = "Answer the following questions as best you can. You have access to tools provided.

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take
Action Input: the input to the action
Observation: the result of the action
... (this process can repeat multiple times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question, with the urls used for the answer.

Begin!
Question: {input}
";

/// Build the assistant system message for a termination marker
pub fn assistant_system_message(termination_marker: &str) -> String {
    format!(
        "You are a helpful AI assistant.
Solve tasks using the tools you are provided and your language skills.

Here are the tools you can use and the scenarios to use them:

    1. search_tool: provides search ability for you to get general web search results

Solve the task step by step if you need to. If a plan is not provided, explain your plan first.
When you find an answer, verify the answer carefully. Include verifiable evidence in your response if possible, and cite the urls of the search results you relied on.
Reply \"{marker}\" in the end of the final answer sentence when everything is done. If it seems there was no question or input provided and you are going on loop, also reply \"{marker}\"",
        marker = termination_marker
    )
}

/// Render turns as `Role: content` lines, in order
pub fn render_history(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|turn| format!("{}: {}", turn.role.label(), turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convert the session into the prompt sent to the agent
pub fn format_prompt(turns: &[Turn]) -> String {
    REACT_TEMPLATE.replace(INPUT_PLACEHOLDER, &render_history(turns))
}
