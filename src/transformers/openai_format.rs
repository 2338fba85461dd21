//! Host messages → OpenAI chat-completions messages

use crate::types::{
    ContentBlock, MessageContent, MessageParam, OpenAiContentPart, OpenAiFunctionCall,
    OpenAiMessage, OpenAiRole, OpenAiToolCall, Role, ToolResultContent,
};

/// Placeholder for images inside tool results; tool messages only carry text.
const TOOL_RESULT_IMAGE_NOTE: &str = "(see following user message for image)";

/// Convert host messages to OpenAI messages.
///
/// Tool results inside a user turn become `tool` messages placed before the
/// remaining user content. Tool uses inside an assistant turn become
/// `tool_calls`.
pub fn convert_to_openai_messages(messages: &[MessageParam]) -> Vec<OpenAiMessage> {
    let mut out = Vec::with_capacity(messages.len());

    for message in messages {
        match &message.content {
            MessageContent::Text(text) => {
                out.push(OpenAiMessage::text(message.role.into(), text.clone()));
            }
            MessageContent::Blocks(blocks) => match message.role {
                Role::User => convert_user_blocks(blocks, &mut out),
                Role::Assistant => out.push(convert_assistant_blocks(blocks)),
            },
        }
    }

    out
}

fn convert_user_blocks(blocks: &[ContentBlock], out: &mut Vec<OpenAiMessage>) {
    let mut parts = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                ..
            } => {
                out.push(OpenAiMessage::tool_result(
                    tool_use_id.clone(),
                    tool_result_text(content.as_ref()),
                ));
            }
            ContentBlock::Text { text } => parts.push(OpenAiContentPart::text(text.clone())),
            ContentBlock::Image { source } => {
                parts.push(OpenAiContentPart::image_url(source.to_data_url()))
            }
            // A user turn never carries tool uses.
            ContentBlock::ToolUse { .. } => {}
        }
    }

    if !parts.is_empty() {
        out.push(OpenAiMessage::parts(OpenAiRole::User, parts));
    }
}

fn tool_result_text(content: Option<&ToolResultContent>) -> String {
    match content {
        None => String::new(),
        Some(ToolResultContent::Text(text)) => text.clone(),
        Some(ToolResultContent::Blocks(blocks)) => blocks
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Image { .. } => Some(TOOL_RESULT_IMAGE_NOTE),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn convert_assistant_blocks(blocks: &[ContentBlock]) -> OpenAiMessage {
    let mut texts = Vec::new();
    let mut tool_calls = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Text { text } => texts.push(text.as_str()),
            ContentBlock::ToolUse { id, name, input } => tool_calls.push(OpenAiToolCall {
                id: id.clone(),
                call_type: "function".to_string(),
                function: OpenAiFunctionCall {
                    name: name.clone(),
                    arguments: input.to_string(),
                },
            }),
            // Assistants cannot send images; tool results belong to user turns.
            ContentBlock::Image { .. } | ContentBlock::ToolResult { .. } => {}
        }
    }

    let mut message = OpenAiMessage::text(OpenAiRole::Assistant, texts.join("\n"));
    if !tool_calls.is_empty() {
        message.tool_calls = Some(tool_calls);
    }
    message
}
