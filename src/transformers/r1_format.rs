//! Host messages → merged-role "R1" format
//!
//! Reasoning models in the DeepSeek R1 / Qwen QwQ families reject consecutive
//! turns with the same role and do not accept a system message, so turns are
//! merged and only `user`/`assistant` roles are produced.

use crate::types::{
    ContentBlock, MessageContent, MessageParam, OpenAiContent, OpenAiContentPart, OpenAiMessage,
};

pub fn convert_to_r1_format(messages: &[MessageParam]) -> Vec<OpenAiMessage> {
    let mut merged: Vec<OpenAiMessage> = Vec::with_capacity(messages.len());

    for message in messages {
        let content = flatten_content(&message.content);
        let role = message.role.into();

        match merged.last_mut() {
            Some(last) if last.role == role => {
                let previous = last
                    .content
                    .take()
                    .unwrap_or_else(|| OpenAiContent::Text(String::new()));
                last.content = Some(merge_content(previous, content));
            }
            _ => merged.push(OpenAiMessage {
                role,
                content: Some(content),
                tool_calls: None,
                tool_call_id: None,
            }),
        }
    }

    merged
}

fn flatten_content(content: &MessageContent) -> OpenAiContent {
    let blocks = match content {
        MessageContent::Text(text) => return OpenAiContent::Text(text.clone()),
        MessageContent::Blocks(blocks) => blocks,
    };

    let mut texts = Vec::new();
    let mut images = Vec::new();
    for block in blocks {
        match block {
            ContentBlock::Text { text } => texts.push(text.as_str()),
            ContentBlock::Image { source } => {
                images.push(OpenAiContentPart::image_url(source.to_data_url()))
            }
            ContentBlock::ToolUse { .. } | ContentBlock::ToolResult { .. } => {}
        }
    }

    if images.is_empty() {
        return OpenAiContent::Text(texts.join("\n"));
    }

    let mut parts = Vec::with_capacity(images.len() + 1);
    if !texts.is_empty() {
        parts.push(OpenAiContentPart::text(texts.join("\n")));
    }
    parts.extend(images);
    OpenAiContent::Parts(parts)
}

fn merge_content(previous: OpenAiContent, next: OpenAiContent) -> OpenAiContent {
    match (previous, next) {
        (OpenAiContent::Text(a), OpenAiContent::Text(b)) => OpenAiContent::Text(format!("{a}\n{b}")),
        (a, b) => {
            let mut parts = into_parts(a);
            parts.extend(into_parts(b));
            OpenAiContent::Parts(parts)
        }
    }
}

fn into_parts(content: OpenAiContent) -> Vec<OpenAiContentPart> {
    match content {
        OpenAiContent::Text(text) => vec![OpenAiContentPart::text(text)],
        OpenAiContent::Parts(parts) => parts,
    }
}
