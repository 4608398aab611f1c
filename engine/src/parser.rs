//! Extracts the prompt and the optional `--size` / `--n` flags from a `/draw` message.
//!
//! Flags are found by substring search, not positional parsing, so they may appear
//! in any order. The prompt is everything before the first flag.

use std::num::IntErrorKind;

use crate::error::DrawError;

pub const DEFAULT_SIZE: &str = "1024x1024";
pub const SMALL_SIZE: &str = "512x512";
pub const LARGE_SIZE: &str = "1024x1024";
pub const MIN_COUNT: u8 = 1;
pub const MAX_COUNT: u8 = 4;

const SIZE_FLAG: &str = "--size";
const COUNT_FLAG: &str = "--n";
const DRAW_TOKEN: &str = "draw";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub prompt: String,
    pub size: String,
    pub count: u8,
}

pub fn parse(raw: &str) -> Result<ParsedCommand, DrawError> {
    let body = strip_command_token(raw).trim();
    if body.is_empty() {
        return Err(DrawError::EmptyPrompt);
    }

    let size_at = body.find(SIZE_FLAG);
    let count_at = body.find(COUNT_FLAG);

    let size = size_at
        .map(|i| resolve_size(&body[i + SIZE_FLAG.len()..]))
        .unwrap_or_else(|| DEFAULT_SIZE.to_string());
    let count = count_at
        .map(|i| resolve_count(&body[i + COUNT_FLAG.len()..]))
        .unwrap_or(MIN_COUNT);

    let prompt_end = [size_at, count_at]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(body.len());
    let prompt = body[..prompt_end].trim();
    if prompt.is_empty() {
        return Err(DrawError::EmptyPrompt);
    }

    Ok(ParsedCommand {
        prompt: prompt.to_string(),
        size,
        count,
    })
}

/// Removes a leading `/draw` (or bare `draw`) token. Text without one is returned as is.
fn strip_command_token(raw: &str) -> &str {
    let text = raw.trim_start();
    let unslashed = text.strip_prefix('/').unwrap_or(text);
    match unslashed.strip_prefix(DRAW_TOKEN) {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest,
        _ => text,
    }
}

fn resolve_size(after_flag: &str) -> String {
    let value = after_flag.trim();
    if value.starts_with("small") {
        return SMALL_SIZE.into();
    }
    if value.starts_with("large") {
        return LARGE_SIZE.into();
    }

    match value.split_whitespace().next() {
        Some(token) if token.contains('x') && !token.starts_with("--") => token.into(),
        _ => DEFAULT_SIZE.into(),
    }
}

fn resolve_count(after_flag: &str) -> u8 {
    let Some(token) = after_flag.split_whitespace().next() else {
        return MIN_COUNT;
    };

    match token.parse::<i64>() {
        Ok(n) => n.clamp(MIN_COUNT.into(), MAX_COUNT.into()) as u8,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => MAX_COUNT,
        Err(_) => MIN_COUNT,
    }
}
