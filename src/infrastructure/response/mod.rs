use once_cell::sync::Lazy;
use regex::Regex;

static THINK_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<think>[\s\S]*?</think>|<think\s*/>").unwrap());

static REASONING_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<reasoning>[\s\S]*?</reasoning>").unwrap());

/// A reply that is nothing but one fenced block, e.g. ```markdown ... ```
static WRAPPING_FENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[A-Za-z]*\n([\s\S]*?)\n```$").unwrap());

static TRAILING_SPACE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+\n").unwrap());

static MULTIPLE_NEWLINES_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Cleans a model reply before it is shown to the user
pub fn clean_llm_response(response: &str) -> String {
    let mut cleaned = response.replace("\r\n", "\n");

    cleaned = THINK_TAG_PATTERN.replace_all(&cleaned, "").to_string();
    cleaned = REASONING_TAG_PATTERN.replace_all(&cleaned, "").to_string();
    cleaned = cleaned.trim().to_string();

    if let Some(inner) = WRAPPING_FENCE_PATTERN
        .captures(&cleaned)
        .and_then(|caps| caps.get(1))
    {
        cleaned = inner.as_str().trim().to_string();
    }

    cleaned = TRAILING_SPACE_PATTERN.replace_all(&cleaned, "\n").to_string();

    // Collapse multiple consecutive newlines into at most two
    MULTIPLE_NEWLINES_PATTERN
        .replace_all(&cleaned, "\n\n")
        .to_string()
}
