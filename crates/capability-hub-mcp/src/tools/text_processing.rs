//! Text analysis and transformation tools.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use capability_hub::{
    CapabilityDescriptor, CapabilityError, CapabilityResult, ParamSpec, ParamType, Payload,
};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email pattern")
});

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"'()\[\]{}]+"#).expect("url pattern"));

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence pattern"));

static NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern"));

fn text_param() -> ParamSpec {
    ParamSpec::required("text", ParamType::String).describe("Input text")
}

/// Matches of `re` in order of first appearance, without repeats.
fn unique_matches(re: &Regex, text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    re.find_iter(text)
        .map(|m| m.as_str().to_string())
        .filter(|m| seen.insert(m.clone()))
        .collect()
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Uppercase the first character, lowercase everything else.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub fn slugify(text: &str) -> String {
    NON_SLUG
        .replace_all(&text.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn text_tools() -> CapabilityResult<Vec<CapabilityDescriptor>> {
    Ok(vec![
        CapabilityDescriptor::tool("count_words", |_, args| {
            let text = args.str("text")?;
            Ok(Payload::Json(json!({
                "words": text.split_whitespace().count(),
                "characters": text.chars().count(),
                "characters_no_spaces": text.chars().filter(|c| *c != ' ').count(),
                "lines": text.split('\n').count(),
            })))
        })
        .title("Count Words")
        .description("Count words in text")
        .param(text_param())
        .build()?,
        CapabilityDescriptor::tool("convert_case", |_, args| {
            let text = args.str("text")?;
            let converted = match args.str("case_type")?.to_ascii_lowercase().as_str() {
                "upper" => text.to_uppercase(),
                "lower" => text.to_lowercase(),
                "title" => title_case(text),
                "capitalize" => capitalize(text),
                _ => {
                    return Err(CapabilityError::invalid(
                        "case_type",
                        "Invalid case_type. Use: upper, lower, title, or capitalize",
                    ))
                }
            };
            Ok(Payload::Text(converted))
        })
        .title("Convert Case")
        .description("Convert text case")
        .param(text_param())
        .param(
            ParamSpec::required("case_type", ParamType::String)
                .describe("One of upper, lower, title, capitalize"),
        )
        .build()?,
        CapabilityDescriptor::tool("extract_emails", |_, args| {
            Ok(Payload::Json(json!(unique_matches(&EMAIL, args.str("text")?))))
        })
        .title("Extract Emails")
        .description("Extract email addresses from text")
        .param(text_param())
        .build()?,
        CapabilityDescriptor::tool("extract_urls", |_, args| {
            Ok(Payload::Json(json!(unique_matches(&URL, args.str("text")?))))
        })
        .title("Extract URLs")
        .description("Extract URLs from text")
        .param(text_param())
        .build()?,
        CapabilityDescriptor::tool("replace_text", |_, args| {
            let text = args.str("text")?;
            let pattern = args.str("pattern")?;
            let replacement = args.str("replacement")?;

            let replaced = if args.bool("use_regex")? {
                let re = Regex::new(pattern)
                    .map_err(|e| CapabilityError::invalid("pattern", format!("invalid regex: {e}")))?;
                re.replace_all(text, replacement).into_owned()
            } else {
                text.replace(pattern, replacement)
            };
            Ok(Payload::Text(replaced))
        })
        .title("Replace Text")
        .description("Replace text with regex support")
        .param(text_param())
        .param(ParamSpec::required("pattern", ParamType::String).describe("Text or regex to find"))
        .param(
            ParamSpec::required("replacement", ParamType::String)
                .describe("Replacement; regex mode expands $1 and $name"),
        )
        .param(ParamSpec::optional("use_regex", ParamType::Boolean).with_default(false))
        .build()?,
        CapabilityDescriptor::tool("clean_text", |_, args| {
            let cleaned: Vec<&str> = args.str("text")?.split_whitespace().collect();
            Ok(Payload::Text(cleaned.join(" ")))
        })
        .title("Clean Text")
        .description("Clean and normalize text")
        .param(text_param())
        .build()?,
        CapabilityDescriptor::tool("generate_slug", |_, args| {
            Ok(Payload::Text(slugify(args.str("text")?)))
        })
        .title("Generate Slug")
        .description("Generate URL-friendly slug from text")
        .param(text_param())
        .build()?,
        CapabilityDescriptor::tool("text_statistics", |_, args| {
            let text = args.str("text")?;
            let words: Vec<&str> = text.split_whitespace().collect();
            let sentences: Vec<&str> = SENTENCE_END
                .split(text)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();

            let average_word_length = if words.is_empty() {
                0.0
            } else {
                words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / words.len() as f64
            };
            let average_sentence_length = if sentences.is_empty() {
                0.0
            } else {
                sentences
                    .iter()
                    .map(|s| s.split_whitespace().count())
                    .sum::<usize>() as f64
                    / sentences.len() as f64
            };
            let unique_words: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();

            Ok(Payload::Json(json!({
                "total_characters": text.chars().count(),
                "total_words": words.len(),
                "total_sentences": sentences.len(),
                "average_word_length": round_to(average_word_length, 2),
                "average_sentence_length": round_to(average_sentence_length, 2),
                "unique_words": unique_words.len(),
                // 200 words per minute
                "reading_time_minutes": round_to(words.len() as f64 / 200.0, 1),
            })))
        })
        .title("Text Statistics")
        .description("Get detailed text statistics")
        .param(text_param())
        .build()?,
    ])
}
