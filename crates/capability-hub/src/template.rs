//! URI templates (`scheme://literal/{param}`) and first-match resolution.

use std::collections::BTreeMap;

use crate::descriptor::CapabilityDescriptor;
use crate::error::{CapabilityError, CapabilityResult};

/// One `/`-delimited piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// Parameter values extracted from a concrete URI, keyed by placeholder name.
pub type TemplateParams = BTreeMap<String, String>;

/// A parsed URI pattern.
///
/// Placeholders occupy whole segments and never span a `/`. Matching is
/// structural: same scheme, same segment count, literals equal position by
/// position, and every placeholder bound to a non-empty segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    pattern: String,
    scheme: String,
    segments: Vec<Segment>,
}

impl UriTemplate {
    /// Parse a pattern such as `config://user/{user_id}`.
    pub fn parse(pattern: &str) -> CapabilityResult<Self> {
        let invalid = |reason: String| CapabilityError::InvalidDescriptor {
            identity: pattern.to_string(),
            reason,
        };

        let (scheme, rest) = pattern
            .split_once("://")
            .ok_or_else(|| invalid("template needs a scheme:// prefix".to_string()))?;
        if scheme.is_empty() || scheme.contains(['{', '}', '/']) {
            return Err(invalid(format!("invalid scheme '{scheme}'")));
        }

        let mut segments = Vec::new();
        for raw in rest.split('/') {
            let segment = match raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => {
                    if !is_placeholder_name(name) {
                        return Err(invalid(format!("invalid placeholder name '{name}'")));
                    }
                    let taken = segments
                        .iter()
                        .any(|s| matches!(s, Segment::Placeholder(n) if n == name));
                    if taken {
                        return Err(invalid(format!("placeholder '{name}' appears twice")));
                    }
                    Segment::Placeholder(name.to_string())
                }
                None => {
                    if raw.contains(['{', '}']) {
                        return Err(invalid(format!(
                            "placeholders must span a whole segment, got '{raw}'"
                        )));
                    }
                    Segment::Literal(raw.to_string())
                }
            };
            segments.push(segment);
        }

        if !segments
            .iter()
            .any(|s| matches!(s, Segment::Placeholder(_)))
        {
            return Err(invalid("template has no placeholders".to_string()));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            scheme: scheme.to_string(),
            segments,
        })
    }

    /// The original pattern text.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Placeholder names in pattern order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Try to match a concrete URI, returning the extracted parameters.
    pub fn matches(&self, uri: &str) -> Option<TemplateParams> {
        let (scheme, rest) = uri.split_once("://")?;
        if scheme != self.scheme {
            return None;
        }

        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = TemplateParams::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Placeholder(_) if part.is_empty() => return None,
                Segment::Placeholder(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(params)
    }
}

fn is_placeholder_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Find the first template (in iteration order) matching `uri`.
///
/// Iteration order is registration order when fed from
/// [`CapabilityRegistry::all_templates`](crate::CapabilityRegistry::all_templates),
/// so the first-registered template wins when several match.
pub fn match_uri<'a, I>(templates: I, uri: &str) -> Option<(&'a CapabilityDescriptor, TemplateParams)>
where
    I: IntoIterator<Item = &'a CapabilityDescriptor>,
{
    templates.into_iter().find_map(|descriptor| {
        descriptor
            .template()
            .and_then(|template| template.matches(uri))
            .map(|params| (descriptor, params))
    })
}
