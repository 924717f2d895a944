//! Terminal rendering of a learning path, plus the resource-string link
//! extraction shared with the browser view's pattern.

use lazy_static::lazy_static;
use regex::Regex;

use crate::schema::LearningPath;

lazy_static! {
    // Matches a trailing well-formed "(http(s)://...)" suffix; everything
    // before it is display text. Anything else stays plain text.
    static ref LINK_RE: Regex =
        Regex::new(r"(?s)^(.*?)\s*\((https?://[^\s()]+)\)$").expect("link pattern is valid");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLink {
    pub text: String,
    pub url: Option<String>,
}

/// Split a resource string into display text and an optional URL.
///
/// Lenient on purpose: a malformed entry (unbalanced parentheses, bare
/// text, a non-http scheme) degrades to plain display text with no link.
pub fn extract_link(resource: &str) -> ResourceLink {
    match LINK_RE.captures(resource) {
        Some(caps) => ResourceLink {
            text: caps[1].trim().to_string(),
            url: Some(caps[2].to_string()),
        },
        None => ResourceLink {
            text: resource.to_string(),
            url: None,
        },
    }
}

/// Format a learning path for the terminal. Pure function of its input.
pub fn render_path(path: &LearningPath) -> String {
    let mut out = String::new();
    for step in &path.steps {
        out.push_str(&format!(
            "{}. {} [{}]\n",
            step.order, step.title, step.estimated_time
        ));
        out.push_str(&format!("   {}\n", step.description));
        out.push_str(&format!("   Resources ({}):\n", step.resources.len()));
        for resource in &step.resources {
            let link = extract_link(resource);
            match link.url {
                Some(url) => out.push_str(&format!("     - {} <{}>\n", link.text, url)),
                None => out.push_str(&format!("     - {}\n", link.text)),
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Step;

    #[test]
    fn test_extract_link_with_url() {
        let link = extract_link("Read the docs (https://example.com/docs)");
        assert_eq!(link.text, "Read the docs");
        assert_eq!(link.url.as_deref(), Some("https://example.com/docs"));
    }

    #[test]
    fn test_extract_link_plain_text() {
        let link = extract_link("Practice daily");
        assert_eq!(link.text, "Practice daily");
        assert_eq!(link.url, None);
    }

    #[test]
    fn test_extract_link_http_scheme() {
        let link = extract_link("Old mirror (http://example.org)");
        assert_eq!(link.text, "Old mirror");
        assert_eq!(link.url.as_deref(), Some("http://example.org"));
    }

    #[test]
    fn test_extract_link_unbalanced_parens_degrades() {
        let link = extract_link("Read the docs (https://example.com/docs");
        assert_eq!(link.text, "Read the docs (https://example.com/docs");
        assert_eq!(link.url, None);
    }

    #[test]
    fn test_extract_link_url_must_be_suffix() {
        let link = extract_link("See (https://example.com) for details");
        assert_eq!(link.url, None);
    }

    #[test]
    fn test_extract_link_takes_last_parenthesized_url() {
        let link = extract_link("Intro (part one) (https://example.com/intro)");
        assert_eq!(link.text, "Intro (part one)");
        assert_eq!(link.url.as_deref(), Some("https://example.com/intro"));
    }

    fn sample_path() -> LearningPath {
        LearningPath {
            steps: vec![Step {
                order: serde_json::Number::from(1u32),
                title: "Learn the basics".to_string(),
                description: "Work through the official book".to_string(),
                resources: vec![
                    "The Book (https://doc.rust-lang.org/book/)".to_string(),
                    "Practice daily".to_string(),
                ],
                estimated_time: "2 weeks".to_string(),
            }],
        }
    }

    #[test]
    fn test_render_path_contents() {
        let rendered = render_path(&sample_path());
        assert!(rendered.contains("1. Learn the basics [2 weeks]"));
        assert!(rendered.contains("Resources (2):"));
        assert!(rendered.contains("- The Book <https://doc.rust-lang.org/book/>"));
        assert!(rendered.contains("- Practice daily"));
    }

    #[test]
    fn test_render_path_is_idempotent() {
        let path = sample_path();
        assert_eq!(render_path(&path), render_path(&path));
    }

    #[test]
    fn test_render_empty_path() {
        let empty = LearningPath { steps: vec![] };
        assert_eq!(render_path(&empty), "");
    }
}
