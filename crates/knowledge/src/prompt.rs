//! Prompt construction for page generation.

use refresher_core::{NewsArticle, Task};

/// Instructions shared by every generation request.
pub const SYSTEM_PROMPT: &str = "You write landing-page copy for a local services marketplace. \
Respond with a single JSON object and nothing else. Required fields: \
\"title\" (under 60 characters) and \"description\" (meta description, under 160 characters). \
Optional fields: \"heroHeadline\", \"heroSubheadline\", \"intro\", \
\"benefits\" (array of {\"title\", \"description\"}), \
\"faqs\" (array of {\"question\", \"answer\"}) and \"callToAction\".";

/// Max characters of each news snippet included in a prompt.
const SNIPPET_CHARS: usize = 280;

/// Build the user message describing one task.
pub fn user_prompt(task: &Task, news: &[NewsArticle]) -> String {
    let mut prompt = match task {
        Task::Industry { industry } => format!(
            "Write the landing page for {} services. Cover what customers should look for \
             when hiring, typical costs and why booking through the marketplace helps.",
            industry.name
        ),
        Task::Location { location } => format!(
            "Write the landing page for local services in {}, {}. Cover what makes hiring \
             in this city different and which services are most in demand.",
            location.city, location.country
        ),
        Task::IndustryLocation { industry, location } => format!(
            "Write the landing page for {} services in {}, {}. Be specific to the city: \
             local regulations, climate or housing stock where relevant, and typical pricing.",
            industry.name, location.city, location.country
        ),
    };

    if !news.is_empty() {
        prompt.push_str("\n\nRecent industry news you may reference where relevant:\n");
        for article in news {
            prompt.push_str("- ");
            prompt.push_str(article.title.trim());
            if !article.source.is_empty() {
                prompt.push_str(&format!(" ({})", article.source.trim()));
            }
            let snippet = truncate_chars(article.snippet.trim(), SNIPPET_CHARS);
            if !snippet.is_empty() {
                prompt.push_str(": ");
                prompt.push_str(snippet);
            }
            prompt.push('\n');
        }
    }

    prompt
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
