use crate::model::EnrichedRepository;
use crate::report::format_languages;

/// README characters embedded in a prompt; keeps requests inside a small
/// local model's context window.
pub const README_EXCERPT_CHARS: usize = 1000;

pub fn build_prompt(repo: &EnrichedRepository) -> String {
    let d = &repo.descriptor;
    let languages = format_languages(&repo.language_percentages());

    format!(
        r#"As a technical writer, create a concise and informative summary of this GitHub repository:

Repository Name: {name}
Description: {description}
Languages: {languages}
Stars: {stars}
Forks: {forks}
Created: {created}
Last Updated: {updated}
Commit Count: {commits}
Topics: {topics}

README Content:
{readme}

Write a 2-3 paragraph summary that explains what this project does, its key features, and its technological significance.
Focus on the purpose, technologies used, and any notable aspects."#,
        name = d.name,
        description = d.description,
        stars = d.stars,
        forks = d.forks,
        created = d.created_at.to_rfc3339(),
        updated = d.updated_at.to_rfc3339(),
        commits = repo.commit_count,
        topics = d.topics.join(", "),
        readme = excerpt(&repo.readme, README_EXCERPT_CHARS),
    )
}

fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
