//! Human-readable rendering of listings and search results. Color is gated
//! on both the global `--shell` flag (machine mode never gets color) and
//! whether stdout is actually a terminal.

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use sessionctl_types::{SearchHit, SessionRecord};
use std::io::stdout;

pub fn color_enabled(shell_mode: bool) -> bool {
    !shell_mode && stdout().is_terminal()
}

fn colored_agent_tag(short_name: &str, color: bool) -> String {
    if !color {
        return short_name.to_string();
    }
    match short_name {
        "codex" => short_name.magenta().to_string(),
        _ => short_name.cyan().to_string(),
    }
}

pub fn print_session_line(record: &SessionRecord, color: bool) {
    let short_id = &record.session_id[..record.session_id.len().min(8)];
    let headline = record.headline().unwrap_or("(no preview available)");
    let tag = colored_agent_tag(record.agent.short_name(), color);
    println!("{}  {}  {}  {}", short_id, tag, record.modified_at.format("%Y-%m-%d %H:%M"), truncate(headline, 80));
}

pub fn print_search_hit(hit: &SearchHit, color: bool) {
    let doc = &hit.document;
    let short_id = &doc.session_id[..doc.session_id.len().min(8)];
    let tag = colored_agent_tag(&doc.agent, color);
    let project = doc.project.as_deref().unwrap_or("-");
    if color {
        println!("{}  {}  {:.3}  {}", short_id.bold(), tag, hit.final_score, project);
    } else {
        println!("{short_id}  {tag}  {:.3}  {project}", hit.final_score);
    }
    println!("    {}", hit.snippet);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.replace('\n', " ")
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}…", truncated.replace('\n', " "))
    }
}
