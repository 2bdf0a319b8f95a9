// ABOUTME: Output formatting for the link administration subcommands
// ABOUTME: Tables for listings, plain URLs for issued links so they can be piped

use chrono::Utc;
use colored::*;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};

use otr_cli::{CliResult, LinkAdmin, ListedLink};
use otr_core::token_preview;

pub async fn issue_links(admin: &LinkAdmin, count: u32) -> CliResult<()> {
    for link in admin.issue(count).await? {
        println!("{}", link.url);
    }
    Ok(())
}

pub async fn list_links(admin: &LinkAdmin, show_urls: bool) -> CliResult<()> {
    let links = admin.list().await?;

    if links.is_empty() {
        println!("{}", "No outstanding registration links".yellow());
        println!("{}", "Use 'otr issue' to create one".dimmed());
        return Ok(());
    }

    let now = Utc::now();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    if show_urls {
        table.set_header(vec!["Issued (UTC)", "Age", "URL"]);
    } else {
        table.set_header(vec!["Issued (UTC)", "Age", "Token"]);
    }

    for link in &links {
        table.add_row(vec![
            link.token.issued_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            format_age(link.token.age(now)),
            link_column(link, show_urls),
        ]);
    }

    println!("{}", table);
    println!("Total: {} outstanding", links.len().to_string().cyan());
    Ok(())
}

pub async fn check_token(admin: &LinkAdmin, token: &str) -> CliResult<bool> {
    let valid = admin.check(token).await?;
    if valid {
        println!("{} Token is valid and unused", "✓".green().bold());
    } else {
        println!("{} Token is not valid", "✗".red().bold());
    }
    Ok(valid)
}

pub async fn import_token(
    admin: &LinkAdmin,
    token: &str,
    issued_at: Option<chrono::DateTime<Utc>>,
) -> CliResult<()> {
    let link = admin.import(token, issued_at).await?;
    println!("{} Imported token", "✓".green().bold());
    println!("{}", link.url);
    Ok(())
}

pub async fn purge_links(admin: &LinkAdmin, older_than_days: u32) -> CliResult<()> {
    let removed = admin.purge(older_than_days).await?;
    println!(
        "{} Removed {} token(s) older than {} day(s)",
        "✓".green().bold(),
        removed.to_string().cyan(),
        older_than_days
    );
    Ok(())
}

/// Full URL, or the log-safe token prefix
fn link_column(link: &ListedLink, show_urls: bool) -> String {
    if show_urls {
        link.url.clone()
    } else {
        token_preview(&link.token.value)
    }
}

fn format_age(age: chrono::Duration) -> String {
    if age.num_days() > 0 {
        format!("{}d", age.num_days())
    } else if age.num_hours() > 0 {
        format!("{}h", age.num_hours())
    } else {
        format!("{}m", age.num_minutes().max(0))
    }
}
