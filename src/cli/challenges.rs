//! Challenge browsing, bookmarks and submissions

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use tracing::{debug, warn};

use createathon::models::{Challenge, ChallengeId, Difficulty, Submission, UserProgress};
use createathon::services::ChallengeQuery;
use createathon::views::challenges::{check_submission, page_count, paginate, submissions_for};
use createathon::views::timer::{elapsed_since, format_elapsed};
use createathon::views::{ChallengeFilter, ChallengeListState, StatusFilter, PER_PAGE};

use super::app::{alert, print_json, App};

#[derive(Debug, Clone, Default)]
pub struct ListArgs {
    pub search: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub category: Option<u64>,
    pub status: StatusFilter,
    pub page: usize,
    pub bookmarked: bool,
}

pub async fn list_command(app: &mut App, args: ListArgs) -> Result<()> {
    let page = app
        .services
        .challenges
        .list(&ChallengeQuery::default())
        .await
        .map_err(alert("Failed to load challenges"))?;
    let mut challenges = page.into_results();

    if args.bookmarked {
        let bookmarks = app.local.bookmarks()?;
        challenges.retain(|c| bookmarks.contains(&c.id));
    }

    // Without a session there is no progress to filter on.
    let status = if app.session.current_user().is_some() {
        args.status
    } else {
        StatusFilter::All
    };
    let progress = if status != StatusFilter::All {
        load_progress(app).await?
    } else {
        Vec::new()
    };

    let mut state = ChallengeListState::default();
    state.set_filter(ChallengeFilter {
        search: args.search.unwrap_or_default(),
        difficulty: args.difficulty,
        category: args.category,
        status,
    });
    state.set_page(args.page);

    let filtered: Vec<&Challenge> = state.filter().apply(&challenges, &progress);
    let pages = page_count(filtered.len(), PER_PAGE);
    let shown = paginate(&filtered, state.page(), PER_PAGE);

    if app.json {
        return print_json(&serde_json::json!({
            "count": filtered.len(),
            "page": state.page(),
            "pages": pages,
            "results": shown,
        }));
    }

    if filtered.is_empty() {
        println!("No challenges found matching your criteria.");
        return Ok(());
    }

    let bookmarks = app.local.bookmarks()?;
    println!(
        "{:<6} {:<36} {:<13} {:<18} {:>6}",
        "ID", "TITLE", "DIFFICULTY", "CATEGORY", "POINTS"
    );
    println!("{}", "-".repeat(83));
    for challenge in shown {
        let marker = if bookmarks.contains(&challenge.id) { "*" } else { " " };
        println!(
            "{:<6} {:<36} {:<13} {:<18} {:>6}",
            format!("{}{marker}", challenge.id),
            truncate(&challenge.title, 36),
            challenge.difficulty.as_str(),
            truncate(&challenge.category.name, 18),
            challenge.points
        );
    }
    println!("\nPage {} of {pages} ({} challenges)", state.page(), filtered.len());
    Ok(())
}

pub async fn categories_command(app: &mut App) -> Result<()> {
    let categories = app
        .services
        .challenges
        .categories()
        .await
        .map_err(alert("Failed to load categories"))?
        .into_results();

    if app.json {
        return print_json(&categories);
    }
    if categories.is_empty() {
        println!("No categories found.");
        return Ok(());
    }
    for category in categories {
        println!("  #{:<4} {}", category.id, category.name);
        if !category.description.is_empty() {
            println!("        {}", category.description);
        }
    }
    Ok(())
}

/// Show one challenge and start its timer if it is not running yet.
pub async fn show_command(app: &mut App, id: ChallengeId) -> Result<()> {
    let challenge = app
        .services
        .challenges
        .get(id)
        .await
        .map_err(alert("Failed to load challenge"))?;

    let started = app.local.start_timer(id, Utc::now())?;
    let bookmarked = app.local.is_bookmarked(id)?;

    let submissions = if app.session.current_user().is_some() {
        match app.services.challenges.submissions().await {
            Ok(page) => page.into_results(),
            Err(e) => {
                warn!(error = %e, "could not load submissions");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };
    let mine = submissions_for(id, &submissions);
    let elapsed = format_elapsed(elapsed_since(started, Utc::now()));

    if app.json {
        return print_json(&serde_json::json!({
            "challenge": challenge,
            "bookmarked": bookmarked,
            "started_at": started,
            "elapsed": elapsed,
            "submissions": mine,
        }));
    }

    let star = if bookmarked { " [bookmarked]" } else { "" };
    println!("#{} {}{star}", challenge.id, challenge.title);
    println!(
        "{} | {} | {} points | time {elapsed}",
        challenge.difficulty, challenge.category.name, challenge.points
    );
    println!("{}", "-".repeat(60));
    println!("{}\n", challenge.description);
    if let Some(content) = challenge.content.as_deref().filter(|c| !c.is_empty()) {
        println!("{content}\n");
    }
    if let Some(template) = challenge.code_template.as_deref().filter(|t| !t.is_empty()) {
        println!("Starter code:\n{template}\n");
    }

    if mine.is_empty() {
        println!("No submissions yet.");
    } else {
        println!("Your submissions:");
        for submission in mine {
            print_submission_line(submission);
        }
    }
    Ok(())
}

pub async fn submit_command(
    app: &mut App,
    id: ChallengeId,
    content: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    app.require_user()?;
    let content = match (content, file) {
        (Some(content), _) => content,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read solution file: {}", path.display()))?,
        (None, None) => bail!("Provide a solution with --content or --file"),
    };
    let content = check_submission(&content).map_err(|msg| anyhow!(msg))?;

    let submission = app
        .services
        .challenges
        .submit(id, content)
        .await
        .map_err(alert("Failed to submit solution"))?;

    if let Err(e) = app.local.clear_timer(id) {
        warn!(error = %e, "could not clear challenge timer");
    }
    debug!(challenge = id, status = %submission.status, "submitted");

    if app.json {
        return print_json(&submission);
    }
    println!("Solution submitted: {}", submission.status);
    if !submission.feedback.is_empty() {
        println!("{}", submission.feedback);
    }
    Ok(())
}

pub fn bookmark_command(app: &mut App, id: ChallengeId) -> Result<()> {
    let bookmarked = app.local.toggle_bookmark(id)?;
    if app.json {
        return print_json(&serde_json::json!({ "challenge": id, "bookmarked": bookmarked }));
    }
    if bookmarked {
        println!("Bookmarked challenge #{id}.");
    } else {
        println!("Removed bookmark for challenge #{id}.");
    }
    Ok(())
}

pub async fn submissions_command(app: &mut App, challenge: Option<ChallengeId>) -> Result<()> {
    app.require_user()?;
    let all = app
        .services
        .challenges
        .submissions()
        .await
        .map_err(alert("Failed to load submissions"))?
        .into_results();

    let shown: Vec<&Submission> = match challenge {
        Some(id) => submissions_for(id, &all),
        None => all.iter().collect(),
    };

    if app.json {
        return print_json(&shown);
    }
    if shown.is_empty() {
        println!("No submissions found.");
        return Ok(());
    }
    for submission in shown {
        print_submission_line(submission);
    }
    Ok(())
}

async fn load_progress(app: &App) -> Result<Vec<UserProgress>> {
    Ok(app
        .services
        .progress
        .list()
        .await
        .map_err(alert("Failed to load progress"))?
        .into_results())
}

fn print_submission_line(submission: &Submission) {
    println!(
        "  {}  #{:<5} {:<10} {}",
        submission.submitted_at.format("%Y-%m-%d %H:%M"),
        submission.challenge.id,
        submission.status.to_string(),
        truncate(&submission.challenge.title, 40)
    );
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}
