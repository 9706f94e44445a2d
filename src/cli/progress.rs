//! Dashboard, progress, leaderboard and achievements

use anyhow::Result;

use createathon::models::ChallengeId;
use createathon::services::ChallengeQuery;
use createathon::views::dashboard::RECENT_LIMIT;
use createathon::views::{leaderboard, AchievementSummary, DashboardStats};

use super::app::{alert, print_json, App};

pub async fn dashboard_command(app: &mut App) -> Result<()> {
    let session = app.require_user()?;
    let services = &app.services;

    let recent_query = ChallengeQuery {
        limit: Some(RECENT_LIMIT as u32),
        ..Default::default()
    };
    let (progress, recent, top) = tokio::try_join!(
        services.progress.list(),
        services.challenges.list(&recent_query),
        services.progress.leaderboard(),
    )
    .map_err(alert("Failed to load dashboard data"))?;

    let progress = progress.into_results();
    let mut recent = recent.into_results();
    recent.truncate(RECENT_LIMIT);
    let top = top.into_results();
    let stats = DashboardStats::compute(&progress, &recent, &top, Some(session.user_id));

    if app.json {
        return print_json(&serde_json::json!({
            "stats": stats,
            "recent_challenges": recent,
            "top_users": top.iter().take(RECENT_LIMIT).collect::<Vec<_>>(),
        }));
    }

    println!("Welcome back, {}!\n", session.display_name);
    println!("  Completed:        {} / {}", stats.completed, stats.sampled);
    println!("  Completion rate:  {:.0}%", stats.completion_rate);
    println!("  Points earned:    {}", stats.total_points);
    println!("  Rank:             {}", stats.rank_label());

    println!("\nRecent challenges");
    println!("{}", "-".repeat(60));
    if recent.is_empty() {
        println!("  No challenges available yet.");
    }
    for challenge in &recent {
        println!(
            "  #{:<5} {:<36} {:<13} {:>4} pts",
            challenge.id,
            challenge.title,
            challenge.difficulty.as_str(),
            challenge.points
        );
    }

    println!("\nTop users");
    println!("{}", "-".repeat(60));
    if top.is_empty() {
        println!("  No leaderboard data yet.");
    }
    for entry in top.iter().take(RECENT_LIMIT) {
        println!(
            "  {:>3}. {:<24} {:>6} points",
            entry.rank, entry.user.username, entry.total_points
        );
    }
    Ok(())
}

pub async fn progress_command(app: &mut App, challenge: Option<ChallengeId>) -> Result<()> {
    app.require_user()?;

    let records = match challenge {
        Some(id) => vec![app
            .services
            .progress
            .for_challenge(id)
            .await
            .map_err(alert("Failed to load progress"))?],
        None => app
            .services
            .progress
            .list()
            .await
            .map_err(alert("Failed to load progress"))?
            .into_results(),
    };

    if app.json {
        return print_json(&records);
    }
    if records.is_empty() {
        println!("No progress yet. Open a challenge to get started.");
        return Ok(());
    }

    println!(
        "{:<6} {:<36} {:<10} {:>8} {:>6}",
        "ID", "CHALLENGE", "STATUS", "ATTEMPTS", "POINTS"
    );
    println!("{}", "-".repeat(70));
    for record in &records {
        println!(
            "{:<6} {:<36} {:<10} {:>8} {:>6}",
            record.challenge.id,
            record.challenge.title,
            record.status.to_string(),
            record.attempts,
            record.points_earned
        );
    }
    Ok(())
}

pub async fn leaderboard_command(app: &mut App, search: Option<String>) -> Result<()> {
    let entries = app
        .services
        .progress
        .leaderboard()
        .await
        .map_err(alert("Failed to load leaderboard"))?
        .into_results();

    let username = app.session.current_user().map(|s| s.username.clone());
    let rows = leaderboard::rows(&entries, search.as_deref().unwrap_or(""), username.as_deref());

    if app.json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    println!(
        "{:>5}  {:<24} {:<24} {:>8} {:>10}",
        "RANK", "USER", "NAME", "POINTS", "COMPLETED"
    );
    println!("{}", "-".repeat(76));
    for row in &rows {
        let user = &row.entry.user;
        let name = format!("{} {}", user.first_name, user.last_name);
        let you = if row.is_you { " (you)" } else { "" };
        println!(
            "{:>5}  {:<24} {:<24} {:>8} {:>10}",
            row.entry.rank,
            format!("{}{you}", user.username),
            name.trim(),
            row.entry.total_points,
            row.entry.challenges_completed
        );
    }
    Ok(())
}

pub async fn achievements_command(app: &mut App) -> Result<()> {
    app.require_user()?;
    let earned = app
        .services
        .progress
        .achievements()
        .await
        .map_err(alert("Failed to load achievements"))?
        .into_results();
    // The backend exposes no achievement catalog, so the total is unknown.
    let summary = AchievementSummary::compute(&earned, None);

    if app.json {
        return print_json(&serde_json::json!({
            "summary": summary,
            "achievements": earned,
        }));
    }

    println!(
        "Earned {} achievements, {} points\n",
        summary.earned, summary.points
    );
    if earned.is_empty() {
        println!("  None yet. Complete challenges to earn achievements.");
    }
    for ua in &earned {
        println!(
            "  {}  {:<28} {:>4} pts",
            ua.earned_at.format("%Y-%m-%d"),
            ua.achievement.name,
            ua.achievement.points
        );
        if !ua.achievement.description.is_empty() {
            println!("              {}", ua.achievement.description);
        }
    }
    Ok(())
}
