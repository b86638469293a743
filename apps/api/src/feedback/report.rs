//! Plain-text downloads: the interview transcript and the performance report.

use chrono::{DateTime, Utc};

use crate::feedback::retriever::FeedbackReport;

const PLATFORM_NAME: &str = "UPSC Mock Interview Board";

pub fn render_transcript(
    candidate_name: &str,
    roll_no: &str,
    transcript: &str,
    generated_at: DateTime<Utc>,
) -> String {
    let rule = "-".repeat(50);
    format!(
        "UPSC Mock Interview Transcript\n\
         Candidate: {candidate_name}\n\
         Roll Number: {roll_no}\n\
         Date: {date}\n\
         \n\
         {rule}\n\
         \n\
         {transcript}\n\
         \n\
         {rule}\n\
         Generated by {PLATFORM_NAME}\n",
        date = generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

/// Summary, verdict, justification, then every criterion/feedback pair in order.
pub fn render_report(
    candidate_name: &str,
    roll_no: &str,
    report: &FeedbackReport,
    generated_at: DateTime<Utc>,
) -> String {
    let rule = "-".repeat(60);
    let rating = report
        .verdict
        .as_ref()
        .and_then(|v| v.rating.as_ref())
        .map_or("Not Available", |r| r.label());
    let justification = report
        .verdict
        .as_ref()
        .and_then(|v| v.justification.as_deref())
        .unwrap_or("Assessment completed.");
    let summary = report.summary.as_deref().unwrap_or("");

    let mut out = format!(
        "UPSC Mock Interview - Performance Report\n\
         Candidate: {candidate_name}\n\
         Roll Number: {roll_no}\n\
         Interview Date: {date}\n\
         \n\
         {rule}\n\
         EXECUTIVE SUMMARY\n\
         {rule}\n\
         {summary}\n\
         \n\
         {rule}\n\
         OVERALL ASSESSMENT: {rating}\n\
         {rule}\n\
         {justification}\n\
         \n\
         {rule}\n\
         DETAILED PERFORMANCE ANALYSIS\n\
         {rule}\n",
        date = generated_at.format("%Y-%m-%d"),
    );

    for row in &report.criteria {
        out.push_str(&format!("\n{}:\n{}\n", row.criterion, row.feedback));
    }

    out.push_str(&format!(
        "\n{rule}\nReport Generated: {}\nPlatform: {PLATFORM_NAME}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out
}
