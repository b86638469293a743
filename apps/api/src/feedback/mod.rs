// Post-call feedback: call selection, analysis extraction, downloadable reports.
// All voice platform calls go through voice_platform, never direct HTTP.

pub mod handlers;
pub mod report;
pub mod retriever;
