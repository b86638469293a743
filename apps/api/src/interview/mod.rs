// Interview setup: persona prompt composition and voice agent provisioning.
// All voice platform calls go through voice_platform, never direct HTTP.

pub mod composer;
pub mod handlers;
pub mod prompts;
pub mod provisioner;
