mod vibe_card;

pub use vibe_card::{VibeCardPage, PROJECT_URL, VERIFICATION_PROMPT};
