//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::config::AnalyticsConfig;
use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;

use super::waitlist::cached_count;

// =============================================================================
// Static Content
// =============================================================================

/// A feature block below the hero.
pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
    pub image_path: &'static str,
}

/// A question in the FAQ section.
pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
}

pub const FEATURES: &[Feature] = &[
    Feature {
        title: "Quietly powerful. Effortlessly wearable.",
        description: "Atmos Band is designed to disappear until you need it. A smooth, matte \
                      finish and ambient LED display deliver timely insights without ever \
                      demanding your attention.",
        image_path: "/static/images/lifestyle-wrist.svg",
    },
    Feature {
        title: "Your smart environmental guide.",
        description: "Atmos monitors air quality, weather and noise in real time, with gentle \
                      nudges to help you stay well, comfortable and prepared.",
        image_path: "/static/images/lifestyle-outdoors.svg",
    },
];

pub const FAQ: &[FaqEntry] = &[
    FaqEntry {
        question: "What is Atmos and how is it different from a smartwatch?",
        answer: "Atmos is an AI-powered wearable designed for intelligence, not apps. It \
                 focuses on voice-first interaction and environmental awareness, without a \
                 screen.",
    },
    FaqEntry {
        question: "Does Atmos have a display?",
        answer: "Atmos uses a subtle, screenless light-strip interface for low-distraction \
                 feedback, so you stay present in the real world.",
    },
    FaqEntry {
        question: "How long does the battery last?",
        answer: "Two to three days on typical use.",
    },
    FaqEntry {
        question: "Is Atmos always listening to me?",
        answer: "No. Atmos only activates when you say the wake phrase or press the button. \
                 Voice data is processed securely and never sold or shared.",
    },
    FaqEntry {
        question: "When will my Atmos band ship?",
        answer: "The first public batch ships in launch order. Reservations are fulfilled on a \
                 first-come, first-served basis.",
    },
    FaqEntry {
        question: "Do you offer warranty or returns?",
        answer: "Every Atmos comes with a 1-year limited warranty and a 30-day return policy.",
    },
];

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub features: &'static [Feature],
    pub faq: &'static [FaqEntry],
    /// Active waitlist entries; hidden when the count is unavailable.
    pub waitlist_count: Option<i64>,
    pub analytics: AnalyticsConfig,
    pub nonce: String,
}

/// Display the landing page.
#[instrument(skip(state, nonce))]
pub async fn home(State(state): State<AppState>, CspNonce(nonce): CspNonce) -> impl IntoResponse {
    let waitlist_count = cached_count(&state)
        .await
        .map_err(|e| tracing::error!("Failed to fetch waitlist count: {e}"))
        .ok();

    HomeTemplate {
        features: FEATURES,
        faq: FAQ,
        waitlist_count,
        analytics: state.config().analytics.clone(),
        nonce,
    }
}
