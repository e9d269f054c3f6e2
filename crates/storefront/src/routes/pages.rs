//! Static marketing page route handlers.
//!
//! About, collection, Halo and FAQ pages, plus the 404 page served for any
//! path no other route matches.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::instrument;

use atmos_core::{Color, PaymentOption};

use crate::config::AnalyticsConfig;
use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;

use super::cart::format_price;
use super::home::FaqEntry;

// =============================================================================
// Static Content
// =============================================================================

/// A titled block of copy.
pub struct Highlight {
    pub title: &'static str,
    pub description: &'static str,
}

/// A group of FAQ entries under one heading.
pub struct FaqSection {
    pub title: &'static str,
    pub entries: &'static [FaqEntry],
}

pub const MISSION: &[Highlight] = &[
    Highlight {
        title: "Environmental Connection",
        description: "Reconnect with the world around you through intelligent environmental \
                      sensing and awareness.",
    },
    Highlight {
        title: "Voice-First AI",
        description: "Intelligence that lives quietly on your body, enhancing your experience \
                      without demanding attention.",
    },
    Highlight {
        title: "Elegant Design",
        description: "Crafted to be worn everywhere, from silent forests to electric cities. \
                      Always present, never overwhelming.",
    },
];

pub const HALO_FEATURES: &[Highlight] = &[
    Highlight {
        title: "Environmental sensing",
        description: "Sensors monitor air quality, UV exposure and your body's natural \
                      rhythms, and alert you to invisible threats before they affect you.",
    },
    Highlight {
        title: "Ask the World camera",
        description: "Point, capture and ask. Identify objects, products, signs or places with \
                      instant AI-powered answers.",
    },
    Highlight {
        title: "Atmos Listen translation",
        description: "Say \"Atmos, listen\" to translate and speak in 25+ languages.",
    },
    Highlight {
        title: "Atmos Shield",
        description: "One tap or spoken phrase alerts your contacts, shares your location and \
                      records your surroundings.",
    },
    Highlight {
        title: "Safe Zones & Alerts",
        description: "Define safe zones for family members and get notified when someone \
                      leaves a designated area.",
    },
    Highlight {
        title: "Stealth SOS",
        description: "A double-press or hidden tap pattern silently alerts emergency contacts.",
    },
    Highlight {
        title: "Personalized nudges",
        description: "Recommendations for sleep, focus periods and recovery timing, learned \
                      from your own patterns.",
    },
    Highlight {
        title: "Screenless, minimalist interface",
        description: "No bulky screen. A color-matched light strip gives subtle, intelligent \
                      cues.",
    },
    Highlight {
        title: "All-day comfort & long battery",
        description: "Engineered for all-day wear, with extended battery life and swappable \
                      bands.",
    },
];

pub const FAQ_SECTIONS: &[FaqSection] = &[
    FaqSection {
        title: "General Product",
        entries: &[
            FaqEntry {
                question: "What is Atmos Halo and how is it different from a smartwatch?",
                answer: "Atmos Halo is an AI-powered wearable designed for intelligence, not \
                         apps. It focuses on voice-first interaction, environmental awareness \
                         and real-world functionality, without a screen.",
            },
            FaqEntry {
                question: "What's the difference between Atmos Halo and Atmos Lucid?",
                answer: "Lucid has the same core AI as Halo, crafted from rare materials and \
                         produced in limited, serialized batches.",
            },
        ],
    },
    FaqSection {
        title: "AI & Features",
        entries: &[
            FaqEntry {
                question: "How does Atmos Listen work?",
                answer: "Say \"Atmos, listen\" to start real-time voice translation in 25+ \
                         languages. Atmos transcribes, translates and can speak back in a \
                         natural voice.",
            },
            FaqEntry {
                question: "What is Atmos Shield?",
                answer: "A tap or voice command alerts your emergency contacts, shares your live \
                         location and starts audio monitoring.",
            },
            FaqEntry {
                question: "Does Atmos have a display?",
                answer: "Atmos uses a subtle, screenless light-strip interface for \
                         low-distraction feedback, so you stay present in the real world.",
            },
            FaqEntry {
                question: "Can Atmos tell me about things I point at?",
                answer: "Yes. With the Ask the World camera you can point at objects, signs or \
                         places and Atmos explains what it sees.",
            },
        ],
    },
    FaqSection {
        title: "Design & Materials",
        entries: &[
            FaqEntry {
                question: "Is Atmos waterproof?",
                answer: "Atmos is water-resistant and built for daily wear, rain and sweat. \
                         Full submersion is not recommended.",
            },
            FaqEntry {
                question: "What materials is the band made from?",
                answer: "The Halo band uses soft-touch polymers with a color-matched light \
                         strip. Lucid editions offer ceramic, sapphire and carbon fiber.",
            },
            FaqEntry {
                question: "How long does the battery last?",
                answer: "Two to three days on typical use.",
            },
        ],
    },
    FaqSection {
        title: "Privacy & Security",
        entries: &[
            FaqEntry {
                question: "Is Atmos always listening to me?",
                answer: "No. Atmos only activates when you say the wake phrase or press the \
                         button. Voice data is processed securely and never sold or shared.",
            },
            FaqEntry {
                question: "Can I turn off translation, camera, or Shield?",
                answer: "Yes. Every feature is opt-in and can be controlled from settings or by \
                         voice.",
            },
        ],
    },
    FaqSection {
        title: "Shipping, Returns, and Support",
        entries: &[
            FaqEntry {
                question: "When will my Atmos band ship?",
                answer: "The first public batch ships in launch order. Reservations are \
                         fulfilled on a first-come, first-served basis.",
            },
            FaqEntry {
                question: "Do you offer warranty or returns?",
                answer: "Every Atmos comes with a 1-year limited warranty and a 30-day return \
                         policy.",
            },
            FaqEntry {
                question: "Can I update Atmos with new features?",
                answer: "Yes. Atmos receives over-the-air updates that improve the AI, add \
                         languages and unlock features.",
            },
        ],
    },
];

// =============================================================================
// Templates
// =============================================================================

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub mission: &'static [Highlight],
    pub analytics: AnalyticsConfig,
    pub nonce: String,
}

/// A finish shown on the collection page.
pub struct CollectionItem {
    pub name: &'static str,
    pub image: &'static str,
}

/// Collection page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/collection.html")]
pub struct CollectionTemplate {
    pub items: Vec<CollectionItem>,
    pub analytics: AnalyticsConfig,
    pub nonce: String,
}

/// Halo product page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/halo.html")]
pub struct HaloTemplate {
    pub features: &'static [Highlight],
    pub full_price: String,
    pub deposit_price: String,
    pub analytics: AnalyticsConfig,
    pub nonce: String,
}

/// FAQ page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/faq.html")]
pub struct FaqTemplate {
    pub sections: &'static [FaqSection],
    pub analytics: AnalyticsConfig,
    pub nonce: String,
}

/// 404 page template.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub analytics: AnalyticsConfig,
    pub nonce: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the About page.
#[instrument(skip(state, nonce))]
pub async fn about(State(state): State<AppState>, CspNonce(nonce): CspNonce) -> impl IntoResponse {
    AboutTemplate {
        mission: MISSION,
        analytics: state.config().analytics.clone(),
        nonce,
    }
}

/// Display the collection of finishes.
#[instrument(skip(state, nonce))]
pub async fn collection(
    State(state): State<AppState>,
    CspNonce(nonce): CspNonce,
) -> impl IntoResponse {
    let items = Color::ALL
        .iter()
        .map(|color| CollectionItem {
            name: color.display_name(),
            image: color.image_path(),
        })
        .collect();

    CollectionTemplate {
        items,
        analytics: state.config().analytics.clone(),
        nonce,
    }
}

/// Display the Halo product page.
#[instrument(skip(state, nonce))]
pub async fn halo(State(state): State<AppState>, CspNonce(nonce): CspNonce) -> impl IntoResponse {
    HaloTemplate {
        features: HALO_FEATURES,
        full_price: format_price(PaymentOption::Full.unit_price()),
        deposit_price: format_price(PaymentOption::Deposit.unit_price()),
        analytics: state.config().analytics.clone(),
        nonce,
    }
}

/// Display the FAQ page.
#[instrument(skip(state, nonce))]
pub async fn faq(State(state): State<AppState>, CspNonce(nonce): CspNonce) -> impl IntoResponse {
    FaqTemplate {
        sections: FAQ_SECTIONS,
        analytics: state.config().analytics.clone(),
        nonce,
    }
}

/// Fallback for unmatched paths.
#[instrument(skip(state, nonce))]
pub async fn not_found(
    State(state): State<AppState>,
    CspNonce(nonce): CspNonce,
) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            analytics: state.config().analytics.clone(),
            nonce,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faq_sections_are_populated() {
        assert_eq!(FAQ_SECTIONS.len(), 5);
        assert!(FAQ_SECTIONS.iter().all(|s| !s.entries.is_empty()));
    }
}
