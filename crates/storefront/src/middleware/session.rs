//! Session middleware configuration and typed session access.
//!
//! Sets up sessions using tower-sessions. The binary passes the `PostgreSQL`
//! store, tests a memory store. The session holds the visitor's cart, the
//! current checkout nonce, the last paid payment intent and the waitlist
//! attempt window.

use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};
use uuid::Uuid;

use atmos_core::{AttemptWindow, Cart};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "atmos_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

pub const CART_KEY: &str = "cart";
pub const CHECKOUT_NONCE_KEY: &str = "checkout_nonce";
pub const LAST_PAYMENT_INTENT_KEY: &str = "last_payment_intent";
pub const WAITLIST_ATTEMPTS_KEY: &str = "waitlist_attempts";

/// Create the session layer over a store.
#[must_use]
pub fn session_layer<S: SessionStore + Clone>(store: S, secure: bool) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Load the session cart, or an empty one.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load_cart(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    Ok(session.get::<Cart>(CART_KEY).await?.unwrap_or_default())
}

/// Store the cart back into the session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(CART_KEY, cart).await
}

/// Current checkout nonce, created on first use.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn checkout_nonce(session: &Session) -> Result<Uuid, tower_sessions::session::Error> {
    if let Some(nonce) = session.get::<Uuid>(CHECKOUT_NONCE_KEY).await? {
        return Ok(nonce);
    }
    let nonce = Uuid::new_v4();
    session.insert(CHECKOUT_NONCE_KEY, nonce).await?;
    Ok(nonce)
}

/// Clear the cart and start a fresh checkout after an order is recorded.
///
/// Remembers `payment_intent_id` so this session, and only this session,
/// can view the order confirmation.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn finish_checkout(
    session: &Session,
    payment_intent_id: &str,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(CART_KEY, Cart::new()).await?;
    session.insert(CHECKOUT_NONCE_KEY, Uuid::new_v4()).await?;
    session
        .insert(LAST_PAYMENT_INTENT_KEY, payment_intent_id)
        .await
}

/// Payment intent of the last order this session completed.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn last_payment_intent(
    session: &Session,
) -> Result<Option<String>, tower_sessions::session::Error> {
    session.get::<String>(LAST_PAYMENT_INTENT_KEY).await
}

/// Waitlist attempt window stored for this session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn waitlist_attempts(
    session: &Session,
) -> Result<Option<AttemptWindow>, tower_sessions::session::Error> {
    session.get::<AttemptWindow>(WAITLIST_ATTEMPTS_KEY).await
}

/// Store the waitlist attempt window.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_waitlist_attempts(
    session: &Session,
    window: Option<AttemptWindow>,
) -> Result<(), tower_sessions::session::Error> {
    match window {
        Some(window) => session.insert(WAITLIST_ATTEMPTS_KEY, window).await,
        None => Ok(()),
    }
}
