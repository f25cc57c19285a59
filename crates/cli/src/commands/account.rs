//! Session and profile commands.

use glokart_core::ListingId;
use glokart_marketplace::{Listing, RegistrationForm};
use tracing::info;

use super::{App, CommandResult};

/// # Errors
///
/// Returns an error for a missing field, a malformed email or an email that
/// is already registered.
pub fn register(
    app: &mut App,
    name: String,
    email: String,
    address: String,
    phone_number: String,
) -> CommandResult {
    let id = app.market.register(RegistrationForm {
        name,
        email,
        address,
        phone_number,
    })?;
    info!(user_id = %id, "Welcome to GloKart");
    Ok(())
}

/// # Errors
///
/// Returns an error if no account has this email.
pub fn login(app: &mut App, email: &str) -> CommandResult {
    let user = app.market.login(email)?;
    info!(name = %user.name, "Signed in");
    Ok(())
}

/// # Errors
///
/// Returns an error for wrong credentials.
pub fn admin_login(app: &mut App, username: &str, password: &str) -> CommandResult {
    let user = app.market.admin_login(username, password)?;
    info!(name = %user.name, "Signed in to the admin console");
    Ok(())
}

pub fn logout(app: &mut App) {
    app.market.logout();
}

/// # Errors
///
/// Returns an error without a session or for an unknown listing.
pub fn save(app: &mut App, id: &ListingId) -> CommandResult {
    let saved = app.market.toggle_saved(id)?;
    info!(listing_id = %id, saved, "Wishlist updated");
    Ok(())
}

fn section(name: &str, listings: &[&Listing]) {
    info!(section = name, count = listings.len(), "Profile");
    for listing in listings {
        info!(
            section = name,
            listing_id = %listing.id,
            title = %listing.title,
            price = %listing.asking_price(),
            status = %listing.status,
            sold = listing.is_sold,
            "Listing"
        );
    }
}

/// Show the signed-in user's profile page.
///
/// # Errors
///
/// Returns an error without a session.
pub fn profile(app: &App) -> CommandResult {
    let user_id = app.market.require_user()?.id.clone();
    let view = app.market.profile(&user_id)?;

    info!(
        name = %view.user.name,
        email = %view.user.email,
        address = %view.user.address,
        seller = view.user.is_seller,
        admin = view.user.is_admin,
        "Account"
    );
    section("my listings", &view.my_listings);
    section("orders placed", &view.orders_placed);
    section("orders received", &view.orders_received);
    section("wishlist", &view.wishlist);
    section("offers received", &view.offers_received);
    Ok(())
}

/// List every registered account.
///
/// # Errors
///
/// Returns an error without an admin session.
pub fn users(app: &App) -> CommandResult {
    app.market.require_admin()?;
    let users = app.market.users();
    info!(count = users.len(), "Users");
    for user in users {
        info!(
            user_id = %user.id,
            name = %user.name,
            email = %user.email,
            phone = %user.phone_number,
            seller = user.is_seller,
            admin = user.is_admin,
            saved = user.saved_listing_ids.len(),
            "User"
        );
    }
    Ok(())
}
