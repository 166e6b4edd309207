//! # Grant Role Utility
//!
//! Assigns a seeded role to an existing user. Registration only ever hands
//! out `User`, so this is how the first `Admin` is made.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --package grant-role --bin grant_role -- alice@example.com Admin
//! ```
//!
//! The program will:
//! 1. Connect to `DATABASE_URL` and apply pending migrations
//! 2. Look up the user by email and the role by name
//! 3. Assign the role, reporting if the user already had it

use anyhow::{bail, Context};
use lib_core::config::DEFAULT_DATABASE_URL;
use lib_core::model::store::{RoleRepository, UserRepository};
use lib_core::{create_pool, run_migrations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let (Some(email), Some(role_name)) = (args.next(), args.next()) else {
        bail!("usage: grant_role <email> <role>");
    };

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    println!("Connecting to database...");
    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;

    let user = UserRepository::find_by_email(&pool, &email)
        .await?
        .with_context(|| format!("No user registered with email {email}"))?;
    let role = RoleRepository::find_by_name(&pool, &role_name)
        .await?
        .with_context(|| format!("Role '{role_name}' does not exist"))?;

    if RoleRepository::assign(&pool, user.id, role.id).await? {
        println!("Granted '{}' to {} (id {}).", role.name, user.email, user.id);
    } else {
        println!("{} already has '{}'.", user.email, role.name);
    }

    let roles = RoleRepository::role_names_for_user(&pool, user.id).await?;
    println!("Roles: {}", roles.join(", "));

    Ok(())
}
