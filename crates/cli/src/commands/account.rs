//! Sign-in and account commands.

use savat_storefront::{Result, Storefront};
use secrecy::SecretString;

pub async fn login(shop: &mut Storefront, email: &str, password: String) -> Result<()> {
    let user = shop.login(email, &SecretString::from(password)).await?;
    println!("Signed in as {} ({}).", user.display_name(), user.role);
    Ok(())
}

pub async fn register(
    shop: &mut Storefront,
    name: &str,
    email: &str,
    password: String,
) -> Result<()> {
    let user = shop
        .register(name, email, &SecretString::from(password))
        .await?;
    println!("Welcome, {}! You are signed in.", user.display_name());
    Ok(())
}

pub fn logout(shop: &mut Storefront) {
    if shop.session().is_authenticated() {
        shop.logout();
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
}

pub fn whoami(shop: &Storefront) {
    match shop.session().user() {
        Some(user) => println!(
            "{} <{}> (id {}, {})",
            user.display_name(),
            user.email,
            user.id,
            user.role
        ),
        None => println!("Not signed in."),
    }
}
