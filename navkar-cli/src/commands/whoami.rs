//! Whoami command - show the signed-in identity

use anyhow::Result;
use colored::Colorize;
use navkar_core::OperationResult;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context("whoami")?;
    let identity = ctx.session_store.current_identity();

    if json {
        let result = OperationResult::ok(serde_json::json!({
            "loggedIn": identity.is_some(),
            "identity": identity,
        }));
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let Some(identity) = identity else {
        output::warning("Not signed in. Run `nk login` or `nk signup`.");
        return Ok(());
    };

    println!("{}", format!("Hi, {}", identity.first_name()).bold());
    println!();

    let member_since = identity.created_at.format("%Y-%m-%d").to_string();
    let table = output::key_value_table(&[
        ("Name", Some(identity.name.as_str())),
        ("Email", Some(identity.email.as_str())),
        ("Phone", Some(identity.phone.as_str())),
        ("Address", identity.address.as_deref()),
        ("Member since", Some(member_since.as_str())),
    ]);

    println!("{}", table);
    Ok(())
}
