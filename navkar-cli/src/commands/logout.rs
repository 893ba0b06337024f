//! Logout command - drop the persisted session

use anyhow::Result;
use navkar_core::OperationResult;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context("logout")?;
    let was_signed_in = ctx.session_store.is_authenticated();

    ctx.session_store.logout();

    if json {
        let result = OperationResult::ok(serde_json::json!({ "wasSignedIn": was_signed_in }));
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if was_signed_in {
        output::success("Signed out.");
    } else {
        output::info("Not signed in.");
    }
    Ok(())
}
