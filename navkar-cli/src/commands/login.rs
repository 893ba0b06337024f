//! Login command - sign in to the storefront account

use anyhow::Result;
use navkar_core::services::{AuthView, SubmitOutcome};
use navkar_core::LoginRequest;

use super::{
    await_dialog, block_on, get_context, password_or_prompt, report_outcome, spinner,
    value_or_prompt,
};

pub fn run(email: Option<String>, password: Option<String>, demo: bool, json: bool) -> Result<()> {
    let ctx = get_context("login")?;

    let fields = if demo {
        LoginRequest::demo()
    } else {
        let email = value_or_prompt(email, "Email")?;
        let (password, _) = password_or_prompt(password, false)?;
        LoginRequest::new(email, password)
    };

    let (flow, mut events) = ctx.auth_flow();
    flow.open(AuthView::Login);

    let (outcome, end) = block_on(async {
        let pb = (!json).then(|| spinner("Signing in..."));
        let outcome = flow.submit_login(fields).await;
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        let end = match outcome {
            SubmitOutcome::Accepted(_) => Some(await_dialog(&mut events).await),
            _ => None,
        };
        (outcome, end)
    })?;

    report_outcome(outcome, end, json)
}
