//! Signup command - create an account and sign in

use anyhow::Result;
use navkar_core::services::{AuthView, SubmitOutcome};
use navkar_core::SignupRequest;

use super::{
    await_dialog, block_on, get_context, password_or_prompt, report_outcome, spinner,
    value_or_prompt,
};

pub struct SignupArgs {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub password: Option<String>,
    pub json: bool,
}

pub fn run(args: SignupArgs) -> Result<()> {
    let ctx = get_context("signup")?;

    let name = value_or_prompt(args.name, "Name")?;
    let email = value_or_prompt(args.email, "Email")?;
    let phone = value_or_prompt(args.phone, "Phone")?;
    let (password, confirmation) = password_or_prompt(args.password, true)?;

    let mut fields = SignupRequest::new(name, email, phone, password, confirmation);
    if let Some(address) = args.address {
        fields = fields.with_address(address);
    }

    let (flow, mut events) = ctx.auth_flow();
    flow.open(AuthView::Signup);

    let json = args.json;
    let (outcome, end) = block_on(async {
        let pb = (!json).then(|| spinner("Creating account..."));
        let outcome = flow.submit_signup(fields).await;
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
