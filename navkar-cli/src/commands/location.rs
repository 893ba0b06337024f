//! Location command - look up and confirm the delivery location

use anyhow::Result;
use navkar_core::OperationResult;
use serde::Serialize;

use super::{block_on, get_context, spinner};
use crate::output;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LocationReport {
    provider: String,
    display_text: String,
    latitude: f64,
    longitude: f64,
    accuracy: f64,
    confirmed: Option<String>,
}

pub fn run(confirm: bool, json: bool) -> Result<()> {
    let ctx = get_context("location")?;
    let service = &ctx.location_service;

    let result = block_on(async {
        let pb = (!json).then(|| spinner("Getting your location..."));
        let result = service.request_location().await;
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        result
    })?;

    let position = match result {
        Ok(position) => position,
        Err(e) => {
            let guidance = e.guidance();
            if json {
                let result: OperationResult<()> = OperationResult::fail(guidance);
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            anyhow::bail!("{}", guidance);
        }
    };

    let confirmed = if confirm {
        service.confirm_location()
    } else {
        None
    };

    if json {
        let report = LocationReport {
            provider: service.provider_name().to_string(),
            display_text: service.display_text(),
            latitude: position.latitude,
            longitude: position.longitude,
            accuracy: position.accuracy,
            confirmed,
        };
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(report))?);
        return Ok(());
    }

    match confirmed {
        Some(text) => output::success(&format!("Delivery location set: {}", text)),
        None => {
            println!("{}", service.display_text());
            output::info("Run with --confirm to use this as your delivery location.");
        }
    }
    Ok(())
}
