//! Single conversion commands

use super::{build_pipeline, print_response, shutdown};
use crate::args::RequestOrigin;
use kotonoha_core::admission::derive_client_key;
use kotonoha_core::config::Config;
use kotonoha_core::llm::TargetRegister;
use kotonoha_core::pipeline::{ConversionPipeline, ConversionRequest, PipelineResponse};
use std::process::ExitCode;

pub async fn convert(
    config: &Config,
    text: &str,
    register: &str,
    origin: &RequestOrigin,
) -> anyhow::Result<ExitCode> {
    let register = TargetRegister::from_name_or_normal(register);
    let request = ConversionRequest::new(text, register);
    execute(config, origin, request, false).await
}

pub async fn regenerate(
    config: &Config,
    text: &str,
    register: &str,
    previous: &str,
    origin: &RequestOrigin,
) -> anyhow::Result<ExitCode> {
    let register = TargetRegister::from_name_or_normal(register);
    let request = ConversionRequest::regeneration(text, register, previous);
    execute(config, origin, request, true).await
}

async fn execute(
    config: &Config,
    origin: &RequestOrigin,
    request: Result<ConversionRequest, kotonoha_core::ValidationError>,
    regenerate: bool,
) -> anyhow::Result<ExitCode> {
    let request = match request {
        Ok(request) => request.with_provider(origin.provider.clone()),
        Err(e) => return finish(&ConversionPipeline::reject(e)),
    };

    let client = derive_client_key(origin.forwarded_for.as_deref(), origin.peer.as_deref());
    let (pipeline, worker) = build_pipeline(config);
    let response = if regenerate {
        pipeline.regenerate(&client, request).await
    } else {
        pipeline.convert(&client, request).await
    };
    shutdown(pipeline, worker).await;

    finish(&response)
}

fn finish(response: &PipelineResponse) -> anyhow::Result<ExitCode> {
    print_response(response)?;
    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
