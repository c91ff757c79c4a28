// agentctl-client - Wire client for the AgentCore control plane
//
// Turns a bound request into a signed REST-JSON HTTP call and the response
// back into a JSON value or a classified RemoteError.

use agentctl_config::ClientConfig;
use agentctl_core::SERVICE;
use anyhow::{Context, Result};
use tracing::{debug, info};

pub mod endpoint;
pub mod http;
pub mod rest;

pub use endpoint::resolve_endpoint;
pub use http::{HttpClient, HttpResponse, ReqwestHttpClient, SigV4Signer};
pub use rest::RestJsonClient;

pub type Client = RestJsonClient<ReqwestHttpClient>;

/// Build a wire client from the resolved configuration.
///
/// The AWS config chain (profile, region, credentials) is only loaded when
/// requests are signed or no region is known yet.
pub async fn connect(config: &ClientConfig) -> Result<Client> {
    let aws = &config.aws;
    let needs_sdk = aws.sign_requests || (aws.region.is_none() && aws.endpoint_url.is_none());

    let sdk = if needs_sdk {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &aws.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        if let Some(profile) = &aws.profile {
            loader = loader.profile_name(profile);
        }
        Some(loader.load().await)
    } else {
        None
    };

    let region = aws.region.clone().or_else(|| {
        sdk.as_ref()
            .and_then(|sdk| sdk.region())
            .map(|region| region.as_ref().to_string())
    });

    let endpoint = resolve_endpoint(&SERVICE, aws.endpoint_url.as_deref(), region.as_deref())?;

    let signer = match &sdk {
        Some(sdk) if aws.sign_requests => {
            let credentials = sdk.credentials_provider().context(
                "no AWS credentials provider available; configure a profile or pass --no-sign-request",
            )?;
            let region = region
                .clone()
                .context("signing requires a region; pass --region or set AWS_REGION")?;
            Some(SigV4Signer::new(credentials, region, SERVICE.signing_name))
        }
        _ => None,
    };

    debug!(
        endpoint = %endpoint,
        region = region.as_deref().unwrap_or("-"),
        signed = signer.is_some(),
        "connecting"
    );
    if signer.is_none() {
        info!("request signing disabled");
    }

    let http = ReqwestHttpClient::new(aws.timeout(), signer)?;
    Ok(RestJsonClient::new(http, endpoint))
}
