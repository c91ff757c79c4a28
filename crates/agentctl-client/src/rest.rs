//! REST-JSON wire protocol.
//!
//! Bound fields are placed according to their descriptor location. URI
//! labels are substituted and percent-encoded, query fields are appended
//! with lists repeated, and everything else becomes the JSON body.

use agentctl_core::{BoundRequest, ControlPlane, Location, RemoteError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, instrument};
use url::Url;

use crate::http::{HttpClient, HttpResponse};

/// A request ready for the HTTP layer.
#[derive(Debug, Clone, PartialEq)]
pub struct WireRequest {
    pub method: &'static str,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

pub struct RestJsonClient<H> {
    http: H,
    endpoint: String,
}

impl<H: HttpClient> RestJsonClient<H> {
    pub fn new(http: H, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn http(&self) -> &H {
        &self.http
    }

    /// Marshal a bound request into method, URL, headers and body.
    pub fn build(&self, request: &BoundRequest) -> Result<WireRequest, RemoteError> {
        let op = request.operation();
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| RemoteError::Request(format!("invalid endpoint {}: {e}", self.endpoint)))?;

        let labels: Vec<(&str, String)> = request
            .located(Location::Uri)
            .map(|(field, value)| (field.wire_name, scalar(value)))
            .collect();

        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| RemoteError::Request(format!("endpoint {} cannot carry a path", self.endpoint)))?;
            path.pop_if_empty();
            for segment in op.http.uri.split('/').skip(1) {
                match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Some(label) => {
                        let value = labels
                            .iter()
                            .find(|(name, _)| *name == label)
                            .map(|(_, value)| value.as_str());
                        path.push(label_segment(label, value)?);
                    }
                    None => {
                        path.push(segment);
                    }
                }
            }
        }

        let query: Vec<(&str, String)> = request
            .located(Location::Query)
            .flat_map(|(field, value)| match value {
                Value::Array(items) => items.iter().map(|item| (field.wire_name, scalar(item))).collect(),
                other => vec![(field.wire_name, scalar(other))],
            })
            .collect();
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &query {
                pairs.append_pair(name, value);
            }
        }

        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];

        let body: Map<String, Value> = request
            .located(Location::Body)
            .map(|(field, value)| (field.wire_name.to_string(), value.clone()))
            .collect();
        let method = op.http.method;
        let body = if body.is_empty() && matches!(method, "GET" | "DELETE") {
            None
        } else {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
            let bytes = serde_json::to_vec(&Value::Object(body))
                .map_err(|e| RemoteError::Request(format!("cannot encode body: {e}")))?;
            Some(bytes)
        };

        Ok(WireRequest {
            method,
            url,
            headers,
            body,
        })
    }
}

#[async_trait]
impl<H: HttpClient> ControlPlane for RestJsonClient<H> {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[instrument(skip_all, fields(operation = request.operation().name))]
    async fn call(&self, request: &BoundRequest) -> Result<Value, RemoteError> {
        let wire = self.build(request)?;
        debug!(method = wire.method, url = %wire.url, "sending request");

        let response = self
            .http
            .request(wire.method, wire.url.as_str(), wire.headers, wire.body)
            .await
            .map_err(|e| RemoteError::from_transport(e.into()))?;

        if !response.is_success() {
            return Err(decode_error(&response));
        }

        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Object(Map::new()));
        }
        response
            .json::<Value>()
            .map_err(|e| RemoteError::Decode(format!("{e} (HTTP {})", response.status)))
    }
}

/// A URI label value must be present and survive as its own path segment;
/// `push` would silently drop `.` and `..`.
fn label_segment<'a>(label: &str, value: Option<&'a str>) -> Result<&'a str, RemoteError> {
    match value {
        None | Some("") => Err(RemoteError::Request(format!("no value for URI label {label}"))),
        Some(dots @ ("." | "..")) => Err(RemoteError::Request(format!(
            "'{dots}' cannot be used for URI label {label}"
        ))),
        Some(value) => Ok(value),
    }
}

/// Render a scalar for a URI label, query parameter or header.
fn scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Decode an AWS REST-JSON error response.
pub fn decode_error(response: &HttpResponse) -> RemoteError {
    let body: Option<Value> = response.json().ok();
    let field = |names: &[&str]| -> Option<String> {
        let body = body.as_ref()?;
        names
            .iter()
            .find_map(|name| body.get(*name).and_then(Value::as_str))
            .map(str::to_string)
    };

    let code = response
        .header("x-amzn-ErrorType")
        .map(str::to_string)
        .or_else(|| field(&["__type", "code", "Code"]))
        .map(|raw| sanitize_error_code(&raw))
        .unwrap_or_else(|| format!("Http{}", response.status));

    let message = field(&["message", "Message", "errorMessage"])
        .or_else(|| {
            response
                .body_string()
                .ok()
                .map(|text| text.trim().chars().take(512).collect::<String>())
                .filter(|text| !text.is_empty())
        })
        .unwrap_or_else(|| "no error message returned".to_string());

    let request_id = response
        .header("x-amzn-RequestId")
        .or_else(|| response.header("x-amz-request-id"))
        .map(str::to_string);

    RemoteError::Service {
        status: response.status,
        code,
        message,
        request_id,
    }
}

/// `aws.protocoltests#ValidationException:http://...` -> `ValidationException`
fn sanitize_error_code(raw: &str) -> String {
    let before_colon = raw.split(':').next().unwrap_or(raw);
    before_colon
        .rsplit('#')
        .next()
        .unwrap_or(before_colon)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ReqwestHttpClient;
    use agentctl_core::registry::find;
    use agentctl_core::{bind, RawInputs, RawValue};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    struct NoHttp;

    #[async_trait]
    impl HttpClient for NoHttp {
        async fn request(
            &self,
            _method: &str,
            _url: &str,
            _headers: Vec<(String, String)>,
            _body: Option<Vec<u8>>,
        ) -> anyhow::Result<HttpResponse> {
            anyhow::bail!("not used")
        }
    }

    fn client(endpoint: &str) -> RestJsonClient<NoHttp> {
        RestJsonClient::new(NoHttp, endpoint)
    }

    #[test]
    fn test_uri_labels_and_query() {
        let op = find("get-agent-runtime").unwrap();
        let raw = RawInputs::new()
            .with("agentRuntimeId", "rt/1 a")
            .with("agentRuntimeVersion", "3");
        let wire = client("https://example.com").build(&bind(op, &raw).unwrap()).unwrap();

        assert_eq!(wire.method, "GET");
        assert_eq!(wire.url.path(), "/runtimes/rt%2F1%20a/");
        assert_eq!(wire.url.query(), Some("version=3"));
        assert!(wire.body.is_none());
    }

    #[test]
    fn test_label_segment_rejects_missing_and_dot_values() {
        assert_eq!(label_segment("memoryId", Some("m..1")).unwrap(), "m..1");
        for value in [None, Some(""), Some("."), Some("..")] {
            let err = label_segment("memoryId", value).unwrap_err();
            assert!(matches!(err, RemoteError::Request(ref msg) if msg.contains("memoryId")));
        }
    }

    #[test]
    fn test_body_fields_and_endpoint_prefix() {
        let op = find("new-memory").unwrap();
        let raw = RawInputs::new()
            .with("name", "notes")
            .with("eventExpiryDuration", "7")
            .with("clientToken", "tok");
        let wire = client("http://localhost:4566/agentcore/")
            .build(&bind(op, &raw).unwrap())
            .unwrap();

        assert_eq!(wire.method, "POST");
        assert_eq!(wire.url.as_str(), "http://localhost:4566/agentcore/memories/create");
        let body: Value = serde_json::from_slice(wire.body.as_ref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "notes", "eventExpiryDuration": 7, "clientToken": "tok"}));
        assert!(wire
            .headers
            .iter()
            .any(|(k, v)| k == "Content-Type" && v == "application/json"));
    }

    #[test]
    fn test_repeated_query_values_and_encoded_arn() {
        let op = find("remove-resource-tag").unwrap();
        let raw = RawInputs::new()
            .with("resourceArn", "arn:aws:bedrock-agentcore:us-west-2:123456789012:gateway/gw-1")
            .with("tagKeys", RawValue::List(vec!["team".into(), "env".into()]));
        let wire = client("https://example.com").build(&bind(op, &raw).unwrap()).unwrap();

        assert_eq!(wire.method, "DELETE");
        assert!(wire.url.path().starts_with("/tags/arn:aws:bedrock-agentcore"));
        assert!(wire.url.path().ends_with("gateway%2Fgw-1"));
        assert_eq!(wire.url.query(), Some("tagKeys=team&tagKeys=env"));
        assert!(wire.body.is_none());
    }

    #[test]
    fn test_post_without_fields_sends_empty_object() {
        let op = find("get-token-vault").unwrap();
        let wire = client("https://example.com")
            .build(&bind(op, &RawInputs::new()).unwrap())
            .unwrap();
        assert_eq!(wire.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_decode_error_from_header_and_body() {
        let response = HttpResponse {
            status: 400,
            headers: vec![
                (
                    "X-Amzn-ErrorType".into(),
                    "ValidationException:http://internal.amazon.com/coral/".into(),
                ),
                ("X-Amzn-RequestId".into(), "req-7".into()),
            ],
            body: br#"{"message":"name is too long"}"#.to_vec(),
        };
        match decode_error(&response) {
            RemoteError::Service {
                status,
                code,
                message,
                request_id,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code, "ValidationException");
                assert_eq!(message, "name is too long");
                assert_eq!(request_id.as_deref(), Some("req-7"));
            }
            other => panic!("unexpected {other:?}"),
        }

        let response = HttpResponse {
            status: 404,
            headers: vec![],
            body: br#"{"__type":"com.amazonaws.agentcore#ResourceNotFoundException","Message":"gone"}"#.to_vec(),
        };
        assert!(matches!(
            decode_error(&response),
            RemoteError::Service { ref code, ref message, .. }
                if code == "ResourceNotFoundException" && message == "gone"
        ));

        let response = HttpResponse {
            status: 502,
            headers: vec![],
            body: b"Bad Gateway".to_vec(),
        };
        assert!(matches!(
            decode_error(&response),
            RemoteError::Service { ref code, ref message, .. }
                if code == "Http502" && message == "Bad Gateway"
        ));
    }

    #[tokio::test]
    async fn test_call_against_mock_server() {
        let server = MockServer::start_async().await;
        let list = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/policy-engines/pe-1/policies")
                    .query_param("maxResults", "5");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({"policies": [{"policyId": "p-1"}], "nextToken": "n"}));
            })
            .await;

        let http = ReqwestHttpClient::new(Duration::from_secs(5), None).unwrap();
        let client = RestJsonClient::new(http, server.base_url());
        let op = find("get-policy-list").unwrap();
        let raw = RawInputs::new()
            .with("policyEngineId", "pe-1")
            .with("maxResults", "5");

        let value = client.call(&bind(op, &raw).unwrap()).await.unwrap();
        list.assert_async().await;
        assert_eq!(value["policies"][0]["policyId"], "p-1");
    }

    #[tokio::test]
    async fn test_call_decodes_service_error_and_empty_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/gateways/gw-404/");
                then.status(404)
                    .header("x-amzn-ErrorType", "ResourceNotFoundException")
                    .body(r#"{"message":"Gateway gw-404 not found"}"#);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/identities/DeleteWorkloadIdentity");
                then.status(204);
            })
            .await;

        let http = ReqwestHttpClient::new(Duration::from_secs(5), None).unwrap();
        let client = RestJsonClient::new(http, server.base_url());

        let op = find("remove-gateway").unwrap();
        let request = bind(op, &RawInputs::new().with("gatewayIdentifier", "gw-404")).unwrap();
        let err = client.call(&request).await.unwrap_err();
        assert!(matches!(err, RemoteError::Service { status: 404, .. }));
        assert!(err.to_string().contains("Gateway gw-404 not found"));

        let op = find("remove-workload-identity").unwrap();
        let request = bind(op, &RawInputs::new().with("name", "wi")).unwrap();
        assert_eq!(client.call(&request).await.unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_classified() {
        let http = ReqwestHttpClient::new(Duration::from_secs(5), None).unwrap();
        let client = RestJsonClient::new(http, "http://agentctl-test.invalid");
        let op = find("get-memory").unwrap();
        let request = bind(op, &RawInputs::new().with("memoryId", "m-1")).unwrap();

        let err = client.call(&request).await.unwrap_err();
        assert!(
            matches!(err, RemoteError::NameResolution(_)),
            "unexpected error: {err:?}"
        );
    }
}
