//! `reqwest` implementation of [`UploadTransport`].

use reqwest::header::{CONTENT_RANGE, HeaderName, LOCATION, RANGE};
use tracing::debug;
use videohub_protocol::ContentRange;
use videohub_protocol::constants::{
    HEADER_UPLOAD_CONTENT_LENGTH, HEADER_UPLOAD_CONTENT_TYPE, INITIATE_QUERY,
};

use crate::config::UploaderConfig;
use crate::error::UploadError;
use crate::transport::{InitiateRequest, TransportFuture, TransportResponse, UploadTransport};

/// HTTP transport authenticated with a bearer token.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl HttpTransport {
    /// Wraps an existing client.
    ///
    /// The client must not follow redirects: a 308 here means "resume
    /// incomplete", not "moved".
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            access_token: access_token.into(),
        }
    }

    /// Builds a transport for `config.endpoint` with its own client.
    pub fn from_config(
        config: &UploaderConfig,
        access_token: impl Into<String>,
    ) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| UploadError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::new(client, config.endpoint.clone(), access_token))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn initiate_request(&self, request: &InitiateRequest) -> reqwest::RequestBuilder {
        self.client
            .post(&self.endpoint)
            .query(&INITIATE_QUERY)
            .bearer_auth(&self.access_token)
            .header(HEADER_UPLOAD_CONTENT_TYPE, request.metadata.media_type())
            .header(HEADER_UPLOAD_CONTENT_LENGTH, request.content_length)
            .json(&request.metadata.insert_body())
    }

    fn chunk_request(
        &self,
        session_url: &str,
        range: ContentRange,
        body: Vec<u8>,
    ) -> reqwest::RequestBuilder {
        self.client
            .put(session_url)
            .bearer_auth(&self.access_token)
            .header(CONTENT_RANGE, range.to_string())
            .body(body)
    }
}

impl UploadTransport for HttpTransport {
    fn initiate<'a>(&'a self, request: &'a InitiateRequest) -> TransportFuture<'a> {
        Box::pin(async move {
            debug!(
                endpoint = %self.endpoint,
                content_length = request.content_length,
                "initiating upload session"
            );
            let response = self
                .initiate_request(request)
                .send()
                .await
                .map_err(|e| UploadError::Transport(format!("initiate request failed: {e}")))?;
            read_response(response).await
        })
    }

    fn put<'a>(
        &'a self,
        session_url: &'a str,
        range: ContentRange,
        body: Vec<u8>,
    ) -> TransportFuture<'a> {
        Box::pin(async move {
            let response = self
                .chunk_request(session_url, range, body)
                .send()
                .await
                .map_err(|e| UploadError::Transport(format!("PUT {range} failed: {e}")))?;
            read_response(response).await
        })
    }
}

async fn read_response(response: reqwest::Response) -> Result<TransportResponse, UploadError> {
    let header = |name: HeaderName| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let status = response.status().as_u16();
    let location = header(LOCATION);
    let range = header(RANGE);

    let body = response
        .bytes()
        .await
        .map_err(|e| UploadError::Transport(format!("failed to read response body: {e}")))?
        .to_vec();

    Ok(TransportResponse {
        status,
        location,
        range,
        body,
    })
}
