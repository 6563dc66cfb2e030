use std::fmt;

use {
    async_trait::async_trait,
    reqwest::{Client, Method, RequestBuilder},
    secrecy::{ExposeSecret, Secret},
    serde::{Serialize, de::DeserializeOwned},
    switchboard_config::GatewayConfig,
    switchboard_protocol::{
        API_KEY_HEADER, Ack, BalancedSendRequest, CreateInstanceGroup, Instance, InstanceGroup,
        IntegrationSession, MemberRequest, SendReceipt, SessionScope, TargetStatus,
        UpdateInstanceGroup,
    },
    tracing::{debug, trace},
    urlencoding::encode,
};

use crate::{
    api::{InstanceApi, InstanceGroupApi, IntegrationSessionApi, MessageApi},
    error::{ClientError, ClientResult, extract_message},
};

/// reqwest-backed gateway client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct HttpGatewayClient {
    http: Client,
    base_url: String,
    api_key: Option<Secret<String>>,
}

impl fmt::Debug for HttpGatewayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpGatewayClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HttpGatewayClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<Secret<String>>) -> Self {
        Self::with_http(Client::new(), base_url, api_key)
    }

    pub fn with_http(
        http: Client,
        base_url: impl Into<String>,
        api_key: Option<Secret<String>>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Build from the `[gateway]` config section.
    pub fn from_config(config: &GatewayConfig) -> ClientResult<Self> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        let api_key = config.api_key.clone().map(Secret::new);
        Ok(Self::with_http(http, config.base_url.clone(), api_key))
    }

    /// Same endpoint and pool, different credential (e.g. an instance token).
    pub fn with_api_key(&self, api_key: Option<Secret<String>>) -> Self {
        Self {
            api_key,
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        trace!(%method, %url, "gateway request");
        let builder = self.http.request(method, url);
        match &self.api_key {
            Some(key) => builder.header(API_KEY_HEADER, key.expose_secret()),
            None => builder,
        }
    }

    /// Body of a 2xx response; anything else becomes `ClientError::Status`.
    async fn send_raw(&self, builder: RequestBuilder) -> ClientResult<String> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "gateway call failed");
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: extract_message(&body),
            });
        }
        Ok(body)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let body = self.send_raw(builder).await?;
        let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
        Ok(serde_json::from_str(body)?)
    }

    /// Acknowledgements are taken as confirmed on any 2xx. A body that is not
    /// an `Ack` object becomes its message.
    async fn send_ack(&self, builder: RequestBuilder) -> ClientResult<Ack> {
        let body = self.send_raw(builder).await?;
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Ok(Ack::default());
        }
        Ok(serde_json::from_str(trimmed).unwrap_or_else(|_| {
            debug!("gateway acknowledged with a non-JSON body");
            Ack {
                message: trimmed.to_string(),
            }
        }))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.request(Method::GET, path)).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send(self.request(method, path).json(body)).await
    }
}

fn group_path(group_id: &str) -> String {
    format!("/instance-group/{}", encode(group_id))
}

fn members_path(group_id: &str) -> String {
    format!("/instance-group/{}/instances", encode(group_id))
}

#[async_trait]
impl InstanceGroupApi for HttpGatewayClient {
    async fn list_groups(&self) -> ClientResult<Vec<InstanceGroup>> {
        self.get("/instance-group").await
    }

    async fn get_group(&self, group_id: &str) -> ClientResult<InstanceGroup> {
        self.get(&group_path(group_id)).await
    }

    async fn create_group(&self, spec: &CreateInstanceGroup) -> ClientResult<InstanceGroup> {
        self.send_json(Method::POST, "/instance-group", spec).await
    }

    async fn update_group(
        &self,
        group_id: &str,
        patch: &UpdateInstanceGroup,
    ) -> ClientResult<InstanceGroup> {
        self.send_json(Method::PUT, &group_path(group_id), patch).await
    }

    async fn delete_group(&self, group_id: &str) -> ClientResult<Ack> {
        self.send_ack(self.request(Method::DELETE, &group_path(group_id)))
            .await
    }

    async fn add_instance(&self, group_id: &str, instance_name: &str) -> ClientResult<Ack> {
        let body = MemberRequest {
            instance_name: instance_name.to_string(),
        };
        self.send_ack(self.request(Method::POST, &members_path(group_id)).json(&body))
            .await
    }

    async fn remove_instance(&self, group_id: &str, instance_name: &str) -> ClientResult<Ack> {
        // The target member travels in the body of a DELETE.
        let body = MemberRequest {
            instance_name: instance_name.to_string(),
        };
        self.send_ack(self.request(Method::DELETE, &members_path(group_id)).json(&body))
            .await
    }
}

#[async_trait]
impl MessageApi for HttpGatewayClient {
    async fn send_text_with_group_balancing(
        &self,
        request: &BalancedSendRequest,
    ) -> ClientResult<SendReceipt> {
        self.send_json(Method::POST, "/message/sendTextWithGroupBalancing", request)
            .await
    }
}

#[async_trait]
impl InstanceApi for HttpGatewayClient {
    async fn fetch_instances(&self) -> ClientResult<Vec<Instance>> {
        self.get("/instance/fetchInstances").await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangeStatusBody<'a> {
    remote_jid: &'a str,
    status: TargetStatus,
}

#[async_trait]
impl IntegrationSessionApi for HttpGatewayClient {
    async fn fetch_sessions(&self, scope: &SessionScope) -> ClientResult<Vec<IntegrationSession>> {
        let path = format!(
            "/{}/fetchSessions/{}/{}",
            scope.integration.path_segment(),
            encode(&scope.bot_id),
            encode(&scope.instance_name)
        );
        self.get(&path).await
    }

    async fn change_session_status(
        &self,
        scope: &SessionScope,
        remote_jid: &str,
        status: TargetStatus,
    ) -> ClientResult<Ack> {
        let path = format!(
            "/{}/changeStatus/{}",
            scope.integration.path_segment(),
            encode(&scope.instance_name)
        );
        let body = ChangeStatusBody { remote_jid, status };
        self.send_ack(self.request(Method::POST, &path).json(&body))
            .await
    }
}
