//! REST v1.1 client signed with OAuth 1.0a.

use async_trait::async_trait;
use reqwest::{multipart, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::config::{AccountConfig, ApiConfig};
use crate::metrics;

use super::oauth::{percent_encode, OAuthSigner};
use super::{
    ApiError, Cursor, IdListing, IdPage, ListInfo, Post, SearchQuery, SocialApi, StatusId,
    UserId, UserProfile, LOOKUP_BATCH_LIMIT,
};

/// Twitter REST API client.
#[derive(Debug)]
pub struct TwitterClient {
    client: Client,
    base_url: String,
    upload_url: String,
    signer: OAuthSigner,
}

impl TwitterClient {
    pub fn new(api: &ApiConfig, account: &AccountConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs as u64))
            .user_agent(format!("tweeterbot/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            upload_url: api.upload_url.trim_end_matches('/').to_string(),
            signer: OAuthSigner::new(account),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        self.request("GET", endpoint, params).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        self.request("POST", endpoint, params).await
    }

    /// Single attempt, no retry. Parameters travel in the query string so
    /// they are covered by the signature for both GET and POST.
    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        endpoint: &str,
        params: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let auth_header = self.signer.sign(method, &url, &params)?;

        let full_url = if params.is_empty() {
            url
        } else {
            let query = params
                .iter()
                .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            format!("{}?{}", url, query)
        };

        debug!(method, endpoint, "Calling API");

        let request = match method {
            "POST" => self.client.post(&full_url),
            _ => self.client.get(&full_url),
        };

        let response = request
            .header("Authorization", auth_header)
            .send()
            .await?;

        let result = handle_response(response).await;
        record_request(method, &result);
        result
    }

    /// Upload an image and return its media id.
    async fn upload_media(&self, path: &Path) -> Result<u64, ApiError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::Media(format!("{}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "media".to_string());

        let url = format!("{}/media/upload.json", self.upload_url);
        let auth_header = self.signer.sign("POST", &url, &[])?;
        let form = multipart::Form::new()
            .part("media", multipart::Part::bytes(bytes).file_name(file_name));

        debug!(path = %path.display(), "Uploading media");

        let response = self
            .client
            .post(&url)
            .header("Authorization", auth_header)
            .multipart(form)
            .send()
            .await?;

        let uploaded: Result<MediaUploadResponse, ApiError> = handle_response(response).await;
        record_request("POST", &uploaded);
        Ok(uploaded?.media_id)
    }
}

#[async_trait]
impl SocialApi for TwitterClient {
    fn name(&self) -> &str {
        "twitter"
    }

    async fn list_ids(
        &self,
        listing: IdListing,
        screen_name: &str,
        cursor: Cursor,
    ) -> Result<IdPage, ApiError> {
        let endpoint = match listing {
            IdListing::Followers => "/followers/ids.json",
            IdListing::Friends => "/friends/ids.json",
        };
        self.get(
            endpoint,
            vec![
                ("screen_name".to_string(), screen_name.to_string()),
                ("cursor".to_string(), cursor.to_string()),
                ("count".to_string(), "5000".to_string()),
            ],
        )
        .await
    }

    async fn lookup_users(&self, ids: &[UserId]) -> Result<Vec<UserProfile>, ApiError> {
        if ids.len() > LOOKUP_BATCH_LIMIT {
            return Err(ApiError::BatchTooLarge {
                size: ids.len(),
                max: LOOKUP_BATCH_LIMIT,
            });
        }
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.post(
            "/users/lookup.json",
            vec![("user_id".to_string(), joined)],
        )
        .await
    }

    async fn follow(&self, id: UserId) -> Result<UserProfile, ApiError> {
        self.post(
            "/friendships/create.json",
            vec![
                ("user_id".to_string(), id.to_string()),
                ("follow".to_string(), "true".to_string()),
            ],
        )
        .await
    }

    async fn unfollow(&self, id: UserId) -> Result<UserProfile, ApiError> {
        self.post(
            "/friendships/destroy.json",
            vec![("user_id".to_string(), id.to_string())],
        )
        .await
    }

    async fn favorite(&self, id: StatusId) -> Result<Post, ApiError> {
        self.post(
            "/favorites/create.json",
            vec![("id".to_string(), id.to_string())],
        )
        .await
    }

    async fn retweet(&self, id: StatusId) -> Result<Post, ApiError> {
        self.post(&format!("/statuses/retweet/{}.json", id), Vec::new())
            .await
    }

    async fn unretweet(&self, id: StatusId) -> Result<Post, ApiError> {
        self.post(&format!("/statuses/unretweet/{}.json", id), Vec::new())
            .await
    }

    async fn post_status(&self, text: &str, media: Option<&Path>) -> Result<Post, ApiError> {
        let mut params = vec![("status".to_string(), text.to_string())];
        if let Some(path) = media {
            let media_id = self.upload_media(path).await?;
            params.push(("media_ids".to_string(), media_id.to_string()));
        }
        self.post("/statuses/update.json", params).await
    }

    async fn delete_status(&self, id: StatusId) -> Result<Post, ApiError> {
        self.post(&format!("/statuses/destroy/{}.json", id), Vec::new())
            .await
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Post>, ApiError> {
        let response: SearchResponse = self
            .get(
                "/search/tweets.json",
                vec![
                    ("q".to_string(), query.phrase.clone()),
                    (
                        "result_type".to_string(),
                        query.result_type.as_str().to_string(),
                    ),
                    ("count".to_string(), query.count.to_string()),
                ],
            )
            .await?;
        Ok(response.statuses)
    }

    async fn list_muted_ids(&self, cursor: Cursor) -> Result<IdPage, ApiError> {
        self.get(
            "/mutes/users/ids.json",
            vec![("cursor".to_string(), cursor.to_string())],
        )
        .await
    }

    async fn mute(&self, id: UserId) -> Result<UserProfile, ApiError> {
        self.post(
            "/mutes/users/create.json",
            vec![("user_id".to_string(), id.to_string())],
        )
        .await
    }

    async fn unmute(&self, id: UserId) -> Result<UserProfile, ApiError> {
        self.post(
            "/mutes/users/destroy.json",
            vec![("user_id".to_string(), id.to_string())],
        )
        .await
    }

    async fn add_list_member(
        &self,
        owner_screen_name: &str,
        slug: &str,
        screen_name: &str,
    ) -> Result<ListInfo, ApiError> {
        self.post(
            "/lists/members/create.json",
            vec![
                ("owner_screen_name".to_string(), owner_screen_name.to_string()),
                ("slug".to_string(), slug.to_string()),
                ("screen_name".to_string(), screen_name.to_string()),
            ],
        )
        .await
    }
}

fn record_request<T>(method: &str, result: &Result<T, ApiError>) {
    let status = match result {
        Ok(_) => "success",
        Err(e) if e.is_quota_exceeded() => "rate_limited",
        Err(_) => "error",
    };
    metrics::API_REQUESTS
        .with_label_values(&[method, status])
        .inc();
}

async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("x-rate-limit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(|reset| reset.saturating_sub(chrono::Utc::now().timestamp().max(0) as u64));
        return Err(ApiError::RateLimited { retry_after });
    }

    let bytes = response.bytes().await?;

    if status.is_success() {
        return serde_json::from_slice(&bytes).map_err(ApiError::from);
    }

    let (code, message) = match serde_json::from_slice::<ErrorResponse>(&bytes) {
        Ok(ErrorResponse {
            errors: Some(errors),
            ..
        }) if !errors.is_empty() => (errors[0].code, errors[0].message.clone()),
        Ok(ErrorResponse {
            error: Some(message),
            ..
        }) => (None, message),
        _ => (
            None,
            String::from_utf8_lossy(&bytes).chars().take(200).collect(),
        ),
    };

    Err(ApiError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    statuses: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct MediaUploadResponse {
    media_id: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Option<Vec<ErrorDetail>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResultType;
    use wiremock::{
        matchers::{header_exists, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn test_client(server: &MockServer) -> TwitterClient {
        let api = ApiConfig {
            base_url: server.uri(),
            upload_url: server.uri(),
            timeout_secs: 5,
        };
        let account = AccountConfig {
            handle: "rustacean".into(),
            consumer_key: "ck".into(),
            consumer_secret: "cs".into(),
            access_token: "at".into(),
            access_token_secret: "ats".into(),
        };
        TwitterClient::new(&api, &account).unwrap()
    }

    fn user_json(id: u64, name: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "screen_name": name,
            "followers_count": 250,
            "friends_count": 100,
            "statuses_count": 900,
            "protected": false,
            "verified": false,
            "following": false,
            "profile_image_url": format!("http://pbs.twimg.com/profile_images/{}/a_normal.png", id),
            "profile_image_url_https": format!("https://pbs.twimg.com/profile_images/{}/a_normal.png", id),
            "default_profile_image": false
        })
    }

    #[tokio::test]
    async fn test_list_follower_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/followers/ids.json"))
            .and(query_param("screen_name", "rustacean"))
            .and(query_param("cursor", "-1"))
            .and(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ids": [11, 22, 33],
                "next_cursor": 1480
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let page = client
            .list_ids(IdListing::Followers, "rustacean", -1)
            .await
            .unwrap();
        assert_eq!(page.ids, vec![UserId(11), UserId(22), UserId(33)]);
        assert_eq!(page.next_cursor, 1480);
        assert!(!page.is_last());
    }

    #[tokio::test]
    async fn test_lookup_users() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/lookup.json"))
            .and(query_param("user_id", "1,2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                user_json(1, "one"),
                user_json(2, "two")
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let users = client.lookup_users(&[UserId(1), UserId(2)]).await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].screen_name, "two");
        assert_eq!(users[1].followers_count, Some(250));
    }

    #[tokio::test]
    async fn test_lookup_decodes_full_user_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/lookup.json"))
            .and(query_param("user_id", "783214"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{
                    "id": 783214,
                    "id_str": "783214",
                    "name": "Twitter",
                    "screen_name": "Twitter",
                    "location": "San Francisco, CA",
                    "description": "What's happening?!",
                    "url": null,
                    "entities": { "description": { "urls": [] } },
                    "protected": false,
                    "followers_count": 56675981,
                    "friends_count": 46,
                    "listed_count": 89874,
                    "created_at": "Tue Feb 20 14:35:54 +0000 2007",
                    "favourites_count": 5931,
                    "verified": true,
                    "statuses_count": 12228,
                    "status": { "id": 1111, "text": "hello" },
                    "profile_image_url": "http://pbs.twimg.com/profile_images/942858479592554497/BbazLO9L_normal.jpg",
                    "profile_image_url_https": "https://pbs.twimg.com/profile_images/942858479592554497/BbazLO9L_normal.jpg",
                    "default_profile": false,
                    "default_profile_image": false,
                    "following": false,
                    "follow_request_sent": false,
                    "notifications": false
                }]"#,
            ))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let users = client.lookup_users(&[UserId(783214)]).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].screen_name, "Twitter");
        assert_eq!(users[0].statuses_count, Some(12228));
        assert!(users[0].is_verified());
        assert!(users[0].has_profile_image());
    }

    #[tokio::test]
    async fn test_lookup_rejects_oversized_batch() {
        let server = MockServer::start().await;
        let client = test_client(&server);
        let ids: Vec<UserId> = (0..101).map(UserId).collect();

        let err = client.lookup_users(&ids).await.unwrap_err();
        assert!(matches!(err, ApiError::BatchTooLarge { size: 101, max: 100 }));
    }

    #[tokio::test]
    async fn test_search_encodes_phrase() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/tweets.json"))
            .and(query_param("q", "#rust lang"))
            .and(query_param("result_type", "recent"))
            .and(query_param("count", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "statuses": [
                    { "id": 900, "text": "ferris says hi", "user": user_json(5, "crab") }
                ]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let posts = client
            .search(&SearchQuery::new("#rust lang", 50, ResultType::Recent))
            .await
            .unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, StatusId(900));
        assert_eq!(posts[0].user.screen_name, "crab");
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/friendships/create.json"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "errors": [{ "code": 88, "message": "Rate limit exceeded" }]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.follow(UserId(3)).await.unwrap_err();
        assert!(matches!(err, ApiError::RateLimited { .. }));
        assert!(err.is_quota_exceeded());
    }

    #[tokio::test]
    async fn test_api_error_code_is_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/favorites/create.json"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "errors": [{ "code": 139, "message": "You have already favorited this status." }]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.favorite(StatusId(77)).await.unwrap_err();
        match err {
            ApiError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 403);
                assert_eq!(code, Some(139));
                assert!(message.contains("already favorited"));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_follow_limit_is_quota() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/friendships/create.json"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "errors": [{ "code": 161, "message": "You are unable to follow more people at this time." }]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.follow(UserId(3)).await.unwrap_err();
        assert!(err.is_quota_exceeded());
    }

    #[tokio::test]
    async fn test_delete_status_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/statuses/destroy/123456.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 123456, "text": "old news", "user": user_json(1, "rustacean")
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let post = client.delete_status(StatusId(123456)).await.unwrap();
        assert_eq!(post.text, "old news");
    }

    #[tokio::test]
    async fn test_post_status_with_media() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/media/upload.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "media_id": 710511363345354753u64,
                "media_id_string": "710511363345354753"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/statuses/update.json"))
            .and(query_param("status", "look at this"))
            .and(query_param("media_ids", "710511363345354753"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 1, "text": "look at this", "user": user_json(1, "rustacean")
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("crab.png");
        std::fs::write(&image, b"\x89PNG fake").unwrap();

        let client = test_client(&server);
        let post = client
            .post_status("look at this", Some(&image))
            .await
            .unwrap();
        assert_eq!(post.id, StatusId(1));
    }

    #[tokio::test]
    async fn test_muted_ids_and_mute() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mutes/users/ids.json"))
            .and(query_param("cursor", "-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ids": [5, 6],
                "next_cursor": 0,
                "previous_cursor": 0
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/mutes/users/create.json"))
            .and(query_param("user_id", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_json(5, "loud")))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let page = client.list_muted_ids(-1).await.unwrap();
        assert_eq!(page.ids, vec![UserId(5), UserId(6)]);
        assert!(page.is_last());

        let muted = client.mute(UserId(5)).await.unwrap();
        assert_eq!(muted.screen_name, "loud");
    }

    #[tokio::test]
    async fn test_add_list_member() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lists/members/create.json"))
            .and(query_param("owner_screen_name", "rustacean"))
            .and(query_param("slug", "crabs"))
            .and(query_param("screen_name", "ferris"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 574,
                "slug": "crabs",
                "name": "crabs",
                "member_count": 12,
                "user": user_json(1, "rustacean")
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let list = client
            .add_list_member("rustacean", "crabs", "ferris")
            .await
            .unwrap();
        assert_eq!(list.slug, "crabs");
        assert_eq!(list.member_count, Some(12));
    }

    #[tokio::test]
    async fn test_post_status_missing_media_file() {
        let server = MockServer::start().await;
        let client = test_client(&server);

        let err = client
            .post_status("hello", Some(Path::new("/nonexistent/crab.png")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Media(_)));
    }
}
