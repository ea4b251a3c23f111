use async_trait::async_trait;
use reqwest::{multipart, Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::models::{PlayerProfile, Session, SessionIdentity, SkillLevel};
use crate::services::ports::{IdentityProvider, ImageStore, ProfileStore, ServiceError};

/// Errors that can occur when interacting with Appwrite
#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl AppwriteError {
    /// Convert for an auth flow, where rejections are shown to the user as-is
    fn into_auth(self) -> ServiceError {
        match self {
            AppwriteError::ApiError { status, message } if matches!(status, 400 | 401 | 409 | 429) => {
                ServiceError::Auth(message)
            }
            other => other.into(),
        }
    }
}

impl From<AppwriteError> for ServiceError {
    fn from(err: AppwriteError) -> Self {
        match err {
            AppwriteError::NotFound(what) => ServiceError::NotFound(what),
            other => ServiceError::Backend(other.to_string()),
        }
    }
}

/// Appwrite API client
///
/// Handles all communication with the Appwrite backend including:
/// - Account creation and email/password sessions
/// - Reading, writing and listing player profile documents
/// - Uploading profile pictures to a storage bucket
pub struct AppwriteClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
    collections: AppwriteCollections,
}

/// Collection and bucket IDs in Appwrite
#[derive(Debug, Clone)]
pub struct AppwriteCollections {
    pub players: String,
    pub profile_images: String,
    /// Upper bound on documents fetched for one roster
    pub roster_limit: u32,
}

#[derive(Debug, Deserialize)]
struct AppwriteUser {
    #[serde(rename = "$id")]
    id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct AppwriteSession {
    #[serde(rename = "$id")]
    id: String,
    #[serde(rename = "userId")]
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct SessionList {
    #[serde(default)]
    sessions: Vec<AppwriteSession>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl AppwriteClient {
    /// Create a new Appwrite client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collections: AppwriteCollections,
    ) -> Result<Self, AppwriteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            project_id,
            database_id,
            client,
            collections,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
    }

    fn documents_path(&self) -> String {
        format!(
            "/databases/{}/collections/{}/documents",
            self.database_id, self.collections.players
        )
    }

    fn file_path(&self, file_id: &str) -> String {
        format!(
            "/storage/buckets/{}/files/{}",
            self.collections.profile_images,
            urlencoding::encode(file_id)
        )
    }

    /// Turn a non-success response into an error carrying Appwrite's message
    async fn api_error(response: Response) -> AppwriteError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status.to_string());

        tracing::debug!("Appwrite returned {}: {}", status, message);

        AppwriteError::ApiError {
            status: status.as_u16(),
            message,
        }
    }

    /// Fetch a single player profile document
    pub async fn get_profile(&self, id: &str) -> Result<Option<PlayerProfile>, AppwriteError> {
        let path = format!("{}/{}", self.documents_path(), urlencoding::encode(id));

        tracing::debug!("Fetching profile for user: {}", id);

        let response = self.request(Method::GET, &path).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let json: Value = response.json().await?;
        serde_json::from_value(json)
            .map(Some)
            .map_err(|e| AppwriteError::InvalidResponse(format!("Failed to parse profile: {}", e)))
    }

    /// Update a profile document, creating it when it doesn't exist yet
    pub async fn put_profile(&self, profile: &PlayerProfile) -> Result<(), AppwriteError> {
        let data = profile.document_data();
        let path = format!("{}/{}", self.documents_path(), urlencoding::encode(&profile.id));

        let response = self
            .request(Method::PATCH, &path)
            .json(&json!({ "data": data }))
            .send()
            .await?;

        if response.status() != StatusCode::NOT_FOUND {
            if !response.status().is_success() {
                return Err(Self::api_error(response).await);
            }
            tracing::debug!("Updated profile {}", profile.id);
            return Ok(());
        }

        let response = self
            .request(Method::POST, &self.documents_path())
            .json(&json!({ "documentId": profile.id, "data": data }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        tracing::debug!("Created profile {}", profile.id);
        Ok(())
    }

    /// List player profiles, optionally restricted to one skill level
    pub async fn list_profiles(&self, skill_level: Option<SkillLevel>) -> Result<Vec<PlayerProfile>, AppwriteError> {
        let mut queries = Vec::new();
        if let Some(level) = skill_level {
            queries.push(format!("equal(\"skillLevel\", [\"{}\"])", level.as_str()));
        }
        queries.push(format!("limit({})", self.collections.roster_limit));

        let query_string = queries
            .iter()
            .map(|q| format!("queries[]={}", urlencoding::encode(q)))
            .collect::<Vec<_>>()
            .join("&");

        let path = format!("{}?{}", self.documents_path(), query_string);

        let response = self.request(Method::GET, &path).send().await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let json: Value = response.json().await?;

        let total = json.get("total").and_then(|t| t.as_u64()).unwrap_or(0);

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| AppwriteError::InvalidResponse("Missing documents array".into()))?;

        let profiles: Vec<PlayerProfile> = documents
            .iter()
            .filter_map(|doc| match serde_json::from_value(doc.clone()) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!("Skipping unreadable profile document: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Listed {} profiles (total: {})", profiles.len(), total);

        Ok(profiles)
    }

    /// Create a user account
    pub async fn create_user(&self, email: &str, password: &str, name: &str) -> Result<SessionIdentity, AppwriteError> {
        let payload = json!({
            "userId": uuid::Uuid::new_v4().simple().to_string(),
            "email": email,
            "password": password,
            "name": name,
        });

        let response = self.request(Method::POST, "/users").json(&payload).send().await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let user: AppwriteUser = response.json().await?;
        tracing::info!("Registered user {}", user.id);

        Ok(SessionIdentity {
            user_id: user.id,
            email: user.email,
            name: user.name,
        })
    }

    /// Open an email/password session
    pub async fn create_session(&self, email: &str, password: &str) -> Result<Session, AppwriteError> {
        let response = self
            .request(Method::POST, "/account/sessions/email")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let session: AppwriteSession = response.json().await?;

        Ok(Session {
            user_id: session.user_id,
            session_id: session.id,
        })
    }

    /// Delete a session; an already-gone session counts as success
    pub async fn delete_session(&self, session: &Session) -> Result<(), AppwriteError> {
        let path = format!(
            "/users/{}/sessions/{}",
            urlencoding::encode(&session.user_id),
            urlencoding::encode(&session.session_id)
        );

        let response = self.request(Method::DELETE, &path).send().await?;

        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }

        Err(Self::api_error(response).await)
    }

    /// Identity for an active session
    pub async fn session_user(&self, session: &Session) -> Result<Option<SessionIdentity>, AppwriteError> {
        let user_path = format!("/users/{}", urlencoding::encode(&session.user_id));

        let response = self
            .request(Method::GET, &format!("{}/sessions", user_path))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let list: SessionList = response.json().await?;
        if !list.sessions.iter().any(|s| s.id == session.session_id) {
            return Ok(None);
        }

        let response = self.request(Method::GET, &user_path).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let user: AppwriteUser = response.json().await?;

        Ok(Some(SessionIdentity {
            user_id: user.id,
            email: user.email,
            name: user.name,
        }))
    }

    /// Upload a file to the profile image bucket under a fresh file id.
    ///
    /// Nothing existing is touched, so a failed upload leaves the current
    /// picture intact.
    pub async fn upload_file(&self, owner: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, AppwriteError> {
        let file_id = uuid::Uuid::new_v4().simple().to_string();

        let part = multipart::Part::bytes(bytes)
            .file_name(owner.to_string())
            .mime_str(content_type)?;
        let form = multipart::Form::new()
            .text("fileId", file_id.clone())
            .part("file", part);

        let path = format!("/storage/buckets/{}/files", self.collections.profile_images);

        let response = self.request(Method::POST, &path).multipart(form).send().await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        tracing::debug!(
            "Uploaded file {} for {} to bucket {}",
            file_id,
            owner,
            self.collections.profile_images
        );

        Ok(self.file_url(&file_id))
    }

    /// Delete a file from the profile image bucket; a missing file counts as deleted
    pub async fn delete_file(&self, file_id: &str) -> Result<(), AppwriteError> {
        let response = self.request(Method::DELETE, &self.file_path(file_id)).send().await?;

        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }

        Err(Self::api_error(response).await)
    }

    fn file_url(&self, file_id: &str) -> String {
        format!(
            "{}{}/view?project={}",
            self.base_url,
            self.file_path(file_id),
            urlencoding::encode(&self.project_id)
        )
    }

    /// File id inside a view URL built by `file_url`
    fn file_id_from_url(&self, url: &str) -> Option<String> {
        let prefix = format!(
            "{}/storage/buckets/{}/files/",
            self.base_url, self.collections.profile_images
        );
        let encoded = url.strip_prefix(&prefix)?.split('/').next()?;
        urlencoding::decode(encoded)
            .ok()
            .map(|id| id.into_owned())
            .filter(|id| !id.is_empty())
    }
}

#[async_trait]
impl IdentityProvider for AppwriteClient {
    async fn register(&self, email: &str, password: &str, name: &str) -> Result<SessionIdentity, ServiceError> {
        self.create_user(email, password, name)
            .await
            .map_err(AppwriteError::into_auth)
    }

    async fn login(&self, email: &str, password: &str) -> Result<Session, ServiceError> {
        self.create_session(email, password)
            .await
            .map_err(AppwriteError::into_auth)
    }

    async fn logout(&self, session: &Session) -> Result<(), ServiceError> {
        Ok(self.delete_session(session).await?)
    }

    async fn current_user(&self, session: &Session) -> Result<Option<SessionIdentity>, ServiceError> {
        Ok(self.session_user(session).await?)
    }
}

#[async_trait]
impl ProfileStore for AppwriteClient {
    async fn get(&self, id: &str) -> Result<Option<PlayerProfile>, ServiceError> {
        Ok(self.get_profile(id).await?)
    }

    async fn put(&self, profile: &PlayerProfile) -> Result<(), ServiceError> {
        Ok(self.put_profile(profile).await?)
    }

    async fn query_all(&self) -> Result<Vec<PlayerProfile>, ServiceError> {
        Ok(self.list_profiles(None).await?)
    }

    async fn query_by_skill_level(&self, level: SkillLevel) -> Result<Vec<PlayerProfile>, ServiceError> {
        Ok(self.list_profiles(Some(level)).await?)
    }
}

#[async_trait]
impl ImageStore for AppwriteClient {
    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, ServiceError> {
        Ok(self.upload_file(key, bytes, content_type).await?)
    }

    async fn delete(&self, url: &str) -> Result<(), ServiceError> {
        match self.file_id_from_url(url) {
            Some(file_id) => Ok(self.delete_file(&file_id).await?),
            None => {
                tracing::debug!("Not deleting {}: not a file in this bucket", url);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn collections() -> AppwriteCollections {
        AppwriteCollections {
            players: "players".to_string(),
            profile_images: "profile_images".to_string(),
            roster_limit: 100,
        }
    }

    fn client_for(server: &mockito::ServerGuard) -> AppwriteClient {
        AppwriteClient::new(
            server.url(),
            "test_key".to_string(),
            "test_project".to_string(),
            "test_db".to_string(),
            collections(),
        )
        .unwrap()
    }

    #[test]
    fn test_appwrite_client_creation() {
        let client = AppwriteClient::new(
            "https://appwrite.test/v1/".to_string(),
            "test_key".to_string(),
            "test_project".to_string(),
            "test_db".to_string(),
            collections(),
        )
        .unwrap();

        assert_eq!(client.base_url, "https://appwrite.test/v1");
        assert_eq!(client.api_key, "test_key");
        assert_eq!(
            client.documents_path(),
            "/databases/test_db/collections/players/documents"
        );
    }

    #[tokio::test]
    async fn test_get_profile() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/databases/test_db/collections/players/documents/u1")
            .match_header("x-appwrite-project", "test_project")
            .match_header("x-appwrite-key", "test_key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"$id": "u1", "firstName": "Ana", "skillLevel": "Advanced", "zipcode": "10001"}"#)
            .create_async()
            .await;

        let profile = client_for(&server).get_profile("u1").await.unwrap().unwrap();

        mock.assert_async().await;
        assert_eq!(profile.id, "u1");
        assert_eq!(profile.first_name, "Ana");
        assert_eq!(profile.zipcode, "10001");
    }

    #[tokio::test]
    async fn test_get_missing_profile() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/databases/test_db/collections/players/documents/nobody")
            .with_status(404)
            .with_body(r#"{"message": "Document not found", "code": 404}"#)
            .create_async()
            .await;

        assert!(client_for(&server).get_profile("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_profile_creates_when_missing() {
        let mut server = mockito::Server::new_async().await;
        let patch = server
            .mock("PATCH", "/databases/test_db/collections/players/documents/u1")
            .with_status(404)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/databases/test_db/collections/players/documents")
            .match_body(Matcher::PartialJson(json!({
                "documentId": "u1",
                "data": { "firstName": "Ana", "skillLevel": "Beginner" }
            })))
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;

        let profile = PlayerProfile::registered("u1", "Ana", "ana@example.com", SkillLevel::Beginner);
        client_for(&server).put_profile(&profile).await.unwrap();

        patch.assert_async().await;
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_profiles_by_skill() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/databases/test_db/collections/players/documents")
            .match_query(Matcher::AllOf(vec![Matcher::UrlEncoded(
                "queries[]".into(),
                "equal(\"skillLevel\", [\"Advanced\"])".into(),
            )]))
            .with_status(200)
            .with_body(
                r#"{"total": 2, "documents": [
                    {"$id": "a", "skillLevel": "Advanced", "zipcode": "10001"},
                    {"$id": "b", "skillLevel": "Advanced", "zipcode": null}
                ]}"#,
            )
            .create_async()
            .await;

        let profiles = client_for(&server)
            .list_profiles(Some(SkillLevel::Advanced))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[1].zipcode, "");
    }

    #[tokio::test]
    async fn test_login_rejection_is_auth_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/account/sessions/email")
            .with_status(401)
            .with_body(r#"{"message": "Invalid credentials. Please check the email and password.", "code": 401, "type": "user_invalid_credentials"}"#)
            .create_async()
            .await;

        let err = IdentityProvider::login(&client_for(&server), "ana@example.com", "wrong")
            .await
            .unwrap_err();

        match err {
            ServiceError::Auth(message) => {
                assert_eq!(message, "Invalid credentials. Please check the email and password.")
            }
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_session_user_requires_listed_session() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/u1/sessions")
            .with_status(200)
            .with_body(r#"{"total": 1, "sessions": [{"$id": "s1", "userId": "u1"}]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/users/u1")
            .with_status(200)
            .with_body(r#"{"$id": "u1", "email": "ana@example.com", "name": "Ana"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let active = Session { user_id: "u1".to_string(), session_id: "s1".to_string() };
        let stale = Session { user_id: "u1".to_string(), session_id: "s0".to_string() };

        let identity = client.session_user(&active).await.unwrap().unwrap();
        assert_eq!(identity.email, "ana@example.com");
        assert!(client.session_user(&stale).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upload_uses_fresh_file_id() {
        let mut server = mockito::Server::new_async().await;
        let delete = server
            .mock("DELETE", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let upload = server
            .mock("POST", "/storage/buckets/profile_images/files")
            .with_status(201)
            .with_body(r#"{"$id": "ignored"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let url = client.upload_file("u1", vec![0xFF, 0xD8, 0xFF], "image/jpeg").await.unwrap();

        upload.assert_async().await;
        delete.assert_async().await;

        let prefix = format!("{}/storage/buckets/profile_images/files/", server.url());
        assert!(url.starts_with(&prefix));
        assert!(url.ends_with("/view?project=test_project"));
        assert_ne!(client.file_id_from_url(&url).as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_failed_upload_leaves_existing_file() {
        let mut server = mockito::Server::new_async().await;
        let delete = server
            .mock("DELETE", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        server
            .mock("POST", "/storage/buckets/profile_images/files")
            .with_status(400)
            .with_body(r#"{"message": "File extension not allowed"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let result = ImageStore::upload(&client, "u1", vec![0x00], "image/gif").await;

        assert!(matches!(result, Err(ServiceError::Backend(_))));
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_by_view_url() {
        let mut server = mockito::Server::new_async().await;
        let delete = server
            .mock("DELETE", "/storage/buckets/profile_images/files/old123")
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server);
        let url = client.file_url("old123");
        ImageStore::delete(&client, &url).await.unwrap();
        delete.assert_async().await;

        // URLs from elsewhere are left alone
        ImageStore::delete(&client, "https://cdn.example.com/avatar.png").await.unwrap();
    }
}
