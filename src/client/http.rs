use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    client::api::FeedApi,
    error::AppError,
    models::{
        comment::{Comment, CommentId, CreateCommentRequest},
        post::{CreatePostRequest, Post, PostId, UpdatePostRequest},
    },
};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct IdBody {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct UrlBody {
    url: String,
}

/// `FeedApi` over the HTTP surface, authenticated with a session token.
#[derive(Debug, Clone)]
pub struct HttpFeedClient {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpFeedClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AppError> {
        let response = request.bearer_auth(&self.token).send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        match response.json::<ErrorBody>().await {
            Ok(body) => Err(AppError::from_kind(&body.kind, body.error)),
            Err(_) => Err(match status.as_u16() {
                401 => AppError::Unauthenticated,
                403 => AppError::Permission(status.to_string()),
                404 => AppError::NotFound(status.to_string()),
                409 => AppError::Duplicate(status.to_string()),
                400 | 422 => AppError::Validation(status.to_string()),
                413 => AppError::Upload(status.to_string()),
                _ => AppError::Transient(status.to_string()),
            }),
        }
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AppError> {
        Ok(self.send(request).await?.json::<T>().await?)
    }
}

#[async_trait]
impl FeedApi for HttpFeedClient {
    async fn list_posts(&self, page: i64, page_size: i64) -> Result<Vec<Post>, AppError> {
        let request = self
            .client
            .get(self.url("/posts"))
            .query(&[("page", page), ("page_size", page_size)]);
        self.json(request).await
    }

    async fn create_post(&self, content: &str, image_url: Option<&str>) -> Result<PostId, AppError> {
        let request = self.client.post(self.url("/posts")).json(&CreatePostRequest {
            content: content.to_string(),
            image_url: image_url.map(str::to_string),
        });
        Ok(self.json::<IdBody>(request).await?.id)
    }

    async fn update_post(&self, post_id: PostId, content: &str) -> Result<(), AppError> {
        let request = self
            .client
            .put(self.url(&format!("/posts/{}", post_id)))
            .json(&UpdatePostRequest {
                content: content.to_string(),
            });
        self.send(request).await.map(|_| ())
    }

    async fn delete_post(&self, post_id: PostId) -> Result<(), AppError> {
        let request = self.client.delete(self.url(&format!("/posts/{}", post_id)));
        self.send(request).await.map(|_| ())
    }

    async fn list_comments(&self, post_id: PostId) -> Result<Vec<Comment>, AppError> {
        let request = self
            .client
            .get(self.url(&format!("/posts/{}/comments", post_id)));
        self.json(request).await
    }

    async fn create_comment(&self, post_id: PostId, content: &str) -> Result<CommentId, AppError> {
        let request = self
            .client
            .post(self.url(&format!("/posts/{}/comments", post_id)))
            .json(&CreateCommentRequest {
                content: content.to_string(),
            });
        Ok(self.json::<IdBody>(request).await?.id)
    }

    async fn like(&self, post_id: PostId) -> Result<(), AppError> {
        let request = self.client.post(self.url(&format!("/posts/{}/like", post_id)));
        match self.send(request).await {
            Ok(_) | Err(AppError::Duplicate(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn unlike(&self, post_id: PostId) -> Result<(), AppError> {
        let request = self
            .client
            .delete(self.url(&format!("/posts/{}/like", post_id)));
        self.send(request).await.map(|_| ())
    }

    async fn upload_media(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, AppError> {
        let request = self
            .client
            .post(self.url("/media"))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        Ok(self.json::<UrlBody>(request).await?.url)
    }
}
