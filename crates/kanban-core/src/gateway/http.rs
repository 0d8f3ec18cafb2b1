//! HTTP gateway for the Board Store REST API.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::wire::{self, RawBoard, RawCard, RawComment, RawList, RawMessage};
use super::{BoardGateway, GatewayError, GatewayResult};
use crate::config::KanbanConfig;
use crate::domain::{
    Board, BoardPatch, BoardSummary, Card, CardTarget, CardUpdate, Comment, List, ListPatch,
    NewBoard, NewCard, NewComment, NewList,
};

/// Path prefix of every Board Store endpoint
pub const API_PREFIX: &str = "/api/kanban/v1";

/// Client for the Board Store REST API
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn from_config(config: &KanbanConfig) -> Self {
        Self::new(config.api_base_url.trim(), config.token.clone())
    }

    /// Endpoint URL with every segment percent-encoded, so opaque ids
    /// containing `/`, `?` or spaces stay a single segment
    fn url(&self, segments: &[&str]) -> GatewayResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| GatewayError::Network(format!("Invalid base url {:?}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::Network(format!("Invalid base url {:?}", self.base_url)))?
            .pop_if_empty()
            .extend(API_PREFIX.split('/').filter(|s| !s.is_empty()))
            .extend(segments);
        Ok(url)
    }

    /// Request builder with the bearer token attached
    fn request(&self, method: Method, segments: &[&str]) -> GatewayResult<RequestBuilder> {
        let url = self.url(segments)?;
        debug!(%method, path = url.path(), "request");
        let builder = self.client.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        })
    }

    /// Map an HTTP response to a `GatewayError` based on status code.
    async fn check_response(response: Response) -> GatewayResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = match wire::extract_error_message(&body) {
            msg if msg.is_empty() => status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
            msg => msg,
        };
        warn!(status = status.as_u16(), %message, "Board Store request failed");
        Err(GatewayError::from_status(status.as_u16(), message))
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> GatewayResult<T> {
        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        let response = Self::check_response(response).await?;
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        serde_json::from_str(&body)
            .map_err(|e| GatewayError::Network(format!("Malformed response: {}", e)))
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> GatewayResult<T> {
        self.send(self.request(Method::GET, segments)?).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, segments: &[&str], body: &B) -> GatewayResult<T> {
        self.send(self.request(Method::POST, segments)?.json(body)).await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(&self, segments: &[&str], body: &B) -> GatewayResult<T> {
        self.send(self.request(Method::PUT, segments)?.json(body)).await
    }

    async fn delete<T: DeserializeOwned>(&self, segments: &[&str]) -> GatewayResult<T> {
        self.send(self.request(Method::DELETE, segments)?).await
    }
}

#[async_trait(?Send)]
impl BoardGateway for HttpGateway {
    async fn list_boards(&self) -> GatewayResult<Vec<BoardSummary>> {
        let raw: Vec<RawBoard> = self.get(&["boards"]).await?;
        raw.into_iter().map(wire::normalize_summary).collect()
    }

    async fn get_board(&self, board_id: &str) -> GatewayResult<Board> {
        let raw: RawBoard = self.get(&["boards", board_id]).await?;
        wire::normalize_board(raw)
    }

    async fn create_board(&self, input: &NewBoard) -> GatewayResult<Board> {
        let raw: RawBoard = self
            .post(&["boards"], &wire::CreateBoardBody::from(input))
            .await?;
        wire::normalize_board(raw)
    }

    async fn update_board(&self, board_id: &str, patch: &BoardPatch) -> GatewayResult<Board> {
        let raw: RawBoard = self
            .put(&["boards", board_id], &wire::UpdateBoardBody::from(patch))
            .await?;
        wire::normalize_board(raw)
    }

    async fn archive_board(&self, board_id: &str) -> GatewayResult<String> {
        let raw: RawMessage = self
            .put(&["boards", board_id, "archive"], &serde_json::json!({}))
            .await?;
        Ok(raw.message)
    }

    async fn create_list(&self, board_id: &str, input: &NewList) -> GatewayResult<List> {
        let raw: RawList = self
            .post(&["boards", board_id, "lists"], &wire::CreateListBody::from(input))
            .await?;
        wire::normalize_list(raw, Some(board_id))
    }

    async fn update_list(&self, list_id: &str, patch: &ListPatch) -> GatewayResult<List> {
        let raw: RawList = self
            .put(&["lists", list_id], &wire::UpdateListBody::from(patch))
            .await?;
        wire::normalize_list(raw, None)
    }

    async fn create_card(&self, list_id: &str, input: &NewCard) -> GatewayResult<Card> {
        let raw: RawCard = self
            .post(&["lists", list_id, "cards"], &wire::CreateCardBody::from(input))
            .await?;
        wire::normalize_card(raw, Some(list_id))
    }

    async fn update_card(&self, card_id: &str, update: &CardUpdate) -> GatewayResult<Card> {
        let raw: RawCard = self
            .put(&["cards", card_id], &wire::UpdateCardBody::from(update))
            .await?;
        wire::normalize_card(raw, None)
    }

    async fn move_card(&self, card_id: &str, target: &CardTarget) -> GatewayResult<Card> {
        let raw: RawCard = self
            .put(&["cards", card_id, "move"], &wire::MoveCardBody::from(target))
            .await?;
        wire::normalize_card(raw, Some(&target.list_id))
    }

    async fn add_comment(&self, card_id: &str, input: &NewComment) -> GatewayResult<Comment> {
        let raw: RawComment = self
            .post(&["cards", card_id, "comments"], &wire::CommentBody::from(input))
            .await?;
        wire::normalize_comment(raw, Some(card_id))
    }

    async fn delete_comment(&self, comment_id: &str) -> GatewayResult<String> {
        let raw: RawMessage = self.delete(&["comments", comment_id]).await?;
        Ok(raw.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn gateway(server: &Server) -> HttpGateway {
        HttpGateway::new(server.url(), Some("secret".to_string()))
    }

    #[tokio::test]
    async fn test_get_board_normalizes_ids() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/kanban/v1/boards/b1")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "_id": "b1",
                    "title": "Placements",
                    "lists": [
                        { "_id": "l1", "title": "Open", "position": 0,
                          "cards": [{ "_id": "c1", "title": "Night shift", "position": 0 }] }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let board = gateway(&server).get_board("b1").await.unwrap();

        mock.assert_async().await;
        assert_eq!(board.id, "b1");
        assert_eq!(board.lists[0].cards[0].id, "c1");
        assert_eq!(board.lists[0].cards[0].list_id, "l1");
    }

    #[tokio::test]
    async fn test_move_card_sends_destination() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/kanban/v1/cards/c1/move")
            .match_body(Matcher::Json(json!({ "listId": "l2", "position": 0 })))
            .with_status(200)
            .with_body(json!({ "_id": "c1", "listId": "l2", "title": "Card", "position": 0 }).to_string())
            .create_async()
            .await;

        let card = gateway(&server)
            .move_card("c1", &CardTarget::new("l2", 0))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(card.list_id, "l2");
        assert_eq!(card.position, 0);
    }

    #[tokio::test]
    async fn test_error_statuses_map_to_taxonomy() {
        let mut server = Server::new_async().await;
        let _missing = server
            .mock("GET", "/api/kanban/v1/boards/nope")
            .with_status(404)
            .with_body(r#"{"message":"Board not found"}"#)
            .create_async()
            .await;
        let _expired = server
            .mock("GET", "/api/kanban/v1/boards")
            .with_status(401)
            .with_body(r#"{"message":"Token expired"}"#)
            .create_async()
            .await;
        let _invalid = server
            .mock("POST", "/api/kanban/v1/boards")
            .with_status(400)
            .with_body(r#"{"error":"Title is required"}"#)
            .create_async()
            .await;
        let _broken = server
            .mock("DELETE", "/api/kanban/v1/comments/m1")
            .with_status(500)
            .create_async()
            .await;

        let gw = gateway(&server);
        assert_eq!(
            gw.get_board("nope").await.unwrap_err(),
            GatewayError::NotFound("Board not found".into())
        );
        assert_eq!(
            gw.list_boards().await.unwrap_err(),
            GatewayError::Unauthorized("Token expired".into())
        );
        assert_eq!(
            gw.create_board(&NewBoard {
                title: " ".into(),
                ..Default::default()
            })
            .await
            .unwrap_err(),
            GatewayError::ValidationFailed("Title is required".into())
        );
        assert_eq!(
            gw.delete_comment("m1").await.unwrap_err(),
            GatewayError::Server {
                status: 500,
                message: "Internal Server Error".into()
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let gw = HttpGateway::new("http://127.0.0.1:9", None);
        assert!(matches!(gw.list_boards().await, Err(GatewayError::Network(_))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_network_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/kanban/v1/boards")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;
        assert!(matches!(
            gateway(&server).list_boards().await,
            Err(GatewayError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_comment_round_trip() {
        let mut server = Server::new_async().await;
        let _create = server
            .mock("POST", "/api/kanban/v1/cards/c1/comments")
            .match_body(Matcher::Json(json!({ "content": "Credentialing done" })))
            .with_status(201)
            .with_body(json!({ "_id": "m7", "author": { "_id": "u3" }, "content": "Credentialing done" }).to_string())
            .create_async()
            .await;
        let _delete = server
            .mock("DELETE", "/api/kanban/v1/comments/m7")
            .with_status(200)
            .with_body(r#"{"message":"Comment deleted"}"#)
            .create_async()
            .await;

        let gw = gateway(&server);
        let comment = gw
            .add_comment(
                "c1",
                &NewComment {
                    content: "Credentialing done".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(comment.id, "m7");
        assert_eq!(comment.card_id, "c1");
        assert_eq!(comment.author_id.as_deref(), Some("u3"));
        assert_eq!(gw.delete_comment("m7").await.unwrap(), "Comment deleted");
    }

    #[test]
    fn test_ids_are_encoded_as_single_segments() {
        let gw = HttpGateway::new("https://crm.example.com/", None);
        let url = gw.url(&["cards", "a/b?c d#e", "move"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://crm.example.com/api/kanban/v1/cards/a%2Fb%3Fc%20d%23e/move"
        );

        let nested = HttpGateway::new("https://crm.example.com/tenant", None);
        assert_eq!(
            nested.url(&["boards"]).unwrap().as_str(),
            "https://crm.example.com/tenant/api/kanban/v1/boards"
        );
    }

    #[test]
    fn test_invalid_base_url_is_network_error() {
        let gw = HttpGateway::new("not a url", None);
        assert!(matches!(gw.url(&["boards"]), Err(GatewayError::Network(_))));
    }

    #[tokio::test]
    async fn test_get_board_with_slash_in_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/kanban/v1/boards/team%2Fq4")
            .with_status(200)
            .with_body(json!({ "_id": "team/q4", "title": "Q4" }).to_string())
            .create_async()
            .await;

        let board = gateway(&server).get_board("team/q4").await.unwrap();

        mock.assert_async().await;
        assert_eq!(board.id, "team/q4");
    }
}
