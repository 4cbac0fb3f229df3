use std::future::Future;

use log::debug;
use serde::{Deserialize, Serialize};

use super::error::TransportError;
use crate::config::ClientConfig;
use crate::graph::Graph;

/// Body of a `continue_chat` call. A missing `chat_id` asks the server to
/// open a new conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
	/// Server conversation id.
	pub chat_id: Option<String>,
	/// The user's message.
	pub message: String,
	/// Graph currently on screen.
	#[serde(rename = "currentGraph")]
	pub current_graph: Option<Graph>,
}

/// Reply from `continue_chat`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
	/// Id the server uses for this conversation from now on.
	pub chat_id: String,
	/// Assistant reply text.
	pub message: String,
	/// Graph fragment to merge into the conversation, if any.
	#[serde(rename = "newGraph", default)]
	pub new_graph: Option<Graph>,
}

/// Sends chat turns to the backend.
pub trait ChatTransport {
	/// Posts one turn and waits for the reply.
	fn send(
		&self,
		request: &ChatRequest,
	) -> impl Future<Output = Result<ChatResponse, TransportError>>;
}

/// JSON over HTTP against the research backend.
#[derive(Clone, Debug)]
pub struct HttpTransport {
	client: reqwest::Client,
	endpoint: String,
}

impl HttpTransport {
	/// Client for the endpoint in `config`.
	pub fn new(config: &ClientConfig) -> Self {
		Self {
			client: reqwest::Client::new(),
			endpoint: config.chat_endpoint(),
		}
	}

	/// Full URL turns are posted to.
	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}
}

impl ChatTransport for HttpTransport {
	async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
		debug!(
			"POST {} (chat {:?})",
			self.endpoint,
			request.chat_id.as_deref().unwrap_or("<new>")
		);
		let response = self.client.post(&self.endpoint).json(request).send().await?;
		let status = response.status();
		if !status.is_success() {
			return Err(TransportError::Status(status.as_u16()));
		}
		Ok(response.json::<ChatResponse>().await?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{Link, Node};

	#[test]
	fn request_wire_shape() {
		let request = ChatRequest {
			chat_id: None,
			message: "hello".into(),
			current_graph: Some(Graph::new(
				vec![Node::paper("a", "A"), Node::keyword("b", "B")],
				vec![Link::new("a", "b")],
			)),
		};
		let value = serde_json::to_value(&request).unwrap();
		assert!(value["chat_id"].is_null());
		assert_eq!(value["message"], "hello");
		assert_eq!(value["currentGraph"]["nodes"][1]["type"], "keyword");
		assert_eq!(value["currentGraph"]["links"][0]["source"], "a");
	}

	#[test]
	fn response_graph_is_optional() {
		let bare: ChatResponse =
			serde_json::from_str(r#"{"chat_id": "c1", "message": "hi"}"#).unwrap();
		assert_eq!(bare.new_graph, None);

		let null: ChatResponse =
			serde_json::from_str(r#"{"chat_id": "c1", "message": "hi", "newGraph": null}"#)
				.unwrap();
		assert_eq!(null.new_graph, None);
	}

	#[test]
	fn response_graph_accepts_object_endpoints() {
		let response: ChatResponse = serde_json::from_str(
			r#"{
				"chat_id": "c1",
				"message": "found two",
				"newGraph": {
					"nodes": [
						{"id": "p", "title": "P", "type": "paper", "year": 2021},
						{"id": "k", "title": "K", "type": "keyword"}
					],
					"links": [{"source": {"id": "p"}, "target": "k", "strength": 0.5}]
				}
			}"#,
		)
		.unwrap();
		let graph = response.new_graph.unwrap();
		assert_eq!(graph.nodes.len(), 2);
		assert_eq!(graph.links[0].source.as_str(), "p");
		assert_eq!(graph.links[0].strength, Some(0.5));
	}

	#[test]
	fn endpoint_comes_from_config() {
		let transport = HttpTransport::new(&ClientConfig {
			api_base_url: "http://backend:9000".into(),
			..ClientConfig::default()
		});
		assert_eq!(transport.endpoint(), "http://backend:9000/api/continue_chat");
	}
}
