use crate::analysis::{self, document_store::DocumentStore};
use crate::lsp::codec::DecodedMessage;
use crate::lsp::error::{DecodeError, RpcError};
use crate::lsp::types::{error_codes, Notification, Outgoing, ResponseError, ResponseMessage};
use lsp_types::{
    ClientInfo, CodeActionParams, CodeActionProviderCapability, CompletionOptions,
    CompletionParams, CompletionResponse, DidChangeTextDocumentParams, DidOpenTextDocumentParams,
    GotoDefinitionParams, HoverParams, HoverProviderCapability, InitializeResult, OneOf,
    PublishDiagnosticsParams, ServerCapabilities, ServerInfo, TextDocumentSyncCapability,
    TextDocumentSyncKind, Url,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

const PUBLISH_DIAGNOSTICS: &str = "textDocument/publishDiagnostics";

/// The methods this server answers. Anything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Initialize,
    DidOpen,
    DidChange,
    Hover,
    Definition,
    CodeAction,
    Completion,
}

impl Method {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "initialize" => Some(Method::Initialize),
            "textDocument/didOpen" => Some(Method::DidOpen),
            "textDocument/didChange" => Some(Method::DidChange),
            "textDocument/hover" => Some(Method::Hover),
            "textDocument/definition" => Some(Method::Definition),
            "textDocument/codeAction" => Some(Method::CodeAction),
            "textDocument/completion" => Some(Method::Completion),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Initialize => "initialize",
            Method::DidOpen => "textDocument/didOpen",
            Method::DidChange => "textDocument/didChange",
            Method::Hover => "textDocument/hover",
            Method::Definition => "textDocument/definition",
            Method::CodeAction => "textDocument/codeAction",
            Method::Completion => "textDocument/completion",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Processing,
}

// Only the part of InitializeParams that gets logged.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitializeParams {
    client_info: Option<ClientInfo>,
}

/// Routes decoded messages to handlers. Owns all document state.
pub struct Dispatcher {
    documents: DocumentStore,
    state: DispatchState,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher {
            documents: DocumentStore::new(),
            state: DispatchState::Idle,
        }
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Handle one message to completion and return what should be written
    /// back, in order. Unknown methods produce nothing.
    ///
    /// A request whose params do not decode is answered with an
    /// InvalidParams error; for a notification the error is returned.
    pub fn dispatch(&mut self, message: &DecodedMessage) -> Result<Vec<Outgoing>, RpcError> {
        self.state = DispatchState::Processing;
        let result = match Method::parse(&message.method) {
            Some(method) => {
                trace!(method = method.as_str(), "processing");
                self.handle(method, message)
            }
            None => {
                debug!(method = %message.method, "ignoring unsupported method");
                Ok(Vec::new())
            }
        };
        self.state = DispatchState::Idle;

        match (result, message.id) {
            (Err(RpcError::Decode(err @ DecodeError::Params { .. })), Some(id)) => {
                warn!(method = %message.method, id, error = %err, "rejecting request");
                let reply = ResponseError::new(id, error_codes::INVALID_PARAMS, err.to_string());
                Ok(vec![Ok(reply.into())])
            }
            (result, _) => result,
        }
    }

    fn handle(
        &mut self,
        method: Method,
        message: &DecodedMessage,
    ) -> Result<Vec<Outgoing>, RpcError> {
        match method {
            Method::Initialize => self.initialize(message),
            Method::DidOpen => self.did_open(message),
            Method::DidChange => self.did_change(message),
            Method::Hover => self.hover(message),
            Method::Definition => self.definition(message),
            Method::CodeAction => self.code_action(message),
            Method::Completion => self.completion(message),
        }
    }

    fn text(&self, uri: &Url) -> &str {
        self.documents.get(uri.as_str()).unwrap_or_default()
    }

    fn initialize(&mut self, message: &DecodedMessage) -> Result<Vec<Outgoing>, RpcError> {
        let id = message.request_id()?;
        let params: InitializeParams = message.params()?;
        if let Some(client) = params.client_info {
            info!(
                client = %client.name,
                version = client.version.as_deref().unwrap_or("unknown"),
                "connected"
            );
        }

        let result = InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions::default()),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        };
        Ok(vec![respond(id, result)])
    }

    fn did_open(&mut self, message: &DecodedMessage) -> Result<Vec<Outgoing>, RpcError> {
        let params: DidOpenTextDocumentParams = message.params()?;
        let document = params.text_document;
        info!(uri = %document.uri, "opened");

        self.documents.open(document.uri.as_str(), document.text);
        let diagnostics = publish_diagnostics(
            document.uri.clone(),
            self.text(&document.uri),
            document.version,
        );
        Ok(vec![diagnostics])
    }

    fn did_change(&mut self, message: &DecodedMessage) -> Result<Vec<Outgoing>, RpcError> {
        let params: DidChangeTextDocumentParams = message.params()?;
        let document = params.text_document;
        debug!(
            uri = %document.uri,
            changes = params.content_changes.len(),
            "changed"
        );

        let mut outgoing = Vec::with_capacity(params.content_changes.len());
        for change in params.content_changes {
            // Full sync: each change carries the whole new text, range or not.
            self.documents.update(document.uri.as_str(), change.text);
            outgoing.push(publish_diagnostics(
                document.uri.clone(),
                self.text(&document.uri),
                document.version,
            ));
        }
        Ok(outgoing)
    }

    fn hover(&mut self, message: &DecodedMessage) -> Result<Vec<Outgoing>, RpcError> {
        let id = message.request_id()?;
        let params: HoverParams = message.params()?;
        let uri = params.text_document_position_params.text_document.uri;

        let hover = analysis::hover(&uri, self.text(&uri));
        Ok(vec![respond(id, hover)])
    }

    fn definition(&mut self, message: &DecodedMessage) -> Result<Vec<Outgoing>, RpcError> {
        let id = message.request_id()?;
        let params: GotoDefinitionParams = message.params()?;
        let position = params.text_document_position_params;

        let location = analysis::definition(&position.text_document.uri, position.position);
        Ok(vec![respond(id, location)])
    }

    fn code_action(&mut self, message: &DecodedMessage) -> Result<Vec<Outgoing>, RpcError> {
        let id = message.request_id()?;
        let params: CodeActionParams = message.params()?;
        let uri = params.text_document.uri;

        let actions = analysis::code_actions(&uri, self.text(&uri));
        Ok(vec![respond(id, actions)])
    }

    fn completion(&mut self, message: &DecodedMessage) -> Result<Vec<Outgoing>, RpcError> {
        let id = message.request_id()?;
        let _params: CompletionParams = message.params()?;

        let items = CompletionResponse::Array(analysis::completion());
        Ok(vec![respond(id, items)])
    }
}

fn respond<T: Serialize>(id: i64, result: T) -> Outgoing {
    ResponseMessage::new(id, result).map(Into::into)
}

fn publish_diagnostics(uri: Url, text: &str, version: i32) -> Outgoing {
    let params = PublishDiagnosticsParams::new(uri, analysis::diagnostics(text), Some(version));
    Notification::new(PUBLISH_DIAGNOSTICS, params).map(Into::into)
}
