//! LSP server for featnav
//!
//! Provides go-to-definition on tags: with the cursor on a tag such as
//! `// TAG:42`, the editor jumps to the feature file(s) for case 42.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use eyre::Result;
use featnav_core::{Definition, Match, Navigator, Notifier, Settings, Workspace};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::{debug, info, warn};

use crate::config::{CONFIG_PATH, SettingsPatch, load_settings};

/// Run the LSP server over stdio
pub async fn run(root: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    // Determine project root
    let project_root = match root {
        Some(r) => r,
        None => crate::find_project_root()?,
    };

    // Load config; a broken file must not keep the server from starting
    let config_path = config_path.unwrap_or_else(|| project_root.join(CONFIG_PATH));
    let settings = match load_settings(&config_path) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("{:?}", e);
            Settings::default()
        }
    };

    run_lsp_server(project_root, settings).await
}

/// Internal: run the LSP server with the initial settings
async fn run_lsp_server(project_root: PathBuf, settings: Settings) -> Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) =
        LspService::new(|client| Backend::new(client, project_root, settings));
    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}

/// Shows errors as editor popups
struct ClientNotifier {
    client: Client,
}

impl Notifier for ClientNotifier {
    fn show_error(&self, message: &str) {
        let client = self.client.clone();
        let message = message.to_string();
        tokio::spawn(async move {
            client.show_message(MessageType::ERROR, message).await;
        });
    }
}

struct Backend {
    navigator: Navigator,
    state: tokio::sync::Mutex<LspState>,
}

struct LspState {
    /// Document content cache: uri -> content
    documents: HashMap<String, String>,
    /// Fallback folder when the client reports none
    project_root: PathBuf,
    /// Folders the client has open
    workspace: Workspace,
    /// Config file settings with editor settings applied on top
    settings: Settings,
}

impl LspState {
    /// Apply editor settings; invalid payloads are logged and ignored.
    fn apply_settings(&mut self, value: &Value) {
        match SettingsPatch::from_value(value) {
            Ok(patch) => {
                patch.apply_to(&mut self.settings);
                debug!("Settings now {:?}", self.settings);
            }
            Err(e) => warn!("{:?}", e),
        }
    }

    /// Copy out what a lookup in `uri` needs, so the lock can be released
    /// before any file I/O.
    fn snapshot(&self, uri: &Url) -> Snapshot {
        Snapshot {
            cached: self.documents.get(uri.as_str()).cloned(),
            workspace: self.workspace.clone(),
            settings: self.settings.clone(),
        }
    }
}

/// State for one lookup, taken under the lock
struct Snapshot {
    /// Editor text of the document, if it is open
    cached: Option<String>,
    workspace: Workspace,
    settings: Settings,
}

/// The text of `line`, from the editor's copy or else from disk.
async fn line_at(cached: Option<String>, path: &Path, line: u32) -> Option<String> {
    let content = match cached {
        Some(content) => content,
        None => tokio::fs::read_to_string(path).await.ok()?,
    };
    content.lines().nth(line as usize).map(str::to_string)
}

impl Backend {
    fn new(client: Client, project_root: PathBuf, settings: Settings) -> Self {
        let notifier = Arc::new(ClientNotifier {
            client: client.clone(),
        });
        Self {
            navigator: Navigator::from_fs(notifier),
            state: tokio::sync::Mutex::new(LspState {
                documents: HashMap::new(),
                project_root,
                workspace: Workspace::default(),
                settings,
            }),
        }
    }

    /// Lock state and get access to all LSP state.
    async fn state(&self) -> tokio::sync::MutexGuard<'_, LspState> {
        self.state.lock().await
    }
}

/// Workspace folders announced in `initialize`, oldest protocol field last
#[allow(deprecated)]
fn initial_folders(params: &InitializeParams) -> Vec<PathBuf> {
    if let Some(folders) = &params.workspace_folders {
        return folders
            .iter()
            .filter_map(|f| f.uri.to_file_path().ok())
            .collect();
    }
    if let Some(uri) = &params.root_uri {
        return uri.to_file_path().ok().into_iter().collect();
    }
    params.root_path.iter().map(PathBuf::from).collect()
}

/// Folders are canonicalized so they compare equal to walked paths
fn normalize_folder(path: PathBuf) -> PathBuf {
    path.canonicalize().unwrap_or(path)
}

fn to_location(m: &Match) -> Option<Location> {
    let uri = Url::from_file_path(&m.path).ok()?;
    let anchor = Position {
        line: Match::LINE,
        character: Match::COLUMN,
    };
    Some(Location {
        uri,
        range: Range {
            start: anchor,
            end: anchor,
        },
    })
}

/// One location as a scalar, several as an array
fn to_response(definition: Definition) -> Option<GotoDefinitionResponse> {
    let mut locations: Vec<Location> = definition.matches().iter().filter_map(to_location).collect();
    match locations.len() {
        0 => None,
        1 => locations.pop().map(GotoDefinitionResponse::Scalar),
        _ => Some(GotoDefinitionResponse::Array(locations)),
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> LspResult<InitializeResult> {
        {
            let mut state = self.state().await;

            for folder in initial_folders(&params) {
                state.workspace.add_folder(normalize_folder(folder));
            }
            if state.workspace.is_empty() {
                let root = normalize_folder(state.project_root.clone());
                state.workspace.add_folder(root);
            }

            if let Some(options) = &params.initialization_options {
                state.apply_settings(options);
            }

            info!(
                "Initialized with workspace folders {:?}",
                state.workspace.folders()
            );
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                definition_provider: Some(OneOf::Left(true)),
                // Sync full document content
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                workspace: Some(WorkspaceServerCapabilities {
                    workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                        supported: Some(true),
                        change_notifications: Some(OneOf::Left(true)),
                    }),
                    file_operations: None,
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "featnav".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("DefinitionProvider registered successfully");
    }

    async fn shutdown(&self) -> LspResult<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri.to_string();
        self.state().await.documents.insert(uri, params.text_document.text);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri.to_string();
        if let Some(change) = params.content_changes.into_iter().last() {
            self.state().await.documents.insert(uri, change.text);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri.to_string();
        self.state().await.documents.remove(&uri);
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        self.state().await.apply_settings(&params.settings);
    }

    async fn did_change_workspace_folders(&self, params: DidChangeWorkspaceFoldersParams) {
        let mut state = self.state().await;
        for folder in params.event.removed {
            if let Ok(path) = folder.uri.to_file_path() {
                state.workspace.remove_folder(&normalize_folder(path));
            }
        }
        for folder in params.event.added {
            if let Ok(path) = folder.uri.to_file_path() {
                state.workspace.add_folder(normalize_folder(path));
            }
        }
        info!("Workspace folders now {:?}", state.workspace.folders());
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> LspResult<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        debug!("provideDefinition activated at {}:{:?}", uri, position);

        let Ok(path) = uri.to_file_path() else {
            return Ok(None);
        };
        let path = normalize_folder(path);

        let Snapshot {
            cached,
            workspace,
            settings,
        } = self.state().await.snapshot(uri);

        let Some(line_text) = line_at(cached, &path, position.line).await else {
            return Ok(None);
        };
        let document = workspace.context_for(path, line_text, position.character);

        // tower-lsp drops this future when the client cancels the request;
        // the guard then stops any walk still running on the blocking pool
        let cancel = CancellationToken::new();
        let _guard = cancel.clone().drop_guard();

        let definition = self
            .navigator
            .provide_definition(&settings, &document, &cancel)
            .await;

        Ok(definition.and_then(to_response))
    }
}
