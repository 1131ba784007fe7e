use zed_extension_api::{self as zed, LanguageServerId, Result, settings::LspSettings};

struct FeatnavExtension;

impl zed::Extension for FeatnavExtension {
    fn new() -> Self {
        FeatnavExtension
    }

    fn language_server_command(
        &mut self,
        language_server_id: &LanguageServerId,
        worktree: &zed::Worktree,
    ) -> Result<zed::Command> {
        let configured = LspSettings::for_worktree(language_server_id.as_ref(), worktree)
            .ok()
            .and_then(|settings| settings.binary)
            .and_then(|binary| binary.path);

        let command = match configured.or_else(|| worktree.which("featnav")) {
            Some(path) => path,
            None => {
                return Err(
                    "featnav not found in PATH; install it with `cargo install featnav`".into(),
                );
            }
        };

        Ok(zed::Command {
            command,
            args: vec!["lsp".to_string()],
            env: Default::default(),
        })
    }

    // Editor settings are sent as initializationOptions and
    // workspace/didChangeConfiguration alike
    fn language_server_workspace_configuration(
        &mut self,
        language_server_id: &LanguageServerId,
        worktree: &zed::Worktree,
    ) -> Result<Option<zed::serde_json::Value>> {
        let settings = LspSettings::for_worktree(language_server_id.as_ref(), worktree)?;
        Ok(settings.settings)
    }

    fn language_server_initialization_options(
        &mut self,
        language_server_id: &LanguageServerId,
        worktree: &zed::Worktree,
    ) -> Result<Option<zed::serde_json::Value>> {
        let settings = LspSettings::for_worktree(language_server_id.as_ref(), worktree)?;
        Ok(settings.settings.or(settings.initialization_options))
    }
}

zed::register_extension!(FeatnavExtension);
