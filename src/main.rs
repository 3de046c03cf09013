//! Headless table annotator.
//!
//! Replays a JSON script of annotation steps against a folder of scans and
//! writes the resulting tables into the folder's `.tables` directory.
//!
//! ```text
//! table-annotator <image-folder> <script.json>
//! ```
//!
//! A script is a list of steps:
//!
//! ```json
//! [
//!   {"do": {"DocumentMoved": {"x": 0, "y": 0}}},
//!   {"do": {"OutlineTable": {"x": 10, "y": 10}}},
//!   {"do": {"OutlineTable": {"x": 110, "y": 60}}},
//!   {"do": {"AddColumn": 50}},
//!   {"key": "d"},
//!   {"wait_ms": 200},
//!   "save"
//! ]
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod driver {
    use std::path::PathBuf;
    use std::time::Duration;

    use serde::Deserialize;
    use table_annotator::config::{AppConfig, ConfigError};
    use table_annotator::keybindings::Key;
    use table_annotator::message::Message;
    use table_annotator::persistence::{
        Backend, FolderBackend, PersistenceError, SaveScheduler, fulfil,
    };
    use table_annotator::state::AnnotatorState;
    use web_time::Instant;

    /// One step of a replay script.
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "snake_case")]
    enum ScriptStep {
        /// Apply a message
        Do(Message),
        /// Press a key by name
        Key(String),
        /// Let time pass
        WaitMs(u64),
        /// Write every pending change now
        Save,
    }

    #[derive(Debug, thiserror::Error)]
    pub enum DriverError {
        #[error("usage: table-annotator <image-folder> <script.json>")]
        Usage,

        #[error("Failed to read script: {0}")]
        Script(#[from] std::io::Error),

        #[error("Invalid script: {0}")]
        ScriptFormat(#[from] serde_json::Error),

        #[error(transparent)]
        Config(#[from] ConfigError),

        #[error(transparent)]
        Persistence(#[from] PersistenceError),
    }

    struct Session {
        state: AnnotatorState,
        backend: FolderBackend,
        saves: SaveScheduler,
        /// Replay clock, advanced only by wait steps.
        now: Instant,
        rotation_step: f32,
    }

    impl Session {
        fn apply(&mut self, message: Message) {
            // Rejections are logged by the state; the script goes on.
            let Ok(Some(request)) = self.state.update(message, self.now) else {
                return;
            };
            if let Err(e) = fulfil(&mut self.state, &mut self.backend, request) {
                log::warn!("Could not apply collaborator response: {}", e);
            }
        }

        fn observe(&mut self) {
            let Some(image) = self.state.current_image() else {
                return;
            };
            let name = image.name.clone();
            self.saves
                .observe(self.state.tables_revision(), &name, self.state.tables(), self.now);
        }

        /// Write every save that is due at `at`.
        fn flush(&mut self, at: Instant) {
            while let Some(ticket) = self.saves.poll(at) {
                let result = self.backend.save_tables(&ticket.image_name, &ticket.tables);
                let failed = result.is_err();
                if self.saves.complete(ticket, result, at) {
                    self.state.notify_saved(at);
                }
                if failed {
                    break;
                }
            }
        }
    }

    pub fn run() -> Result<(), DriverError> {
        let config = AppConfig::load_from_default_path().unwrap_or_default();
        env_logger::Builder::new()
            .filter_level(config.preferences.log_level.to_level_filter())
            .parse_default_env()
            .init();

        let mut args = std::env::args().skip(1);
        let (Some(folder), Some(script)) = (args.next(), args.next()) else {
            return Err(DriverError::Usage);
        };
        let steps: Vec<ScriptStep> = serde_json::from_str(&std::fs::read_to_string(script)?)?;

        let preferences = &config.preferences;
        let mut session = Session {
            state: AnnotatorState::new(preferences.engine_settings()),
            backend: FolderBackend::new(PathBuf::from(folder)),
            saves: SaveScheduler::new(preferences.save_debounce()),
            now: Instant::now(),
            rotation_step: preferences.rotation_step_degrees,
        };

        let images = session.backend.fetch_images()?;
        match session.state.load_images(images, None) {
            Ok(Some(request)) => {
                if let Err(e) = fulfil(&mut session.state, &mut session.backend, request) {
                    log::warn!("Could not load the first image: {}", e);
                }
            }
            Ok(None) => log::warn!("No images to annotate"),
            Err(e) => log::warn!("Could not load the first image: {}", e),
        }
        session.observe();

        for step in steps {
            match step {
                ScriptStep::Do(message) => session.apply(message),
                ScriptStep::Key(name) => {
                    let action = Key::from_name(&name).and_then(|key| {
                        config.keybindings.action_for_key(key, session.rotation_step)
                    });
                    match action {
                        Some(message) => session.apply(message),
                        None => log::debug!("Key '{}' is not bound", name),
                    }
                }
                ScriptStep::WaitMs(ms) => session.now += Duration::from_millis(ms),
                ScriptStep::Save => session.flush(session.now + preferences.save_debounce()),
            }
            session.observe();
            session.flush(session.now);
        }
        session.flush(session.now + preferences.save_debounce());

        if session.saves.is_dirty() {
            log::warn!("Some tables could not be saved");
        }
        log::info!(
            "Finished on image {} with {} tables",
            session.state.current_image_index(),
            session.state.tables().len()
        );
        Ok(())
    }
}

/// Table annotator entry point for native builds
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = driver::run() {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
