use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use folio::app::{EditingSurface, Session};
use folio::config::Config;
use folio::error::{ExplorerError, Result};
use folio::input::{FocusContext, KeyOutcome};
use folio::primitives::language::Language;
use folio::services::fs::{FixedDirectoryPicker, FsManager, MemoryFsBackend, SlowFsBackend};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Root directory every harness project lives under
pub const PROJECT_DIR: &str = "/project";

/// What the editing surface was asked to do
#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub shown: Vec<(String, Language)>,
    pub format_requests: usize,
}

/// Surface that records calls and never formats
pub struct RecordingSurface {
    log: Arc<Mutex<SurfaceLog>>,
}

impl EditingSurface for RecordingSurface {
    fn set_content(&mut self, text: &str, language: Language) {
        self.log
            .lock()
            .unwrap()
            .shown
            .push((text.to_string(), language));
    }

    fn request_format(&mut self, _text: &str, language: Language) -> Result<Option<String>> {
        self.log.lock().unwrap().format_requests += 1;
        Err(ExplorerError::FormatUnsupported(language.to_string()))
    }
}

/// A session over an in-memory project, attached and ready for input
pub struct ExplorerTestHarness {
    pub memory: Arc<MemoryFsBackend>,
    pub backend: Arc<SlowFsBackend>,
    pub picker: Arc<FixedDirectoryPicker>,
    pub surface: Arc<Mutex<SurfaceLog>>,
    pub session: Session,
}

impl ExplorerTestHarness {
    /// Files are `(relative path, contents)`; parent directories are implied
    pub fn new(files: &[(&str, &str)]) -> Self {
        Self::with_config(files, Config::default())
    }

    pub fn with_config(files: &[(&str, &str)], config: Config) -> Self {
        super::tracing::init_tracing_from_env();

        let memory = Arc::new(MemoryFsBackend::new());
        memory.add_dir(PROJECT_DIR);
        for (path, contents) in files {
            memory.add_file(format!("{PROJECT_DIR}/{path}"), contents);
        }

        let backend = Arc::new(SlowFsBackend::counting(memory.clone()));
        let picker = Arc::new(FixedDirectoryPicker::new(
            memory.clone(),
            Some(PathBuf::from(PROJECT_DIR)),
        ));
        let surface = Arc::new(Mutex::new(SurfaceLog::default()));

        let mut session = Session::new(
            Arc::new(FsManager::new(backend.clone())),
            picker.clone(),
            Box::new(RecordingSurface {
                log: surface.clone(),
            }),
            &config,
        )
        .unwrap();
        session.attach();

        Self {
            memory,
            backend,
            picker,
            surface,
            session,
        }
    }

    /// Press a key with application focus
    pub async fn send_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> KeyOutcome {
        self.session
            .handle_key(&KeyEvent::new(code, modifiers), FocusContext::Application)
            .await
    }

    /// Deliver a non-press event (repeat or release) for a key
    pub async fn send_key_kind(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        kind: KeyEventKind,
    ) -> KeyOutcome {
        let event = KeyEvent::new_with_kind_and_state(code, modifiers, kind, KeyEventState::NONE);
        self.session
            .handle_key(&event, FocusContext::Application)
            .await
    }

    /// Names of the visible rows, indented two spaces per level
    pub fn visible(&self) -> Vec<String> {
        self.session
            .rows()
            .into_iter()
            .map(|row| format!("{}{}", "  ".repeat(row.depth), row.name))
            .collect()
    }

    /// Full path of a project entry in the tree, e.g. `project/sub/b.txt`
    pub fn tree_path(relative: &str) -> String {
        format!("project/{relative}")
    }

    /// Stored contents of a project file
    pub fn disk(&self, relative: &str) -> Option<String> {
        self.memory.contents(format!("{PROJECT_DIR}/{relative}"))
    }
}
