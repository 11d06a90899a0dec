use crate::config::{settings_path, AppConfig, PartialAppConfig};
use crate::controller::{ExportOutcome, JobOutcome, ReviewController, SessionView};
use crate::models::AboutInfo;
use crate::ops::error::{ErrorMessage, OpsError};
use crate::ops::paths::normalize_path;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tauri::{AppHandle, Manager, State};

pub struct AppState {
    controller: Arc<Mutex<ReviewController>>,
}

impl AppState {
    pub fn new(controller: ReviewController) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
        }
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, ReviewController>, ErrorMessage> {
        self.controller
            .lock()
            .map_err(|_| OpsError::InvalidState("controller lock poisoned".to_string()).into())
    }

    pub fn shared(&self) -> Arc<Mutex<ReviewController>> {
        Arc::clone(&self.controller)
    }
}

fn join_error(e: tokio::task::JoinError) -> ErrorMessage {
    OpsError::Other(anyhow::anyhow!("job task failed: {e}")).into()
}

fn dialog_error(e: tokio::sync::oneshot::error::RecvError) -> ErrorMessage {
    OpsError::Other(anyhow::anyhow!("failed to open dialog: {e}")).into()
}

/// Native selections are used as picked; `file://` URLs are decoded.
pub(crate) fn selection_to_path(selection: tauri_plugin_dialog::FilePath) -> PathBuf {
    use tauri_plugin_dialog::FilePath;

    match selection {
        FilePath::Path(p) => p,
        FilePath::Url(url) => PathBuf::from(normalize_path(url.as_str())),
    }
}

async fn pick_folder(window: &tauri::Window) -> Result<Option<PathBuf>, ErrorMessage> {
    use tauri_plugin_dialog::DialogExt;

    let (sender, receiver) = tokio::sync::oneshot::channel();
    window.dialog().file().pick_folder(move |folder| {
        let _ = sender.send(folder.map(selection_to_path));
    });
    receiver.await.map_err(dialog_error)
}

async fn pick_manifest(window: &tauri::Window) -> Result<Option<PathBuf>, ErrorMessage> {
    use tauri_plugin_dialog::DialogExt;

    let (sender, receiver) = tokio::sync::oneshot::channel();
    window
        .dialog()
        .file()
        .add_filter("Removal manifest", &["json"])
        .pick_file(move |file| {
            let _ = sender.send(file.map(selection_to_path));
        });
    receiver.await.map_err(dialog_error)
}

#[tauri::command]
pub async fn open_folder(
    window: tauri::Window,
    state: State<'_, AppState>,
) -> Result<Option<SessionView>, ErrorMessage> {
    let Some(folder) = pick_folder(&window).await? else {
        return Ok(None);
    };
    let mut controller = state.lock()?;
    Ok(Some(controller.open_folder(&folder)?))
}

#[tauri::command]
pub fn session_view(state: State<'_, AppState>) -> Result<SessionView, ErrorMessage> {
    Ok(state.lock()?.view())
}

#[tauri::command]
pub fn mark_current(state: State<'_, AppState>) -> Result<SessionView, ErrorMessage> {
    Ok(state.lock()?.mark()?)
}

#[tauri::command]
pub fn keep_current(state: State<'_, AppState>) -> Result<SessionView, ErrorMessage> {
    Ok(state.lock()?.keep()?)
}

#[tauri::command]
pub fn go_back(state: State<'_, AppState>) -> Result<SessionView, ErrorMessage> {
    Ok(state.lock()?.back()?)
}

/// Keyboard entry point. Non-shortcut keys come back as `None`.
#[tauri::command]
pub fn press_key(
    key: String,
    repeat: bool,
    state: State<'_, AppState>,
) -> Result<Option<SessionView>, ErrorMessage> {
    Ok(state.lock()?.handle_key(&key, repeat)?)
}

#[tauri::command]
pub fn export_manifest(state: State<'_, AppState>) -> Result<ExportOutcome, ErrorMessage> {
    Ok(state.lock()?.export()?)
}

#[tauri::command]
pub fn discard_session(state: State<'_, AppState>) -> Result<SessionView, ErrorMessage> {
    Ok(state.lock()?.discard())
}

#[tauri::command]
pub fn resume_review(state: State<'_, AppState>) -> Result<SessionView, ErrorMessage> {
    Ok(state.lock()?.resume()?)
}

#[tauri::command]
pub async fn run_job(
    window: tauri::Window,
    state: State<'_, AppState>,
) -> Result<Option<JobOutcome>, ErrorMessage> {
    let Some(manifest) = pick_manifest(&window).await? else {
        return Ok(None);
    };

    let shared = state.shared();
    let outcome = tokio::task::spawn_blocking(move || -> Result<JobOutcome, ErrorMessage> {
        let mut controller = shared
            .lock()
            .map_err(|_| OpsError::InvalidState("controller lock poisoned".to_string()))?;
        Ok(controller.run_job_from_manifest(&manifest)?)
    })
    .await
    .map_err(join_error)??;

    Ok(Some(outcome))
}

#[tauri::command]
pub async fn run_marked_job(state: State<'_, AppState>) -> Result<JobOutcome, ErrorMessage> {
    let shared = state.shared();
    tokio::task::spawn_blocking(move || -> Result<JobOutcome, ErrorMessage> {
        let mut controller = shared
            .lock()
            .map_err(|_| OpsError::InvalidState("controller lock poisoned".to_string()))?;
        Ok(controller.run_job_for_marked()?)
    })
    .await
    .map_err(join_error)?
}

#[tauri::command]
pub fn toggle_debug(state: State<'_, AppState>) -> Result<bool, ErrorMessage> {
    Ok(state.lock()?.toggle_debug())
}

#[tauri::command]
pub fn about(state: State<'_, AppState>) -> Result<AboutInfo, ErrorMessage> {
    Ok(state.lock()?.about())
}

#[tauri::command]
pub fn get_settings(state: State<'_, AppState>) -> Result<AppConfig, ErrorMessage> {
    Ok(state.lock()?.settings().clone())
}

#[tauri::command]
pub fn set_settings(
    update: PartialAppConfig,
    state: State<'_, AppState>,
) -> Result<AppConfig, ErrorMessage> {
    let updated = state.lock()?.update_settings(update)?;
    if let Some(path) = settings_path() {
        updated.save_to(&path)?;
        tracing::info!(path = %path.display(), "settings saved");
    }
    Ok(updated)
}

/// Exit goes through `RunEvent::Exit`, which flushes the debug log.
#[tauri::command]
pub fn quit_app(app: AppHandle) {
    app.exit(0);
}

/// Writes out the debug log before the process goes away.
pub fn shutdown(app: &AppHandle) {
    let state = app.state::<AppState>();
    match state.lock() {
        Ok(mut controller) => {
            if let Some(path) = controller.shutdown() {
                tracing::info!(path = %path, "debug log written on exit");
            }
        }
        Err(err) => tracing::warn!(message = %err.message, "could not flush debug log on exit"),
    }
}

#[cfg(test)]
mod tests;
