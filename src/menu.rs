//! Native menu. Actions that change the session emit `session-updated`
//! with a fresh `SessionView`; everything else ends in a message dialog.

use crate::commands::{selection_to_path, AppState};
use crate::ops::error::{ErrorMessage, OpsError};
use tauri::menu::{MenuBuilder, MenuEvent, MenuItemBuilder, SubmenuBuilder};
use tauri::{App, AppHandle, Emitter, Manager};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

pub const SESSION_UPDATED: &str = "session-updated";

const OPEN_FOLDER: &str = "open_folder";
const RUN_JOB: &str = "run_job";
const TOGGLE_DEBUG: &str = "toggle_debug";
const ABOUT: &str = "about";
const QUIT: &str = "quit";

pub fn build(app: &App) -> tauri::Result<()> {
    let open_folder = MenuItemBuilder::with_id(OPEN_FOLDER, "Open Folder")
        .accelerator("CmdOrCtrl+O")
        .build(app)?;
    let run_job = MenuItemBuilder::with_id(RUN_JOB, "Run Job").build(app)?;
    let toggle_debug = MenuItemBuilder::with_id(TOGGLE_DEBUG, "Toggle Debug")
        .accelerator("CmdOrCtrl+D")
        .build(app)?;
    let about = MenuItemBuilder::with_id(ABOUT, "About").build(app)?;
    let quit = MenuItemBuilder::with_id(QUIT, "Quit")
        .accelerator("CmdOrCtrl+Q")
        .build(app)?;

    let file = SubmenuBuilder::new(app, "File")
        .item(&open_folder)
        .item(&run_job)
        .separator()
        .item(&quit)
        .build()?;
    let view = SubmenuBuilder::new(app, "View").item(&toggle_debug).build()?;
    let help = SubmenuBuilder::new(app, "Help").item(&about).build()?;

    let menu = MenuBuilder::new(app)
        .item(&file)
        .item(&view)
        .item(&help)
        .build()?;
    app.set_menu(menu)?;
    Ok(())
}

pub fn handle(app: &AppHandle, event: MenuEvent) {
    match event.id().as_ref() {
        OPEN_FOLDER => open_folder(app),
        RUN_JOB => run_job(app),
        TOGGLE_DEBUG => toggle_debug(app),
        ABOUT => about(app),
        QUIT => app.exit(0),
        other => tracing::debug!(id = other, "unhandled menu event"),
    }
}

fn show_info(app: &AppHandle, title: &str, text: String) {
    app.dialog()
        .message(text)
        .title(title)
        .kind(MessageDialogKind::Info)
        .show(|_| {});
}

fn show_error(app: &AppHandle, err: ErrorMessage) {
    let text = match &err.suggestion {
        Some(suggestion) => format!("{}\n\n{}", err.message, suggestion),
        None => err.message.clone(),
    };
    app.dialog()
        .message(text)
        .title(err.title)
        .kind(MessageDialogKind::Error)
        .show(|_| {});
}

fn emit_view(app: &AppHandle) {
    let state = app.state::<AppState>();
    let view = match state.lock() {
        Ok(controller) => controller.view(),
        Err(err) => return show_error(app, err),
    };
    if let Err(err) = app.emit(SESSION_UPDATED, view) {
        tracing::warn!(error = %err, "failed to emit session update");
    }
}

fn open_folder(app: &AppHandle) {
    let handle = app.clone();
    app.dialog().file().pick_folder(move |folder| {
        let Some(folder) = folder.map(selection_to_path) else {
            return;
        };
        let result = handle
            .state::<AppState>()
            .lock()
            .and_then(|mut controller| Ok(controller.open_folder(&folder)?));
        match result {
            Ok(_) => emit_view(&handle),
            Err(err) => show_error(&handle, err),
        }
    });
}

fn run_job(app: &AppHandle) {
    let handle = app.clone();
    app.dialog()
        .file()
        .add_filter("Removal manifest", &["json"])
        .pick_file(move |file| {
            let Some(manifest) = file.map(selection_to_path) else {
                return;
            };
            let shared = handle.state::<AppState>().shared();
            tauri::async_runtime::spawn_blocking(move || {
                let result = shared
                    .lock()
                    .map_err(|_| OpsError::InvalidState("controller lock poisoned".to_string()))
                    .and_then(|mut controller| controller.run_job_from_manifest(&manifest));
                match result {
                    Ok(outcome) => {
                        let mut text = outcome.message.clone();
                        for failure in outcome.report.failures() {
                            text.push_str(&format!(
                                "\n{}: {}",
                                failure.path,
                                failure.error.as_deref().unwrap_or("unknown error")
                            ));
                        }
                        show_info(&handle, "Job Finished", text);
                    }
                    Err(err) => show_error(&handle, err.into()),
                }
            });
        });
}

fn toggle_debug(app: &AppHandle) {
    let result = app
        .state::<AppState>()
        .lock()
        .map(|mut controller| controller.toggle_debug());
    match result {
        Ok(enabled) => {
            tracing::info!(enabled, "debug logging toggled");
            emit_view(app);
        }
        Err(err) => show_error(app, err),
    }
}

fn about(app: &AppHandle) {
    let info = match app.state::<AppState>().lock() {
        Ok(controller) => controller.about(),
        Err(err) => return show_error(app, err),
    };
    show_info(
        app,
        &format!("About {}", info.app_name),
        format!(
            "{} {}\n\n{}\n\n{}\n{}",
            info.app_name, info.version, info.description, info.website, info.license
        ),
    );
}
