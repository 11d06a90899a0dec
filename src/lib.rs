pub mod audit;
pub mod config;
pub mod controller;
pub mod keys;
pub mod logging;
pub mod models;
pub mod ops;
pub mod scanner;
pub mod session;

#[cfg(feature = "desktop")]
mod commands;
#[cfg(feature = "desktop")]
mod menu;

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use commands::AppState;
    use config::AppConfig;
    use controller::ReviewController;
    use tauri::Manager;

    logging::init();
    let config = AppConfig::load_or_default();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(move |app| {
            let controller = ReviewController::from_config(config)?;
            tracing::info!(
                export_dir = %controller.export_dir().root().display(),
                "review controller ready"
            );
            app.manage(AppState::new(controller));
            menu::build(app)?;
            Ok(())
        })
        .on_menu_event(menu::handle)
        .invoke_handler(tauri::generate_handler![
            commands::open_folder,
            commands::session_view,
            commands::mark_current,
            commands::keep_current,
            commands::go_back,
            commands::press_key,
            commands::export_manifest,
            commands::discard_session,
            commands::resume_review,
            commands::run_job,
            commands::run_marked_job,
            commands::toggle_debug,
            commands::about,
            commands::get_settings,
            commands::set_settings,
            commands::quit_app
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app, event| {
            if let tauri::RunEvent::Exit = event {
                commands::shutdown(app);
            }
        });
}
