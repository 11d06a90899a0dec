use super::*;
use tauri_plugin_dialog::FilePath;

#[test]
fn test_native_selection_is_used_as_picked() {
    let picked = PathBuf::from("/photos/50%25 off/a%20b");
    assert_eq!(selection_to_path(FilePath::Path(picked.clone())), picked);
}

#[test]
fn test_url_selection_is_decoded() {
    let url = tauri::Url::parse("file:///photos/My%20Pics").unwrap();
    assert_eq!(
        selection_to_path(FilePath::Url(url)),
        PathBuf::from("/photos/My Pics")
    );
}
