use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrashOutcome {
    Success,
    StrategyFailed(String),
}

/// One way of getting a file out of the user's folder.
pub trait TrashStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn attempt_trash(&self, path: &Path) -> TrashOutcome;
}

/// The platform recycle bin through the `trash` crate.
#[derive(Debug, Default)]
pub struct NativeTrash;

impl TrashStrategy for NativeTrash {
    fn name(&self) -> &'static str {
        "native-trash"
    }

    fn attempt_trash(&self, path: &Path) -> TrashOutcome {
        match trash::delete(path) {
            Ok(()) => TrashOutcome::Success,
            Err(e) => TrashOutcome::StrategyFailed(format!("Native trash failed: {}", e)),
        }
    }
}

/// Moves the file into the per-user trash folder by rename.
#[derive(Debug, Default)]
pub struct HomeTrash {
    root: Option<PathBuf>,
}

impl HomeTrash {
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Trash rooted somewhere else; files go to `<root>/files`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn trash_root(&self) -> Result<PathBuf, String> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        let home = dirs::home_dir().ok_or_else(|| "Cannot determine home directory".to_string())?;

        #[cfg(target_os = "linux")]
        {
            let data = dirs::data_dir().unwrap_or_else(|| home.join(".local").join("share"));
            Ok(data.join("Trash"))
        }

        #[cfg(target_os = "macos")]
        {
            Ok(home.join(".Trash"))
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            Ok(home.join(".trash"))
        }
    }

    fn files_dir(&self, root: &Path) -> PathBuf {
        if cfg!(target_os = "macos") && self.root.is_none() {
            root.to_path_buf()
        } else {
            root.join("files")
        }
    }

    fn move_to_trash(&self, path: &Path) -> Result<PathBuf, String> {
        let root = self.trash_root()?;
        let files_dir = self.files_dir(&root);
        fs::create_dir_all(&files_dir)
            .map_err(|e| format!("Failed to create trash directory: {}", e))?;

        let filename = path
            .file_name()
            .ok_or_else(|| "Invalid file path".to_string())?
            .to_string_lossy();
        let mut trash_path = files_dir.join(&*filename);

        let mut counter = 1;
        while trash_path.exists() {
            let stem = path
                .file_stem()
                .ok_or_else(|| "Invalid file name".to_string())?
                .to_string_lossy();
            let extension = path
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
                .unwrap_or_default();

            trash_path = files_dir.join(format!("{} ({}){}", stem, counter, extension));
            counter += 1;
        }

        fs::rename(path, &trash_path).map_err(|e| format!("Failed to move to trash: {}", e))?;

        if files_dir != root {
            if let Err(e) = write_trash_info(&root, &trash_path, path) {
                tracing::warn!(path = %path.display(), error = %e, "trash info record not written");
            }
        }
        Ok(trash_path)
    }
}

/// freedesktop `.trashinfo` record so file managers can restore the file.
fn write_trash_info(root: &Path, trashed: &Path, original: &Path) -> std::io::Result<()> {
    let info_dir = root.join("info");
    fs::create_dir_all(&info_dir)?;
    let name = trashed
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let original = original.to_string_lossy();
    let encoded: Vec<String> = original
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    let contents = format!(
        "[Trash Info]\nPath={}\nDeletionDate={}\n",
        encoded.join("/"),
        Local::now().format("%Y-%m-%dT%H:%M:%S")
    );
    fs::write(info_dir.join(format!("{}.trashinfo", name)), contents)
}

impl TrashStrategy for HomeTrash {
    fn name(&self) -> &'static str {
        "home-trash"
    }

    fn attempt_trash(&self, path: &Path) -> TrashOutcome {
        match self.move_to_trash(path) {
            Ok(trashed) => {
                tracing::debug!(from = %path.display(), to = %trashed.display(), "moved to trash");
                TrashOutcome::Success
            }
            Err(e) => TrashOutcome::StrategyFailed(e),
        }
    }
}

/// A platform shell command that removes the file.
pub struct ShellStrategy {
    name: &'static str,
    build: fn(&Path) -> Option<Command>,
}

impl ShellStrategy {
    /// Overwrite-then-unlink (`shred`, `rm -P`, `del /F`).
    pub fn secure_delete() -> Self {
        Self {
            name: "secure-delete",
            build: secure_delete_command,
        }
    }

    /// Desktop trash utility (`gio trash`, Finder, the VB recycle API).
    pub fn trash_utility() -> Self {
        Self {
            name: "trash-utility",
            build: trash_utility_command,
        }
    }
}

impl TrashStrategy for ShellStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn attempt_trash(&self, path: &Path) -> TrashOutcome {
        let Some(mut command) = (self.build)(path) else {
            return TrashOutcome::StrategyFailed(format!(
                "{} is not supported on this platform",
                self.name
            ));
        };

        let output = match command.output() {
            Ok(output) => output,
            Err(e) => {
                return TrashOutcome::StrategyFailed(format!("Failed to launch {}: {}", self.name, e))
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let reason = if stderr.is_empty() {
                format!("{} exited with {}", self.name, output.status)
            } else {
                format!("{} failed: {}", self.name, stderr)
            };
            return TrashOutcome::StrategyFailed(reason);
        }
        if path.exists() {
            return TrashOutcome::StrategyFailed(format!(
                "{} reported success but the file is still there",
                self.name
            ));
        }
        TrashOutcome::Success
    }
}

#[allow(unused_variables, unreachable_code)]
fn secure_delete_command(path: &Path) -> Option<Command> {
    #[cfg(target_os = "linux")]
    {
        let mut command = Command::new("shred");
        command.arg("-u").arg("-z").arg(path);
        return Some(command);
    }

    #[cfg(target_os = "macos")]
    {
        let mut command = Command::new("rm");
        command.arg("-P").arg(path);
        return Some(command);
    }

    #[cfg(target_os = "windows")]
    {
        let mut command = Command::new("cmd");
        command.args(["/C", "del", "/F", "/Q"]).arg(path);
        return Some(command);
    }

    None
}

#[allow(unused_variables, unreachable_code)]
fn trash_utility_command(path: &Path) -> Option<Command> {
    #[cfg(target_os = "linux")]
    {
        let mut command = Command::new("gio");
        command.arg("trash").arg(path);
        return Some(command);
    }

    #[cfg(target_os = "macos")]
    {
        let escaped = path
            .to_string_lossy()
            .replace('\\', "\\\\")
            .replace('"', "\\\"");
        let mut command = Command::new("osascript");
        command.arg("-e").arg(format!(
            "tell application \"Finder\" to delete POSIX file \"{}\"",
            escaped
        ));
        return Some(command);
    }

    #[cfg(target_os = "windows")]
    {
        let escaped = path.to_string_lossy().replace('\'', "''");
        let mut command = Command::new("powershell");
        command.args(["-NoProfile", "-NonInteractive", "-Command"]).arg(format!(
            "Add-Type -AssemblyName Microsoft.VisualBasic; \
             [Microsoft.VisualBasic.FileIO.FileSystem]::DeleteFile('{}', 'OnlyErrorDialogs', 'SendToRecycleBin')",
            escaped
        ));
        return Some(command);
    }

    None
}

/// Strategies in the order the job runner tries them.
pub fn default_strategies(shell_fallbacks: bool) -> Vec<Box<dyn TrashStrategy>> {
    let mut strategies: Vec<Box<dyn TrashStrategy>> =
        vec![Box::new(NativeTrash), Box::new(HomeTrash::new())];
    if shell_fallbacks {
        strategies.push(Box::new(ShellStrategy::secure_delete()));
        strategies.push(Box::new(ShellStrategy::trash_utility()));
    }
    strategies
}
