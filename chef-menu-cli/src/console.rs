//! Terminal implementations of the controller collaborators.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use async_trait::async_trait;
use chef_menu_core::{Confirm, ImagePicker, MenuError, Notice, NoticeLevel, Notifier, PickedImage};

/// Prints notices: successes to stdout, errors to stderr.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => println!("✓ {}: {}", notice.title, notice.message),
            NoticeLevel::Error => eprintln!("✗ {}: {}", notice.title, notice.message),
        }
    }
}

/// Asks on stdin unless `--yes` was given.
pub struct PromptConfirm {
    pub assume_yes: bool,
}

impl Confirm for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// "Picks" the image given on the command line.
pub struct FilePicker {
    pub path: PathBuf,
}

#[async_trait]
impl ImagePicker for FilePicker {
    async fn pick(&self) -> Result<Option<PickedImage>, MenuError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| MenuError::Image(format!("{}: {}", self.path.display(), e)))?;
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        Ok(Some(PickedImage::new(file_name, bytes)))
    }
}
