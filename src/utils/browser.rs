use anyhow::Result;
use std::process::Command;

/// Hands a URL to the host environment.
pub trait UrlOpener: Send + Sync {
    fn open_url(&self, url: &str) -> Result<()>;
}

/// Launches the platform's default browser through its URL opener
/// (`open`, `xdg-open` or `cmd /C start`).
#[derive(Debug, Default, Clone)]
pub struct SystemBrowser {
    program: Option<String>,
}

impl SystemBrowser {
    /// Uses `program <url>` instead of the platform opener.
    pub fn with_program(program: &str) -> Self {
        Self {
            program: Some(program.to_string()),
        }
    }

    fn command(&self, url: &str) -> Command {
        if let Some(program) = &self.program {
            let mut command = Command::new(program);
            command.arg(url);
            return command;
        }

        #[cfg(target_os = "macos")]
        {
            let mut command = Command::new("open");
            command.arg(url);
            command
        }

        #[cfg(target_os = "windows")]
        {
            // The empty argument is the window title expected by `start`
            let mut command = Command::new("cmd");
            command.args(["/C", "start", "", url]);
            command
        }

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            let mut command = Command::new("xdg-open");
            command.arg(url);
            command
        }
    }
}

impl UrlOpener for SystemBrowser {
    fn open_url(&self, url: &str) -> Result<()> {
        log::debug!("Opening {} in the default browser", url);

        // The openers hand off to the browser and exit, so waiting is short
        // and reaps the child.
        let status = self.command(url).status()?;
        if !status.success() {
            return Err(anyhow::anyhow!("URL opener exited with {}", status));
        }

        Ok(())
    }
}
