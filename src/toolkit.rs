use colored::*;
use log::debug;
use std::path::PathBuf;

/// Optional external helpers, each probed for once at startup.
///
/// A missing tool is never an error; the caller picks the built-in fallback
/// instead of re-checking the PATH on every use.
#[derive(Debug, Clone, Default)]
pub struct Toolkit {
    /// Big-letter banner renderer.
    pub figlet: Option<PathBuf>,
    /// Rainbow gradient filter for piped text.
    pub lolcat: Option<PathBuf>,
    /// Precise byte-rate output pacer.
    pub pv: Option<PathBuf>,
    /// Image-to-terminal-art renderers, in order of preference.
    pub chafa: Option<PathBuf>,
    pub jp2a: Option<PathBuf>,
}

impl Toolkit {
    pub fn probe() -> Self {
        let toolkit = Self {
            figlet: find_tool("figlet"),
            lolcat: find_tool("lolcat"),
            pv: find_tool("pv"),
            chafa: find_tool("chafa"),
            jp2a: find_tool("jp2a"),
        };
        debug!("External tools: {:?}", toolkit);
        toolkit
    }

    pub fn image_renderer(&self) -> Option<&PathBuf> {
        self.chafa.as_ref().or(self.jp2a.as_ref())
    }

    /// One-line hint for the nicest missing tool, printed at most once.
    pub fn missing_tool_hint(&self) -> Option<String> {
        if self.figlet.is_none() {
            Some(
                format!("{}", "hint: install figlet for bigger banners".dimmed()),
            )
        } else {
            None
        }
    }
}

fn find_tool(name: &str) -> Option<PathBuf> {
    match which::which(name) {
        Ok(path) => {
            debug!("Found {} at {}", name, path.display());
            Some(path)
        }
        Err(_) => None,
    }
}
