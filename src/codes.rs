use std::io;

use webbrowser::Browser;

/// A special input string that opens an external page instead of being graded
#[derive(Clone, Debug, PartialEq)]
pub struct CodeEntry {
    pub trigger: String,
    pub label: String,
    pub destination: String,
}

/// Static trigger -> destination mapping. Triggers are unique and matched
/// exactly (case-sensitive) against trimmed input.
#[derive(Clone, Debug, Default)]
pub struct CodeRegistry {
    entries: Vec<CodeEntry>,
}

impl CodeRegistry {
    pub fn new(entries: Vec<CodeEntry>) -> Self {
        debug_assert!(
            {
                let mut triggers: Vec<&str> = entries.iter().map(|e| e.trigger.as_str()).collect();
                triggers.sort_unstable();
                triggers.windows(2).all(|w| w[0] != w[1])
            },
            "code triggers must be unique"
        );
        Self { entries }
    }

    /// The codes shipped with the quiz
    pub fn standard() -> Self {
        Self::new(vec![
            CodeEntry {
                trigger: "DOOM3-D3WASM".to_string(),
                label: "DOOM 3".to_string(),
                destination: "https://milesrichardson406-stack.github.io/games/doom3/index.html"
                    .to_string(),
            },
            CodeEntry {
                trigger: "MOTHER3-M3WASM".to_string(),
                label: "MOTHER 3".to_string(),
                destination: "https://milesrichardson406-stack.github.io/games/mother3/index.html"
                    .to_string(),
            },
        ])
    }

    /// Trim the raw input, then exact-match against the triggers.
    /// No partial or case-insensitive matching.
    pub fn lookup(&self, raw_input: &str) -> Option<&CodeEntry> {
        let code = raw_input.trim();
        self.entries.iter().find(|e| e.trigger == code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Capability to leave the quiz for an external page. The production impl
/// opens the system browser; tests substitute a recording fake.
pub trait Navigate {
    fn navigate_to(&mut self, url: &str) -> io::Result<()>;
}

/// Opens destinations in the default browser when one is available
#[derive(Debug, Default)]
pub struct BrowserNavigator;

impl Navigate for BrowserNavigator {
    fn navigate_to(&mut self, url: &str) -> io::Result<()> {
        if Browser::is_available() {
            webbrowser::open(url)
        } else {
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "no browser available",
            ))
        }
    }
}
