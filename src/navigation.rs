use url::Url;

use crate::HelperError;

/// The browsing context the helper drives.
///
/// `assign` is a full-page navigation away from the helper. `replace` rewrites
/// the visible address without loading anything.
pub trait Navigator {
    fn assign(&mut self, url: &Url) -> Result<(), HelperError>;

    fn replace(&mut self, location: &str) -> Result<(), HelperError>;
}

/// What a page-rendering navigator was asked to do, to be turned into an HTTP
/// response by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDirective {
    Assign(String),
    Replace(String),
}

/// Records directives instead of acting on them. The helper server builds one
/// per request and translates the result into a redirect or an inline
/// `history.replaceState` call.
#[derive(Debug, Default)]
pub struct PageNavigator {
    directives: Vec<NavigationDirective>,
}

impl PageNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directives(&self) -> &[NavigationDirective] {
        &self.directives
    }

    pub fn assigned(&self) -> Option<&str> {
        self.directives.iter().rev().find_map(|directive| match directive {
            NavigationDirective::Assign(url) => Some(url.as_str()),
            NavigationDirective::Replace(_) => None,
        })
    }

    pub fn replaced(&self) -> Option<&str> {
        self.directives.iter().rev().find_map(|directive| match directive {
            NavigationDirective::Replace(location) => Some(location.as_str()),
            NavigationDirective::Assign(_) => None,
        })
    }
}

impl Navigator for PageNavigator {
    fn assign(&mut self, url: &Url) -> Result<(), HelperError> {
        self.directives
            .push(NavigationDirective::Assign(url.to_string()));
        Ok(())
    }

    fn replace(&mut self, location: &str) -> Result<(), HelperError> {
        self.directives
            .push(NavigationDirective::Replace(location.to_string()));
        Ok(())
    }
}

/// Opens the system browser. There is no address bar to rewrite from a
/// terminal, so `replace` only logs.
#[cfg(feature = "cli")]
#[derive(Debug, Default)]
pub struct BrowserNavigator;

#[cfg(feature = "cli")]
impl Navigator for BrowserNavigator {
    fn assign(&mut self, url: &Url) -> Result<(), HelperError> {
        webbrowser::open(url.as_str())
            .map_err(|err| HelperError::Navigation(format!("failed to open browser: {err}")))
    }

    fn replace(&mut self, location: &str) -> Result<(), HelperError> {
        tracing::debug!(location, "ignoring address replacement outside a browser");
        Ok(())
    }
}
