use std::collections::BTreeMap;
use std::fmt;

/// Server-issued session credential, held as the cookie jar for one API base.
///
/// Passed explicitly to every transport call. `Debug` prints cookie names
/// only so the value can be logged.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    cookies: BTreeMap<String, String>,
}

impl Session {
    /// Parse a stored `Cookie` header (`a=1; b=2`).
    pub fn from_cookie_header(header: &str) -> Self {
        let cookies = header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                let name = name.trim();
                if name.is_empty() || value.is_empty() {
                    return None;
                }
                Some((name.to_string(), value.trim().to_string()))
            })
            .collect();
        Session { cookies }
    }

    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        Some(pairs.join("; "))
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    /// Merge one `Set-Cookie` header. Returns true if the jar changed.
    ///
    /// An empty value or `Max-Age=0` deletes the cookie.
    pub fn absorb(&mut self, set_cookie: &str) -> bool {
        let mut parts = set_cookie.split(';');
        let Some((name, value)) = parts.next().and_then(|p| p.trim().split_once('=')) else {
            return false;
        };
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let value = value.trim().trim_matches('"');

        let expired = parts.any(|attr| {
            attr.trim()
                .split_once('=')
                .map(|(k, v)| k.trim().eq_ignore_ascii_case("max-age") && v.trim() == "0")
                .unwrap_or(false)
        });

        if value.is_empty() || expired {
            return self.cookies.remove(name).is_some();
        }

        match self.cookies.get(name) {
            Some(existing) if existing == value => false,
            _ => {
                self.cookies.insert(name.to_string(), value.to_string());
                true
            }
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("cookies", &self.cookies.keys().collect::<Vec<_>>())
            .finish()
    }
}
