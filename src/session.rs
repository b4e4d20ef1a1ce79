use std::path::PathBuf;
use tracing::{debug, warn};
use crate::config::{self, Config};
use crate::i18n::{Language, TextDirection};

/// Current language and API base URL, created once at startup and owned by the `App`
#[derive(Debug)]
pub struct Session {
    language: Language,
    api_base: String,
    store: Option<PathBuf>,
}

impl Session {
    pub fn new(language: Language, api_base: impl Into<String>, store: Option<PathBuf>) -> Self {
        Self {
            language,
            api_base: api_base.into(),
            store,
        }
    }

    /// Rebuild the session from the persisted config at `store`.
    ///
    /// `api_override` takes precedence over the stored `API` key. A config
    /// file that cannot be read is treated as empty.
    pub fn restore(store: Option<PathBuf>, api_override: Option<String>, host: Option<&str>) -> Self {
        let stored = match store.as_deref() {
            Some(path) => Config::load_from(path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                Config::new()
            }),
            None => Config::new(),
        };

        let language = stored
            .lang
            .as_deref()
            .map(Language::from_code)
            .unwrap_or_default();
        let override_url = api_override.or(stored.api);
        let api_base = config::resolve_api_base(override_url.as_deref(), host);

        debug!(lang = language.code(), api = %api_base, "session restored");
        Self::new(language, api_base, store)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn direction(&self) -> TextDirection {
        self.language.direction()
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Switch language and persist the choice.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        self.persist_language();
    }

    pub fn toggle_language(&mut self) -> Language {
        self.set_language(self.language.toggled());
        self.language
    }

    fn persist_language(&self) {
        let Some(path) = self.store.as_deref() else {
            return;
        };

        let mut stored = match Config::load_from(path) {
            Ok(stored) => stored,
            Err(e) => {
                // Rewriting would drop whatever else the file holds
                warn!(path = %path.display(), error = %e, "config unreadable, language not persisted");
                return;
            }
        };
        stored.lang = Some(self.language.code().to_string());
        if let Err(e) = stored.save_to(path) {
            warn!(path = %path.display(), error = %e, "failed to persist language");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_to_english_without_config() {
        let session = Session::restore(None, None, None);
        assert_eq!(session.language(), Language::English);
        assert_eq!(session.api_base(), config::LOCAL_API);
    }

    #[test]
    fn persisted_arabic_survives_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut session = Session::restore(Some(path.clone()), None, None);
        session.set_language(Language::Arabic);

        let restored = Session::restore(Some(path), None, None);
        assert_eq!(restored.language(), Language::Arabic);
        assert_eq!(restored.direction(), TextDirection::Rtl);
    }

    #[test]
    fn invalid_stored_code_falls_back_to_english() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"LANG":"klingon"}"#).unwrap();

        let session = Session::restore(Some(path), None, None);
        assert_eq!(session.language(), Language::English);
    }

    #[test]
    fn toggle_persists_and_keeps_api_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        Config {
            api: Some("http://lab.internal/api".to_string()),
            lang: None,
        }
        .save_to(&path)
        .unwrap();

        let mut session = Session::restore(Some(path.clone()), None, Some("x.onrender.com"));
        assert_eq!(session.api_base(), "http://lab.internal/api");
        assert_eq!(session.toggle_language(), Language::Arabic);

        let stored = Config::load_from(&path).unwrap();
        assert_eq!(stored.lang.as_deref(), Some("ar"));
        assert_eq!(stored.api.as_deref(), Some("http://lab.internal/api"));
    }

    #[test]
    fn explicit_override_beats_stored_api() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        Config {
            api: Some("http://stored/api".to_string()),
            lang: None,
        }
        .save_to(&path)
        .unwrap();

        let session = Session::restore(Some(path), Some("http://env/api".to_string()), None);
        assert_eq!(session.api_base(), "http://env/api");
    }

    #[test]
    fn unreadable_config_is_left_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let raw = r#"{"API":"http://lab.internal/api","LANG":5}"#;
        std::fs::write(&path, raw).unwrap();

        let mut session = Session::restore(Some(path.clone()), None, None);
        assert_eq!(session.toggle_language(), Language::Arabic);
        assert_eq!(session.language(), Language::Arabic);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), raw);
    }
}
