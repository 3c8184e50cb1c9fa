#[cfg(test)]
mod tests {
    use super::super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.pubmed.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.pubmed.tool, "epiwatch");
        assert_eq!(config.ner.min_entity_len, 3);
        assert_eq!(config.countries.match_mode, CountryMatch::Substring);
        assert_eq!(config.report.table_rows, 15);
        assert_eq!(config.report.bar_rows, 10);
        assert_eq!(config.server.bind, "127.0.0.1:3000");
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [pubmed]
            email = "curator@example.org"

            [ner]
            extra_clinical_terms = ["measles"]

            [countries]
            match_mode = "word_boundary"

            [report]
            table_rows = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.pubmed.email.as_deref(), Some("curator@example.org"));
        assert_eq!(config.pubmed.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.ner.extra_clinical_terms, vec!["measles"]);
        assert_eq!(config.countries.match_mode, CountryMatch::WordBoundary);
        assert_eq!(config.report.table_rows, 5);
        assert_eq!(config.report.bar_rows, 10);
    }

    #[test]
    fn test_unknown_match_mode_is_error() {
        let parsed: Result<Config, _> = toml::from_str("[countries]\nmatch_mode = \"fuzzy\"\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:3000");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("epiwatch.toml");
        std::fs::write(&path, "[server]\nbind = \"0.0.0.0:8080\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");

        std::fs::write(&path, "[server\n").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, EpiwatchError::Config(ref msg) if msg.contains("epiwatch.toml")));
    }

    #[test]
    fn test_api_key_from_env_only_when_unset() {
        let mut config = Config::default();
        config.apply_env(|key| (key == API_KEY_ENV).then(|| "env-key".to_string()));
        assert_eq!(config.pubmed.api_key.as_deref(), Some("env-key"));

        let mut config = Config::default();
        config.pubmed.api_key = Some("file-key".to_string());
        config.apply_env(|_| Some("env-key".to_string()));
        assert_eq!(config.pubmed.api_key.as_deref(), Some("file-key"));

        let settings = config.pubmed.to_settings();
        assert_eq!(settings.api_key.as_deref(), Some("file-key"));
    }
}
