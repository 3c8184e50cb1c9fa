//! PubMed E-utilities client.
//!
//! Endpoints used:
//!   esearch: https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi
//!   efetch:  https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi
//!
//! Records are fetched one PMID per efetch call, sequentially.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use epiwatch_common::sandbox::SandboxClient as Client;
use epiwatch_common::{EpiwatchError, Record};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::LiteratureSource;
use crate::models::SearchParams;

pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
pub const DEFAULT_TOOL: &str = "epiwatch";

/// Earliest date E-utilities accepts when only an end date is given.
const EARLIEST_MINDATE: &str = "1800/01/01";

/// Connection settings for the E-utilities API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubMedSettings {
    pub base_url: String,
    /// Contact address NCBI asks every E-utilities client to send.
    pub email: Option<String>,
    pub tool: String,
    pub api_key: Option<String>,
}

impl Default for PubMedSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            email: None,
            tool: DEFAULT_TOOL.to_string(),
            api_key: None,
        }
    }
}

pub struct PubMedClient {
    client: Client,
    settings: PubMedSettings,
}

impl PubMedClient {
    pub fn new(settings: PubMedSettings) -> anyhow::Result<Self> {
        let client = Client::new()?;
        Ok(Self { client, settings })
    }

    /// Like [`PubMedClient::new`], also allowlisting the base URL's host.
    pub fn with_trusted_base_url(settings: PubMedSettings) -> anyhow::Result<Self> {
        let mut client = Client::new()?;
        if let Some(host) = url::Url::parse(&settings.base_url)
            .ok()
            .and_then(|u| u.host_str().map(String::from))
        {
            client.allow_domain(&host);
        }
        Ok(Self { client, settings })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), name)
    }

    fn base_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("tool", self.settings.tool.clone()),
        ];
        if let Some(email) = &self.settings.email {
            params.push(("email", email.clone()));
        }
        if let Some(key) = &self.settings.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }

    /// Search PubMed and return a list of PMIDs.
    #[instrument(skip(self))]
    async fn esearch(&self, params: &SearchParams) -> anyhow::Result<Vec<String>> {
        let mut query = self.base_params();
        query.push(("term", params.query.clone()));
        query.push(("retmax", params.max_results.to_string()));
        query.push(("retmode", "json".to_string()));
        query.extend(date_range_params(params.start_date, params.end_date));

        let resp: serde_json::Value = self.client
            .get(&self.endpoint("esearch.fcgi"))?
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = resp["esearchresult"]["ERROR"].as_str() {
            anyhow::bail!("PubMed esearch error: {}", err);
        }

        let ids: Vec<String> = resp["esearchresult"]["idlist"]
            .as_array()
            .map(|ids| {
                ids.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        debug!(?ids, "PubMed esearch returned PMIDs");
        Ok(ids)
    }

    /// Fetch the abstract XML for a single PMID.
    #[instrument(skip(self))]
    async fn efetch(&self, pmid: &str) -> anyhow::Result<String> {
        let mut query = self.base_params();
        query.push(("id", pmid.to_string()));
        query.push(("rettype", "abstract".to_string()));
        query.push(("retmode", "xml".to_string()));

        let xml = self.client
            .get(&self.endpoint("efetch.fcgi"))?
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(xml)
    }
}

#[async_trait]
impl LiteratureSource for PubMedClient {
    async fn search_ids(&self, params: &SearchParams) -> anyhow::Result<Vec<String>> {
        self.esearch(params).await
    }

    async fn fetch_record(&self, pmid: &str) -> anyhow::Result<Vec<Record>> {
        let xml = self.efetch(pmid).await?;
        Ok(parse_pubmed_xml(&xml)?)
    }
}

/// `datetype=pdat` range parameters. E-utilities needs both bounds, so a
/// missing one is widened to the earliest date or today.
fn date_range_params(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<(&'static str, String)> {
    if start.is_none() && end.is_none() {
        return vec![];
    }
    let fmt = |d: NaiveDate| d.format("%Y/%m/%d").to_string();
    let min = start.map(fmt).unwrap_or_else(|| EARLIEST_MINDATE.to_string());
    let max = fmt(end.unwrap_or_else(|| Utc::now().date_naive()));
    vec![
        ("datetype", "pdat".to_string()),
        ("mindate", min),
        ("maxdate", max),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Capture {
    Title,
    Abstract,
    PubYear,
    CompletedYear,
}

#[derive(Default)]
struct ArticleFields {
    title: Option<String>,
    abstract_text: Option<String>,
    pub_year: Option<String>,
    completed_year: Option<String>,
}

impl ArticleFields {
    fn slot(&mut self, capture: Capture) -> &mut Option<String> {
        match capture {
            Capture::Title => &mut self.title,
            Capture::Abstract => &mut self.abstract_text,
            Capture::PubYear => &mut self.pub_year,
            Capture::CompletedYear => &mut self.completed_year,
        }
    }

    fn into_record(self) -> Record {
        let date = self.pub_year.or(self.completed_year);
        Record::new(self.title, self.abstract_text, date)
    }
}

/// Parse PubMed efetch XML into records.
///
/// For each `<PubmedArticle>` the first `ArticleTitle` and first
/// `AbstractText` are taken (inline markup is flattened to text). The year
/// comes from `PubDate/Year`, falling back to `DateCompleted/Year`.
pub fn parse_pubmed_xml(xml: &str) -> Result<Vec<Record>, EpiwatchError> {
    let mut records = Vec::new();
    let mut reader = Reader::from_str(xml);

    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<ArticleFields> = None;
    // Active capture and the path depth it started at.
    let mut capture: Option<(Capture, usize)> = None;
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.name().as_ref().to_vec();
                let parent = path.last().map(Vec::as_slice);

                if name == b"PubmedArticle" {
                    current = Some(ArticleFields::default());
                } else if let (Some(article), None) = (current.as_mut(), capture) {
                    let wanted = match (name.as_slice(), parent) {
                        (b"ArticleTitle", _) => Some(Capture::Title),
                        (b"AbstractText", _) => Some(Capture::Abstract),
                        (b"Year", Some(b"PubDate")) => Some(Capture::PubYear),
                        (b"Year", Some(b"DateCompleted")) => Some(Capture::CompletedYear),
                        _ => None,
                    };
                    if let Some(c) = wanted.filter(|c| article.slot(*c).is_none()) {
                        capture = Some((c, path.len() + 1));
                        text.clear();
                    }
                }
                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                if capture.is_some() {
                    let unescaped = e
                        .unescape()
                        .map_err(|err| EpiwatchError::Xml(err.to_string()))?;
                    text.push_str(&unescaped);
                }
            }
            Ok(Event::CData(ref e)) => {
                if capture.is_some() {
                    text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::End(ref e)) => {
                if let Some((c, depth)) = capture {
                    if depth == path.len() {
                        if let Some(article) = current.as_mut() {
                            let value = text.trim();
                            if !value.is_empty() {
                                *article.slot(c) = Some(value.to_string());
                            }
                        }
                        capture = None;
                    }
                }
                if e.name().as_ref() == b"PubmedArticle" {
                    if let Some(article) = current.take() {
                        records.push(article.into_record());
                    }
                }
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(EpiwatchError::Xml(format!(
                    "PubMed XML parse error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_minimal_pubmed_xml() {
        let xml = r#"<?xml version="1.0"?>
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation>
      <PMID>12345678</PMID>
      <DateCompleted><Year>2020</Year><Month>01</Month></DateCompleted>
      <Article>
        <Journal>
          <JournalIssue><PubDate><Year>2019</Year><Month>Dec</Month></PubDate></JournalIssue>
          <Title>Tropical Medicine</Title>
        </Journal>
        <ArticleTitle>Dengue fever in India</ArticleTitle>
        <Abstract><AbstractText>Patients presented with fever &amp; rash.</AbstractText></Abstract>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

        let records = parse_pubmed_xml(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title.as_deref(), Some("Dengue fever in India"));
        assert_eq!(
            records[0].abstract_str(),
            Some("Patients presented with fever & rash.")
        );
        assert_eq!(records[0].date.as_deref(), Some("2019"));
    }

    #[test]
    fn test_year_falls_back_to_date_completed() {
        let xml = r#"<PubmedArticleSet><PubmedArticle><MedlineCitation>
            <DateCompleted><Year>2018</Year></DateCompleted>
            <Article>
              <Journal><JournalIssue><PubDate><MedlineDate>2017 Winter</MedlineDate></PubDate></JournalIssue></Journal>
              <ArticleTitle>Cholera</ArticleTitle>
            </Article>
        </MedlineCitation></PubmedArticle></PubmedArticleSet>"#;

        let records = parse_pubmed_xml(xml).unwrap();
        assert_eq!(records[0].date.as_deref(), Some("2018"));
        assert_eq!(records[0].abstract_str(), None);
    }

    #[test]
    fn test_first_abstract_section_with_inline_markup() {
        let xml = r#"<PubmedArticleSet><PubmedArticle><MedlineCitation><Article>
            <ArticleTitle>Zika</ArticleTitle>
            <Abstract>
              <AbstractText Label="BACKGROUND">Cases of <i>zika</i> and fever in Brazil.</AbstractText>
              <AbstractText Label="METHODS">Second section.</AbstractText>
            </Abstract>
        </Article></MedlineCitation></PubmedArticle></PubmedArticleSet>"#;

        let records = parse_pubmed_xml(xml).unwrap();
        assert_eq!(
            records[0].abstract_str(),
            Some("Cases of zika and fever in Brazil.")
        );
    }

    #[test]
    fn test_no_articles_yields_empty() {
        let records = parse_pubmed_xml("<PubmedArticleSet></PubmedArticleSet>").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_malformed_xml_is_error() {
        let err = parse_pubmed_xml("<PubmedArticleSet><PubmedArticle></Wrong>").unwrap_err();
        assert!(matches!(err, EpiwatchError::Xml(_)));
    }

    #[test]
    fn test_date_range_params() {
        assert!(date_range_params(None, None).is_empty());

        let start = NaiveDate::from_ymd_opt(2020, 1, 2);
        let end = NaiveDate::from_ymd_opt(2021, 3, 4);
        let params = date_range_params(start, end);
        assert_eq!(params[0], ("datetype", "pdat".to_string()));
        assert_eq!(params[1], ("mindate", "2020/01/02".to_string()));
        assert_eq!(params[2], ("maxdate", "2021/03/04".to_string()));

        let params = date_range_params(None, end);
        assert_eq!(params[1].1, EARLIEST_MINDATE);
    }
}
