use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde_json::{Value, json};

use crate::config::Config;
use crate::core::constants::{sheets, timeouts};
use crate::core::{CpdbError, Dataset, Result};
use crate::sink::{InputShape, ResultSink};

/// Writes flagged rows to a worksheet named after today's date.
///
/// An existing worksheet with that name is cleared first; otherwise one is
/// created with room for every input row plus a margin.
#[derive(Debug, Clone)]
pub struct SheetsSink {
    client: reqwest::Client,
    api_url: String,
    spreadsheet_id: String,
    token: String,
    worksheet_title: String,
}

impl SheetsSink {
    pub fn new(
        api_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts::SHEETS_TIMEOUT_SECONDS))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            spreadsheet_id: spreadsheet_id.into(),
            token: token.into(),
            worksheet_title: today_title(),
        })
    }

    /// Sink for the spreadsheet named in the `[sheets]` section.
    pub fn from_config(config: &Config) -> Result<Self> {
        let spreadsheet_id = config.sheets.spreadsheet_id.as_deref().ok_or_else(|| {
            CpdbError::Config(
                "No spreadsheet configured. Pass --output_csv or set sheets.spreadsheet_id."
                    .to_string(),
            )
        })?;
        let token = config.sheets.token.as_deref().ok_or_else(|| {
            CpdbError::Config(format!(
                "No spreadsheet access token. Set {} or sheets.token.",
                sheets::TOKEN_ENV
            ))
        })?;

        Self::new(config.sheets_api_url(), spreadsheet_id, token)
    }

    pub fn with_worksheet_title(mut self, title: impl Into<String>) -> Self {
        self.worksheet_title = title.into();
        self
    }

    pub fn worksheet_title(&self) -> &str {
        &self.worksheet_title
    }

    /// A1 range covering every cell of the worksheet.
    fn sheet_range(&self) -> String {
        format!("'{}'", self.worksheet_title.replace('\'', "''"))
    }

    /// A1 range anchoring the worksheet's top-left cell.
    fn anchor_range(&self) -> String {
        format!("{}!A1", self.sheet_range())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| CpdbError::Config(format!("Sheets API URL '{}' is invalid: {e}", self.api_url)))?;
        url.path_segments_mut()
            .map_err(|_| CpdbError::Config(format!("Sheets API URL '{}' cannot be a base", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn call(&self, method: Method, url: Url, body: Option<Value>, action: &str) -> Result<Value> {
        log::debug!("Sheets {action}: {method} {url}");
        let mut request = self.client.request(method, url).bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CpdbError::Sheets(format!("{action} failed with {status}: {detail}")));
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn worksheet_titles(&self) -> Result<Vec<String>> {
        let mut url = self.endpoint(&[self.spreadsheet_id.as_str()])?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties.title");

        let body = self.call(Method::GET, url, None, "listing worksheets").await?;
        let titles = body["sheets"]
            .as_array()
            .map(|sheets| {
                sheets
                    .iter()
                    .filter_map(|sheet| sheet["properties"]["title"].as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(titles)
    }

    async fn add_worksheet(&self, rows: usize, columns: usize) -> Result<()> {
        let url = self.endpoint(&[format!("{}:batchUpdate", self.spreadsheet_id).as_str()])?;
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": self.worksheet_title,
                        "gridProperties": {"rowCount": rows, "columnCount": columns}
                    }
                }
            }]
        });
        self.call(Method::POST, url, Some(body), "creating worksheet").await?;
        Ok(())
    }

    fn clear_endpoint(&self) -> Result<Url> {
        let range = self.sheet_range();
        self.endpoint(&[self.spreadsheet_id.as_str(), "values", format!("{range}:clear").as_str()])
    }

    async fn clear_worksheet(&self) -> Result<()> {
        let url = self.clear_endpoint()?;
        self.call(Method::POST, url, Some(json!({})), "clearing worksheet").await?;
        Ok(())
    }

    async fn update_values(&self, rows: Vec<Vec<String>>) -> Result<()> {
        let range = self.anchor_range();
        let mut url = self.endpoint(&[self.spreadsheet_id.as_str(), "values", range.as_str()])?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows,
        });
        self.call(Method::PUT, url, Some(body), "writing rows").await?;
        Ok(())
    }
}

#[async_trait]
impl ResultSink for SheetsSink {
    async fn write(&self, flagged: &Dataset, input: InputShape) -> Result<()> {
        let exists = self
            .worksheet_titles()
            .await?
            .iter()
            .any(|title| *title == self.worksheet_title);

        if exists {
            log::info!("Clearing existing worksheet '{}'", self.worksheet_title);
            self.clear_worksheet().await?;
        } else {
            log::info!("Creating worksheet '{}'", self.worksheet_title);
            self.add_worksheet(input.rows + sheets::EXTRA_ROWS, input.columns.max(1))
                .await?;
        }

        self.update_values(flagged.to_rows_with_header()).await?;
        log::info!(
            "Wrote {} flagged row(s) to worksheet '{}'",
            flagged.len(),
            self.worksheet_title
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("worksheet '{}' of spreadsheet {}", self.worksheet_title, self.spreadsheet_id)
    }
}

fn today_title() -> String {
    chrono::Local::now().format(sheets::WORKSHEET_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SheetsConfig;
    use mockito::{Matcher, Server, ServerGuard};

    const SHEET: &str = "sheet-123";

    fn flagged() -> Dataset {
        let mut dataset = Dataset::new(["policy_id", "reference"]);
        dataset.push(["3", "not a url"]).unwrap();
        dataset
    }

    fn sink(server: &ServerGuard) -> SheetsSink {
        SheetsSink::new(server.url() + "/v4/spreadsheets", SHEET, "token-abc")
            .unwrap()
            .with_worksheet_title("2024-05-01")
    }

    fn values_body() -> Matcher {
        Matcher::PartialJson(json!({
            "majorDimension": "ROWS",
            "values": [["policy_id", "reference"], ["3", "not a url"]]
        }))
    }

    #[test]
    fn test_default_title_is_today() {
        let sink = SheetsSink::new(sheets::DEFAULT_API_URL, SHEET, "t").unwrap();
        let expected = chrono::Local::now().format("%Y-%m-%d").to_string();
        assert_eq!(sink.worksheet_title(), expected);
    }

    #[test]
    fn test_from_config_requires_spreadsheet_and_token() {
        let mut config = Config::default();
        assert!(matches!(SheetsSink::from_config(&config), Err(CpdbError::Config(_))));

        config.sheets = SheetsConfig {
            spreadsheet_id: Some(SHEET.to_string()),
            ..Default::default()
        };
        assert!(matches!(SheetsSink::from_config(&config), Err(CpdbError::Config(_))));

        config.sheets.token = Some("t".to_string());
        assert!(SheetsSink::from_config(&config).is_ok());
    }

    #[test]
    fn test_anchor_range_escapes_quotes() {
        let sink = SheetsSink::new(sheets::DEFAULT_API_URL, SHEET, "t")
            .unwrap()
            .with_worksheet_title("it's");
        assert_eq!(sink.anchor_range(), "'it''s'!A1");
    }

    #[test]
    fn test_clear_covers_whole_worksheet() -> Result<()> {
        let sink = SheetsSink::new("http://x/v4/spreadsheets", "id", "t")?.with_worksheet_title("2024-05-01");

        assert_eq!(sink.sheet_range(), "'2024-05-01'");
        assert_eq!(
            sink.clear_endpoint()?.as_str(),
            "http://x/v4/spreadsheets/id/values/'2024-05-01':clear"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_write_creates_missing_worksheet() -> Result<()> {
        let mut server = Server::new_async().await;
        let list = server
            .mock("GET", "/v4/spreadsheets/sheet-123")
            .match_query(Matcher::UrlEncoded("fields".into(), "sheets.properties.title".into()))
            .match_header("authorization", "Bearer token-abc")
            .with_status(200)
            .with_body(r#"{"sheets": [{"properties": {"title": "2024-04-30"}}]}"#)
            .create_async()
            .await;
        let add = server
            .mock("POST", "/v4/spreadsheets/sheet-123:batchUpdate")
            .match_body(Matcher::PartialJson(json!({
                "requests": [{"addSheet": {"properties": {
                    "title": "2024-05-01",
                    "gridProperties": {"rowCount": 15, "columnCount": 2}
                }}}]
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let clear = server
            .mock("POST", Matcher::Regex(":clear".into()))
            .expect(0)
            .create_async()
            .await;
        let update = server
            .mock("PUT", Matcher::Regex(r"^/v4/spreadsheets/sheet-123/values/.*2024-05-01.*A1".into()))
            .match_query(Matcher::UrlEncoded("valueInputOption".into(), "RAW".into()))
            .match_body(values_body())
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        sink(&server).write(&flagged(), InputShape { rows: 5, columns: 2 }).await?;

        list.assert_async().await;
        add.assert_async().await;
        clear.assert_async().await;
        update.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_write_clears_existing_worksheet() -> Result<()> {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/v4/spreadsheets/sheet-123")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"sheets": [{"properties": {"title": "2024-05-01"}}]}"#)
            .create_async()
            .await;
        let add = server
            .mock("POST", "/v4/spreadsheets/sheet-123:batchUpdate")
            .expect(0)
            .create_async()
            .await;
        let clear = server
            .mock("POST", "/v4/spreadsheets/sheet-123/values/'2024-05-01':clear")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let update = server
            .mock("PUT", Matcher::Regex("/values/".into()))
            .match_query(Matcher::Any)
            .match_body(values_body())
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        sink(&server).write(&flagged(), InputShape { rows: 5, columns: 2 }).await?;

        add.assert_async().await;
        clear.assert_async().await;
        update.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_write_surfaces_api_errors() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/v4/spreadsheets/sheet-123")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error": {"message": "The caller does not have permission"}}"#)
            .create_async()
            .await;

        let result = sink(&server)
            .write(&flagged(), InputShape { rows: 1, columns: 2 })
            .await;

        match result {
            Err(CpdbError::Sheets(msg)) => {
                assert!(msg.contains("403"));
                assert!(msg.contains("does not have permission"));
            }
            other => panic!("Expected Sheets error, got {other:?}"),
        }
    }
}
