mod cli {
    #![allow(non_snake_case)]

    use assert_cmd::prelude::*;
    use mockito::{Mock, Server, ServerGuard};
    use predicates::str::contains;

    use std::path::Path;
    use std::process::Command;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    const NAME: &str = "cpdb-refcheck";

    fn command() -> Result<Command, Box<dyn std::error::Error>> {
        let mut cmd = Command::cargo_bin(NAME)?;
        cmd.arg("--no-config")
            .env_remove("CPDB_SHEETS_TOKEN")
            .env_remove("RUST_LOG");
        Ok(cmd)
    }

    /// Server answering `/<status>` with that status. Mocks live as long as
    /// the returned handles.
    async fn reference_server() -> (ServerGuard, Vec<Mock>) {
        let mut server = Server::new_async().await;
        let mut mocks = Vec::new();
        for status in [200, 401, 404, 500] {
            let mock = server
                .mock("GET", format!("/{status}").as_str())
                .with_status(status)
                .create_async()
                .await;
            mocks.push(mock);
        }
        (server, mocks)
    }

    fn write_input(dir: &Path, contents: &str) -> std::io::Result<std::path::PathBuf> {
        let path = dir.join("policies.csv");
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    #[test]
    fn test_help__lists_input_and_output_flags() -> TestResult {
        let mut cmd = Command::cargo_bin(NAME)?;
        cmd.arg("--help");

        cmd.assert()
            .success()
            .stdout(contains("--input_csv"))
            .stdout(contains("--output_csv"));
        Ok(())
    }

    #[test]
    fn test_output__when_reference_column_missing() -> TestResult {
        let dir = TempDir::new()?;
        let input = write_input(dir.path(), "id,title\n1,Carbon tax\n")?;
        let output = dir.path().join("flagged.csv");
        let mut cmd = command()?;

        cmd.arg("--input_csv").arg(&input).arg("--output_csv").arg(&output);

        cmd.assert()
            .failure()
            .stderr(contains("Missing column"))
            .stderr(contains("Found columns: id, title"));
        assert!(!output.exists());
        Ok(())
    }

    #[test]
    fn test_output__when_input_file_missing() -> TestResult {
        let dir = TempDir::new()?;
        let mut cmd = command()?;

        cmd.arg("-i")
            .arg(dir.path().join("nope.csv"))
            .arg("-o")
            .arg(dir.path().join("out.csv"));

        cmd.assert().failure().stderr(contains("Error: IO error"));
        Ok(())
    }

    #[test]
    fn test_output__when_no_destination_configured() -> TestResult {
        let dir = TempDir::new()?;
        let input = write_input(dir.path(), "id,reference\n1,\n")?;
        let mut cmd = command()?;

        cmd.arg("-i").arg(&input);

        cmd.assert()
            .failure()
            .stderr(contains("No spreadsheet configured"));
        Ok(())
    }

    #[test]
    fn test_output__when_row_timeout_not_above_url_timeout() -> TestResult {
        let dir = TempDir::new()?;
        let input = write_input(dir.path(), "id,reference\n1,\n")?;
        let mut cmd = command()?;

        cmd.arg("-i")
            .arg(&input)
            .arg("-o")
            .arg(dir.path().join("out.csv"))
            .args(["--row-timeout", "2", "--url-timeout", "5"]);

        cmd.assert()
            .failure()
            .stderr(contains("row_timeout (2s) must be greater than url_timeout (5s)"));
        Ok(())
    }

    #[tokio::test]
    async fn test_output__writes_only_flagged_rows() -> TestResult {
        let (server, _mocks) = reference_server().await;
        let url = server.url();
        let dir = TempDir::new()?;
        let input = write_input(
            dir.path(),
            &format!(
                "id,reference,title\n\
                 1,{url}/200,Ok\n\
                 2,{url}/404,Missing\n\
                 3,{url}/401,Login\n\
                 4,,Empty\n\
                 5,not a url,Bad\n\
                 6,http://www.climatechange.gov.au,Ignored\n\
                 7,\"{url}/200\n{url}/500\",Mixed\n"
            ),
        )?;
        let output = dir.path().join("flagged.csv");
        let mut cmd = command()?;

        cmd.arg("--input_csv").arg(&input).arg("--output_csv").arg(&output);

        cmd.assert()
            .success()
            .stdout(contains("4 of 7 row(s) flagged"));
        let written = std::fs::read_to_string(&output)?;
        assert_eq!(
            written,
            format!(
                "id,reference,title\n\
                 2,{url}/404,Missing\n\
                 4,,Empty\n\
                 5,not a url,Bad\n\
                 7,\"{url}/200\n{url}/500\",Mixed\n"
            )
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_output__ignore_empty_and_extra_ignored_url() -> TestResult {
        let (server, _mocks) = reference_server().await;
        let url = server.url();
        let dir = TempDir::new()?;
        let input = write_input(
            dir.path(),
            &format!(
                "id,reference\n\
                 1,\n\
                 2,{url}/404\n\
                 3,not a url\n"
            ),
        )?;
        let output = dir.path().join("flagged.csv");
        let mut cmd = command()?;

        cmd.arg("-i")
            .arg(&input)
            .arg("-o")
            .arg(&output)
            .arg("--ignore-empty")
            .arg("--ignore-url")
            .arg(format!("{url}/404"));

        cmd.assert().success();
        assert_eq!(
            std::fs::read_to_string(&output)?,
            "id,reference\n3,not a url\n"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_output__quiet_prints_nothing() -> TestResult {
        let (server, _mocks) = reference_server().await;
        let dir = TempDir::new()?;
        let input = write_input(dir.path(), &format!("id,reference\n1,{}/200\n", server.url()))?;
        let output = dir.path().join("flagged.csv");
        let mut cmd = command()?;

        cmd.arg("-i").arg(&input).arg("-o").arg(&output).arg("--quiet");

        cmd.assert().success().stdout("");
        assert_eq!(std::fs::read_to_string(&output)?, "id,reference\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_output__fetches_policies_from_api() -> TestResult {
        let mut server = Server::new_async().await;
        let _refs = server
            .mock("GET", "/404")
            .with_status(404)
            .create_async()
            .await;
        let body = format!(
            r#"[{{"policy_id": 1, "reference": "{0}/404"}}, {{"policy_id": 2, "reference": null}}]"#,
            server.url()
        );
        let _api = server
            .mock("GET", "/api/v1/climate-policies")
            .match_query(mockito::Matcher::UrlEncoded("country_iso".into(), "DEU".into()))
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;
        let dir = TempDir::new()?;
        let output = dir.path().join("flagged.csv");
        let mut cmd = command()?;

        cmd.arg("--api-url")
            .arg(server.url() + "/api/v1/climate-policies")
            .args(["--country", "DEU", "--ignore-empty"])
            .arg("-o")
            .arg(&output);

        cmd.assert().success();
        assert_eq!(
            std::fs::read_to_string(&output)?,
            format!("policy_id,reference\n1,{}/404\n", server.url())
        );
        Ok(())
    }
}
