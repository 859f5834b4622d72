//! Integration tests for the Jenkins gateway

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Binary with an isolated config file and no Jenkins settings from the host
    fn gateway(config_dir: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("jenkins-gateway");
        cmd.env("JENKINS_GATEWAY_CONFIG", config_dir.path().join("config.toml"))
            .env_remove("JENKINS_URL")
            .env_remove("JENKINS_USER")
            .env_remove("JENKINS_API_TOKEN");
        cmd
    }

    /// Points at a closed local port; only usable for commands that fail before I/O
    fn unreachable_gateway(config_dir: &TempDir) -> Command {
        let mut cmd = gateway(config_dir);
        cmd.env("JENKINS_URL", "http://127.0.0.1:9");
        cmd
    }

    #[test]
    fn help_displays() {
        let dir = TempDir::new().unwrap();
        gateway(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("browse, inspect and drive Jenkins jobs"));
    }

    #[test]
    fn version_displays() {
        let dir = TempDir::new().unwrap();
        gateway(&dir)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("jenkins-gateway"));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        gateway(&dir)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_redacts_token() {
        let dir = TempDir::new().unwrap();
        gateway(&dir)
            .env("JENKINS_API_TOKEN", "very-secret-token")
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[jenkins]"))
            .stdout(predicate::str::contains("********"))
            .stdout(predicate::str::contains("very-secret-token").not());
    }

    #[test]
    fn config_set_then_show() {
        let dir = TempDir::new().unwrap();
        gateway(&dir)
            .args(["config", "set", "cache.status_ttl_secs", "3"])
            .assert()
            .success();
        gateway(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("status_ttl_secs = 3"));
    }

    #[test]
    fn config_set_unknown_key() {
        let dir = TempDir::new().unwrap();
        gateway(&dir)
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn jobs_without_server_fails_with_hint() {
        let dir = TempDir::new().unwrap();
        gateway(&dir)
            .arg("jobs")
            .assert()
            .failure()
            .stderr(predicate::str::contains("not configured"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn invalid_build_identifier_fails_before_any_request() {
        let dir = TempDir::new().unwrap();
        unreachable_gateway(&dir)
            .args(["status", "team/app", "yesterday"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid build identifier 'yesterday'"));
    }

    #[test]
    fn malformed_job_path_is_rejected() {
        let dir = TempDir::new().unwrap();
        unreachable_gateway(&dir)
            .args(["builds", "team//app"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("empty segment"));
    }

    #[test]
    fn delete_without_yes_does_nothing_when_not_interactive() {
        let dir = TempDir::new().unwrap();
        unreachable_gateway(&dir)
            .args(["delete", "team/app"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Pass --yes"));
    }

    #[test]
    fn trigger_rejects_malformed_param() {
        let dir = TempDir::new().unwrap();
        gateway(&dir)
            .args(["trigger", "app", "-p", "NOVALUE"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("KEY=VALUE"));
    }

    #[test]
    fn create_needs_config_file_or_folder() {
        let dir = TempDir::new().unwrap();
        gateway(&dir).args(["create", "app"]).assert().failure();
    }

    #[test]
    fn completions_generate() {
        let dir = TempDir::new().unwrap();
        gateway(&dir)
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("jenkins-gateway"));
    }
}

mod gateway_tests {
    use async_trait::async_trait;
    use jenkins_gateway::audit::AuditLog;
    use jenkins_gateway::build_ref::{BuildOrigin, SymbolicBuild};
    use jenkins_gateway::cache::Source;
    use jenkins_gateway::config::Config;
    use jenkins_gateway::error::{ErrorKind, GatewayError, GatewayResult};
    use jenkins_gateway::logs::OverallGuess;
    use jenkins_gateway::remote::{
        BuildMetadata, BuildPointer, Catalog, CatalogItem, JobMetadata, QueueItem, RemoteClient,
    };
    use jenkins_gateway::Gateway;
    use parking_lot::Mutex;
    use std::collections::{BTreeMap, HashMap};
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    const FOLDER: &str = "com.cloudbees.hudson.plugins.folder.Folder";
    const JOB: &str = "hudson.model.FreeStyleProject";

    /// In-memory Jenkins with call counters and injectable transient failures
    #[derive(Default)]
    struct FakeJenkins {
        items: Mutex<Vec<CatalogItem>>,
        jobs: Mutex<HashMap<String, JobMetadata>>,
        builds: Mutex<HashMap<(String, u64), BuildMetadata>>,
        consoles: Mutex<HashMap<(String, u64), String>>,
        calls: Mutex<HashMap<&'static str, u32>>,
        failures: Mutex<HashMap<&'static str, u32>>,
        created: Mutex<Vec<(String, String)>>,
        triggered: Mutex<Vec<(String, BTreeMap<String, String>)>>,
    }

    impl FakeJenkins {
        fn scenario() -> Self {
            let fake = Self::default();
            fake.add_item("root-job", JOB);
            fake.add_item("folder-a", FOLDER);
            fake.add_item("folder-a/child-job", JOB);
            fake.add_item("folder-a/sub", FOLDER);
            fake.add_item("folder-a/sub/deep-job", JOB);

            fake.add_job("root-job", true, &[1, 2, 3], Some(3), Some(2));
            fake.add_job("folder-a/child-job", true, &[17], Some(17), None);
            fake.add_job("folder-a/sub/deep-job", false, &[], None, None);

            fake.consoles.lock().insert(
                ("root-job".to_string(), 3),
                "Started by user admin\nline1\nERROR: bad\nFinished: FAILURE\n".to_string(),
            );
            fake
        }

        fn add_item(&self, path: &str, kind: &str) {
            let item = CatalogItem::new(path, format!("https://ci.test/job/{}/", path), kind).unwrap();
            self.items.lock().push(item);
        }

        fn add_job(
            &self,
            path: &str,
            buildable: bool,
            numbers: &[u64],
            last: Option<u64>,
            last_success: Option<u64>,
        ) {
            let pointer = |n: u64| BuildPointer {
                number: Some(n),
                url: Some(format!("https://ci.test/job/{}/{}/", path, n)),
            };
            let job = JobMetadata {
                full_name: Some(path.to_string()),
                buildable,
                builds: numbers.iter().rev().map(|&n| pointer(n)).collect(),
                last_build: last.map(pointer),
                last_completed_build: last.map(pointer),
                last_successful_build: last_success.map(pointer),
                ..Default::default()
            };
            self.jobs.lock().insert(path.to_string(), job);

            for &number in numbers {
                let build = BuildMetadata {
                    number,
                    url: format!("https://ci.test/job/{}/{}/", path, number),
                    result: Some(if number % 2 == 0 { "SUCCESS" } else { "FAILURE" }.to_string()),
                    timestamp: 1_700_000_000_000 + number as i64,
                    duration: 1000 * number,
                    ..Default::default()
                };
                self.builds.lock().insert((path.to_string(), number), build);
            }
        }

        fn fail_next(&self, method: &'static str, times: u32) {
            self.failures.lock().insert(method, times);
        }

        fn calls(&self, method: &str) -> u32 {
            self.calls.lock().get(method).copied().unwrap_or(0)
        }

        fn enter(&self, method: &'static str) -> GatewayResult<()> {
            *self.calls.lock().entry(method).or_default() += 1;
            let mut failures = self.failures.lock();
            match failures.get_mut(method) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    Err(GatewayError::transient(method, "503 Service Unavailable"))
                }
                _ => Ok(()),
            }
        }
    }

    #[async_trait]
    impl RemoteClient for FakeJenkins {
        async fn fetch_full_catalog(&self) -> GatewayResult<Catalog> {
            self.enter("catalog")?;
            Ok(Catalog::from_items(self.items.lock().clone()))
        }

        async fn fetch_job_metadata(&self, job_path: &str) -> GatewayResult<JobMetadata> {
            self.enter("job")?;
            self.jobs
                .lock()
                .get(job_path)
                .cloned()
                .ok_or_else(|| GatewayError::NotFound(format!("job '{}'", job_path)))
        }

        async fn fetch_build_metadata(
            &self,
            job_path: &str,
            number: u64,
        ) -> GatewayResult<BuildMetadata> {
            self.enter("build")?;
            self.builds
                .lock()
                .get(&(job_path.to_string(), number))
                .cloned()
                .ok_or_else(|| GatewayError::NotFound(format!("build {} #{}", job_path, number)))
        }

        async fn fetch_console_text(&self, job_path: &str, number: u64) -> GatewayResult<String> {
            self.enter("console")?;
            self.consoles
                .lock()
                .get(&(job_path.to_string(), number))
                .cloned()
                .ok_or_else(|| GatewayError::NotFound(format!("console {} #{}", job_path, number)))
        }

        async fn trigger_build(
            &self,
            job_path: &str,
            parameters: &BTreeMap<String, String>,
        ) -> GatewayResult<QueueItem> {
            self.enter("trigger")?;
            let mut triggered = self.triggered.lock();
            triggered.push((job_path.to_string(), parameters.clone()));
            Ok(QueueItem::from_location(Some(&format!(
                "https://ci.test/queue/item/{}/",
                100 + triggered.len()
            ))))
        }

        async fn create_job(&self, job_path: &str, config_xml: &str) -> GatewayResult<()> {
            self.enter("create")?;
            let kind = if config_xml.contains(FOLDER) { FOLDER } else { JOB };
            self.add_item(job_path, kind);
            self.created
                .lock()
                .push((job_path.to_string(), config_xml.to_string()));
            Ok(())
        }

        async fn delete_job(&self, job_path: &str) -> GatewayResult<()> {
            self.enter("delete")?;
            let nested = format!("{}/", job_path);
            let mut items = self.items.lock();
            let before = items.len();
            items.retain(|i| i.full_path != job_path && !i.full_path.starts_with(&nested));
            if items.len() == before {
                return Err(GatewayError::NotFound(format!("job '{}'", job_path)));
            }
            Ok(())
        }

        async fn job_exists(&self, job_path: &str) -> GatewayResult<bool> {
            self.enter("exists")?;
            Ok(self.items.lock().iter().any(|i| i.full_path == job_path))
        }

        async fn whoami(&self) -> GatewayResult<String> {
            self.enter("whoami")?;
            Ok("admin".to_string())
        }

        fn console_url(&self, job_path: &str, number: u64) -> String {
            format!("https://ci.test/job/{}/{}/consoleText", job_path, number)
        }
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.general.audit_log = false;
        config.retry.min_delay_ms = 1;
        config.retry.max_delay_ms = 5;
        config.rate_limit.enabled = false;
        config
    }

    fn setup() -> (Arc<FakeJenkins>, Gateway) {
        setup_with(test_config())
    }

    fn setup_with(config: Config) -> (Arc<FakeJenkins>, Gateway) {
        let fake = Arc::new(FakeJenkins::scenario());
        let gateway = Gateway::new(fake.clone(), &config);
        (fake, gateway)
    }

    fn paths(items: &[CatalogItem]) -> Vec<&str> {
        items.iter().map(|i| i.full_path.as_str()).collect()
    }

    #[tokio::test]
    async fn root_listing_is_cached() {
        let (fake, gateway) = setup();

        let first = gateway.list_jobs(None, false).await.unwrap();
        assert_eq!(paths(&first.value), vec!["root-job", "folder-a"]);
        assert_eq!(first.source, Source::Remote);

        let second = gateway.list_jobs(None, false).await.unwrap();
        assert_eq!(second.value, first.value);
        assert_eq!(second.source, Source::Cache);
        assert_eq!(fake.calls("catalog"), 1);
    }

    #[tokio::test]
    async fn recursive_folder_listing() {
        let (_, gateway) = setup();
        let listing = gateway.list_jobs(Some("folder-a"), true).await.unwrap();
        assert_eq!(
            paths(&listing.value),
            vec!["folder-a/child-job", "folder-a/sub", "folder-a/sub/deep-job"]
        );
    }

    #[tokio::test]
    async fn listing_keys_cover_every_input() {
        let (fake, gateway) = setup();
        gateway.list_jobs(Some("folder-a"), false).await.unwrap();
        gateway.list_jobs(Some("folder-a"), true).await.unwrap();
        gateway.list_jobs(Some("/folder-a/"), true).await.unwrap();
        // Normalized prefix shares the entry; the recursive flag does not
        assert_eq!(fake.calls("catalog"), 2);
    }

    #[tokio::test]
    async fn keyword_resolves_through_job_metadata() {
        let (fake, gateway) = setup();

        let status = gateway
            .get_build_status("folder-a/child-job", "lastBuild")
            .await
            .unwrap();
        assert_eq!(status.value.build.number, 17);
        assert_eq!(status.value.origin, BuildOrigin::Keyword(SymbolicBuild::LastBuild));
        assert_eq!(fake.calls("job"), 1);

        let again = gateway
            .get_build_status("folder-a/child-job", "lastBuild")
            .await
            .unwrap();
        assert_eq!(again.source, Source::Cache);
        assert_eq!(fake.calls("job"), 1);
        assert_eq!(fake.calls("build"), 1);
    }

    #[tokio::test]
    async fn numeric_token_skips_job_metadata() {
        let (fake, gateway) = setup();
        let status = gateway.get_build_status("root-job", "2").await.unwrap();
        assert_eq!(status.value.build.result.as_deref(), Some("SUCCESS"));
        assert_eq!(status.value.origin, BuildOrigin::Literal);
        assert_eq!(fake.calls("job"), 0);
    }

    #[tokio::test]
    async fn invalid_token_makes_no_remote_call() {
        let (fake, gateway) = setup();
        let err = gateway
            .get_build_status("root-job", "last-build-please")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIdentifierFormat);
        assert_eq!(err.http_status(), 400);
        assert_eq!(fake.calls("job") + fake.calls("build"), 0);
    }

    #[tokio::test]
    async fn missing_pointer_is_unresolvable() {
        let (_, gateway) = setup();
        let err = gateway
            .get_build_status("folder-a/child-job", "lastSuccessfulBuild")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnresolvableIdentifier);
    }

    #[tokio::test]
    async fn missing_job_is_not_retried() {
        let (fake, gateway) = setup();
        let err = gateway.get_build_status("nope", "lastBuild").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(fake.calls("job"), 1);
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let (fake, gateway) = setup();
        fake.fail_next("catalog", 2);

        let listing = gateway.list_jobs(None, true).await.unwrap();
        assert_eq!(listing.value.len(), 5);
        assert_eq!(fake.calls("catalog"), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_are_distinguishable() {
        let (fake, gateway) = setup();
        fake.fail_next("catalog", 10);

        let err = gateway.list_jobs(None, false).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RetriesExhausted);
        assert_eq!(err.http_status(), 503);
        assert_eq!(fake.calls("catalog"), 3);

        // Failures are not cached
        fake.fail_next("catalog", 0);
        let listing = gateway.list_jobs(None, false).await.unwrap();
        assert_eq!(listing.source, Source::Remote);
    }

    #[tokio::test]
    async fn builds_are_newest_first_and_bounded() {
        let mut config = test_config();
        config.gateway.max_builds = 2;
        let (fake, gateway) = setup_with(config);

        let builds = gateway.list_builds("root-job").await.unwrap();
        let numbers: Vec<u64> = builds.value.iter().map(|b| b.number).collect();
        assert_eq!(numbers, vec![3, 2]);
        assert_eq!(fake.calls("build"), 2);

        let cached = gateway.list_builds("/root-job").await.unwrap();
        assert_eq!(cached.source, Source::Cache);
    }

    #[tokio::test]
    async fn vanished_builds_are_skipped() {
        let (fake, gateway) = setup();
        fake.builds.lock().remove(&("root-job".to_string(), 2));

        let builds = gateway.list_builds("root-job").await.unwrap();
        let numbers: Vec<u64> = builds.value.iter().map(|b| b.number).collect();
        assert_eq!(numbers, vec![3, 1]);
    }

    #[tokio::test]
    async fn log_digest_summarizes_console() {
        let (_, gateway) = setup();
        let digest = gateway.get_build_log("root-job", "latest").await.unwrap();

        assert_eq!(digest.number, 3);
        assert_eq!(digest.console_url, "https://ci.test/job/root-job/3/consoleText");
        assert_eq!(digest.summary.overall_guess, OverallGuess::Failure);
        assert_eq!(digest.summary.error_hits.len(), 1);
        assert_eq!(digest.summary.error_hits[0].line, 3);
        assert_eq!(digest.summary.error_hits[0].content, "ERROR: bad");
    }

    #[tokio::test]
    async fn console_fetch_has_its_own_retry_budget() {
        let (fake, gateway) = setup();
        fake.fail_next("console", 5);

        let err = gateway.get_build_log("root-job", "3").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RetriesExhausted);
        assert_eq!(fake.calls("console"), 2);
    }

    /// Plain HTTP server answering every request with `200 OK` and `body`
    fn serve_console(body: &'static [u8]) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                counter.fetch_add(1, Ordering::SeqCst);

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(body);
            }
        });

        (url, hits)
    }

    #[tokio::test]
    async fn non_utf8_console_is_summarized_without_retrying() {
        let (url, hits) = serve_console(b"caf\xe9 ERROR: bad\nFinished: FAILURE\n");
        let mut config = test_config();
        config.jenkins.url = Some(url);
        let gateway = Gateway::from_config(&config).unwrap();

        let digest = gateway.get_build_log("app", "1").await.unwrap();

        assert_eq!(digest.summary.overall_guess, OverallGuess::Failure);
        assert_eq!(digest.summary.error_hits.len(), 1);
        assert_eq!(digest.summary.error_hits[0].content, "caf\u{FFFD} ERROR: bad");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn trigger_rejects_non_buildable_jobs() {
        let (fake, gateway) = setup();
        let err = gateway
            .trigger_build("folder-a/sub/deep-job", BTreeMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(fake.calls("trigger"), 0);
    }

    #[tokio::test]
    async fn trigger_queues_and_refreshes_status() {
        let (fake, gateway) = setup();
        gateway.get_build_status("root-job", "lastBuild").await.unwrap();

        let parameters = BTreeMap::from([("BRANCH".to_string(), "main".to_string())]);
        let triggered = gateway.trigger_build("root-job", parameters.clone()).await.unwrap();
        assert_eq!(triggered.queue.id, Some(101));
        assert_eq!(fake.triggered.lock()[0], ("root-job".to_string(), parameters));

        let status = gateway.get_build_status("root-job", "lastBuild").await.unwrap();
        assert_eq!(status.source, Source::Remote);
    }

    #[tokio::test]
    async fn trigger_is_not_retried() {
        let (fake, gateway) = setup();
        fake.fail_next("trigger", 1);

        let err = gateway.trigger_build("root-job", BTreeMap::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert_eq!(fake.calls("trigger"), 1);
    }

    #[tokio::test]
    async fn create_refuses_existing_path() {
        let (fake, gateway) = setup();
        let err = gateway.create_job("root-job", "<project/>").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(err.http_status(), 409);
        assert_eq!(fake.calls("create"), 0);
    }

    #[tokio::test]
    async fn create_invalidates_listings_and_audits() {
        let dir = TempDir::new().unwrap();
        let audit_path = dir.path().join("audit.log");
        let fake = Arc::new(FakeJenkins::scenario());
        let gateway = Gateway::new(fake.clone(), &test_config())
            .with_audit_log(AuditLog::with_path(&audit_path));

        let before = gateway.list_jobs(None, false).await.unwrap();
        assert_eq!(before.value.len(), 2);

        gateway.create_folder("folder-b").await.unwrap();
        gateway.create_job("folder-b/new-job", "<project/>").await.unwrap();

        let after = gateway.list_jobs(None, true).await.unwrap();
        assert!(paths(&after.value).contains(&"folder-b/new-job"));
        let root = gateway.list_jobs(None, false).await.unwrap();
        assert_eq!(root.source, Source::Remote);
        assert_eq!(root.value.len(), 3);

        let created = fake.created.lock();
        assert!(created[0].1.contains(FOLDER));

        let log = tokio::fs::read_to_string(&audit_path).await.unwrap();
        let events: Vec<serde_json::Value> =
            log.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event"], "folder.created");
        assert_eq!(events[1]["event"], "job.created");
    }

    #[tokio::test]
    async fn delete_removes_from_listing() {
        let (_, gateway) = setup();
        gateway.list_jobs(None, true).await.unwrap();

        gateway.delete_job("folder-a/sub").await.unwrap();

        let listing = gateway.list_jobs(None, true).await.unwrap();
        assert_eq!(paths(&listing.value), vec!["root-job", "folder-a", "folder-a/child-job"]);
    }

    #[tokio::test]
    async fn malformed_paths_fail_before_io() {
        let (fake, gateway) = setup();
        let err = gateway.list_builds("a//b").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = gateway.delete_job("/").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(fake.calls("job") + fake.calls("delete"), 0);
    }

    #[tokio::test]
    async fn disabled_cache_always_fetches() {
        let mut config = test_config();
        config.cache.enabled = false;
        let (fake, gateway) = setup_with(config);

        gateway.list_jobs(None, false).await.unwrap();
        let second = gateway.list_jobs(None, false).await.unwrap();
        assert_eq!(second.source, Source::Remote);
        assert_eq!(fake.calls("catalog"), 2);
    }

    #[tokio::test]
    async fn health_reports_user_and_cache() {
        let (_, gateway) = setup();
        gateway.list_jobs(None, false).await.unwrap();
        gateway.list_jobs(None, false).await.unwrap();

        let report = gateway.health().await.unwrap();
        assert_eq!(report.remote_user, "admin");
        assert_eq!(report.cache.listings.hits, 1);
        assert_eq!(report.cache.listings.misses, 1);
    }

    #[tokio::test]
    async fn json_output_carries_source_tag() {
        let (_, gateway) = setup();
        gateway.list_jobs(None, false).await.unwrap();
        let cached = gateway.list_jobs(None, false).await.unwrap();

        let json = serde_json::to_value(&cached).unwrap();
        assert_eq!(json["source"], "cache");
        assert_eq!(json["value"][0]["full_path"], "root-job");
    }
}
