//! End-to-end tests: lexicons → catalog → line source → ingest loop → reports
//!
//! Key integration points tested:
//! - Catalog loading from lexicon files and pattern-file output
//! - Line channel feeding the unified ingest loop
//! - Final report on end-of-input
//! - Matcher subprocess output forwarded into the pipeline

#[cfg(test)]
mod sentiment_pipeline_tests {
    use sentiflow::catalog::{CatalogSources, PatternCatalog};
    use sentiflow::matcher::{forward_lines, run_matcher, MatcherCommand};
    use sentiflow::pipeline::{
        IngestLoop, LineWriterSink, PatternId, ReportFormat, ReportTimezone, Reporter, WindowSet,
    };
    use std::path::Path;
    use std::sync::Arc;
    use tokio::sync::{mpsc, Mutex};
    use tokio::time::Duration;

    fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn load_catalog(dir: &Path) -> PatternCatalog {
        let sources = CatalogSources {
            negative: Some(write_file(dir, "negative.txt", "awful\nsad\n")),
            positive: Some(write_file(dir, "positive.txt", "happy\ngreat\n")),
            scored: Some(write_file(dir, "scored.txt", "great 3.0 0.5\nmeh -0.5 0.2\n")),
        };
        PatternCatalog::load(&sources).unwrap()
    }

    fn build_loop(catalog: PatternCatalog, horizons: &[f64], now: f64) -> IngestLoop {
        let windows = Arc::new(Mutex::new(WindowSet::new(horizons).unwrap()));
        let catalog = Arc::new(catalog);
        let reporter = Reporter::new(windows.clone(), catalog.clone(), 5);
        IngestLoop::new(
            windows,
            catalog,
            reporter,
            Duration::from_secs(3600),
            Duration::from_secs(3600),
        )
        .with_clock(Arc::new(move || now))
    }

    #[test]
    fn test_catalog_pattern_file() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = load_catalog(dir.path());

        assert_eq!(catalog.id_of("great"), Some(PatternId(2)));
        assert_eq!(catalog.id_of("meh"), Some(PatternId(-3)));

        let out = dir.path().join("patterns.txt");
        catalog.write_pattern_file(&out).unwrap();
        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(
            written,
            "-1 \"awful\"\n-2 \"sad\"\n1 \"happy\"\n2 \"great\"\n-3 \"meh\"\n"
        );
    }

    #[tokio::test]
    async fn test_end_to_end_jsonl_reports() {
        let dir = tempfile::tempdir().unwrap();
        let ingest = build_loop(load_catalog(dir.path()), &[60.0, 3600.0], 1_700_000_000.0);

        let (tx, rx) = mpsc::channel(64);
        let matcher_output: &[u8] = b"scanning corpus\n\
            Pattern #2 offset 10\n\
            Pattern #2 offset 42\n\
            Pattern #-1 offset 50\n\
            Pattern #1 offset 77\n\
            Pattern broken\n\
            done\n";
        tokio::spawn(async move {
            forward_lines(matcher_output, tx).await.unwrap();
        });

        let mut sink = LineWriterSink::new(Vec::new(), ReportFormat::Jsonl);
        let stats = ingest.run(rx, &mut sink).await.unwrap();

        assert_eq!(stats.lines, 7);
        assert_eq!(stats.matches, 4);
        assert_eq!(stats.parse_failures, 1);

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let reports: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(reports.len(), 2);

        for report in &reports {
            // great weighs 3.0 twice, happy 1.0, awful 1.0
            assert_eq!(report["positive"], 7.0);
            assert_eq!(report["negative"], 1.0);
            assert_eq!(report["score"], 87.5);

            let hitters = report["heavy_hitters"].as_array().unwrap();
            let names: Vec<&str> = hitters.iter().map(|h| h["name"].as_str().unwrap()).collect();
            assert_eq!(names, vec!["great", "happy", "awful"]);
        }
        assert_eq!(reports[0]["horizon_secs"], 60.0);
        assert_eq!(reports[1]["horizon_secs"], 3600.0);
    }

    #[tokio::test]
    async fn test_no_matches_reports_without_score() {
        let ingest = build_loop(PatternCatalog::new(), &[60.0], 0.0);

        let (tx, rx) = mpsc::channel(4);
        tx.send("nothing to see".to_string()).await.unwrap();
        drop(tx);

        let mut sink =
            LineWriterSink::new(Vec::new(), ReportFormat::Text).with_timezone(ReportTimezone::Utc);
        ingest.run(rx, &mut sink).await.unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(output, "Thu, 01 January 1970 00:00:00 0.0       60 :\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_matcher_subprocess_feeds_pipeline() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = write_file(
            dir.path(),
            "fake_matcher.sh",
            "#!/bin/sh\necho \"Pattern #1\"\nprintf 'Pattern #-2 in caf\\351\\n'\necho \"Total matches: 2\"\nexit 3\n",
        );
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let command = MatcherCommand {
            program: script.display().to_string(),
            patterns: dir.path().join("patterns.txt"),
            input: "corpus.txt".to_string(),
            target: "/dev/stdin".to_string(),
        };

        let mut catalog = PatternCatalog::new();
        catalog.extend_negative(["awful", "sad"]);
        catalog.extend_positive(["happy"]);
        let ingest = build_loop(catalog, &[60.0], 100.0);

        let (tx, rx) = mpsc::channel(16);
        let source = tokio::spawn(async move { run_matcher(&command, tx).await });

        let mut sink = LineWriterSink::new(Vec::new(), ReportFormat::Text);
        let stats = ingest.run(rx, &mut sink).await.unwrap();

        // A failing exit status still ends ingestion cleanly, and the
        // non-UTF-8 line does not cut the stream short
        assert_eq!(source.await.unwrap().unwrap(), 3);
        assert_eq!(stats.lines, 3);
        assert_eq!(stats.matches, 2);

        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("Score: 50.0 %"));
        assert!(output.contains("[ happy (1.0) sad (1.0) ]"));
    }
}
