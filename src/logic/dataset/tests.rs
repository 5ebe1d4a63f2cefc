use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::assembler::{dedup_by_domain, DatasetAssembler};
use super::error::DatasetError;
use super::reader::read_dataset;
use super::record::{DomainRecord, Label};
use super::splitter::DatasetSplitter;
use crate::logic::config::{OutputConfig, PipelineConfig, SourceConfig, SplitConfig};
use crate::logic::features::CharacterCategories;
use crate::logic::pipeline::Pipeline;
use tempfile::tempdir;

fn write_source(dir: &Path, name: &str, domains: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut content = String::from("rank,domain\n");
    for (i, d) in domains.iter().enumerate() {
        content.push_str(&format!("{},{}\n", i + 1, d));
    }
    fs::write(&path, content).unwrap();
    path
}

fn source(role: &str, path: PathBuf, suspicious: bool) -> SourceConfig {
    SourceConfig { role: role.to_string(), path, suspicious }
}

fn many(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{}{}.com", prefix, i)).collect()
}

fn refs(v: &[String]) -> Vec<&str> {
    v.iter().map(|s| s.as_str()).collect()
}

#[test]
fn test_build_from_source_labels_and_order() {
    let dir = tempdir().unwrap();
    let path = write_source(dir.path(), "sus.csv", &["b.com", "a1b2c3.com", "b.com"]);
    let cats = CharacterCategories::standard();
    let assembler = DatasetAssembler::new(&cats, 1);

    let records = assembler.build_from_source(&path, true).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1].domain, "a1b2c3.com");
    assert_eq!(records[1].strange_char_count, 1);
    assert!(records.iter().all(|r| r.class == Label::Malicious));
    assert!(records.iter().all(|r| r.id.is_none()));

    let (deduped, dropped) = dedup_by_domain(records);
    assert_eq!(dropped, 1);
    let unique: HashSet<_> = deduped.iter().map(|r| r.domain.clone()).collect();
    assert_eq!(unique.len(), deduped.len());
}

#[test]
fn test_assemble_keeps_cross_source_duplicates_until_clean() {
    let dir = tempdir().unwrap();
    let a = write_source(dir.path(), "a.csv", &["x.com", "y.com", "x.com"]);
    let b = write_source(dir.path(), "b.csv", &["y.com", "z.com"]);
    let combined = dir.path().join("all.csv");

    let cats = CharacterCategories::standard();
    let assembler = DatasetAssembler::new(&cats, 1);
    let report = assembler
        .assemble_all(&[source("a", a, true), source("b", b, false)], &combined)
        .unwrap();

    assert_eq!(report.sources[0].duplicates_dropped, 1);
    assert_eq!(report.total_rows, 4);

    let content = fs::read_to_string(&combined).unwrap();
    assert_eq!(content.matches("domain,domain_length").count(), 1);

    let loaded = read_dataset(&combined).unwrap();
    assert!(!loaded.has_id);
    assert_eq!(loaded.records.iter().filter(|r| r.domain == "y.com").count(), 2);
}

#[test]
fn test_clean_dedups_and_assigns_contiguous_ids() {
    let dir = tempdir().unwrap();
    let a = write_source(dir.path(), "a.csv", &["x.com", "y.com"]);
    let b = write_source(dir.path(), "b.csv", &["y.com", "z.com", "x.com", "w.com"]);
    let combined = dir.path().join("all.csv");

    let cats = CharacterCategories::standard();
    DatasetAssembler::new(&cats, 1)
        .assemble_all(&[source("a", a, true), source("b", b, false)], &combined)
        .unwrap();
    let report = DatasetAssembler::clean(&combined).unwrap();

    assert_eq!(report.rows_before, 6);
    assert_eq!(report.duplicates_dropped, 2);
    assert_eq!(report.rows_after, 4);

    let loaded = read_dataset(&combined).unwrap();
    assert!(loaded.has_id);
    let domains: Vec<&str> = loaded.records.iter().map(|r| r.domain.as_str()).collect();
    assert_eq!(domains, vec!["x.com", "y.com", "z.com", "w.com"]);
    let ids: Vec<i64> = loaded.records.iter().filter_map(|r| r.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
    // first occurrence came from the suspicious source
    assert_eq!(loaded.records[1].class, Label::Malicious);

    // Re-cleaning a cleaned file is a no-op
    let again = DatasetAssembler::clean(&combined).unwrap();
    assert_eq!(again.duplicates_dropped, 0);
    assert_eq!(again.rows_after, 4);
}

#[test]
fn test_failed_assembly_leaves_no_combined_file() {
    let dir = tempdir().unwrap();
    let a = write_source(dir.path(), "a.csv", &["x.com"]);
    let missing = dir.path().join("missing.csv");
    let combined = dir.path().join("out").join("all.csv");

    let cats = CharacterCategories::standard();
    let err = DatasetAssembler::new(&cats, 1)
        .assemble_all(&[source("a", a, true), source("gone", missing, false)], &combined)
        .unwrap_err();

    assert!(matches!(err, DatasetError::Io { .. }));
    assert!(err.to_string().contains("missing.csv"));
    assert!(!combined.exists());
    assert_eq!(fs::read_dir(dir.path().join("out")).unwrap().count(), 0);
}

#[test]
fn test_splitter_requires_cleaned_dataset() {
    let dir = tempdir().unwrap();
    let a = write_source(dir.path(), "a.csv", &["x.com"]);
    let combined = dir.path().join("all.csv");

    let cats = CharacterCategories::standard();
    DatasetAssembler::new(&cats, 1)
        .assemble_all(&[source("a", a, true)], &combined)
        .unwrap();

    assert!(matches!(
        DatasetSplitter::load(&combined),
        Err(DatasetError::SchemaMismatch { .. })
    ));
}

fn count(records: &[DomainRecord], class: Label) -> usize {
    records.iter().filter(|r| r.class == class).count()
}

fn build_combined(dir: &Path, n_pos: usize, n_neg: usize) -> PathBuf {
    let pos = many("evil", n_pos);
    let neg = many("good", n_neg);
    let a = write_source(dir, "sus.csv", &refs(&pos));
    let b = write_source(dir, "legit.csv", &refs(&neg));
    let combined = dir.join("all.csv");

    let cats = CharacterCategories::standard();
    DatasetAssembler::new(&cats, 1)
        .assemble_all(&[source("sus", a, true), source("legit", b, false)], &combined)
        .unwrap();
    DatasetAssembler::clean(&combined).unwrap();
    combined
}

#[test]
fn test_split_stratification_counts() {
    let dir = tempdir().unwrap();
    let combined = build_combined(dir.path(), 100, 200);

    let dataset = DatasetSplitter::load(&combined).unwrap();
    let split = DatasetSplitter::new(SplitConfig::default(), 42).split(&dataset).unwrap();

    assert_eq!(count(&split.test, Label::Malicious), 20);
    assert_eq!(count(&split.val, Label::Malicious), 16);
    assert_eq!(count(&split.train, Label::Malicious), 64);

    assert_eq!(count(&split.test, Label::Benign), 20);
    assert_eq!(count(&split.val, Label::Benign), 18);
    assert_eq!(count(&split.train, Label::Benign), 162);

    // ids carried over, not recomputed
    let mut ids: Vec<i64> = split
        .train
        .iter()
        .chain(&split.val)
        .chain(&split.test)
        .filter_map(|r| r.id)
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..300).collect::<Vec<i64>>());
}

#[test]
fn test_split_is_byte_identical_for_same_seed() {
    let dir = tempdir().unwrap();
    let combined = build_combined(dir.path(), 40, 120);
    let dataset = DatasetSplitter::load(&combined).unwrap();

    let out_a = dir.path().join("run_a");
    let out_b = dir.path().join("run_b");
    for out in [&out_a, &out_b] {
        let splitter = DatasetSplitter::new(SplitConfig::default(), 7);
        let split = splitter.split(&dataset).unwrap();
        splitter.write_to_dir(&split, out).unwrap();
    }

    for name in ["train.csv", "val.csv", "test.csv"] {
        assert_eq!(
            fs::read(out_a.join(name)).unwrap(),
            fs::read(out_b.join(name)).unwrap(),
            "{} differs between runs",
            name
        );
    }
}

#[test]
fn test_split_differs_for_other_seed() {
    let dir = tempdir().unwrap();
    let combined = build_combined(dir.path(), 40, 120);
    let dataset = DatasetSplitter::load(&combined).unwrap();

    let a = DatasetSplitter::new(SplitConfig::default(), 1).split(&dataset).unwrap();
    let b = DatasetSplitter::new(SplitConfig::default(), 2).split(&dataset).unwrap();
    assert_ne!(a.test, b.test);
}

#[test]
fn test_written_splits_have_unique_domains_and_manifest() {
    let dir = tempdir().unwrap();
    let combined = build_combined(dir.path(), 30, 60);
    let dataset = DatasetSplitter::load(&combined).unwrap();

    let out = dir.path().join("splits");
    let splitter = DatasetSplitter::new(SplitConfig::default(), 42);
    let split = splitter.split(&dataset).unwrap();
    let manifest = splitter.write_to_dir(&split, &out).unwrap();

    for name in ["train.csv", "val.csv", "test.csv"] {
        let loaded = read_dataset(&out.join(name)).unwrap();
        assert!(loaded.has_id);
        let unique: HashSet<_> = loaded.records.iter().map(|r| r.domain.clone()).collect();
        assert_eq!(unique.len(), loaded.records.len());
    }

    assert_eq!(manifest.partitions.len(), 3);
    assert_eq!(manifest.partitions.iter().map(|p| p.rows).sum::<usize>(), 90);
    assert!(out.join("split_manifest.json").exists());
    assert!(manifest.verify().unwrap().is_empty());
}

#[test]
fn test_end_to_end_shared_suspicious_domain() {
    let dir = tempdir().unwrap();
    let mut high = many("high", 20);
    let mut low = many("low", 20);
    high.push("shared-bad.net".to_string());
    low.insert(0, "shared-bad.net".to_string());
    let benign = many("site", 60);

    let config = PipelineConfig::new(
        vec![
            source("sans_high", write_source(dir.path(), "high.csv", &refs(&high)), true),
            source("sans_low", write_source(dir.path(), "low.csv", &refs(&low)), true),
            source("top_sites", write_source(dir.path(), "top.csv", &refs(&benign)), false),
        ],
        OutputConfig::in_dir(&dir.path().join("data")),
    );
    let outputs = config.outputs.clone();

    let report = Pipeline::new(config).run().unwrap();
    assert_eq!(report.assembly.total_rows, 102);
    assert_eq!(report.clean.duplicates_dropped, 1);
    assert_eq!(report.clean.rows_after, 101);

    let combined = read_dataset(&outputs.combined).unwrap().records;
    let shared: Vec<_> = combined.iter().filter(|r| r.domain == "shared-bad.net").collect();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].class, Label::Malicious);

    let appearances: usize = [&outputs.train, &outputs.val, &outputs.test]
        .iter()
        .map(|p| {
            read_dataset(p)
                .unwrap()
                .records
                .iter()
                .filter(|r| r.domain == "shared-bad.net")
                .count()
        })
        .sum();
    assert_eq!(appearances, 1);
}
