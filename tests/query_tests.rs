use msgcluster_rs::{ClusterError, MessageClusterer, MessageList, MESSAGE_SEPARATOR};
use proptest::prelude::*;
use std::collections::HashSet;
use std::process::Command;

fn mates(raw: &str, target: &str, seed: u64) -> Vec<usize> {
    MessageClusterer::new()
        .with_seed(seed)
        .cluster_raw(raw)
        .unwrap()
        .cluster_mates(target)
        .collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_cat_dog_scenario() {
    let raw = "cat§dog§cats are great§dogs bark";
    let messages = MessageList::parse(raw);

    for seed in 0..5 {
        let indices = mates(raw, "cat", seed);

        assert!(indices.contains(&0), "the target's own index is reported");
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
        assert!(indices.iter().all(|&i| !messages.get(i).unwrap().is_empty()));
    }
}

#[test]
fn test_empty_message_never_reported() {
    for seed in 0..5 {
        let indices = mates("alpha§§beta", "alpha", seed);

        assert!(indices.contains(&0));
        assert!(!indices.contains(&1));
    }
}

#[test]
fn test_single_letter_messages_have_no_vocabulary() {
    let result = MessageClusterer::new().cluster_raw("a§§b");
    assert!(matches!(result, Err(ClusterError::EmptyVocabulary)));
}

#[test]
fn test_single_message_is_rejected() {
    let result = MessageClusterer::new().cluster_raw("only one message here");
    assert!(matches!(result, Err(ClusterError::InsufficientData(_))));
}

#[test]
fn test_groups_by_shared_words() {
    let raw = "apple pie§car engine§apple tart§§car wheel";

    assert_eq!(mates(raw, "apple pie", 3), [0, 2]);
    assert_eq!(mates(raw, "car wheel", 3), [1, 4]);
    assert!(!mates(raw, "", 3).contains(&3));
}

#[test]
fn test_partition_is_stable_across_seeds() {
    let raw = "apple pie§apple tart§car engine§car wheel§apple crumble§car door";
    let expected: HashSet<usize> = [0, 1, 4].into_iter().collect();

    for seed in [1, 7, 42, 1234, 99999] {
        let clusters = MessageClusterer::new().with_seed(seed).cluster_raw(raw).unwrap();
        let apple = clusters.cluster_of("apple pie").unwrap();

        let members: HashSet<usize> = clusters.members(apple).into_iter().collect();
        assert_eq!(members, expected, "seed {}", seed);
    }
}

#[test]
fn test_no_match_reports_nothing() {
    assert!(mates("apple pie§car engine", "bicycle", 0).is_empty());
    assert!(mates("apple pie§car engine", "apple", 0).is_empty());
}

#[test]
fn test_duplicate_targets_reported_individually() {
    let raw = "apple pie§car engine§apple pie§car wheel";
    let indices = mates(raw, "apple pie", 8);

    assert!(indices.contains(&0));
    assert!(indices.contains(&2));
}

// ============================================================================
// Properties
// ============================================================================

fn message() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just(String::new()),
        4 => "[a-z]{2,6}( [a-z]{2,6}){0,3}",
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_reported_indices_share_cluster_and_are_non_empty(
        messages in prop::collection::vec(message(), 2..10),
        pick in any::<prop::sample::Index>(),
        seed in any::<u64>(),
    ) {
        prop_assume!(messages.iter().any(|m| !m.is_empty()));

        let raw = messages.join(MESSAGE_SEPARATOR.to_string().as_str());
        let target = messages[pick.index(messages.len())].clone();

        let clusters = MessageClusterer::new().with_seed(seed).cluster_raw(&raw).unwrap();
        let label = clusters.cluster_of(&target);
        prop_assert!(label.is_some());

        let indices: Vec<usize> = clusters.cluster_mates(&target).collect();

        prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        for &i in &indices {
            prop_assert!(!messages[i].is_empty());
            prop_assert_eq!(clusters.label(i), label);
        }

        // every non-empty member of the cluster is reported
        let expected: Vec<usize> = (0..messages.len())
            .filter(|&i| clusters.label(i) == label && !messages[i].is_empty())
            .collect();
        prop_assert_eq!(indices, expected);
    }

    #[test]
    fn prop_unmatched_target_reports_nothing(
        messages in prop::collection::vec(message(), 2..10),
        seed in any::<u64>(),
    ) {
        prop_assume!(messages.iter().any(|m| !m.is_empty()));

        let raw = messages.join(MESSAGE_SEPARATOR.to_string().as_str());
        let clusters = MessageClusterer::new().with_seed(seed).cluster_raw(&raw).unwrap();

        // messages are lowercase, so this never matches exactly
        prop_assert_eq!(clusters.cluster_mates("NOT THERE").count(), 0);
    }
}

// ============================================================================
// Command line
// ============================================================================

fn msgcluster() -> Command {
    Command::new(env!("CARGO_BIN_EXE_msgcluster"))
}

#[test]
fn test_cli_prints_one_index_per_line() {
    let output = msgcluster()
        .args([
            "--seed",
            "17",
            "apple pie§apple tart§§car engine§car wheel",
            "apple tart",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "0\n1\n");
}

#[test]
fn test_cli_no_match_prints_nothing() {
    let output = msgcluster()
        .args(["apple pie§car engine", "bicycle"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_cli_missing_target_fails() {
    let output = msgcluster().arg("apple pie§car engine").output().unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_cli_too_few_messages_fails() {
    let output = msgcluster().args(["lonely", "lonely"]).output().unwrap();

    assert!(!output.status.success());
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_cli_accepts_hyphen_leading_text() {
    let output = msgcluster()
        .args([
            "--seed",
            "17",
            "-xx marks§-xx spot§car engine§car wheel",
            "-xx marks",
        ])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "0\n1\n");
}

#[test]
fn test_cli_option_names_after_double_dash_are_text() {
    let output = msgcluster()
        .args([
            "--seed",
            "17",
            "--",
            "--help me§--help you§car engine§car wheel",
            "--help me",
        ])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "0\n1\n");
}
