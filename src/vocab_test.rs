use crate::hangman::HangmanError;
use crate::vocab::*;

fn pool() -> Vec<VocabEntry> {
    serde_json::from_str(
        r#"[
            {"vocabWord": "cat", "wordGrade": 1},
            {"vocabWord": "house", "wordGrade": 2},
            {"vocabWord": "zephyr", "wordGrade": 8},
            {"vocabWord": "elephant", "wordGrade": 3}
        ]"#,
    )
    .unwrap()
}

#[test]
fn parses_the_vocab_record_format() {
    let pool = pool();
    assert_eq!(pool.len(), 4);
    assert_eq!(pool[0].word, "cat");
    assert_eq!(pool[0].grade, 1);
    assert_eq!(pool[2].word, "zephyr");
    assert_eq!(pool[2].grade, 8);
}

#[test]
fn selects_only_within_both_ranges() {
    let pool = pool();
    // Only "house" is 4-6 letters at grade 1-5.
    for _ in 0..20 {
        assert_eq!(select_word(&pool, (4, 6), (1, 5)).unwrap(), "HOUSE");
    }
}

#[test]
fn ranges_are_inclusive() {
    let pool = pool();
    // "cat" sits on both low edges.
    assert_eq!(select_word(&pool, (3, 3), (1, 1)).unwrap(), "CAT");
    // "elephant" sits on the high length edge.
    assert_eq!(select_word(&pool, (8, 8), (1, 8)).unwrap(), "ELEPHANT");
}

#[test]
fn selection_returns_uppercase() {
    let pool = pool();
    let word = select_word(&pool, (3, 8), (1, 8)).unwrap();
    assert!(word.chars().all(|c| c.is_ascii_uppercase()));
}

#[test]
fn empty_filter_result_is_an_error() {
    let pool = pool();
    assert_eq!(select_word(&pool, (9, 12), (1, 8)), Err(HangmanError::EmptyPool));
    assert_eq!(select_word(&pool, (3, 8), (9, 12)), Err(HangmanError::EmptyPool));
    assert_eq!(select_word(&[], (3, 8), (1, 8)), Err(HangmanError::EmptyPool));
}

#[test]
fn every_candidate_is_reachable() {
    let pool = pool();
    let mut seen = std::collections::HashSet::new();
    for _ in 0..200 {
        seen.insert(select_word(&pool, (3, 8), (1, 8)).unwrap());
    }
    assert_eq!(seen.len(), 4);
}

#[test]
fn load_drops_malformed_words() {
    let dir = std::env::temp_dir().join("hangmanbot-vocab-test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("vocab.json");
    std::fs::write(
        &path,
        r#"[
            {"vocabWord": "fine", "wordGrade": 2},
            {"vocabWord": "", "wordGrade": 1},
            {"vocabWord": "not ok", "wordGrade": 1},
            {"vocabWord": "als0bad", "wordGrade": 1}
        ]"#,
    )
    .unwrap();

    let pool = load_vocab(path.to_str().unwrap()).unwrap();
    assert_eq!(pool.len(), 1);
    assert_eq!(pool[0].word, "fine");
}

#[test]
fn load_reports_missing_and_invalid_files() {
    assert!(load_vocab("/does/not/exist.json").is_err());

    let dir = std::env::temp_dir().join("hangmanbot-vocab-test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("garbage.json");
    std::fs::write(&path, "not json at all").unwrap();
    assert!(load_vocab(path.to_str().unwrap()).is_err());
}
