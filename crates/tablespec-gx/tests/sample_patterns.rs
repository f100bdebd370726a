use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use tablespec_gx::pattern::{MAX_GROUP_DEPTH, MAX_SAMPLE_LEN};
use tablespec_gx::{generate_sample, generate_sample_with};

const TRIALS: usize = 200;

fn random_printable(rng: &mut ChaCha8Rng, len: usize) -> String {
    (0..len)
        .map(|_| char::from(rng.random_range(0x20u8..=0x7e)))
        .collect()
}

#[test]
fn arbitrary_printable_ascii_terminates() {
    let mut input_rng = ChaCha8Rng::seed_from_u64(2024);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let started = Instant::now();
    for len in [0, 1, 17, 256, 4_096, 10_000] {
        for _ in 0..5 {
            let pattern = random_printable(&mut input_rng, len);
            generate_sample_with(&pattern, &mut rng);
        }
    }
    assert!(started.elapsed() < Duration::from_secs(30));
}

#[test]
fn hostile_nesting_and_unterminated_constructs_terminate() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let open_groups = "(".repeat(10_000);
    let open_brackets = "[".repeat(10_000);
    let open_braces = "a{".repeat(5_000);
    let deep = format!("{}x{}", "(".repeat(5_000), ")".repeat(5_000));
    let escapes = "\\".repeat(10_000);

    assert_eq!(generate_sample_with(&open_groups, &mut rng), "");
    assert_eq!(generate_sample_with(&open_brackets, &mut rng), "");
    assert!(!generate_sample_with(&open_braces, &mut rng).is_empty());
    // `x` sits below the nesting cap and is dropped.
    assert_eq!(generate_sample_with(&deep, &mut rng), "");
    assert!(!generate_sample_with(&escapes, &mut rng).is_empty());

    let shallow = format!(
        "{}x{}",
        "(".repeat(MAX_GROUP_DEPTH),
        ")".repeat(MAX_GROUP_DEPTH)
    );
    assert_eq!(generate_sample_with(&shallow, &mut rng), "x");
}

#[test]
fn multiplied_repetition_stays_bounded() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let sample = generate_sample_with("((([A-Z]{999}){999}){999}){999}", &mut rng);
    assert!(sample.len() <= 2 * MAX_SAMPLE_LEN);
    assert!(sample.chars().all(|ch| ch.is_ascii_uppercase()));
}

#[test]
fn fixed_width_uppercase_class() {
    let mut rng = ChaCha8Rng::seed_from_u64(10);
    for _ in 0..TRIALS {
        let sample = generate_sample_with("^[A-Z]{5}$", &mut rng);
        assert_eq!(sample.len(), 5, "{sample}");
        assert!(sample.chars().all(|ch| ch.is_ascii_uppercase()), "{sample}");
    }
}

#[test]
fn bounded_digit_range() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut lengths = std::collections::BTreeSet::new();
    for _ in 0..TRIALS {
        let sample = generate_sample_with(r"^\d{2,4}$", &mut rng);
        assert!((2..=4).contains(&sample.len()), "{sample}");
        assert!(sample.chars().all(|ch| ch.is_ascii_digit()), "{sample}");
        lengths.insert(sample.len());
    }
    assert_eq!(lengths.len(), 3);
}

#[test]
fn open_range_is_capped_five_above_minimum() {
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    for _ in 0..TRIALS {
        let sample = generate_sample_with("^[0-9]{3,}$", &mut rng);
        assert!((3..=8).contains(&sample.len()), "{sample}");
        assert!(sample.chars().all(|ch| ch.is_ascii_digit()), "{sample}");
    }
}

#[test]
fn optional_literal_yields_both_outcomes() {
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    let mut seen_empty = false;
    let mut seen_a = false;
    for _ in 0..100 {
        match generate_sample_with("^A?$", &mut rng).as_str() {
            "" => seen_empty = true,
            "A" => seen_a = true,
            other => panic!("unexpected sample {other:?}"),
        }
    }
    assert!(seen_empty && seen_a);
}

#[test]
fn plain_text_passes_through() {
    assert_eq!(generate_sample("ABC-123"), "ABC-123");
    assert_eq!(generate_sample("^ABC-123$"), "ABC-123");
}

#[test]
fn escaped_dot_separates_digit_runs() {
    let mut rng = ChaCha8Rng::seed_from_u64(14);
    for _ in 0..TRIALS {
        let sample = generate_sample_with(r"^\d{3}\.\d{2}$", &mut rng);
        let bytes = sample.as_bytes();
        assert_eq!(bytes.len(), 6, "{sample}");
        assert!(bytes[..3].iter().all(u8::is_ascii_digit), "{sample}");
        assert_eq!(bytes[3], b'.');
        assert!(bytes[4..].iter().all(u8::is_ascii_digit), "{sample}");
    }
}

#[test]
fn realistic_identifiers() {
    let mut rng = ChaCha8Rng::seed_from_u64(15);
    for _ in 0..TRIALS {
        let member = generate_sample_with(r"^[A-Z]{2}\d{6}$", &mut rng);
        assert_eq!(member.len(), 8);
        assert!(member[..2].chars().all(|ch| ch.is_ascii_uppercase()));
        assert!(member[2..].chars().all(|ch| ch.is_ascii_digit()));

        let zip = generate_sample_with(r"^\d{5}(-\d{4})?$", &mut rng);
        assert!(zip.len() == 5 || zip.len() == 10, "{zip}");
        if zip.len() == 10 {
            assert_eq!(&zip[5..6], "-");
        }

        let code = generate_sample_with("^[MFU]$", &mut rng);
        assert!(matches!(code.as_str(), "M" | "F" | "U"), "{code}");
    }
}

#[test]
fn unsupported_metacharacters_and_malformed_fragments_degrade() {
    let mut rng = ChaCha8Rng::seed_from_u64(16);
    assert_eq!(generate_sample_with("a.b*c|d", &mut rng), "abcd");
    assert_eq!(generate_sample_with("[A-Z", &mut rng), "A-Z");
    assert_eq!(generate_sample_with("(ab", &mut rng), "ab");
    assert_eq!(generate_sample_with("x{a,b}", &mut rng), "x{a,b}");
    assert_eq!(generate_sample_with("x{4,2}", &mut rng), "x{4,2}");
    assert_eq!(generate_sample_with(r"\w", &mut rng), r"\w");
    assert_eq!(generate_sample_with("[]", &mut rng), "X");
}
