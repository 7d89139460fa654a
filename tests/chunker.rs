use textsift::chunker::chunk;

#[test]
fn short_input_is_a_single_trimmed_chunk() {
    let chunks = chunk("Hello world. This is a test.", 100).unwrap();
    assert_eq!(chunks, vec!["Hello world. This is a test.".to_string()]);

    let chunks = chunk("  padded  ", 100).unwrap();
    assert_eq!(chunks, vec!["padded".to_string()]);
}

#[test]
fn empty_and_whitespace_inputs_yield_nothing() {
    assert!(chunk("", 100).unwrap().is_empty());
    assert!(chunk("   \n\t  ", 100).unwrap().is_empty());
}

#[test]
fn zero_max_chars_is_rejected() {
    assert!(chunk("hi", 0).is_err());
}

#[test]
fn two_long_sentences_split_on_the_sentence_boundary() {
    let s1 = format!("A{}.", "a".repeat(1498));
    let s2 = format!("B{}.", "b".repeat(1498));
    assert_eq!(s1.chars().count(), 1500);

    let text = format!("{} {}", s1, s2);
    let chunks = chunk(&text, 2000).unwrap();

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0], s1);
    assert_eq!(chunks[1], s2);
}

#[test]
fn every_chunk_respects_the_limit() {
    let base = "The quick brown fox jumps over the lazy dog. Pack my box with five dozen liquor jugs. How vexingly quick daft zebras jump! Sphinx of black quartz, judge my vow. Waltz, bad nymph, for quick jigs vex.";
    let text = [base; 4].join(" ");
    let chunks = chunk(&text, 80).unwrap();

    assert!(chunks.len() > 1);
    for c in &chunks {
        assert!(c.chars().count() <= 80, "chunk too long: {c:?}");
        assert_eq!(c, c.trim());
        assert!(!c.is_empty());
    }
}

#[test]
fn word_order_is_preserved() {
    let text = "One two three. Four five six! Seven eight nine? Ten eleven twelve. Thirteen fourteen.";
    let chunks = chunk(text, 25).unwrap();

    let original: Vec<&str> = text.split_whitespace().collect();
    let rejoined = chunks.join(" ");
    let reassembled: Vec<&str> = rejoined.split_whitespace().collect();
    assert_eq!(reassembled, original);
}

#[test]
fn rechunking_a_chunk_is_identity() {
    let text = "First sentence right here. Second sentence follows it. Third one closes things out. Fourth for good measure.";
    let chunks = chunk(text, 60).unwrap();
    assert!(chunks.len() > 1);

    for c in &chunks {
        let again = chunk(c, 60).unwrap();
        assert_eq!(again, vec![c.clone()]);
    }
}

#[test]
fn oversized_word_becomes_its_own_chunk() {
    let long_word = "x".repeat(120);
    let text = format!("tiny words here {} more tiny words after that one", long_word);
    let chunks = chunk(&text, 50).unwrap();

    assert!(chunks.contains(&long_word));
    for c in &chunks {
        if c != &long_word {
            assert!(c.chars().count() <= 50, "chunk too long: {c:?}");
        }
    }
}

#[test]
fn long_sentence_falls_back_to_word_splitting() {
    // One "sentence" (no boundary fires) well past the limit.
    let words: Vec<String> = (0..200).map(|i| format!("word{i}")).collect();
    let text = words.join(" ");
    let chunks = chunk(&text, 100).unwrap();

    assert!(chunks.len() > 1);
    for c in &chunks {
        assert!(c.chars().count() <= 100);
    }
    let rejoined = chunks.join(" ");
    assert_eq!(
        rejoined.split_whitespace().collect::<Vec<_>>(),
        text.split_whitespace().collect::<Vec<_>>()
    );
}

#[test]
fn boundary_followed_by_lowercase_does_not_split() {
    // "Dr. smith" must stay in one unit: the next character is lowercase.
    let filler = "f".repeat(40);
    let text = format!("Dr. smith saw the patient {filler}. Then he left {filler}.");
    let chunks = chunk(&text, 70).unwrap();

    assert!(chunks.len() > 1);
    assert!(chunks[0].starts_with("Dr. smith"));
}

#[test]
fn whitespace_between_sentences_is_normalized() {
    // Long enough to skip the single-chunk early return, but both sentences
    // still pack into one chunk, joined by a single space.
    let s1 = format!("Alpha {}.", "a".repeat(42));
    let s2 = format!("Beta {}.", "b".repeat(42));
    let text = format!("{}  \n\n  {}", s1, s2);
    assert!(text.chars().count() > 100);

    let chunks = chunk(&text, 100).unwrap();
    assert_eq!(chunks, vec![format!("{} {}", s1, s2)]);
}
