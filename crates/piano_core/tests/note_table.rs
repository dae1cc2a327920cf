use piano_core::{piano_keys, KeyClass, Note};

#[test]
fn every_note_maps_to_its_fixed_frequency() {
    let expected = [
        ("C4", 261.63),
        ("C#4", 277.18),
        ("D4", 293.66),
        ("D#4", 311.13),
        ("E4", 329.63),
        ("F4", 349.23),
        ("F#4", 369.99),
        ("G4", 392.00),
        ("G#4", 415.30),
        ("A4", 440.00),
        ("A#4", 466.16),
        ("B4", 493.88),
        ("C5", 523.25),
    ];

    for (name, frequency) in expected {
        let note = Note::from_name(name).unwrap_or_else(|| panic!("{name} should parse"));
        assert!(
            (note.frequency_hz() - frequency).abs() < 0.001,
            "{name}: {} != {frequency}",
            note.frequency_hz()
        );
    }
}

#[test]
fn frequencies_follow_equal_temperament() {
    for (index, note) in Note::ALL.iter().enumerate() {
        let semitones_from_a4 = index as f32 - 9.0;
        let exact = 440.0 * 2f32.powf(semitones_from_a4 / 12.0);
        assert!((note.frequency_hz() - exact).abs() < 0.01, "{note}");
    }
}

#[test]
fn rendered_keys_alternate_like_a_piano() {
    let classes: Vec<KeyClass> = piano_keys().iter().map(|key| key.class).collect();
    use KeyClass::{Black as B, White as W};
    assert_eq!(classes, vec![W, B, W, B, W, W, B, W, B, W, B, W, W]);
}
