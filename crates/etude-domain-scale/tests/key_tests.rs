use etude_domain_scale::{
    named_keys, Accidental, KeyError, KeySignature, Letter, Note, Spelling, Tonality,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn sig_text(sig: &KeySignature) -> String {
    sig.to_string()
}

#[test]
fn major_signatures_are_spelled_one_letter_per_degree() {
    let fsharp = KeySignature::named("F#").unwrap();
    assert_eq!(sig_text(&fsharp.signature), "F# G# A# B C# D# E#");
    assert_eq!(fsharp.tonality, Tonality::Major);

    let gb = KeySignature::named("Gb").unwrap();
    assert_eq!(sig_text(&gb.signature), "Gb Ab Bb Cb Db Eb F");
}

#[test]
fn minor_names_map_to_relative_major_signatures() {
    let a_minor = KeySignature::named("Am").unwrap();
    assert_eq!(sig_text(&a_minor.signature), "C D E F G A B");
    assert_eq!(a_minor.tonality, Tonality::Minor);
    assert_eq!(a_minor.signature.tonic(Tonality::Minor).to_string(), "A");

    let eb_minor = KeySignature::named("EBM").unwrap();
    assert_eq!(sig_text(&eb_minor.signature), "Gb Ab Bb Cb Db Eb F");

    let fsharp_minor = KeySignature::named("f#m").unwrap();
    assert_eq!(sig_text(&fsharp_minor.signature), "A B C# D E F# G#");
}

#[test]
fn catalog_has_thirteen_majors_and_twelve_minors() {
    let keys = named_keys();
    let majors = keys.iter().filter(|k| k.tonality == Tonality::Major).count();
    let minors = keys.iter().filter(|k| k.tonality == Tonality::Minor).count();
    assert_eq!((majors, minors), (13, 12));
}

#[test]
fn unknown_key_name_is_an_error() {
    assert_eq!(
        KeySignature::named("H"),
        Err(KeyError::UnknownName("H".to_string()))
    );
}

#[test]
fn random_key_is_reproducible_for_a_seed() {
    let mut a = StdRng::seed_from_u64(42);
    let mut b = StdRng::seed_from_u64(42);
    let first = KeySignature::random(&mut a).unwrap();
    assert_eq!(first, KeySignature::random(&mut b).unwrap());
    assert_eq!(first.tonality, Tonality::Major);
}

#[test]
fn explicit_lists_are_validated() {
    assert_eq!(
        KeySignature::parse_list("C D E F G A"),
        Err(KeyError::WrongLength(6))
    );
    assert!(matches!(
        KeySignature::parse_list("C,D,E,F,G,A,C"),
        Err(KeyError::Duplicate(_))
    ));
    assert!(matches!(
        KeySignature::parse_list("C,D,E,F,G,A,H"),
        Err(KeyError::Spelling(_))
    ));
}

#[test]
fn enharmonic_spellings_share_a_pitch_class() {
    let csharp: Spelling = "C#".parse().unwrap();
    let dflat: Spelling = "D♭".parse().unwrap();
    assert_eq!(csharp.pitch_class(), dflat.pitch_class());
    assert_eq!(csharp.enharmonics().first(), Some(&dflat));

    let cflat: Spelling = "Cb".parse().unwrap();
    assert_eq!(cflat.pitch_class().get(), 11);
    assert_eq!(cflat.enharmonics().first().map(|s| s.to_string()), Some("B".to_string()));
}

#[test]
fn alteration_stops_at_double_accidentals() {
    let g = Spelling::natural(Letter::G);
    assert_eq!(g.altered(1).unwrap().to_string(), "G#");
    assert_eq!(g.altered(2).unwrap().accidental, Accidental::DoubleSharp);
    assert!(g.altered(3).is_err());
}

#[test]
fn note_parsing_and_absolute_pitch() {
    let note: Note = "Bb-1".parse().unwrap();
    assert_eq!(note.octave, -1);
    assert_eq!(note.absolute_pitch(), -12 + 10);

    let c4: Note = "C4".parse().unwrap();
    assert_eq!(c4.absolute_pitch(), 48);
    assert_eq!(c4.id().as_str(), "C4");

    assert!("C".parse::<Note>().is_err());
}
