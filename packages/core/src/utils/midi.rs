//! MIDI note helpers
//!
//! Note names, frequencies, scales and chords. Also hosts the clamp-policy
//! velocity helper: unlike the tool-level validator it never fails, it pulls
//! the value into `0..=127`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Sharp-based note names, index = pitch class
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

const FLAT_TO_SHARP: [(&str, &str); 5] = [
    ("Db", "C#"),
    ("Eb", "D#"),
    ("Gb", "F#"),
    ("Ab", "G#"),
    ("Bb", "A#"),
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MidiUtilError {
    #[error("Invalid note name: '{0}'. Must be one of C, C#, D, D#, E, F, F#, G, G#, A, A#, B")]
    InvalidNoteName(String),

    #[error("Invalid note format: '{0}'. Expected format like 'C4' or 'A#5'")]
    InvalidNoteFormat(String),

    #[error("MIDI note number {0} out of range (0-127)")]
    NoteOutOfRange(i64),

    #[error("Frequency must be positive, got {0}")]
    InvalidFrequency(f64),

    #[error("Unknown scale type: '{0}'. Available: major, minor, pentatonic_major, pentatonic_minor, blues, chromatic")]
    UnknownScale(String),

    #[error("Unknown chord type: '{0}'. Available: major, minor, diminished, augmented, major_7th, minor_7th, dominant_7th, sus2, sus4")]
    UnknownChord(String),
}

pub type Result<T> = std::result::Result<T, MidiUtilError>;

/// Convert a note name and octave to a MIDI number (`C4` = 60)
pub fn note_to_number(note: &str, octave: i32) -> Result<u8> {
    let note = FLAT_TO_SHARP
        .iter()
        .find(|(flat, _)| *flat == note)
        .map(|(_, sharp)| *sharp)
        .unwrap_or(note);

    let index = NOTE_NAMES
        .iter()
        .position(|name| *name == note)
        .ok_or_else(|| MidiUtilError::InvalidNoteName(note.to_string()))?;

    let number = index as i64 + (i64::from(octave) + 1) * 12;
    if !(0..=127).contains(&number) {
        return Err(MidiUtilError::NoteOutOfRange(number));
    }
    Ok(number as u8)
}

/// Convert a MIDI number to a note name with octave (`69` -> `A4`)
pub fn number_to_note(number: u8) -> Result<String> {
    if number > 127 {
        return Err(MidiUtilError::NoteOutOfRange(i64::from(number)));
    }
    let name = NOTE_NAMES[usize::from(number % 12)];
    let octave = i32::from(number / 12) - 1;
    Ok(format!("{}{}", name, octave))
}

/// Parse strings like `C4`, `A#5`, `Db3` or `C-1`
pub fn parse_note_string(note: &str) -> Result<u8> {
    let note = note.trim();

    let split = note
        .char_indices()
        .skip(1)
        .find(|(_, c)| c.is_ascii_digit() || *c == '-')
        .map(|(i, _)| i)
        .ok_or_else(|| MidiUtilError::InvalidNoteFormat(note.to_string()))?;

    let (name, octave) = note.split_at(split);
    let octave: i32 = octave
        .parse()
        .map_err(|_| MidiUtilError::InvalidNoteFormat(note.to_string()))?;

    note_to_number(name, octave)
}

/// Equal-tempered frequency in Hz, A4 = 440 Hz
pub fn midi_to_frequency(number: u8) -> Result<f64> {
    if number > 127 {
        return Err(MidiUtilError::NoteOutOfRange(i64::from(number)));
    }
    Ok(440.0 * 2f64.powf((f64::from(number) - 69.0) / 12.0))
}

/// Nearest MIDI number for a frequency, clamped to `0..=127`
pub fn frequency_to_midi(frequency: f64) -> Result<u8> {
    if !(frequency > 0.0) || !frequency.is_finite() {
        return Err(MidiUtilError::InvalidFrequency(frequency));
    }
    let number = (12.0 * (frequency / 440.0).log2() + 69.0).round();
    Ok(number.clamp(0.0, 127.0) as u8)
}

/// Clamp a velocity into `0..=127`. Never fails.
pub fn clamp_velocity(velocity: i64) -> u8 {
    velocity.clamp(0, 127) as u8
}

/// Rough dynamic marking for a velocity
pub fn velocity_to_dynamic(velocity: u8) -> &'static str {
    match velocity {
        0..=19 => "pp",
        20..=39 => "p",
        40..=59 => "mp",
        60..=79 => "mf",
        80..=99 => "f",
        _ => "ff",
    }
}

fn normalize_type_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleType {
    Major,
    Minor,
    PentatonicMajor,
    PentatonicMinor,
    Blues,
    Chromatic,
}

impl ScaleType {
    /// Semitone offsets from the root
    pub fn intervals(self) -> &'static [u8] {
        match self {
            Self::Major => &[0, 2, 4, 5, 7, 9, 11],
            Self::Minor => &[0, 2, 3, 5, 7, 8, 10],
            Self::PentatonicMajor => &[0, 2, 4, 7, 9],
            Self::PentatonicMinor => &[0, 3, 5, 7, 10],
            Self::Blues => &[0, 3, 5, 6, 7, 10],
            Self::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        }
    }
}

impl FromStr for ScaleType {
    type Err = MidiUtilError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_type_name(s).as_str() {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "pentatonic_major" => Ok(Self::PentatonicMajor),
            "pentatonic_minor" => Ok(Self::PentatonicMinor),
            "blues" => Ok(Self::Blues),
            "chromatic" => Ok(Self::Chromatic),
            _ => Err(MidiUtilError::UnknownScale(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordType {
    Major,
    Minor,
    Diminished,
    Augmented,
    Major7th,
    Minor7th,
    Dominant7th,
    Sus2,
    Sus4,
}

impl ChordType {
    /// Semitone offsets from the root
    pub fn intervals(self) -> &'static [u8] {
        match self {
            Self::Major => &[0, 4, 7],
            Self::Minor => &[0, 3, 7],
            Self::Diminished => &[0, 3, 6],
            Self::Augmented => &[0, 4, 8],
            Self::Major7th => &[0, 4, 7, 11],
            Self::Minor7th => &[0, 3, 7, 10],
            Self::Dominant7th => &[0, 4, 7, 10],
            Self::Sus2 => &[0, 2, 7],
            Self::Sus4 => &[0, 5, 7],
        }
    }
}

impl FromStr for ChordType {
    type Err = MidiUtilError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_type_name(s).as_str() {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "diminished" => Ok(Self::Diminished),
            "augmented" => Ok(Self::Augmented),
            "major_7th" => Ok(Self::Major7th),
            "minor_7th" => Ok(Self::Minor7th),
            "dominant_7th" => Ok(Self::Dominant7th),
            "sus2" => Ok(Self::Sus2),
            "sus4" => Ok(Self::Sus4),
            _ => Err(MidiUtilError::UnknownChord(s.to_string())),
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::PentatonicMajor => "pentatonic_major",
            Self::PentatonicMinor => "pentatonic_minor",
            Self::Blues => "blues",
            Self::Chromatic => "chromatic",
        };
        f.write_str(name)
    }
}

impl fmt::Display for ChordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Diminished => "diminished",
            Self::Augmented => "augmented",
            Self::Major7th => "major_7th",
            Self::Minor7th => "minor_7th",
            Self::Dominant7th => "dominant_7th",
            Self::Sus2 => "sus2",
            Self::Sus4 => "sus4",
        };
        f.write_str(name)
    }
}

fn stack_intervals(root: &str, intervals: &[u8]) -> Result<Vec<u8>> {
    let root = parse_note_string(root)?;
    intervals
        .iter()
        .map(|interval| {
            let number = i64::from(root) + i64::from(*interval);
            if number > 127 {
                Err(MidiUtilError::NoteOutOfRange(number))
            } else {
                Ok(number as u8)
            }
        })
        .collect()
}

/// MIDI numbers of a scale starting at `root` (e.g. `"C4"`)
pub fn scale_notes(root: &str, scale: ScaleType) -> Result<Vec<u8>> {
    stack_intervals(root, scale.intervals())
}

/// MIDI numbers of a chord rooted at `root` (e.g. `"C4"`)
pub fn chord_notes(root: &str, chord: ChordType) -> Result<Vec<u8>> {
    stack_intervals(root, chord.intervals())
}
