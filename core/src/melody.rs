/// Completion jingle, played on a triangle oscillator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Note {
    pub name: &'static str,
    pub frequency_hz: f32,
    /// Offset from the start of the melody.
    pub start_ms: u32,
    pub duration_ms: u32,
}

pub const DO_HZ: f32 = 261.6;
pub const RE_HZ: f32 = 293.7;
pub const MI_HZ: f32 = 329.6;

pub const NOTE_PEAK_GAIN: f32 = 0.5;
pub const NOTE_ATTACK_MS: u32 = 100;

pub const MELODY: [Note; 4] = [
    Note {
        name: "MI",
        frequency_hz: MI_HZ,
        start_ms: 0,
        duration_ms: 300,
    },
    Note {
        name: "DO",
        frequency_hz: DO_HZ,
        start_ms: 300,
        duration_ms: 300,
    },
    Note {
        name: "RE",
        frequency_hz: RE_HZ,
        start_ms: 450,
        duration_ms: 150,
    },
    Note {
        name: "MI",
        frequency_hz: MI_HZ,
        start_ms: 600,
        duration_ms: 600,
    },
];

impl Note {
    pub fn end_ms(&self) -> u32 {
        self.start_ms + self.duration_ms
    }

    /// Envelope value `elapsed_ms` into the note: a linear rise to the peak
    /// over the attack, then a linear fall reaching zero at the note's end.
    pub fn gain_at(&self, elapsed_ms: f32) -> f32 {
        let attack = NOTE_ATTACK_MS as f32;
        let duration = self.duration_ms as f32;
        if elapsed_ms <= 0.0 || elapsed_ms >= duration {
            return 0.0;
        }
        if elapsed_ms <= attack {
            return NOTE_PEAK_GAIN * elapsed_ms / attack;
        }
        NOTE_PEAK_GAIN * (duration - elapsed_ms) / (duration - attack)
    }
}

pub fn melody_length_ms() -> u32 {
    MELODY.iter().map(Note::end_ms).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn melody_ends_with_long_mi() {
        assert_eq!(melody_length_ms(), 1200);
        assert_eq!(MELODY[3].name, "MI");
        assert_eq!(MELODY[2].duration_ms, 150);
    }

    #[test]
    fn envelope_peaks_after_attack() {
        let note = MELODY[0];
        assert_eq!(note.gain_at(0.0), 0.0);
        assert!((note.gain_at(100.0) - NOTE_PEAK_GAIN).abs() < 1e-6);
        assert!((note.gain_at(200.0) - NOTE_PEAK_GAIN * 0.5).abs() < 1e-6);
        assert_eq!(note.gain_at(300.0), 0.0);
    }
}
