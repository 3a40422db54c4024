use camjigsaw_core::melody::{Note, MELODY, NOTE_ATTACK_MS, NOTE_PEAK_GAIN};
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{AudioContext, HtmlAudioElement, OscillatorType};

const POP_SOUND_SRC: &str = "popsound.mp3";

/// Snap pop and the completion jingle. Everything is fire-and-forget.
pub(crate) struct AudioCues {
    pop: Option<HtmlAudioElement>,
    context: Option<AudioContext>,
}

impl AudioCues {
    pub(crate) fn new(pop_volume: f32) -> Self {
        let pop = match HtmlAudioElement::new_with_src(POP_SOUND_SRC) {
            Ok(audio) => {
                audio.set_volume(pop_volume as f64);
                Some(audio)
            }
            Err(err) => {
                gloo::console::warn!("pop sound unavailable", err);
                None
            }
        };
        let context = match AudioContext::new() {
            Ok(context) => Some(context),
            Err(err) => {
                gloo::console::warn!("audio context unavailable", err);
                None
            }
        };
        Self { pop, context }
    }

    pub(crate) fn pop(&self) {
        let Some(pop) = &self.pop else {
            return;
        };
        pop.set_current_time(0.0);
        if let Ok(promise) = pop.play() {
            // Autoplay may reject before the first user gesture.
            spawn_local(async move {
                let _ = JsFuture::from(promise).await;
            });
        }
    }

    /// Plays the jingle `delay_ms` from now.
    pub(crate) fn play_melody(&self, delay_ms: u32) {
        let Some(context) = self.context.clone() else {
            return;
        };
        Timeout::new(delay_ms, move || {
            let _ = context.resume();
            for note in MELODY {
                let context = context.clone();
                Timeout::new(note.start_ms, move || {
                    if let Err(err) = play_note(&context, &note) {
                        gloo::console::warn!("note failed", err);
                    }
                })
                .forget();
            }
        })
        .forget();
    }
}

fn play_note(context: &AudioContext, note: &Note) -> Result<(), JsValue> {
    let now = context.current_time();
    let end = now + note.duration_ms as f64 / 1000.0;

    let oscillator = context.create_oscillator()?;
    oscillator.set_type(OscillatorType::Triangle);
    oscillator.frequency().set_value(note.frequency_hz);

    let envelope = context.create_gain()?;
    oscillator.connect_with_audio_node(&envelope)?;
    envelope.connect_with_audio_node(&context.destination())?;
    let gain = envelope.gain();
    gain.set_value_at_time(0.0, now)?;
    gain.linear_ramp_to_value_at_time(NOTE_PEAK_GAIN, now + NOTE_ATTACK_MS as f64 / 1000.0)?;
    gain.linear_ramp_to_value_at_time(0.0, end)?;

    oscillator.start_with_when(now)?;
    oscillator.stop_with_when(end)?;

    Timeout::new(note.duration_ms, move || {
        let _ = oscillator.disconnect();
    })
    .forget();
    Ok(())
}
