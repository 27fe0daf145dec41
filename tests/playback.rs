use fretstep::effects::{EffectRegistry, EffectUnit, NoteContext, Settings, Signal};
use fretstep::error::PluginError;
use fretstep::engine::{PlaybackEvent, Schedule, Transport, TransportConfig, TransportState};
use fretstep::graph::{
    extensions::NodeExt,
    node::{GraphNode, RenderCtx},
};
use fretstep::sequencing::{
    Note, NoteDuration, SequenceStore, Step, StrumDirection, NUM_FRETS, NUM_STRINGS,
};
use fretstep::{tuning, Error, Session};

fn quarter(string: usize, fret: usize) -> Note {
    Note::played(string, fret, NoteDuration::Quarter).unwrap()
}

fn drain<T>(rx: &mut rtrb::Consumer<T>) -> Vec<T> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.pop() {
        out.push(ev);
    }
    out
}

#[test]
fn octave_up_doubles_frequency() {
    for string in 0..NUM_STRINGS {
        for fret in 0..(NUM_FRETS - 12) as u32 {
            let low = tuning::frequency_of(string, fret);
            let high = tuning::frequency_of(string, fret + 12);
            assert!((high - 2.0 * low).abs() < 1e-9 * high, "string {string} fret {fret}");
        }
    }
}

#[test]
fn recorded_step_reads_back_unchanged() {
    let mut store = SequenceStore::new();
    store
        .record_step(vec![quarter(0, 0)], StrumDirection::Down)
        .unwrap();
    let notes = vec![
        quarter(4, 3),
        Note::rest(2, 0, NoteDuration::Eighth).unwrap(),
        Note::played(1, 1, NoteDuration::Whole).unwrap(),
    ];
    let index = store.record_step(notes.clone(), StrumDirection::Up).unwrap();

    store.move_to(0).unwrap();
    let step = store.move_to(index).unwrap();
    assert_eq!(step.strum(), StrumDirection::Up);
    assert_eq!(step.notes().len(), notes.len());
    for (read, written) in step.notes().iter().zip(&notes) {
        assert!(read.same_occurrence(written));
    }
}

#[test]
fn strum_direction_orders_strings() {
    let config = TransportConfig::default();
    for (strum, expected) in [
        (StrumDirection::Up, [0u8, 2, 4]),
        (StrumDirection::Down, [4u8, 2, 0]),
    ] {
        let step = Step::new(vec![quarter(2, 0), quarter(0, 0), quarter(4, 0)], strum).unwrap();
        let schedule = Schedule::build(&[step], &config).unwrap();
        let order: Vec<u8> = schedule.notes.iter().map(|n| n.note.string()).collect();
        assert_eq!(order, expected);
    }
}

#[test]
fn two_quarter_notes_at_120_bpm() {
    let sr = 1_000.0;
    let steps = [
        Step::new(vec![quarter(0, 0)], StrumDirection::Down).unwrap(),
        Step::new(vec![quarter(5, 3)], StrumDirection::Down).unwrap(),
    ];
    let config = TransportConfig::default();
    let schedule = Schedule::build(&steps, &config).unwrap();
    assert!((schedule.seconds_per_step - 0.5).abs() < 1e-12);

    let mut transport = Transport::new(sr).unwrap();
    let mut rx = transport.subscribe(64);
    transport
        .play(&steps, &config, &mut fretstep::effects::default_chain())
        .unwrap();

    // Render one frame at a time and note when each event appears
    let mut on = Vec::new();
    let mut off = Vec::new();
    let mut frame = [0.0f32; 1];
    for clock in 0..1_200u64 {
        transport.render_block(&mut frame);
        for ev in drain(&mut rx) {
            match ev {
                PlaybackEvent::NoteSounding { .. } => on.push(clock),
                PlaybackEvent::NoteSilenced { .. } => off.push(clock),
                _ => {}
            }
        }
    }
    assert_eq!(on, vec![0, 500]);
    assert_eq!(off, vec![500, 1_000]);
    assert_eq!(transport.state(), TransportState::Idle);
}

#[test]
fn stop_leaves_nothing_pending_or_sounding() {
    let mut session = Session::new(1_000.0).unwrap();
    for (string, fret) in [(0, 0), (1, 1), (2, 2), (3, 2)] {
        session.clear_selection();
        session.toggle_note(string, fret).unwrap();
        session.toggle_note(5, 0).unwrap();
        session.record_step().unwrap();
    }
    // Let the auditions from selecting ring out
    let mut block = vec![0.0f32; 256];
    for _ in 0..4 {
        session.render_block(&mut block);
    }

    session.play().unwrap();
    let first = session.transport().step_offsets();
    for _ in 0..3 {
        session.render_block(&mut block[..250]);
    }
    session.stop();
    assert_eq!(session.transport().pending_events(), 0);
    assert_eq!(session.transport().sounding_notes(), 0);

    session.render_block(&mut block[..10]);
    assert_eq!(session.transport().audible_voices(), 0);
    session.render_block(&mut block);
    assert!(block.iter().all(|&s| s == 0.0));

    session.play().unwrap();
    assert_eq!(session.transport().step_offsets(), first);
}

#[derive(Clone, Copy)]
struct AffineNode {
    gain: f32,
    offset: f32,
}

impl GraphNode for AffineNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        for s in out.iter_mut() {
            *s = *s * self.gain + self.offset;
        }
    }

    fn is_active(&self) -> bool {
        false
    }
}

struct Affine {
    node: AffineNode,
    enabled: bool,
}

impl Affine {
    fn boxed(gain: f32, offset: f32) -> Box<dyn EffectUnit> {
        Box::new(Self {
            node: AffineNode { gain, offset },
            enabled: true,
        })
    }
}

impl EffectUnit for Affine {
    fn name(&self) -> &'static str {
        "affine"
    }

    fn process(&self, signal: &mut Signal, _ctx: &NoteContext) -> Result<(), PluginError> {
        let node = self.node;
        signal.wrap(move |inner| inner.through(node));
        Ok(())
    }

    fn settings(&self) -> Settings {
        Settings::new()
    }

    fn validate_settings(&self, _settings: &Settings) -> Result<(), PluginError> {
        Ok(())
    }

    fn apply_settings(&mut self, _settings: &Settings) -> Result<(), PluginError> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

struct Dc;

impl GraphNode for Dc {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        out.fill(1.0);
    }
}

fn run_chain(registry: &mut EffectRegistry) -> f32 {
    let note = quarter(0, 0);
    let ctx = NoteContext {
        note,
        step: 0,
        frequency: 329.63,
        sample_rate: 8_000.0,
    };
    let mut signal = Signal::new(Dc.boxed());
    registry.process(&mut signal, &ctx);
    let mut out = [0.0f32; 4];
    signal
        .into_node()
        .render_block(&mut out, &RenderCtx::from_freq(8_000.0, 329.63, 1.0));
    out[0]
}

#[test]
fn effects_apply_in_install_order() {
    let mut ab = EffectRegistry::new();
    ab.install("double", Affine::boxed(2.0, 0.0)).unwrap();
    ab.install("plus_one", Affine::boxed(1.0, 1.0)).unwrap();
    assert_eq!(run_chain(&mut ab), 3.0);

    let mut ba = EffectRegistry::new();
    ba.install("plus_one", Affine::boxed(1.0, 1.0)).unwrap();
    ba.install("double", Affine::boxed(2.0, 0.0)).unwrap();
    assert_eq!(run_chain(&mut ba), 4.0);

    let mut only_b = EffectRegistry::new();
    only_b.install("plus_one", Affine::boxed(1.0, 1.0)).unwrap();

    ab.set_enabled("double", false).unwrap();
    assert_eq!(run_chain(&mut ab), run_chain(&mut only_b));
}

#[test]
fn goto_past_last_step_is_rejected() {
    let mut session = Session::new(1_000.0).unwrap();
    session.toggle_note(0, 0).unwrap();
    session.record_step().unwrap();
    session.toggle_note(1, 0).unwrap();
    session.record_step().unwrap();
    session.goto_step(0).unwrap();

    let err = session.goto_step(2).unwrap_err();
    assert!(matches!(err, Error::Boundary(_)));
    assert_eq!(session.current_step(), Some(0));
}

#[cfg(feature = "serde")]
#[test]
fn import_with_duplicate_note_changes_nothing() {
    let mut session = Session::new(1_000.0).unwrap();
    session.toggle_note(0, 0).unwrap();
    session.record_step().unwrap();
    let before = session.store().steps().to_vec();

    let json = r#"{
        "tempo": 120,
        "timeSignature": { "beatsPerMeasure": 4, "beatUnit": 4 },
        "volume": 0.5,
        "steps": [
            { "notes": [
                { "string": 2, "fret": 5, "duration": "quarter", "isRest": false },
                { "string": 2, "fret": 5, "duration": "quarter", "isRest": false }
            ], "strum": "down" }
        ]
    }"#;
    let err = session.import_json(json).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(session.store().steps(), before.as_slice());
    assert_eq!(session.current_step(), Some(0));
}
