use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_csave"))
}

fn tmp_path(name: &str) -> PathBuf {
    let tmp_dir = std::env::temp_dir().join("csave-cli-tests");
    fs::create_dir_all(&tmp_dir).ok();
    tmp_dir.join(name)
}

fn create_test_file(name: &str, content: &str) -> PathBuf {
    let path = tmp_path(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

fn run_csave(args: &[&str]) -> (bool, String) {
    let output = Command::new(binary())
        .args(args)
        .output()
        .expect("Failed to execute csave");

    let text = String::from_utf8_lossy(&output.stderr).to_string()
        + &String::from_utf8_lossy(&output.stdout);
    (output.status.success(), text)
}

#[test]
fn test_render_default_program() {
    let input = create_test_file("render_default.txt", "HELLO");
    let output = tmp_path("render_default.wav");

    let (ok, text) = run_csave(&[
        "render",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ]);
    assert!(ok, "render failed: {}", text);
    assert!(text.contains("Wrote"), "Unexpected output: {}", text);

    let reader = hound::WavReader::open(&output).expect("Output is not a WAV file");
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 48000);
    assert_eq!(spec.bits_per_sample, 16);

    // 4 s + 16 header bytes, 2 s + 5 data bytes, 400 samples per byte
    let expected = 192_000 + 16 * 400 + 96_000 + 5 * 400;
    assert_eq!(reader.duration(), expected);
}

#[test]
fn test_render_stereo_float() {
    let input = create_test_file("render_stereo.txt", "AB");
    let output = tmp_path("render_stereo.wav");

    let (ok, text) = run_csave(&[
        "render",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
        "--channels",
        "2",
        "--float",
        "--sample-rate",
        "8000",
        "--symbol-rate",
        "2400",
    ]);
    assert!(ok, "render failed: {}", text);

    let mut reader = hound::WavReader::open(&output).expect("Output is not a WAV file");
    assert_eq!(reader.spec().channels, 2);
    assert_eq!(reader.spec().sample_format, hound::SampleFormat::Float);

    let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
    for frame in samples.chunks(2) {
        assert_eq!(frame[0], frame[1], "Channels differ");
        assert!(frame[0].abs() <= 0.125 + 1e-6);
    }
}

#[test]
fn test_render_program_file() {
    let program = create_test_file(
        "program.json",
        r#"{
            "sample_rate": 22050,
            "records": [
                { "preamble": 0.5, "text": "RUN" }
            ]
        }"#,
    );
    let output = tmp_path("program.wav");

    let (ok, text) = run_csave(&[
        "render",
        "--program",
        program.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ]);
    assert!(ok, "render failed: {}", text);

    let reader = hound::WavReader::open(&output).expect("Output is not a WAV file");
    assert_eq!(reader.spec().sample_rate, 22050);
    // round(22050 / 1200) = 18 samples per bit
    assert_eq!(reader.duration(), 11_025 + 3 * 10 * 18);
}

#[test]
fn test_invalid_symbol_rate_writes_nothing() {
    let input = create_test_file("bad_rate.txt", "X");
    let output = tmp_path("bad_rate.wav");
    fs::remove_file(&output).ok();

    let (ok, text) = run_csave(&[
        "render",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
        "--symbol-rate",
        "0",
    ]);
    assert!(!ok, "zero symbol rate was accepted");
    assert!(text.contains("InvalidSymbolRate"), "Unexpected output: {}", text);
    assert!(!output.exists(), "Output file was created for a bad configuration");
}

#[test]
fn test_info_reports_layout() {
    let input = create_test_file("info.txt", "HELLO");

    let (ok, text) = run_csave(&["info", input.to_str().unwrap()]);
    assert!(ok, "info failed: {}", text);
    assert!(text.contains("record 0"), "Missing header record: {}", text);
    assert!(text.contains("record 1"), "Missing data record: {}", text);
    assert!(text.contains("296400 samples"), "Wrong total: {}", text);
}
